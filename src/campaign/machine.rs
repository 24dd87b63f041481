//! Lifecycle State Machine
//!
//! Computes the next campaign state for a requested operation.
//!
//! ```text
//!            ┌──────── Pause ────────┐
//!            ▼                       │
//!   Deposit ─► Active ◄── Resume ── Paused
//!              │   │
//!     SetRoot  │   │  Cancel
//!              ▼   ▼
//!          Ended   Cancelled      (terminal)
//!          (Claim)
//! ```
//!
//! Every function here takes the prior state by reference and returns either
//! a fresh state or a [`CampaignError`]. A rejection therefore never changes
//! the caller's value, and independent campaigns can be evaluated on any
//! thread without locking. Serializing operations on one campaign is the
//! caller's job (see `service::registry`).

use tracing::{debug, warn};

use crate::campaign::operation::{ClaimData, Operation};
use crate::campaign::state::{CampaignState, CampaignStatus, DepositParams};
use crate::core::hash::{Blake2b256, Digest, HashPrimitive};
use crate::errors::CampaignError;
use crate::merkle::proof::InclusionVerifier;

/// State machine bound to the hash primitive used for claim verification.
#[derive(Clone, Copy, Debug, Default)]
pub struct CampaignMachine<H: HashPrimitive = Blake2b256> {
    verifier: InclusionVerifier<H>,
}

impl<H: HashPrimitive> CampaignMachine<H> {
    /// Create a machine.
    pub fn new() -> Self {
        Self {
            verifier: InclusionVerifier::new(),
        }
    }

    /// Apply `op` submitted by `caller`.
    ///
    /// `prior` is None only for a campaign that has not been deposited yet.
    pub fn transition(
        &self,
        prior: Option<&CampaignState>,
        caller: &str,
        op: &Operation,
    ) -> Result<CampaignState, CampaignError> {
        if let Some(state) = prior {
            if let Err(violation) = state.check_invariants() {
                warn!(
                    campaign_id = %state.campaign_id,
                    operation = op.kind(),
                    violation,
                    "refusing operation on corrupt state"
                );
                return Err(CampaignError::CorruptState(violation));
            }
        }

        let result = match (prior, op) {
            (None, Operation::Deposit(params)) => deposit(params),
            (Some(_), Operation::Deposit(_)) => Err(CampaignError::AlreadyDeposited),
            (None, _) => Err(CampaignError::UnknownCampaign),
            (Some(state), op) => self.apply_existing(state, caller, op),
        };

        match &result {
            Ok(next) => {
                debug!(
                    campaign_id = %next.campaign_id,
                    operation = op.kind(),
                    status = ?next.status,
                    total_claimed = next.total_claimed,
                    claims_count = next.claims_count,
                    "operation accepted"
                );
            }
            Err(err) => {
                debug!(operation = op.kind(), caller, error = %err, "operation rejected");
            }
        }

        result
    }

    /// Apply `op` to an existing campaign.
    pub fn apply(
        &self,
        state: &CampaignState,
        caller: &str,
        op: &Operation,
    ) -> Result<CampaignState, CampaignError> {
        self.transition(Some(state), caller, op)
    }

    fn apply_existing(
        &self,
        state: &CampaignState,
        caller: &str,
        op: &Operation,
    ) -> Result<CampaignState, CampaignError> {
        match op {
            Operation::Deposit(_) => Err(CampaignError::AlreadyDeposited),
            Operation::SetRoot { root } => set_root(state, caller, root),
            Operation::Claim(claim) => self.claim(state, claim),
            Operation::Pause => pause(state, caller),
            Operation::Resume => resume(state, caller),
            Operation::Cancel => cancel(state, caller),
            Operation::UpdateCredit { amount } => update_credit(state, caller, *amount),
            Operation::VerifyTask { task_id, credit_cost } => verify_task(state, task_id, *credit_cost),
        }
    }

    /// Status, inclusion proof, double-claim, then balance.
    fn claim(&self, state: &CampaignState, claim: &ClaimData) -> Result<CampaignState, CampaignError> {
        require_status(state, CampaignStatus::Ended, "Claim")?;

        let verified = state.commitment_root.is_some_and(|root| {
            self.verifier.verify(
                &claim.address,
                claim.amount,
                &state.campaign_id,
                &claim.proof,
                root.as_ref(),
            )
        });
        if !verified {
            warn!(
                campaign_id = %state.campaign_id,
                address = %claim.address,
                amount = claim.amount,
                "claim proof rejected"
            );
            return Err(CampaignError::InvalidProof {
                address: claim.address.clone(),
            });
        }

        if state.has_claimed(&claim.address) {
            return Err(CampaignError::DoubleClaim {
                address: claim.address.clone(),
            });
        }

        let available = state.remaining_pool();
        if available < claim.amount {
            return Err(CampaignError::InsufficientPool {
                available,
                requested: claim.amount,
            });
        }

        let mut next = state.clone();
        next.total_claimed += claim.amount;
        next.claims_count += 1;
        next.claimed_addresses.insert(claim.address.clone());
        Ok(next)
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Open a campaign: Active, no root, counters zero.
pub fn deposit(params: &DepositParams) -> Result<CampaignState, CampaignError> {
    params.validate()?;
    Ok(CampaignState::new(params))
}

/// Apply `op` with the default (BLAKE2b-256) machine.
pub fn apply(state: &CampaignState, caller: &str, op: &Operation) -> Result<CampaignState, CampaignError> {
    CampaignMachine::<Blake2b256>::new().apply(state, caller, op)
}

/// Seal the commitment. A second attempt reports `RootAlreadySet` before
/// any other precondition.
fn set_root(state: &CampaignState, caller: &str, root: &[u8]) -> Result<CampaignState, CampaignError> {
    if state.commitment_root.is_some() {
        return Err(CampaignError::RootAlreadySet);
    }
    require_status(state, CampaignStatus::Active, "SetRoot")?;
    require_owner(state, caller)?;
    let root = Digest::from_slice(root).ok_or(CampaignError::InvalidRoot { len: root.len() })?;

    let mut next = state.clone();
    next.commitment_root = Some(root);
    next.status = CampaignStatus::Ended;
    Ok(next)
}

fn pause(state: &CampaignState, caller: &str) -> Result<CampaignState, CampaignError> {
    require_status(state, CampaignStatus::Active, "Pause")?;
    require_owner(state, caller)?;

    let mut next = state.clone();
    next.status = CampaignStatus::Paused;
    Ok(next)
}

fn resume(state: &CampaignState, caller: &str) -> Result<CampaignState, CampaignError> {
    require_status(state, CampaignStatus::Paused, "Resume")?;
    require_owner(state, caller)?;

    let mut next = state.clone();
    next.status = CampaignStatus::Active;
    Ok(next)
}

/// Penalty and refund are projected by `effects`; only the status changes here.
fn cancel(state: &CampaignState, caller: &str) -> Result<CampaignState, CampaignError> {
    require_status(state, CampaignStatus::Active, "Cancel")?;
    require_owner(state, caller)?;
    if !state.cancel_policy.permits(state.claims_count) {
        return Err(CampaignError::CancelNotPermitted {
            claims_count: state.claims_count,
        });
    }

    let mut next = state.clone();
    next.status = CampaignStatus::Cancelled;
    Ok(next)
}

/// Allowed in any status.
fn update_credit(state: &CampaignState, caller: &str, amount: u64) -> Result<CampaignState, CampaignError> {
    require_owner(state, caller)?;
    if amount == 0 {
        return Err(CampaignError::InvalidAmount);
    }
    let credit_balance = state
        .credit_balance
        .checked_add(amount)
        .ok_or(CampaignError::CreditOverflow)?;

    let mut next = state.clone();
    next.credit_balance = credit_balance;
    Ok(next)
}

fn verify_task(state: &CampaignState, task_id: &[u8], credit_cost: u64) -> Result<CampaignState, CampaignError> {
    let available = state.available_credit();
    if available < credit_cost {
        return Err(CampaignError::InsufficientCredit {
            available,
            requested: credit_cost,
        });
    }
    require_status(state, CampaignStatus::Active, "VerifyTask")?;

    debug!(
        campaign_id = %state.campaign_id,
        task_id = %hex::encode(task_id),
        credit_cost,
        "task verification charged"
    );

    let mut next = state.clone();
    next.credit_used += credit_cost;
    Ok(next)
}

fn require_status(
    state: &CampaignState,
    expected: CampaignStatus,
    operation: &'static str,
) -> Result<(), CampaignError> {
    if state.status == expected {
        Ok(())
    } else {
        Err(CampaignError::WrongStatus {
            operation,
            actual: state.status,
        })
    }
}

fn require_owner(state: &CampaignState, caller: &str) -> Result<(), CampaignError> {
    if state.is_owner(caller) {
        Ok(())
    } else {
        Err(CampaignError::Unauthorized {
            caller: caller.to_string(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
