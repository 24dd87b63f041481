//! Campaign State Definitions
//!
//! The campaign record carried between operations. Values are never mutated
//! in place by the state machine; each accepted operation yields a new value.
//! Uses BTreeSet for the claim ledger so serialized state is deterministic.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::bps::{calculate_fee, is_valid_bps, DEFAULT_PENALTY_BPS, DEFAULT_PLATFORM_FEE_BPS};
use crate::core::hash::Digest;
use crate::errors::CampaignError;

// =============================================================================
// STATUS
// =============================================================================

/// Campaign lifecycle status.
///
/// Serialized numerically: `Active=0, Paused=1, Ended=2, Cancelled=3`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum CampaignStatus {
    /// Accepting management operations; claims not yet open.
    #[default]
    Active = 0,
    /// Temporarily halted by the owner.
    Paused = 1,
    /// Commitment sealed; claims open. Terminal.
    Ended = 2,
    /// Pool refunded. Terminal.
    Cancelled = 3,
}

/// Status code outside `0..=3`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid campaign status code: {0}")]
pub struct InvalidStatusCode(pub u8);

impl CampaignStatus {
    /// Whether `self -> next` is an edge of the lifecycle graph.
    pub fn can_transition_to(self, next: CampaignStatus) -> bool {
        use CampaignStatus::*;
        matches!(
            (self, next),
            (Active, Paused) | (Active, Ended) | (Active, Cancelled) | (Paused, Active)
        )
    }

    /// Ended and Cancelled have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, CampaignStatus::Ended | CampaignStatus::Cancelled)
    }

    /// Numeric code.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<CampaignStatus> for u8 {
    fn from(status: CampaignStatus) -> Self {
        status as u8
    }
}

impl TryFrom<u8> for CampaignStatus {
    type Error = InvalidStatusCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CampaignStatus::Active),
            1 => Ok(CampaignStatus::Paused),
            2 => Ok(CampaignStatus::Ended),
            3 => Ok(CampaignStatus::Cancelled),
            other => Err(InvalidStatusCode(other)),
        }
    }
}

// =============================================================================
// CANCEL POLICY
// =============================================================================

/// When an owner may cancel, and what it costs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelPolicy {
    /// Cancellation allowed regardless of claims.
    pub allowed_before_claims: bool,
    /// Cancellation allowed once at least one claim exists.
    pub allowed_after_claims: bool,
    /// Share of the pool withheld as penalty, in basis points.
    pub penalty_bps: u16,
}

impl Default for CancelPolicy {
    fn default() -> Self {
        Self {
            allowed_before_claims: true,
            allowed_after_claims: false,
            penalty_bps: DEFAULT_PENALTY_BPS,
        }
    }
}

impl CancelPolicy {
    /// Create a policy, rejecting `penalty_bps > 10_000`.
    pub fn new(
        allowed_before_claims: bool,
        allowed_after_claims: bool,
        penalty_bps: u16,
    ) -> Result<Self, CampaignError> {
        let policy = Self {
            allowed_before_claims,
            allowed_after_claims,
            penalty_bps,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Check the penalty lies in `[0, 10_000]`.
    pub fn validate(&self) -> Result<(), CampaignError> {
        if is_valid_bps(self.penalty_bps) {
            Ok(())
        } else {
            Err(CampaignError::InvalidBasisPoints(self.penalty_bps))
        }
    }

    /// Whether cancelling is permitted with `claims_count` claims recorded.
    pub fn permits(&self, claims_count: u64) -> bool {
        self.allowed_before_claims || (self.allowed_after_claims && claims_count > 0)
    }
}

// =============================================================================
// DEPOSIT PARAMETERS
// =============================================================================

/// Everything needed to open a campaign.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositParams {
    /// Owner identity (authorizes management operations).
    pub owner: String,
    /// Campaign identifier, bound into every payout leaf.
    pub campaign_id: String,
    /// Deposited reward pool.
    pub pool_amount: u64,
    /// Recipient of cancellation penalties and credit payments.
    pub fee_wallet: String,
    /// Platform fee on the pool, in basis points.
    pub platform_fee_bps: u16,
    /// Cancellation rules.
    pub cancel_policy: CancelPolicy,
}

impl DepositParams {
    /// Check both basis-point rates lie in `[0, 10_000]`.
    pub fn validate(&self) -> Result<(), CampaignError> {
        if !is_valid_bps(self.platform_fee_bps) {
            return Err(CampaignError::InvalidBasisPoints(self.platform_fee_bps));
        }
        self.cancel_policy.validate()
    }
}

// =============================================================================
// CAMPAIGN STATE
// =============================================================================

/// Complete campaign record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignState {
    /// Owner identity
    pub owner: String,

    /// Lifecycle status
    pub status: CampaignStatus,

    /// Sealed payout commitment (set at most once)
    pub commitment_root: Option<Digest>,

    /// Deposited pool
    pub pool_amount: u64,

    /// Sum of accepted claims
    pub total_claimed: u64,

    /// Number of accepted claims
    pub claims_count: u64,

    /// Addresses that have claimed
    pub claimed_addresses: BTreeSet<String>,

    /// Cancellation rules
    pub cancel_policy: CancelPolicy,

    /// Purchased verification credit
    pub credit_balance: u64,

    /// Consumed verification credit
    pub credit_used: u64,

    /// Campaign identifier
    pub campaign_id: String,

    /// Fee recipient
    pub fee_wallet: String,

    /// Platform fee rate
    #[serde(default = "default_platform_fee_bps")]
    pub platform_fee_bps: u16,
}

fn default_platform_fee_bps() -> u16 {
    DEFAULT_PLATFORM_FEE_BPS
}

impl CampaignState {
    /// Fresh state for a deposit: Active, no root, counters at zero.
    pub fn new(params: &DepositParams) -> Self {
        Self {
            owner: params.owner.clone(),
            status: CampaignStatus::Active,
            commitment_root: None,
            pool_amount: params.pool_amount,
            total_claimed: 0,
            claims_count: 0,
            claimed_addresses: BTreeSet::new(),
            cancel_policy: params.cancel_policy,
            credit_balance: 0,
            credit_used: 0,
            campaign_id: params.campaign_id.clone(),
            fee_wallet: params.fee_wallet.clone(),
            platform_fee_bps: params.platform_fee_bps,
        }
    }

    /// `pool_amount - total_claimed`.
    pub fn remaining_pool(&self) -> u64 {
        self.pool_amount.saturating_sub(self.total_claimed)
    }

    /// Platform fee owed on the deposited pool.
    pub fn platform_fee(&self) -> u64 {
        calculate_fee(self.pool_amount, self.platform_fee_bps)
    }

    /// `credit_balance - credit_used`.
    pub fn available_credit(&self) -> u64 {
        self.credit_balance.saturating_sub(self.credit_used)
    }

    /// Whether `address` has already claimed.
    pub fn has_claimed(&self, address: &str) -> bool {
        self.claimed_addresses.contains(address)
    }

    /// Whether `caller` is the owner.
    pub fn is_owner(&self, caller: &str) -> bool {
        self.owner == caller
    }

    /// Whether the campaign reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Check the invariants that hold after every accepted operation.
    ///
    /// Returns the first violated invariant.
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        if self.total_claimed > self.pool_amount {
            return Err("total_claimed exceeds pool_amount");
        }
        if self.claims_count != self.claimed_addresses.len() as u64 {
            return Err("claims_count differs from claimed_addresses");
        }
        if self.credit_used > self.credit_balance {
            return Err("credit_used exceeds credit_balance");
        }
        if self.commitment_root.is_some() && self.status != CampaignStatus::Ended {
            return Err("commitment_root set outside Ended");
        }
        if !is_valid_bps(self.cancel_policy.penalty_bps) {
            return Err("penalty_bps out of range");
        }
        if !is_valid_bps(self.platform_fee_bps) {
            return Err("platform_fee_bps out of range");
        }
        Ok(())
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Serialize to binary (bincode).
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from binary (bincode).
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

// =============================================================================
// TESTS
// =============================================================================
