//! Collaborator Contracts
//!
//! Narrow seams to the services that sit outside the core: on-ledger state
//! lookup and transaction assembly. The core hands them already-validated
//! state transitions and never depends on how they work.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::campaign::effects::{FundMovement, Recipient};
use crate::campaign::operation::Operation;
use crate::campaign::state::{CampaignState, CampaignStatus};

/// Resolves the current state of a campaign, e.g. from a chain indexer.
#[allow(async_fn_in_trait)]
pub trait CampaignQuery {
    /// Current state, or None if the campaign is unknown.
    async fn campaign(&self, campaign_id: &str) -> Option<CampaignState>;
}

/// Turns an accepted operation into something submittable.
pub trait TransactionAssembler {
    /// Assembled transaction type.
    type Output;
    /// Assembly failure.
    type Error: std::error::Error;

    /// Assemble a transaction for `op`, whose resulting state is `state`.
    fn assemble(
        &self,
        op: &Operation,
        state: &CampaignState,
        movements: &[FundMovement],
    ) -> Result<Self::Output, Self::Error>;
}

// =============================================================================
// DRAFT ASSEMBLER
// =============================================================================

/// Transaction assembly errors.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Datum could not be encoded.
    #[error("datum encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
}

/// One transaction output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftOutput {
    /// Receiving address.
    pub address: String,
    /// Amount in the smallest currency unit.
    pub amount: u64,
    /// Continuing campaign datum (bincode, hex), only on the custody output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum: Option<String>,
}

/// Unsigned, unbalanced transaction outline.
///
/// Input selection, fees, collateral and signing are left to the wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    /// Operation name.
    pub operation: String,
    /// Redeemer for the campaign input.
    pub redeemer: Operation,
    /// Outputs in order.
    pub outputs: Vec<DraftOutput>,
    /// Owner signature required.
    pub requires_owner_signature: bool,
}

impl TransactionDraft {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Builds [`TransactionDraft`]s paying custody to a script address.
#[derive(Clone, Debug)]
pub struct DraftAssembler {
    /// Address holding campaign funds.
    pub script_address: String,
}

impl DraftAssembler {
    /// Create an assembler for `script_address`.
    pub fn new(script_address: impl Into<String>) -> Self {
        Self {
            script_address: script_address.into(),
        }
    }
}

impl TransactionAssembler for DraftAssembler {
    type Output = TransactionDraft;
    type Error = AssemblyError;

    fn assemble(
        &self,
        op: &Operation,
        state: &CampaignState,
        movements: &[FundMovement],
    ) -> Result<TransactionDraft, AssemblyError> {
        let datum = hex::encode(state.to_bytes()?);

        let mut outputs: Vec<DraftOutput> = movements
            .iter()
            .map(|movement| match &movement.recipient {
                Recipient::Custody(_) => DraftOutput {
                    address: self.script_address.clone(),
                    amount: movement.amount,
                    datum: Some(datum.clone()),
                },
                Recipient::Participant(address)
                | Recipient::Owner(address)
                | Recipient::FeeWallet(address) => DraftOutput {
                    address: address.clone(),
                    amount: movement.amount,
                    datum: None,
                },
            })
            .collect();

        // The campaign output continues unless the pool was refunded
        let has_custody = movements
            .iter()
            .any(|m| matches!(m.recipient, Recipient::Custody(_)));
        if !has_custody && state.status != CampaignStatus::Cancelled {
            outputs.push(DraftOutput {
                address: self.script_address.clone(),
                amount: state.remaining_pool(),
                datum: Some(datum),
            });
        }

        let requires_owner_signature = match op {
            Operation::Claim(_) | Operation::VerifyTask { .. } => false,
            Operation::Deposit(_)
            | Operation::SetRoot { .. }
            | Operation::Pause
            | Operation::Resume
            | Operation::Cancel
            | Operation::UpdateCredit { .. } => true,
        };

        Ok(TransactionDraft {
            operation: op.kind().to_string(),
            redeemer: op.clone(),
            outputs,
            requires_owner_signature,
        })
    }
}
