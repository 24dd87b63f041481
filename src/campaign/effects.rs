//! Effect Projector
//!
//! Computes which funds must move for an accepted operation. No validation
//! happens here (the state machine already accepted the operation) and no
//! transaction is built: the output is handed to an external assembler.

use serde::{Deserialize, Serialize};

use crate::campaign::operation::Operation;
use crate::campaign::state::CampaignState;
use crate::core::bps::calculate_penalty;

/// Who receives a movement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
pub enum Recipient {
    /// A claiming participant's address.
    Participant(String),
    /// The campaign owner.
    Owner(String),
    /// The fee wallet.
    FeeWallet(String),
    /// Funds held by the campaign itself, keyed by campaign id.
    Custody(String),
}

/// One required fund movement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundMovement {
    /// Receiving party.
    pub recipient: Recipient,
    /// Amount in the smallest currency unit.
    pub amount: u64,
}

impl FundMovement {
    fn new(recipient: Recipient, amount: u64) -> Self {
        Self { recipient, amount }
    }
}

/// Penalty and owner refund when cancelling `state`.
///
/// The penalty is `pool_amount * penalty_bps / 10_000`, capped at what is
/// still held; the owner receives the rest.
pub fn cancel_settlement(state: &CampaignState) -> (u64, u64) {
    let remaining = state.remaining_pool();
    let penalty = calculate_penalty(state.pool_amount, state.cancel_policy.penalty_bps).min(remaining);
    (penalty, remaining - penalty)
}

/// Fund movements required by an accepted operation, in output order.
///
/// `prior` is None for `Deposit`.
pub fn project(prior: Option<&CampaignState>, op: &Operation, new: &CampaignState) -> Vec<FundMovement> {
    let custody = || Recipient::Custody(new.campaign_id.clone());

    match op {
        Operation::Deposit(params) => vec![FundMovement::new(custody(), params.pool_amount)],
        Operation::Claim(claim) => vec![
            FundMovement::new(Recipient::Participant(claim.address.clone()), claim.amount),
            FundMovement::new(custody(), new.remaining_pool()),
        ],
        Operation::Cancel => {
            let (penalty, refund) = cancel_settlement(prior.unwrap_or(new));
            vec![
                FundMovement::new(Recipient::FeeWallet(new.fee_wallet.clone()), penalty),
                FundMovement::new(Recipient::Owner(new.owner.clone()), refund),
            ]
        }
        Operation::UpdateCredit { amount } => {
            vec![FundMovement::new(Recipient::FeeWallet(new.fee_wallet.clone()), *amount)]
        }
        Operation::SetRoot { .. }
        | Operation::Pause
        | Operation::Resume
        | Operation::VerifyTask { .. } => Vec::new(),
    }
}
