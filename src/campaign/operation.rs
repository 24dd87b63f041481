//! Campaign Operations
//!
//! One variant per lifecycle operation. Matching is exhaustive everywhere an
//! operation is interpreted, so adding a variant is a compile error until every
//! consumer handles it.
//!
//! JSON uses an internally tagged form (`{"type": "Claim", ...}`); byte
//! strings travel as hex.

use serde::{Deserialize, Serialize};

use crate::campaign::state::DepositParams;
use crate::merkle::proof::MerkleProof;

/// A participant's claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimData {
    /// Claiming address.
    pub address: String,
    /// Claimed amount.
    pub amount: u64,
    /// Inclusion proof against the campaign root.
    pub proof: MerkleProof,
}

/// Lifecycle operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Operation {
    /// Open a campaign and lock its pool.
    Deposit(DepositParams),

    /// Seal the payout commitment; moves the campaign to Ended.
    SetRoot {
        /// Root bytes as submitted (validated as a 32-byte digest).
        #[serde(with = "hex_bytes")]
        root: Vec<u8>,
    },

    /// Claim an allotted payout.
    Claim(ClaimData),

    /// Halt an active campaign.
    Pause,

    /// Resume a paused campaign.
    Resume,

    /// Cancel and refund, minus penalty.
    Cancel,

    /// Buy additional verification credit.
    UpdateCredit {
        /// Credit to add.
        amount: u64,
    },

    /// Spend credit on a task verification.
    VerifyTask {
        /// Opaque task identifier.
        #[serde(with = "hex_bytes")]
        task_id: Vec<u8>,
        /// Credit consumed.
        credit_cost: u64,
    },
}

impl Operation {
    /// Operation name for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Deposit(_) => "Deposit",
            Operation::SetRoot { .. } => "SetRoot",
            Operation::Claim(_) => "Claim",
            Operation::Pause => "Pause",
            Operation::Resume => "Resume",
            Operation::Cancel => "Cancel",
            Operation::UpdateCredit { .. } => "UpdateCredit",
            Operation::VerifyTask { .. } => "VerifyTask",
        }
    }

    /// Build a claim operation.
    pub fn claim(address: impl Into<String>, amount: u64, proof: MerkleProof) -> Self {
        Operation::Claim(ClaimData {
            address: address.into(),
            amount,
            proof,
        })
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Hex encoding for raw byte fields.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
