//! Tree Export
//!
//! JSON form of a payout tree for storage and for handing to a proof-serving
//! service. Amounts travel as decimal strings so no consumer ever rounds them
//! through a float.
//!
//! ```json
//! { "root": "<hex>",
//!   "leaves": [{ "address": "...", "amount": "50000000", "hash": "<hex>", "index": 0 }],
//!   "layers": [["<hex>", ...], ...] }
//! ```

use serde::{Deserialize, Serialize};

use crate::core::hash::{Digest, HashPrimitive};
use crate::errors::CommitmentError;
use crate::merkle::tree::{PayoutEntry, PayoutTree};

/// Exported leaf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafExport {
    /// Participant address.
    pub address: String,
    /// Amount as a decimal string.
    pub amount: String,
    /// Leaf hash (hex).
    pub hash: String,
    /// Sorted position.
    pub index: usize,
}

/// Exported tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeExport {
    /// Root hash (hex).
    pub root: String,
    /// Leaves in sorted order.
    pub leaves: Vec<LeafExport>,
    /// Every layer, leaves first, hex-encoded.
    pub layers: Vec<Vec<String>>,
}

impl TreeExport {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl<H: HashPrimitive> PayoutTree<H> {
    /// Export for persistence or distribution.
    pub fn export(&self) -> TreeExport {
        TreeExport {
            root: self.root_hex(),
            leaves: self
                .leaves()
                .iter()
                .map(|leaf| LeafExport {
                    address: leaf.address.clone(),
                    amount: leaf.amount.to_string(),
                    hash: leaf.hash.to_hex(),
                    index: leaf.index,
                })
                .collect(),
            layers: self
                .layers()
                .iter()
                .map(|layer| layer.iter().map(Digest::to_hex).collect())
                .collect(),
        }
    }

    /// Rebuild a tree from an export.
    ///
    /// The tree is rebuilt from the exported `(address, amount)` pairs and
    /// must reproduce the exported root, leaf hashes and layers exactly.
    pub fn from_export(export: &TreeExport, campaign_id: &str) -> Result<Self, CommitmentError> {
        let entries = export
            .leaves
            .iter()
            .map(|leaf| -> Result<PayoutEntry, CommitmentError> {
                let amount = leaf.amount.parse::<u64>().map_err(|e| {
                    CommitmentError::MalformedExport(format!(
                        "amount {:?} for {}: {}",
                        leaf.amount, leaf.address, e
                    ))
                })?;
                Ok(PayoutEntry::new(leaf.address.clone(), amount))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tree = Self::build(&entries, campaign_id)?;

        let root = parse_digest(&export.root, "root")?;
        if root != tree.root() {
            return Err(CommitmentError::ExportMismatch(format!(
                "root {} rebuilt as {}",
                root,
                tree.root()
            )));
        }

        for (exported, rebuilt) in export.leaves.iter().zip(tree.leaves()) {
            let hash = parse_digest(&exported.hash, "leaf hash")?;
            if exported.index != rebuilt.index
                || exported.address != rebuilt.address
                || hash != rebuilt.hash
            {
                return Err(CommitmentError::ExportMismatch(format!(
                    "leaf {} ({})",
                    exported.index, exported.address
                )));
            }
        }

        if export.layers.len() != tree.layers().len() {
            return Err(CommitmentError::ExportMismatch(format!(
                "{} layers exported, {} rebuilt",
                export.layers.len(),
                tree.layers().len()
            )));
        }
        for (depth, (exported, rebuilt)) in export.layers.iter().zip(tree.layers()).enumerate() {
            let parsed = exported
                .iter()
                .map(|h| parse_digest(h, "layer node"))
                .collect::<Result<Vec<_>, _>>()?;
            if &parsed != rebuilt {
                return Err(CommitmentError::ExportMismatch(format!("layer {}", depth)));
            }
        }

        Ok(tree)
    }
}

fn parse_digest(s: &str, what: &str) -> Result<Digest, CommitmentError> {
    Digest::from_hex(s)
        .ok_or_else(|| CommitmentError::MalformedExport(format!("{} is not a 32-byte hex digest", what)))
}
