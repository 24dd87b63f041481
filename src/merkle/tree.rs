//! Payout Tree
//!
//! Binary hash tree over a campaign's payout list.
//!
//! Construction is deterministic in the multiset of entries: entries are
//! sorted byte-wise by address before hashing, and node pairing orders the
//! two children, so caller input order never affects the root. Odd layers
//! pair their last element with itself instead of padding.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::hash::{Blake2b256, Digest, HashPrimitive};
use crate::errors::CommitmentError;
use crate::merkle::proof::{hash_pair, leaf_hash, verify_inclusion, MerkleProof};

/// One participant's allotted payout.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayoutEntry {
    /// Participant address.
    pub address: String,
    /// Amount in the smallest currency unit.
    pub amount: u64,
}

impl PayoutEntry {
    /// Create a new entry.
    pub fn new(address: impl Into<String>, amount: u64) -> Self {
        Self {
            address: address.into(),
            amount,
        }
    }
}

/// Hashed payout entry at its sorted position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf {
    /// Participant address.
    pub address: String,
    /// Payout amount.
    pub amount: u64,
    /// Leaf hash.
    pub hash: Digest,
    /// Position in the sorted leaf sequence.
    pub index: usize,
}

/// Proof material for one participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    /// Committed amount.
    pub amount: u64,
    /// Inclusion proof.
    pub proof: MerkleProof,
}

/// Immutable payout tree.
///
/// `layers[0]` holds the leaf hashes; the last layer holds only the root.
#[derive(Clone, Debug)]
pub struct PayoutTree<H: HashPrimitive = Blake2b256> {
    campaign_id: String,
    leaves: Vec<Leaf>,
    layers: Vec<Vec<Digest>>,
    _hash: PhantomData<H>,
}

impl<H: HashPrimitive> PayoutTree<H> {
    /// Build a tree from payout entries.
    ///
    /// Fails with [`CommitmentError::EmptySet`] if `entries` is empty.
    pub fn build(entries: &[PayoutEntry], campaign_id: &str) -> Result<Self, CommitmentError> {
        if entries.is_empty() {
            return Err(CommitmentError::EmptySet);
        }

        // Byte-wise total order; amount breaks ties between duplicate addresses
        let mut sorted: Vec<&PayoutEntry> = entries.iter().collect();
        sorted.sort_by(|a, b| {
            a.address
                .as_bytes()
                .cmp(b.address.as_bytes())
                .then(a.amount.cmp(&b.amount))
        });

        let leaves: Vec<Leaf> = sorted
            .into_iter()
            .enumerate()
            .map(|(index, entry)| Leaf {
                address: entry.address.clone(),
                amount: entry.amount,
                hash: leaf_hash::<H>(&entry.address, entry.amount, campaign_id),
                index,
            })
            .collect();

        let layers = build_layers::<H>(leaves.iter().map(|l| l.hash).collect());

        let tree = Self {
            campaign_id: campaign_id.to_string(),
            leaves,
            layers,
            _hash: PhantomData,
        };

        debug!(
            campaign_id,
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            hash = H::NAME,
            root = %tree.root(),
            "payout tree built"
        );

        Ok(tree)
    }

    /// Root hash.
    pub fn root(&self) -> Digest {
        // build() guarantees at least one layer ending in a single element
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .copied()
            .unwrap_or_default()
    }

    /// Root as lowercase hex.
    pub fn root_hex(&self) -> String {
        self.root().to_hex()
    }

    /// Campaign identifier bound into every leaf.
    pub fn campaign_id(&self) -> &str {
        &self.campaign_id
    }

    /// Leaves in sorted order.
    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// All layers, leaves first.
    pub fn layers(&self) -> &[Vec<Digest>] {
        &self.layers
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Proof length: `ceil(log2(leaf_count))`.
    pub fn depth(&self) -> usize {
        self.layers.len().saturating_sub(1)
    }

    /// First leaf carrying `address`.
    pub fn leaf(&self, address: &str) -> Option<&Leaf> {
        // Leaves are sorted by address bytes
        let start = self
            .leaves
            .partition_point(|l| l.address.as_bytes() < address.as_bytes());
        self.leaves.get(start).filter(|l| l.address == address)
    }

    /// Inclusion proof for `address`, or None if it is not in the tree.
    pub fn proof_for(&self, address: &str) -> Option<MerkleProof> {
        let leaf = self.leaf(address)?;
        Some(MerkleProof::from_digests(&self.siblings(leaf.index)))
    }

    /// Like [`proof_for`](Self::proof_for) with a typed error.
    pub fn require_proof(&self, address: &str) -> Result<MerkleProof, CommitmentError> {
        self.proof_for(address)
            .ok_or_else(|| CommitmentError::NotFound(address.to_string()))
    }

    /// Proofs for every leaf keyed by address.
    ///
    /// For duplicate addresses the first leaf wins, matching [`proof_for`](Self::proof_for).
    pub fn all_proofs(&self) -> BTreeMap<String, ProofBundle> {
        let mut proofs = BTreeMap::new();
        for leaf in &self.leaves {
            proofs.entry(leaf.address.clone()).or_insert_with(|| ProofBundle {
                amount: leaf.amount,
                proof: MerkleProof::from_digests(&self.siblings(leaf.index)),
            });
        }
        proofs
    }

    /// Verify a claim against this tree's root and campaign id.
    pub fn verify(&self, address: &str, amount: u64, proof: &MerkleProof) -> bool {
        verify_inclusion::<H>(address, amount, &self.campaign_id, proof, self.root().as_ref())
    }

    /// Sibling hashes from leaf `index` up to (not including) the root.
    fn siblings(&self, index: usize) -> Vec<Digest> {
        let mut siblings = Vec::with_capacity(self.depth());
        let mut current = index;

        for layer in &self.layers[..self.depth()] {
            // Out of range only for the last element of an odd layer: pair with self
            let sibling = layer.get(current ^ 1).unwrap_or(&layer[current]);
            siblings.push(*sibling);
            current /= 2;
        }

        siblings
    }
}

/// Build all layers bottom-up from non-empty leaf hashes.
pub(crate) fn build_layers<H: HashPrimitive>(leaves: Vec<Digest>) -> Vec<Vec<Digest>> {
    let mut layers = vec![leaves];

    while let Some(current) = layers.last().filter(|layer| layer.len() > 1) {
        let next: Vec<Digest> = current
            .chunks(2)
            .map(|chunk| {
                let left = &chunk[0];
                let right = chunk.get(1).unwrap_or(left);
                hash_pair::<H>(left, right)
            })
            .collect();
        layers.push(next);
    }

    layers
}

// =============================================================================
// DISTRIBUTION
// =============================================================================

/// A built tree together with its root and every participant's proof.
#[derive(Clone, Debug)]
pub struct Distribution<H: HashPrimitive = Blake2b256> {
    /// The tree.
    pub tree: PayoutTree<H>,
    /// Root hash.
    pub root: Digest,
    /// Per-participant proofs.
    pub proofs: BTreeMap<String, ProofBundle>,
}

/// Build a tree and precompute all proofs for distribution to participants.
pub fn generate_distribution<H: HashPrimitive>(
    entries: &[PayoutEntry],
    campaign_id: &str,
) -> Result<Distribution<H>, CommitmentError> {
    let tree = PayoutTree::<H>::build(entries, campaign_id)?;
    let root = tree.root();
    let proofs = tree.all_proofs();
    Ok(Distribution { tree, root, proofs })
}

// =============================================================================
// TESTS
// =============================================================================
