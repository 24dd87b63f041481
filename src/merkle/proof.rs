//! Inclusion Proofs
//!
//! Leaf/node hashing rules shared by tree construction and verification,
//! plus the proof type handed to participants.
//!
//! Verification is a pure function of `(leaf hash, proof, root)` and never
//! needs the full tree.

use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::hash::{Blake2b256, Digest, HashPrimitive, DIGEST_LEN};
use crate::errors::CommitmentError;

/// Leaf hash: `H(UTF8(address) || BE64(amount) || UTF8(campaign_id))`.
pub fn leaf_hash<H: HashPrimitive>(address: &str, amount: u64, campaign_id: &str) -> Digest {
    H::hash_parts(&[
        address.as_bytes(),
        &amount.to_be_bytes(),
        campaign_id.as_bytes(),
    ])
}

/// Combine two nodes, smaller digest first.
///
/// Position independent: `hash_pair(a, b) == hash_pair(b, a)`.
pub fn hash_pair<H: HashPrimitive>(a: &Digest, b: &Digest) -> Digest {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    H::hash_parts(&[first.as_ref(), second.as_ref()])
}

/// Fold a proof onto a leaf hash. Returns None if any element is not 32 bytes.
pub fn reconstruct_root<H: HashPrimitive>(leaf: Digest, proof: &MerkleProof) -> Option<Digest> {
    proof.elements.iter().try_fold(leaf, |current, element| {
        let sibling = Digest::from_slice(element)?;
        Some(hash_pair::<H>(&current, &sibling))
    })
}

/// Verify that `(address, amount)` is committed under `root`.
///
/// Malformed input (a proof element or root that is not 32 bytes) is
/// indistinguishable from a wrong proof: both return false.
pub fn verify_inclusion<H: HashPrimitive>(
    address: &str,
    amount: u64,
    campaign_id: &str,
    proof: &MerkleProof,
    root: &[u8],
) -> bool {
    let Some(root) = Digest::from_slice(root) else {
        return false;
    };
    let leaf = leaf_hash::<H>(address, amount, campaign_id);
    reconstruct_root::<H>(leaf, proof).is_some_and(|computed| computed == root)
}

/// Typed form of [`verify_inclusion`].
pub fn check_inclusion<H: HashPrimitive>(
    address: &str,
    amount: u64,
    campaign_id: &str,
    proof: &MerkleProof,
    root: &[u8],
) -> Result<(), CommitmentError> {
    if verify_inclusion::<H>(address, amount, campaign_id, proof, root) {
        Ok(())
    } else {
        Err(CommitmentError::InvalidProof)
    }
}

// =============================================================================
// PROOF
// =============================================================================

/// Ordered sibling hashes from leaf to root.
///
/// Elements are kept as raw bytes because proofs arrive from untrusted
/// callers; width is only checked during verification.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MerkleProof {
    elements: Vec<Vec<u8>>,
}

impl MerkleProof {
    /// Create from raw sibling elements.
    pub fn new(elements: Vec<Vec<u8>>) -> Self {
        Self { elements }
    }

    /// Create from well-formed digests.
    pub fn from_digests(digests: &[Digest]) -> Self {
        Self {
            elements: digests.iter().map(|d| d.0.to_vec()).collect(),
        }
    }

    /// Decode hex-encoded elements.
    pub fn from_hex_elements<S: AsRef<str>>(elements: &[S]) -> Result<Self, hex::FromHexError> {
        let elements = elements
            .iter()
            .map(|e| hex::decode(e.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { elements })
    }

    /// Hex-encode each element.
    pub fn to_hex_elements(&self) -> Vec<String> {
        self.elements.iter().map(hex::encode).collect()
    }

    /// Raw elements.
    pub fn elements(&self) -> &[Vec<u8>] {
        &self.elements
    }

    /// Number of siblings.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True for a single-leaf tree proof.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// True if every element has digest width.
    pub fn is_well_formed(&self) -> bool {
        self.elements.iter().all(|e| e.len() == DIGEST_LEN)
    }
}

impl Serialize for MerkleProof {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_hex_elements().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MerkleProof {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let elements = Vec::<String>::deserialize(deserializer)?;
        MerkleProof::from_hex_elements(&elements).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// VERIFIER
// =============================================================================

/// Verifier bound to one hash primitive.
///
/// Lets callers pick a primitive once instead of turbofishing every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct InclusionVerifier<H: HashPrimitive = Blake2b256> {
    _hash: PhantomData<H>,
}

impl<H: HashPrimitive> InclusionVerifier<H> {
    /// Create a verifier.
    pub fn new() -> Self {
        Self { _hash: PhantomData }
    }

    /// See [`verify_inclusion`].
    pub fn verify(
        &self,
        address: &str,
        amount: u64,
        campaign_id: &str,
        proof: &MerkleProof,
        root: &[u8],
    ) -> bool {
        verify_inclusion::<H>(address, amount, campaign_id, proof, root)
    }

    /// See [`check_inclusion`].
    pub fn check(
        &self,
        address: &str,
        amount: u64,
        campaign_id: &str,
        proof: &MerkleProof,
        root: &[u8],
    ) -> Result<(), CommitmentError> {
        check_inclusion::<H>(address, amount, campaign_id, proof, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::Sha256;

    #[test]
    fn test_leaf_hash_framing() {
        let direct = Blake2b256::hash_parts(&[&b"addr1"[..], &7u64.to_be_bytes(), &b"c1"[..]]);
        assert_eq!(leaf_hash::<Blake2b256>("addr1", 7, "c1"), direct);
    }

    #[test]
    fn test_leaf_hash_sensitivity() {
        let base = leaf_hash::<Blake2b256>("addr1", 7, "c1");
        assert_ne!(base, leaf_hash::<Blake2b256>("addr2", 7, "c1"));
        assert_ne!(base, leaf_hash::<Blake2b256>("addr1", 8, "c1"));
        assert_ne!(base, leaf_hash::<Blake2b256>("addr1", 7, "c2"));
        assert_ne!(base, leaf_hash::<Sha256>("addr1", 7, "c1"));
    }

    #[test]
    fn test_pair_is_order_independent() {
        let a = Blake2b256::hash(b"a");
        let b = Blake2b256::hash(b"b");
        assert_eq!(hash_pair::<Blake2b256>(&a, &b), hash_pair::<Blake2b256>(&b, &a));
    }

    #[test]
    fn test_pair_sorts_smaller_first() {
        let low = Digest::new([0x01; 32]);
        let high = Digest::new([0xf0; 32]);
        let expected = Sha256::hash_parts(&[low.as_ref(), high.as_ref()]);
        assert_eq!(hash_pair::<Sha256>(&high, &low), expected);
    }

    #[test]
    fn test_empty_proof_reconstructs_leaf() {
        let leaf = leaf_hash::<Blake2b256>("solo", 1, "c1");
        assert!(verify_inclusion::<Blake2b256>("solo", 1, "c1", &MerkleProof::default(), leaf.as_ref()));
    }

    #[test]
    fn test_malformed_elements_rejected() {
        let leaf = leaf_hash::<Blake2b256>("solo", 1, "c1");
        let proof = MerkleProof::new(vec![vec![0u8; 31]]);
        assert!(!proof.is_well_formed());
        assert!(reconstruct_root::<Blake2b256>(leaf, &proof).is_none());
        assert!(!verify_inclusion::<Blake2b256>("solo", 1, "c1", &proof, leaf.as_ref()));
    }

    #[test]
    fn test_malformed_root_rejected() {
        let leaf = leaf_hash::<Blake2b256>("solo", 1, "c1");
        let empty = MerkleProof::default();
        assert!(!verify_inclusion::<Blake2b256>("solo", 1, "c1", &empty, &leaf.0[..31]));
        assert!(!verify_inclusion::<Blake2b256>("solo", 1, "c1", &empty, &[]));
        assert!(matches!(
            check_inclusion::<Blake2b256>("solo", 1, "c1", &empty, &[]),
            Err(CommitmentError::InvalidProof)
        ));
    }

    #[test]
    fn test_proof_serializes_as_hex_list() {
        let proof = MerkleProof::from_digests(&[Digest::new([0x11; 32]), Digest::new([0x22; 32])]);
        let json = serde_json::to_string(&proof).unwrap();
        assert_eq!(json, format!("[\"{}\",\"{}\"]", "11".repeat(32), "22".repeat(32)));
        let back: MerkleProof = serde_json::from_str(&json).unwrap();
        assert_eq!(back, proof);
        assert!(serde_json::from_str::<MerkleProof>("[\"xyz\"]").is_err());
    }

    #[test]
    fn test_verifier_matches_free_function() {
        let leaf = leaf_hash::<Sha256>("solo", 9, "c9");
        let verifier = InclusionVerifier::<Sha256>::new();
        assert!(verifier.verify("solo", 9, "c9", &MerkleProof::default(), leaf.as_ref()));
        assert!(verifier.check("solo", 10, "c9", &MerkleProof::default(), leaf.as_ref()).is_err());
    }
}
