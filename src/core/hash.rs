//! Hash Primitive
//!
//! Fixed-output (32-byte) hashing used for payout leaves and tree nodes.
//! Primitives are stateless: a digest is a pure function of the input bytes.
//!
//! - [`Blake2b256`] - default, matches the ledger's native `blake2b_256`
//! - [`Sha256`] - alternative primitive for off-ledger deployments

use std::fmt;

use blake2::digest::consts::U32;
use blake2::Blake2b;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Digest as _;

/// Digest width in bytes.
pub const DIGEST_LEN: usize = 32;

// =============================================================================
// DIGEST
// =============================================================================

/// 32-byte hash output.
///
/// Ordered byte-wise, which is the ordering used when pairing tree nodes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Digest(pub [u8; DIGEST_LEN]);

impl Digest {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, returning None unless it is exactly 32 bytes wide.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; DIGEST_LEN] = bytes.try_into().ok()?;
        Some(Self(array))
    }

    /// Parse a lowercase or uppercase hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        Self::from_slice(&bytes)
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Digest::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid 32-byte hex digest: {}", s)))
    }
}

// =============================================================================
// PRIMITIVES
// =============================================================================

/// A stateless 32-byte hash function.
///
/// `hash_parts` must equal hashing the concatenation of `parts`.
pub trait HashPrimitive: Clone + Copy + fmt::Debug + Default + Send + Sync + 'static {
    /// Short name used in logs and configuration.
    const NAME: &'static str;

    /// Hash the concatenation of `parts`.
    fn hash_parts(parts: &[&[u8]]) -> Digest;

    /// Hash a single byte string.
    fn hash(data: &[u8]) -> Digest {
        Self::hash_parts(&[data])
    }
}

/// BLAKE2b with a 256-bit output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blake2b256;

impl HashPrimitive for Blake2b256 {
    const NAME: &'static str = "blake2b-256";

    fn hash_parts(parts: &[&[u8]]) -> Digest {
        let mut hasher = Blake2b::<U32>::new();
        for part in parts {
            hasher.update(part);
        }
        Digest(hasher.finalize().into())
    }
}

/// SHA-256.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha256;

impl HashPrimitive for Sha256 {
    const NAME: &'static str = "sha256";

    fn hash_parts(parts: &[&[u8]]) -> Digest {
        let mut hasher = sha2::Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        Digest(hasher.finalize().into())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_equal_concatenation() {
        let joined = Blake2b256::hash(b"addr_test1\x00\x00\x00\x00\x00\x00\x00\x01c1");
        let parts = Blake2b256::hash_parts(&[&b"addr_test1"[..], &1u64.to_be_bytes(), &b"c1"[..]]);
        assert_eq!(joined, parts);

        let joined = Sha256::hash(b"ab");
        let parts = Sha256::hash_parts(&[&b"a"[..], &b"b"[..]]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn test_known_vectors() {
        // BLAKE2b-256 of the empty string
        assert_eq!(
            Blake2b256::hash(b"").to_hex(),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
        // SHA-256 of "abc"
        assert_eq!(
            Sha256::hash(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_primitives_differ() {
        assert_ne!(Blake2b256::hash(b"payout"), Sha256::hash(b"payout"));
    }

    #[test]
    fn test_hex_parsing() {
        let digest = Sha256::hash(b"abc");
        assert_eq!(Digest::from_hex(&digest.to_hex()), Some(digest));
        assert_eq!(Digest::from_hex(&digest.to_hex().to_uppercase()), Some(digest));
        assert_eq!(Digest::from_hex("abcd"), None);
        assert_eq!(Digest::from_hex("zz"), None);
    }

    #[test]
    fn test_from_slice_width() {
        assert!(Digest::from_slice(&[0u8; 32]).is_some());
        assert!(Digest::from_slice(&[0u8; 31]).is_none());
        assert!(Digest::from_slice(&[0u8; 33]).is_none());
        assert!(Digest::from_slice(&[]).is_none());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let digest = Digest::new([0xab; 32]);
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
        assert!(serde_json::from_str::<Digest>("\"00\"").is_err());
    }
}
