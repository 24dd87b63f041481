//! Core primitives.
//!
//! Hashing and settlement arithmetic shared by the commitment engine and the
//! campaign state machine. Everything here is pure.

pub mod bps;
pub mod hash;

// Re-export core types
pub use bps::{apply_bps, calculate_fee, calculate_penalty, BASIS_POINTS};
pub use hash::{Blake2b256, Digest, HashPrimitive, Sha256};
