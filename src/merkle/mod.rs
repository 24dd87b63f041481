//! Commitment Engine
//!
//! Commits a payout list to a single root and proves individual payouts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    COMMITMENT ENGINE                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tree.rs    - Deterministic tree construction, proof lookup │
//! │  proof.rs   - Leaf/pair hashing, proof type, verification   │
//! │  export.rs  - JSON export and rebuild                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod export;
pub mod proof;
pub mod tree;

pub use export::{LeafExport, TreeExport};
pub use proof::{
    check_inclusion, hash_pair, leaf_hash, verify_inclusion, InclusionVerifier, MerkleProof,
};
pub use tree::{generate_distribution, Distribution, Leaf, PayoutEntry, PayoutTree, ProofBundle};
