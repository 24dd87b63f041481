//! # Merkle Campaign
//!
//! Payout commitments and lifecycle enforcement for reward campaigns.
//!
//! A campaign owner locks a reward pool, seals a Merkle root over the list of
//! `(address, amount)` payouts, and participants claim their share by proving
//! inclusion. Everything here is pure and deterministic; ledgers, wallets and
//! transaction building sit behind the traits in `service`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      MERKLE CAMPAIGN                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Primitives                               │
//! │  ├── hash.rs      - Digest, BLAKE2b-256 / SHA-256            │
//! │  └── bps.rs       - Basis-point arithmetic                   │
//! │                                                              │
//! │  merkle/          - Payout commitment engine                 │
//! │  ├── tree.rs      - Sorted tree, proofs, distributions       │
//! │  ├── proof.rs     - Leaf/pair hashing, inclusion checks      │
//! │  └── export.rs    - JSON export and validated re-import      │
//! │                                                              │
//! │  campaign/        - Lifecycle (pure)                         │
//! │  ├── state.rs     - Campaign record and status               │
//! │  ├── operation.rs - Lifecycle operations                     │
//! │  ├── machine.rs   - Preconditions and transitions            │
//! │  └── effects.rs   - Fund movements per operation             │
//! │                                                              │
//! │  service/         - Coordination (async)                     │
//! │  ├── registry.rs  - Versioned multi-campaign store           │
//! │  └── collaborators.rs - Query / assembly seams               │
//! │                                                              │
//! │  config.rs        - Environment configuration                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Tree construction sorts entries byte-wise and pairs nodes in sorted order,
//! so the root depends only on the multiset of payouts and the campaign id.
//! Claimed addresses are kept in a `BTreeSet` so serialized state is stable.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod campaign;
pub mod config;
pub mod core;
pub mod errors;
pub mod merkle;
pub mod service;

// Re-export commonly used types
pub use campaign::{
    apply, deposit, project, CampaignMachine, CampaignState, CampaignStatus, CancelPolicy, DepositParams,
    FundMovement, Operation, Recipient,
};
pub use config::{DeployConfig, HashChoice};
pub use crate::core::hash::{Blake2b256, Digest, HashPrimitive, Sha256};
pub use errors::{CampaignError, CommitmentError, Error, RegistryError, Result};
pub use merkle::{generate_distribution, verify_inclusion, MerkleProof, PayoutEntry, PayoutTree, TreeExport};
pub use service::{CampaignQuery, CampaignRegistry, DraftAssembler, Receipt, TransactionAssembler, TransactionDraft};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
