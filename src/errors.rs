//! Error types
//!
//! Every error here is a per-operation outcome; none is fatal to the process.

use thiserror::Error;

use crate::campaign::state::CampaignStatus;

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Commitment engine errors
    #[error(transparent)]
    Commitment(#[from] CommitmentError),

    /// Lifecycle state machine rejections
    #[error(transparent)]
    Campaign(#[from] CampaignError),

    /// Campaign registry errors
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors from tree construction, proof lookup and verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitmentError {
    /// Tree built with no entries.
    #[error("cannot build a payout tree from an empty set")]
    EmptySet,

    /// Address has no leaf in the tree.
    #[error("address not found in payout tree: {0}")]
    NotFound(String),

    /// Proof does not reconstruct the expected root.
    #[error("inclusion proof does not match root")]
    InvalidProof,

    /// Exported tree could not be parsed.
    #[error("malformed tree export: {0}")]
    MalformedExport(String),

    /// Exported tree disagrees with the tree rebuilt from its leaves.
    #[error("tree export does not match rebuilt tree: {0}")]
    ExportMismatch(String),
}

/// Reasons a lifecycle operation is rejected.
///
/// A rejected operation never changes campaign state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CampaignError {
    /// Campaign status does not permit the operation.
    #[error("operation {operation} not allowed in status {actual:?}")]
    WrongStatus {
        /// Operation that was attempted.
        operation: &'static str,
        /// Status the campaign was in.
        actual: CampaignStatus,
    },

    /// Caller is not the campaign owner.
    #[error("caller {caller} is not the campaign owner")]
    Unauthorized {
        /// Identity that submitted the operation.
        caller: String,
    },

    /// Claim inclusion proof failed.
    #[error("invalid inclusion proof for {address}")]
    InvalidProof {
        /// Claiming address.
        address: String,
    },

    /// Remaining pool cannot cover the claim.
    #[error("insufficient pool: available {available}, requested {requested}")]
    InsufficientPool {
        /// `pool_amount - total_claimed`.
        available: u64,
        /// Claimed amount.
        requested: u64,
    },

    /// Address has already claimed.
    #[error("address has already claimed: {address}")]
    DoubleClaim {
        /// Claiming address.
        address: String,
    },

    /// Unused credit cannot cover the task.
    #[error("insufficient credit: available {available}, requested {requested}")]
    InsufficientCredit {
        /// `credit_balance - credit_used`.
        available: u64,
        /// Task credit cost.
        requested: u64,
    },

    /// A commitment root is already set.
    #[error("commitment root already set")]
    RootAlreadySet,

    /// Root bytes are empty or not a 32-byte digest.
    #[error("commitment root must be a 32-byte digest, got {len} bytes")]
    InvalidRoot {
        /// Submitted root width.
        len: usize,
    },

    /// Amount must be greater than zero.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// Cancel policy forbids cancelling now.
    #[error("cancel policy does not permit cancellation with {claims_count} claims")]
    CancelNotPermitted {
        /// Claims recorded so far.
        claims_count: u64,
    },

    /// Penalty basis points outside `[0, 10000]`.
    #[error("basis points out of range: {0}")]
    InvalidBasisPoints(u16),

    /// Credit balance would overflow.
    #[error("credit balance overflow")]
    CreditOverflow,

    /// Deposit submitted for a campaign that already exists.
    #[error("campaign already deposited")]
    AlreadyDeposited,

    /// Non-deposit operation submitted for a campaign that does not exist.
    #[error("campaign has not been deposited")]
    UnknownCampaign,

    /// Stored state breaks a campaign invariant; no operation applies to it.
    #[error("campaign state is corrupt: {0}")]
    CorruptState(&'static str),
}

/// Errors from the in-memory campaign registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No campaign under this id.
    #[error("campaign not found: {0}")]
    NotFound(String),

    /// A campaign with this id already exists.
    #[error("campaign already exists: {0}")]
    AlreadyExists(String),

    /// Caller's snapshot is out of date; re-read and resubmit.
    #[error("stale version for {campaign_id}: expected {expected}, current {current}")]
    StaleVersion {
        /// Campaign id.
        campaign_id: String,
        /// Version the caller based its operation on.
        expected: u64,
        /// Version currently stored.
        current: u64,
    },

    /// Operation rejected by the lifecycle state machine.
    #[error(transparent)]
    Rejected(#[from] CampaignError),
}
