//! Campaign Lifecycle
//!
//! Campaign state, the operations that change it, and the fund movements
//! each accepted operation requires.
//!
//! ## Module Structure
//!
//! - `state`: Campaign record, status, cancel policy
//! - `operation`: Closed set of lifecycle operations
//! - `machine`: Precondition checks and next-state computation
//! - `effects`: Fund movements for accepted operations

pub mod effects;
pub mod machine;
pub mod operation;
pub mod state;

// Re-export key types
pub use effects::{cancel_settlement, project, FundMovement, Recipient};
pub use machine::{apply, deposit, CampaignMachine};
pub use operation::{ClaimData, Operation};
pub use state::{CampaignState, CampaignStatus, CancelPolicy, DepositParams, InvalidStatusCode};
