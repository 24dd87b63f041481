//! Service Layer
//!
//! Multi-campaign coordination and the seams to external collaborators.
//!
//! ## Module Structure
//!
//! - `registry`: Versioned in-memory campaign store
//! - `collaborators`: State lookup and transaction assembly contracts

pub mod collaborators;
pub mod registry;

// Re-export key types
pub use collaborators::{
    AssemblyError, CampaignQuery, DraftAssembler, DraftOutput, TransactionAssembler, TransactionDraft,
};
pub use registry::{CampaignRegistry, Receipt, VersionedCampaign};
