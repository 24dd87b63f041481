//! Campaign Registry
//!
//! In-memory store for many campaigns. Each campaign sits behind its own lock,
//! so operations on different campaigns only share the map lookup. Every
//! stored state carries a version; a submission commits only when the version
//! the caller read is still current.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::campaign::effects::{project, FundMovement};
use crate::campaign::machine::CampaignMachine;
use crate::campaign::operation::Operation;
use crate::campaign::state::{CampaignState, DepositParams};
use crate::core::hash::{Blake2b256, HashPrimitive};
use crate::errors::RegistryError;
use crate::service::collaborators::CampaignQuery;

/// A stored campaign and its version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionedCampaign {
    /// Incremented on every accepted operation, starting at 1.
    pub version: u64,
    /// Current state.
    pub state: CampaignState,
}

/// Outcome of an accepted operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Version of `state`.
    pub version: u64,
    /// State after the operation.
    pub state: CampaignState,
    /// Fund movements the operation requires.
    pub movements: Vec<FundMovement>,
}

// =============================================================================
// CAMPAIGN REGISTRY
// =============================================================================

/// Manages all known campaigns.
pub struct CampaignRegistry<H: HashPrimitive = Blake2b256> {
    machine: CampaignMachine<H>,
    campaigns: RwLock<BTreeMap<String, Arc<RwLock<VersionedCampaign>>>>,
}

impl<H: HashPrimitive> CampaignRegistry<H> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            machine: CampaignMachine::new(),
            campaigns: RwLock::new(BTreeMap::new()),
        }
    }

    /// Open a new campaign at version 1.
    pub async fn deposit(&self, caller: &str, params: DepositParams) -> Result<Receipt, RegistryError> {
        let mut campaigns = self.campaigns.write().await;
        if campaigns.contains_key(&params.campaign_id) {
            return Err(RegistryError::AlreadyExists(params.campaign_id));
        }

        let op = Operation::Deposit(params);
        let state = self.machine.transition(None, caller, &op)?;
        let movements = project(None, &op, &state);

        info!(
            campaign_id = %state.campaign_id,
            owner = %state.owner,
            pool_amount = state.pool_amount,
            platform_fee = state.platform_fee(),
            "campaign opened"
        );

        campaigns.insert(
            state.campaign_id.clone(),
            Arc::new(RwLock::new(VersionedCampaign {
                version: 1,
                state: state.clone(),
            })),
        );

        Ok(Receipt {
            version: 1,
            state,
            movements,
        })
    }

    /// Apply `op` to campaign `campaign_id` if it is still at `expected_version`.
    pub async fn submit(
        &self,
        campaign_id: &str,
        caller: &str,
        op: &Operation,
        expected_version: u64,
    ) -> Result<Receipt, RegistryError> {
        let entry = self
            .entry(campaign_id)
            .await
            .ok_or_else(|| RegistryError::NotFound(campaign_id.to_string()))?;

        let mut stored = entry.write().await;
        if stored.version != expected_version {
            warn!(
                campaign_id,
                expected = expected_version,
                current = stored.version,
                operation = op.kind(),
                "stale submission"
            );
            return Err(RegistryError::StaleVersion {
                campaign_id: campaign_id.to_string(),
                expected: expected_version,
                current: stored.version,
            });
        }

        let next = self.machine.apply(&stored.state, caller, op)?;
        let movements = project(Some(&stored.state), op, &next);

        stored.version += 1;
        stored.state = next.clone();
        debug!(campaign_id, version = stored.version, operation = op.kind(), "committed");

        Ok(Receipt {
            version: stored.version,
            state: next,
            movements,
        })
    }

    /// Current state and version of a campaign.
    pub async fn get(&self, campaign_id: &str) -> Option<VersionedCampaign> {
        let entry = self.entry(campaign_id).await?;
        let stored = entry.read().await;
        Some(stored.clone())
    }

    /// Current version of a campaign.
    pub async fn version(&self, campaign_id: &str) -> Option<u64> {
        let entry = self.entry(campaign_id).await?;
        let stored = entry.read().await;
        Some(stored.version)
    }

    /// Ids of all known campaigns, in order.
    pub async fn campaign_ids(&self) -> Vec<String> {
        let campaigns = self.campaigns.read().await;
        campaigns.keys().cloned().collect()
    }

    /// Number of known campaigns.
    pub async fn campaign_count(&self) -> usize {
        let campaigns = self.campaigns.read().await;
        campaigns.len()
    }

    async fn entry(&self, campaign_id: &str) -> Option<Arc<RwLock<VersionedCampaign>>> {
        let campaigns = self.campaigns.read().await;
        campaigns.get(campaign_id).cloned()
    }
}

impl<H: HashPrimitive> Default for CampaignRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HashPrimitive> CampaignQuery for CampaignRegistry<H> {
    async fn campaign(&self, campaign_id: &str) -> Option<CampaignState> {
        self.get(campaign_id).await.map(|stored| stored.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bps::DEFAULT_PLATFORM_FEE_BPS;
    use crate::campaign::effects::Recipient;
    use crate::campaign::state::{CampaignStatus, CancelPolicy};
    use crate::errors::CampaignError;
    use crate::merkle::tree::{PayoutEntry, PayoutTree};

    fn params(campaign_id: &str) -> DepositParams {
        DepositParams {
            owner: "owner".into(),
            campaign_id: campaign_id.into(),
            pool_amount: 100_000_000,
            fee_wallet: "fee".into(),
            platform_fee_bps: DEFAULT_PLATFORM_FEE_BPS,
            cancel_policy: CancelPolicy::default(),
        }
    }

    fn tree(campaign_id: &str) -> PayoutTree<Blake2b256> {
        PayoutTree::<Blake2b256>::build(
            &[
                PayoutEntry::new("A", 50_000_000),
                PayoutEntry::new("B", 30_000_000),
                PayoutEntry::new("C", 20_000_000),
            ],
            campaign_id,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_deposit_and_get() {
        let registry: CampaignRegistry = CampaignRegistry::new();
        let receipt = registry.deposit("owner", params("c1")).await.unwrap();

        assert_eq!(receipt.version, 1);
        assert_eq!(receipt.movements, vec![FundMovement {
            recipient: Recipient::Custody("c1".into()),
            amount: 100_000_000,
        }]);

        let stored = registry.get("c1").await.unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.state.status, CampaignStatus::Active);
        assert_eq!(registry.campaign_count().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_deposit_rejected() {
        let registry: CampaignRegistry = CampaignRegistry::new();
        registry.deposit("owner", params("c1")).await.unwrap();
        assert_eq!(
            registry.deposit("owner", params("c1")).await,
            Err(RegistryError::AlreadyExists("c1".into()))
        );
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let registry: CampaignRegistry = CampaignRegistry::new();
        let tree = tree("c1");
        registry.deposit("owner", params("c1")).await.unwrap();

        let set_root = Operation::SetRoot { root: tree.root().0.to_vec() };
        let receipt = registry.submit("c1", "owner", &set_root, 1).await.unwrap();
        assert_eq!(receipt.version, 2);
        assert_eq!(receipt.state.status, CampaignStatus::Ended);

        let mut version = receipt.version;
        for (address, amount) in [("A", 50_000_000), ("B", 30_000_000), ("C", 20_000_000)] {
            let op = Operation::claim(address, amount, tree.proof_for(address).unwrap());
            let receipt = registry.submit("c1", address, &op, version).await.unwrap();
            assert_eq!(receipt.movements[0].amount, amount);
            version = receipt.version;
        }

        let state = registry.campaign("c1").await.unwrap();
        assert_eq!(state.total_claimed, 100_000_000);
        assert_eq!(state.claims_count, 3);

        let again = Operation::claim("A", 50_000_000, tree.proof_for("A").unwrap());
        assert_eq!(
            registry.submit("c1", "A", &again, version).await,
            Err(RegistryError::Rejected(CampaignError::DoubleClaim { address: "A".into() }))
        );
        // Rejection does not bump the version
        assert_eq!(registry.version("c1").await, Some(version));
    }

    #[tokio::test]
    async fn test_stale_version_rejected() {
        let registry: CampaignRegistry = CampaignRegistry::new();
        registry.deposit("owner", params("c1")).await.unwrap();
        registry.submit("c1", "owner", &Operation::Pause, 1).await.unwrap();

        assert_eq!(
            registry.submit("c1", "owner", &Operation::Resume, 1).await,
            Err(RegistryError::StaleVersion {
                campaign_id: "c1".into(),
                expected: 1,
                current: 2,
            })
        );
        assert_eq!(registry.get("c1").await.unwrap().state.status, CampaignStatus::Paused);
    }

    #[tokio::test]
    async fn test_unknown_campaign() {
        let registry: CampaignRegistry = CampaignRegistry::new();
        assert_eq!(
            registry.submit("missing", "owner", &Operation::Pause, 1).await,
            Err(RegistryError::NotFound("missing".into()))
        );
        assert!(registry.campaign("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_claims_serialize() {
        let registry: Arc<CampaignRegistry> = Arc::new(CampaignRegistry::new());
        let tree = Arc::new(tree("c1"));
        registry.deposit("owner", params("c1")).await.unwrap();
        registry
            .submit("c1", "owner", &Operation::SetRoot { root: tree.root().0.to_vec() }, 1)
            .await
            .unwrap();

        // Every task reads version 2, so exactly one commits
        let mut handles = Vec::new();
        for address in ["A", "B", "C"] {
            let registry = Arc::clone(&registry);
            let tree = Arc::clone(&tree);
            handles.push(tokio::spawn(async move {
                let amount = tree.leaves().iter().find(|l| l.address == address).unwrap().amount;
                let op = Operation::claim(address, amount, tree.proof_for(address).unwrap());
                registry.submit("c1", address, &op, 2).await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(err) => assert!(matches!(err, RegistryError::StaleVersion { .. })),
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(registry.version("c1").await, Some(3));
    }

    #[tokio::test]
    async fn test_campaigns_are_independent() {
        let registry: CampaignRegistry = CampaignRegistry::new();
        registry.deposit("owner", params("c1")).await.unwrap();
        registry.deposit("owner", params("c2")).await.unwrap();

        registry.submit("c1", "owner", &Operation::Cancel, 1).await.unwrap();
        assert_eq!(registry.get("c1").await.unwrap().state.status, CampaignStatus::Cancelled);
        assert_eq!(registry.get("c2").await.unwrap().state.status, CampaignStatus::Active);
        assert_eq!(registry.campaign_ids().await, vec!["c1".to_string(), "c2".to_string()]);
    }
}
