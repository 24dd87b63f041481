//! Deployment Configuration
//!
//! Parameters for opening a campaign, read from the environment.
//!
//! | Variable                        | Default          |
//! |---------------------------------|------------------|
//! | `CAMPAIGN_OWNER`                | `owner`          |
//! | `CAMPAIGN_FEE_WALLET`           | `fee_wallet`     |
//! | `CAMPAIGN_ID`                   | random UUID v4   |
//! | `CAMPAIGN_PENALTY_BPS`          | `500`            |
//! | `CAMPAIGN_PLATFORM_FEE_BPS`     | `300`            |
//! | `CAMPAIGN_CANCEL_BEFORE_CLAIMS` | `true`           |
//! | `CAMPAIGN_CANCEL_AFTER_CLAIMS`  | `false`          |
//! | `MERKLE_HASH`                   | `blake2b`        |
//!
//! Unparseable values fall back to the default with a warning.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::campaign::state::{CancelPolicy, DepositParams};
use crate::core::bps::{is_valid_bps, DEFAULT_PENALTY_BPS, DEFAULT_PLATFORM_FEE_BPS};
use crate::core::hash::{Blake2b256, HashPrimitive, Sha256};

/// Hash primitive selected for a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashChoice {
    /// BLAKE2b-256.
    #[default]
    Blake2b,
    /// SHA-256.
    Sha256,
}

impl HashChoice {
    /// Name of the selected primitive.
    pub fn name(self) -> &'static str {
        match self {
            HashChoice::Blake2b => Blake2b256::NAME,
            HashChoice::Sha256 => Sha256::NAME,
        }
    }
}

impl FromStr for HashChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blake2b" | "blake2b-256" | "blake2b256" => Ok(HashChoice::Blake2b),
            "sha256" | "sha-256" => Ok(HashChoice::Sha256),
            other => Err(format!("unknown hash primitive: {other}")),
        }
    }
}

impl fmt::Display for HashChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Campaign deployment parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    /// Owner address.
    pub owner: String,
    /// Fee wallet address.
    pub fee_wallet: String,
    /// Campaign id, bound into every leaf hash.
    pub campaign_id: String,
    /// Cancel penalty in basis points.
    pub penalty_bps: u16,
    /// Platform fee in basis points.
    pub platform_fee_bps: u16,
    /// Cancellation allowed before the first claim.
    pub cancel_before_claims: bool,
    /// Cancellation allowed after claims.
    pub cancel_after_claims: bool,
    /// Leaf and node hash.
    pub hash: HashChoice,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            owner: "owner".to_string(),
            fee_wallet: "fee_wallet".to_string(),
            campaign_id: generate_campaign_id(),
            penalty_bps: DEFAULT_PENALTY_BPS,
            platform_fee_bps: DEFAULT_PLATFORM_FEE_BPS,
            cancel_before_claims: true,
            cancel_after_claims: false,
            hash: HashChoice::Blake2b,
        }
    }
}

impl DeployConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            owner: lookup("CAMPAIGN_OWNER").unwrap_or(defaults.owner),
            fee_wallet: lookup("CAMPAIGN_FEE_WALLET").unwrap_or(defaults.fee_wallet),
            campaign_id: lookup("CAMPAIGN_ID")
                .filter(|id| !id.is_empty())
                .unwrap_or(defaults.campaign_id),
            penalty_bps: parse_bps(&lookup, "CAMPAIGN_PENALTY_BPS", defaults.penalty_bps),
            platform_fee_bps: parse_bps(&lookup, "CAMPAIGN_PLATFORM_FEE_BPS", defaults.platform_fee_bps),
            cancel_before_claims: lookup("CAMPAIGN_CANCEL_BEFORE_CLAIMS")
                .map(|v| parse_flag(&v, defaults.cancel_before_claims))
                .unwrap_or(defaults.cancel_before_claims),
            cancel_after_claims: lookup("CAMPAIGN_CANCEL_AFTER_CLAIMS")
                .map(|v| parse_flag(&v, defaults.cancel_after_claims))
                .unwrap_or(defaults.cancel_after_claims),
            hash: parse_or(&lookup, "MERKLE_HASH", defaults.hash),
        }
    }

    /// Cancel policy described by this config.
    pub fn cancel_policy(&self) -> CancelPolicy {
        CancelPolicy {
            allowed_before_claims: self.cancel_before_claims,
            allowed_after_claims: self.cancel_after_claims,
            penalty_bps: self.penalty_bps,
        }
    }

    /// Deposit parameters for a pool of `pool_amount`.
    pub fn deposit_params(&self, pool_amount: u64) -> DepositParams {
        DepositParams {
            owner: self.owner.clone(),
            campaign_id: self.campaign_id.clone(),
            pool_amount,
            fee_wallet: self.fee_wallet.clone(),
            platform_fee_bps: self.platform_fee_bps,
            cancel_policy: self.cancel_policy(),
        }
    }
}

/// New random campaign id.
pub fn generate_campaign_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(err) => {
                warn!(key, value = %raw, error = %err, "invalid config value, using default");
                default
            }
        },
    }
}

fn parse_bps(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u16) -> u16 {
    let bps = parse_or(lookup, key, default);
    if is_valid_bps(bps) {
        bps
    } else {
        warn!(key, value = bps, "basis points out of range, using default");
        default
    }
}

fn parse_flag(raw: &str, default: bool) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        _ => {
            warn!(value = raw, "invalid boolean, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DeployConfig::from_lookup(lookup(&[]));
        assert_eq!(config.owner, "owner");
        assert_eq!(config.penalty_bps, 500);
        assert_eq!(config.platform_fee_bps, 300);
        assert!(config.cancel_before_claims);
        assert!(!config.cancel_after_claims);
        assert_eq!(config.hash, HashChoice::Blake2b);
        assert!(uuid::Uuid::parse_str(&config.campaign_id).is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = DeployConfig::from_lookup(lookup(&[
            ("CAMPAIGN_OWNER", "addr_owner"),
            ("CAMPAIGN_FEE_WALLET", "addr_fee"),
            ("CAMPAIGN_ID", "c1"),
            ("CAMPAIGN_PENALTY_BPS", "250"),
            ("CAMPAIGN_PLATFORM_FEE_BPS", "150"),
            ("CAMPAIGN_CANCEL_AFTER_CLAIMS", "1"),
            ("MERKLE_HASH", "SHA256"),
        ]));

        assert_eq!(config.campaign_id, "c1");
        assert_eq!(config.hash, HashChoice::Sha256);
        let params = config.deposit_params(1_000);
        assert_eq!(params.owner, "addr_owner");
        assert_eq!(params.fee_wallet, "addr_fee");
        assert_eq!(params.pool_amount, 1_000);
        assert_eq!(params.platform_fee_bps, 150);
        assert_eq!(params.cancel_policy, CancelPolicy::new(true, true, 250).unwrap());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = DeployConfig::from_lookup(lookup(&[
            ("CAMPAIGN_PENALTY_BPS", "20000"),
            ("CAMPAIGN_PLATFORM_FEE_BPS", "10001"),
            ("CAMPAIGN_CANCEL_BEFORE_CLAIMS", "maybe"),
            ("MERKLE_HASH", "md5"),
            ("CAMPAIGN_ID", ""),
        ]));

        assert_eq!(config.penalty_bps, DEFAULT_PENALTY_BPS);
        assert_eq!(config.platform_fee_bps, DEFAULT_PLATFORM_FEE_BPS);
        assert!(config.cancel_before_claims);
        assert_eq!(config.hash, HashChoice::Blake2b);
        assert!(!config.campaign_id.is_empty());

        let config = DeployConfig::from_lookup(lookup(&[("CAMPAIGN_PENALTY_BPS", "abc")]));
        assert_eq!(config.penalty_bps, DEFAULT_PENALTY_BPS);
    }

    #[test]
    fn test_hash_choice_names() {
        assert_eq!(HashChoice::Blake2b.to_string(), "blake2b-256");
        assert_eq!("sha-256".parse::<HashChoice>(), Ok(HashChoice::Sha256));
        assert!("keccak".parse::<HashChoice>().is_err());
    }
}
