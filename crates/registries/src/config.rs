//! Registry network configuration.
//!
//! All three registries live on the same network. Defaults target the
//! Sepolia demo deployment; everything can be overridden via `TRUST_*`
//! environment variables.

use std::str::FromStr;

use alloy_primitives::{address, b256, Address, B256, U256};
use common::RegistryError;
use serde::{Deserialize, Serialize};

/// Network identifier the demo deployment lives on (Sepolia).
pub const DEFAULT_NETWORK_ID: u64 = 11_155_111;

/// Fallback registration fee (0.005 ether in wei) used when the Identity
/// Registry cannot be queried for `REGISTRATION_FEE()`.
pub const DEFAULT_REGISTRATION_FEE_WEI: u64 = 5_000_000_000_000_000;

/// Pre-configured demo agents, mirroring the demo deployment.
pub const DEMO_CLIENT_AGENT_ID: u64 = 1;
pub const DEMO_SERVER_AGENT_ID: u64 = 2;
pub const DEMO_VALIDATOR_AGENT_ID: u64 = 3;

/// Default agent domain for the registration step.
pub const DEMO_AGENT_DOMAIN: &str = "agent1.example.com";

/// Default data hash for the validation step.
pub const DEMO_DATA_HASH: B256 =
    b256!("0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef");

/// Fixed remote addresses of the three registries plus the RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub rpc_url: String,
    pub network_id: u64,
    pub identity_registry: Address,
    pub reputation_registry: Address,
    pub validation_registry: Address,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            network_id: DEFAULT_NETWORK_ID,
            identity_registry: address!("1234567890123456789012345678901234567890"),
            reputation_registry: address!("2345678901234567890123456789012345678901"),
            validation_registry: address!("3456789012345678901234567890123456789012"),
        }
    }
}

impl RegistryConfig {
    /// Build a config from `TRUST_*` environment variables, falling back to
    /// the demo defaults for anything unset.
    pub fn from_env() -> Result<Self, RegistryError> {
        let defaults = Self::default();
        Ok(Self {
            rpc_url: std::env::var("TRUST_RPC_URL").unwrap_or(defaults.rpc_url),
            network_id: env_u64("TRUST_NETWORK_ID")?.unwrap_or(defaults.network_id),
            identity_registry: env_address("TRUST_IDENTITY_REGISTRY")?
                .unwrap_or(defaults.identity_registry),
            reputation_registry: env_address("TRUST_REPUTATION_REGISTRY")?
                .unwrap_or(defaults.reputation_registry),
            validation_registry: env_address("TRUST_VALIDATION_REGISTRY")?
                .unwrap_or(defaults.validation_registry),
        })
    }

    /// Fallback registration fee as a `U256`.
    pub fn default_registration_fee() -> U256 {
        U256::from(DEFAULT_REGISTRATION_FEE_WEI)
    }
}

fn env_address(name: &str) -> Result<Option<Address>, RegistryError> {
    match std::env::var(name) {
        Ok(raw) => Address::from_str(raw.trim())
            .map(Some)
            .map_err(|e| RegistryError::Configuration(format!("invalid {name}={raw}: {e}"))),
        Err(_) => Ok(None),
    }
}

fn env_u64(name: &str) -> Result<Option<u64>, RegistryError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| RegistryError::Configuration(format!("invalid {name}={raw}: {e}"))),
        Err(_) => Ok(None),
    }
}
