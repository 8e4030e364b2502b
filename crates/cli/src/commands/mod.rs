//! CLI command implementations.
//!
//! This module organizes commands by domain:
//! - `run`: the full ordered workflow
//! - `status`: registry lookups (agent, feedback, validation)

pub mod run;
pub mod status;

pub use run::*;
pub use status::*;

use std::str::FromStr;
use std::sync::Arc;

use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::{address, Address, B256};
use anyhow::{Context, Result};
use registries::config::DEMO_DATA_HASH;
use registries::{EvmRegistryClient, MockGateway, RegistryConfig, RegistryGateway};

/// Account bound to the session when running against the mock registries.
const MOCK_ACCOUNT: Address = address!("abcd000000000000000000000000000000001234");

/// Build the registry gateway and the account every write is sent from.
///
/// Live runs need `TRUST_PRIVATE_KEY`; mock runs use a fixed demo account
/// and never touch the network.
pub fn build_gateway(
    mock: bool,
    rpc_url: Option<String>,
) -> Result<(Arc<dyn RegistryGateway>, Address)> {
    if mock {
        let gateway: Arc<dyn RegistryGateway> = Arc::new(MockGateway::new());
        return Ok((gateway, MOCK_ACCOUNT));
    }

    let mut config = RegistryConfig::from_env()?;
    if let Some(url) = rpc_url {
        config.rpc_url = url;
    }

    let key = std::env::var("TRUST_PRIVATE_KEY")
        .context("TRUST_PRIVATE_KEY must be set for live runs (or pass --mock)")?;
    let signer = PrivateKeySigner::from_str(key.trim()).context("invalid TRUST_PRIVATE_KEY")?;

    let client = EvmRegistryClient::connect(&config, signer)?;
    let account = client.caller();
    let gateway: Arc<dyn RegistryGateway> = Arc::new(client);
    Ok((gateway, account))
}

/// Parse a 0x-prefixed 32-byte hash, defaulting to the demo data hash.
pub fn parse_data_hash(raw: Option<&str>) -> Result<B256> {
    match raw {
        Some(raw) => B256::from_str(raw.trim())
            .with_context(|| format!("invalid data hash {raw}: expected 32 hex bytes")),
        None => Ok(DEMO_DATA_HASH),
    }
}
