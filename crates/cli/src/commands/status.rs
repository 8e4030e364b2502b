//! Registry lookup commands.

use std::str::FromStr;

use alloy_primitives::{Address, B256};
use anyhow::{bail, Context, Result};
use registries::RegistryGateway;

/// Look up an agent by id, domain or address; with no selector, print a
/// registry summary.
pub async fn show_agent(
    gateway: &dyn RegistryGateway,
    agent_id: Option<u64>,
    domain: Option<String>,
    address: Option<String>,
) -> Result<()> {
    let agent = if let Some(agent_id) = agent_id {
        if !gateway.agent_exists(agent_id).await? {
            bail!("agent {agent_id} is not registered");
        }
        gateway.get_agent(agent_id).await?
    } else if let Some(domain) = domain {
        gateway.resolve_by_domain(&domain).await?
    } else if let Some(raw) = address {
        let address =
            Address::from_str(raw.trim()).with_context(|| format!("invalid address {raw}"))?;
        gateway.resolve_by_address(address).await?
    } else {
        let count = gateway.agent_count().await?;
        println!("Identity Registry");
        println!("=================");
        println!("  Registered agents: {count}");
        return Ok(());
    };

    println!("Agent");
    println!("=====");
    println!("  Id:       {}", agent.agent_id);
    println!("  Domain:   {}", agent.domain);
    println!("  Address:  {}", agent.address);
    Ok(())
}

/// Check the feedback authorization for an agent pair.
pub async fn show_feedback_status(
    gateway: &dyn RegistryGateway,
    client_agent_id: u64,
    server_agent_id: u64,
) -> Result<()> {
    let (authorized, auth_id) = gateway
        .is_feedback_authorized(client_agent_id, server_agent_id)
        .await?;

    println!("Feedback Authorization");
    println!("======================");
    println!("  Client agent:  {client_agent_id}");
    println!("  Server agent:  {server_agent_id}");
    println!("  Authorized:    {authorized}");
    if authorized {
        println!("  Auth id:       {auth_id}");
    }
    Ok(())
}

/// Inspect a validation request by its data hash.
pub async fn show_validation_status(
    gateway: &dyn RegistryGateway,
    data_hash: B256,
) -> Result<()> {
    let (exists, pending) = gateway.is_validation_pending(data_hash).await?;

    println!("Validation Request");
    println!("==================");
    println!("  Data hash:  {data_hash}");
    if !exists {
        println!("  Status:     no request submitted");
        return Ok(());
    }

    let request = gateway.get_validation_request(data_hash).await?;
    println!("  Validator:  agent {}", request.validator_agent_id);
    println!("  Server:     agent {}", request.server_agent_id);
    println!(
        "  Status:     {}",
        if pending { "awaiting response" } else { "responded" }
    );
    Ok(())
}
