//! Trust Agents CLI
//!
//! Command-line driver for the ERC-8004 trust registries: runs the ordered
//! registration / feedback / validation workflow and inspects registry
//! state.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use registries::config::{
    DEMO_AGENT_DOMAIN, DEMO_CLIENT_AGENT_ID, DEMO_SERVER_AGENT_ID, DEMO_VALIDATOR_AGENT_ID,
};
use tracing_subscriber::EnvFilter;

/// Trust Agents CLI - drive the on-chain trust registries.
#[derive(Parser, Debug)]
#[command(name = "trust-agents")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON-RPC endpoint of the network the registries live on.
    #[arg(long, env = "TRUST_RPC_URL", global = true)]
    rpc_url: Option<String>,

    /// Use the in-memory registries instead of a live network.
    #[arg(long, global = true)]
    mock: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full workflow: register, authorize feedback, request validation.
    Run {
        /// Domain to register for the new agent.
        #[arg(long, default_value = DEMO_AGENT_DOMAIN)]
        domain: String,

        /// Client agent id for the feedback authorization.
        #[arg(long, default_value_t = DEMO_CLIENT_AGENT_ID)]
        client_agent_id: u64,

        /// Server agent id for the feedback authorization and validation.
        #[arg(long, default_value_t = DEMO_SERVER_AGENT_ID)]
        server_agent_id: u64,

        /// Validator agent id for the validation request.
        #[arg(long, default_value_t = DEMO_VALIDATOR_AGENT_ID)]
        validator_agent_id: u64,

        /// Data hash for the validation request (0x-prefixed 32 bytes).
        #[arg(long)]
        data_hash: Option<String>,

        /// Bound on each confirmation wait, in seconds.
        #[arg(long, default_value_t = 120)]
        confirmation_timeout: u64,
    },

    /// Look up a registered agent, or summarize the registry.
    Agent {
        /// Registry-assigned agent id.
        #[arg(long, conflicts_with_all = ["domain", "address"])]
        agent_id: Option<u64>,

        /// Agent domain to resolve.
        #[arg(long, conflicts_with = "address")]
        domain: Option<String>,

        /// Agent address to resolve.
        #[arg(long)]
        address: Option<String>,
    },

    /// Check whether feedback is authorized for an agent pair.
    FeedbackStatus {
        /// Client agent id.
        #[arg(long, default_value_t = DEMO_CLIENT_AGENT_ID)]
        client_agent_id: u64,

        /// Server agent id.
        #[arg(long, default_value_t = DEMO_SERVER_AGENT_ID)]
        server_agent_id: u64,
    },

    /// Inspect a validation request by its data hash.
    ValidationStatus {
        /// Data hash the request was submitted under (0x-prefixed 32 bytes).
        #[arg(long)]
        data_hash: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let (gateway, account) = commands::build_gateway(cli.mock, cli.rpc_url)?;

    match cli.command {
        Commands::Run {
            domain,
            client_agent_id,
            server_agent_id,
            validator_agent_id,
            data_hash,
            confirmation_timeout,
        } => {
            let inputs = workflow::StepInputs {
                domain,
                client_agent_id,
                server_agent_id,
                validator_agent_id,
                data_hash: commands::parse_data_hash(data_hash.as_deref())?,
            };
            commands::run_workflow(gateway, account, inputs, confirmation_timeout).await?;
        }
        Commands::Agent {
            agent_id,
            domain,
            address,
        } => {
            commands::show_agent(gateway.as_ref(), agent_id, domain, address).await?;
        }
        Commands::FeedbackStatus {
            client_agent_id,
            server_agent_id,
        } => {
            commands::show_feedback_status(gateway.as_ref(), client_agent_id, server_agent_id)
                .await?;
        }
        Commands::ValidationStatus { data_hash } => {
            let data_hash = commands::parse_data_hash(data_hash.as_deref())?;
            commands::show_validation_status(gateway.as_ref(), data_hash).await?;
        }
    }

    Ok(())
}
