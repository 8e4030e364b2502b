//! Alloy-backed gateway for the three on-chain registries.
//!
//! Simulate is an `eth_call` dry-run with the caller's `from` (and the fee
//! for registration) attached; submit broadcasts the same call through the
//! signing provider; confirmation is a bounded receipt poll.

use std::time::Duration;

use alloy::contract::Error as ContractError;
use alloy::network::EthereumWallet;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use common::{Agent, EventLog, RegistryError, TxHash, TxReceipt, ValidationRequestRecord};
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::contracts::{IdentityRegistry, ReputationRegistry, ValidationRegistry};
use crate::gateway::{Confirmations, IdentityOps, ReputationOps, ValidationOps};

/// How often to poll for a receipt while awaiting finality.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Gateway bound to fixed registry addresses on a single network.
pub struct EvmRegistryClient {
    provider: DynProvider,
    identity: IdentityRegistry::IdentityRegistryInstance<DynProvider>,
    reputation: ReputationRegistry::ReputationRegistryInstance<DynProvider>,
    validation: ValidationRegistry::ValidationRegistryInstance<DynProvider>,
    caller: Address,
}

impl EvmRegistryClient {
    /// Connect to the configured RPC endpoint with a signing key.
    pub fn connect(
        config: &RegistryConfig,
        signer: PrivateKeySigner,
    ) -> Result<Self, RegistryError> {
        let caller = signer.address();
        let url = config.rpc_url.parse().map_err(|e| {
            RegistryError::Configuration(format!("invalid rpc url {}: {e}", config.rpc_url))
        })?;

        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(url)
            .erased();

        info!(
            rpc_url = %config.rpc_url,
            network_id = config.network_id,
            %caller,
            "connected registry gateway"
        );

        Ok(Self {
            identity: IdentityRegistry::new(config.identity_registry, provider.clone()),
            reputation: ReputationRegistry::new(config.reputation_registry, provider.clone()),
            validation: ValidationRegistry::new(config.validation_registry, provider.clone()),
            provider,
            caller,
        })
    }

    /// The account every write is sent from.
    pub fn caller(&self) -> Address {
        self.caller
    }

    async fn current_fee(&self) -> U256 {
        match self.registration_fee().await {
            Ok(fee) => fee,
            Err(e) => {
                warn!("REGISTRATION_FEE query failed, using default: {e}");
                RegistryConfig::default_registration_fee()
            }
        }
    }
}

/// Map an `eth_call` failure: transport problems are connection errors,
/// anything the node answered with is a predicted revert.
fn map_call_error(err: ContractError) -> RegistryError {
    match &err {
        ContractError::TransportError(e) if !e.is_error_resp() => {
            RegistryError::Connection(err.to_string())
        }
        _ => RegistryError::Simulation(err.to_string()),
    }
}

fn map_send_error(err: ContractError) -> RegistryError {
    match &err {
        ContractError::TransportError(e) if !e.is_error_resp() => {
            RegistryError::Connection(err.to_string())
        }
        _ => RegistryError::Submission(err.to_string()),
    }
}

fn map_read_error(err: ContractError) -> RegistryError {
    match &err {
        ContractError::TransportError(e) if !e.is_error_resp() => {
            RegistryError::Connection(err.to_string())
        }
        _ => RegistryError::Rpc(err.to_string()),
    }
}

fn agent_id_u64(raw: U256) -> Result<u64, RegistryError> {
    u64::try_from(raw).map_err(|_| RegistryError::Decode(format!("agent id {raw} exceeds u64")))
}

fn to_agent(info: IdentityRegistry::AgentInfo) -> Result<Agent, RegistryError> {
    Ok(Agent {
        agent_id: agent_id_u64(info.agentId)?,
        domain: info.agentDomain,
        address: info.agentAddress,
    })
}

fn to_domain_receipt(receipt: &TransactionReceipt) -> TxReceipt {
    TxReceipt {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        success: receipt.status(),
        logs: receipt
            .inner
            .logs()
            .iter()
            .map(|log| EventLog {
                address: log.inner.address,
                topics: log.inner.data.topics().to_vec(),
                data: log.inner.data.data.to_vec(),
            })
            .collect(),
    }
}

#[async_trait]
impl IdentityOps for EvmRegistryClient {
    async fn registration_fee(&self) -> Result<U256, RegistryError> {
        self.identity
            .REGISTRATION_FEE()
            .call()
            .await
            .map_err(map_read_error)
    }

    async fn balance_of(&self, account: Address) -> Result<U256, RegistryError> {
        self.provider
            .get_balance(account)
            .await
            .map_err(|e| RegistryError::Connection(e.to_string()))
    }

    async fn simulate_register(
        &self,
        domain: &str,
        address: Address,
    ) -> Result<(), RegistryError> {
        let fee = self.current_fee().await;
        debug!(domain, %address, %fee, "simulating newAgent");
        self.identity
            .newAgent(domain.to_string(), address)
            .value(fee)
            .from(self.caller)
            .call()
            .await
            .map(|_| ())
            .map_err(map_call_error)
    }

    async fn submit_register(
        &self,
        domain: &str,
        address: Address,
    ) -> Result<TxHash, RegistryError> {
        let fee = self.current_fee().await;
        let pending = self
            .identity
            .newAgent(domain.to_string(), address)
            .value(fee)
            .from(self.caller)
            .send()
            .await
            .map_err(map_send_error)?;
        let tx_hash = *pending.tx_hash();
        info!(%tx_hash, domain, "newAgent broadcast");
        Ok(tx_hash)
    }

    async fn get_agent(&self, agent_id: u64) -> Result<Agent, RegistryError> {
        let info = self
            .identity
            .getAgent(U256::from(agent_id))
            .call()
            .await
            .map_err(map_read_error)?;
        to_agent(info)
    }

    async fn resolve_by_domain(&self, domain: &str) -> Result<Agent, RegistryError> {
        let info = self
            .identity
            .resolveByDomain(domain.to_string())
            .call()
            .await
            .map_err(map_read_error)?;
        to_agent(info)
    }

    async fn resolve_by_address(&self, address: Address) -> Result<Agent, RegistryError> {
        let info = self
            .identity
            .resolveByAddress(address)
            .call()
            .await
            .map_err(map_read_error)?;
        to_agent(info)
    }

    async fn agent_exists(&self, agent_id: u64) -> Result<bool, RegistryError> {
        self.identity
            .agentExists(U256::from(agent_id))
            .call()
            .await
            .map_err(map_read_error)
    }

    async fn agent_count(&self) -> Result<u64, RegistryError> {
        let count = self
            .identity
            .getAgentCount()
            .call()
            .await
            .map_err(map_read_error)?;
        agent_id_u64(count)
    }
}

#[async_trait]
impl ReputationOps for EvmRegistryClient {
    async fn simulate_accept_feedback(
        &self,
        client_agent_id: u64,
        server_agent_id: u64,
    ) -> Result<(), RegistryError> {
        debug!(client_agent_id, server_agent_id, "simulating acceptFeedback");
        self.reputation
            .acceptFeedback(U256::from(client_agent_id), U256::from(server_agent_id))
            .from(self.caller)
            .call()
            .await
            .map(|_| ())
            .map_err(map_call_error)
    }

    async fn submit_accept_feedback(
        &self,
        client_agent_id: u64,
        server_agent_id: u64,
    ) -> Result<TxHash, RegistryError> {
        let pending = self
            .reputation
            .acceptFeedback(U256::from(client_agent_id), U256::from(server_agent_id))
            .from(self.caller)
            .send()
            .await
            .map_err(map_send_error)?;
        let tx_hash = *pending.tx_hash();
        info!(%tx_hash, client_agent_id, server_agent_id, "acceptFeedback broadcast");
        Ok(tx_hash)
    }

    async fn is_feedback_authorized(
        &self,
        client_agent_id: u64,
        server_agent_id: u64,
    ) -> Result<(bool, B256), RegistryError> {
        let ret = self
            .reputation
            .isFeedbackAuthorized(U256::from(client_agent_id), U256::from(server_agent_id))
            .call()
            .await
            .map_err(map_read_error)?;
        Ok((ret.isAuthorized, ret.feedbackAuthId))
    }

    async fn get_feedback_auth_id(
        &self,
        client_agent_id: u64,
        server_agent_id: u64,
    ) -> Result<B256, RegistryError> {
        self.reputation
            .getFeedbackAuthId(U256::from(client_agent_id), U256::from(server_agent_id))
            .call()
            .await
            .map_err(map_read_error)
    }
}

#[async_trait]
impl ValidationOps for EvmRegistryClient {
    async fn simulate_validation_request(
        &self,
        validator_agent_id: u64,
        server_agent_id: u64,
        data_hash: B256,
    ) -> Result<(), RegistryError> {
        debug!(
            validator_agent_id,
            server_agent_id,
            %data_hash,
            "simulating validationRequest"
        );
        self.validation
            .validationRequest(
                U256::from(validator_agent_id),
                U256::from(server_agent_id),
                data_hash,
            )
            .from(self.caller)
            .call()
            .await
            .map(|_| ())
            .map_err(map_call_error)
    }

    async fn submit_validation_request(
        &self,
        validator_agent_id: u64,
        server_agent_id: u64,
        data_hash: B256,
    ) -> Result<TxHash, RegistryError> {
        let pending = self
            .validation
            .validationRequest(
                U256::from(validator_agent_id),
                U256::from(server_agent_id),
                data_hash,
            )
            .from(self.caller)
            .send()
            .await
            .map_err(map_send_error)?;
        let tx_hash = *pending.tx_hash();
        info!(%tx_hash, validator_agent_id, server_agent_id, "validationRequest broadcast");
        Ok(tx_hash)
    }

    async fn get_validation_request(
        &self,
        data_hash: B256,
    ) -> Result<ValidationRequestRecord, RegistryError> {
        let req = self
            .validation
            .getValidationRequest(data_hash)
            .call()
            .await
            .map_err(map_read_error)?;
        Ok(ValidationRequestRecord {
            data_hash: req.dataHash,
            validator_agent_id: agent_id_u64(req.agentValidatorId)?,
            server_agent_id: agent_id_u64(req.agentServerId)?,
            responded: req.responded,
        })
    }

    async fn is_validation_pending(
        &self,
        data_hash: B256,
    ) -> Result<(bool, bool), RegistryError> {
        let ret = self
            .validation
            .isValidationPending(data_hash)
            .call()
            .await
            .map_err(map_read_error)?;
        Ok((ret.exists, ret.pending))
    }
}

#[async_trait]
impl Confirmations for EvmRegistryClient {
    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<TxReceipt, RegistryError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.provider.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    let receipt = to_domain_receipt(&receipt);
                    debug!(%tx_hash, block = ?receipt.block_number, success = receipt.success, "receipt observed");
                    return Ok(receipt);
                }
                Ok(None) => {}
                Err(e) => return Err(RegistryError::Connection(e.to_string())),
            }

            if tokio::time::Instant::now() + RECEIPT_POLL_INTERVAL > deadline {
                warn!(%tx_hash, "confirmation wait exceeded; transaction may still confirm later");
                return Err(RegistryError::Timeout {
                    tx_hash,
                    waited_secs: timeout.as_secs(),
                });
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}
