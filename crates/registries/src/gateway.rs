//! Gateway trait seam between the workflow and the registries.
//!
//! The bindings stay decoupled per registry: each registry gets its own
//! trait with one read and one write operation (writes as simulate/submit
//! pairs). Only the workflow machine composes them into an ordered flow.

use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use common::{Agent, RegistryError, TxHash, TxReceipt, ValidationRequestRecord};

/// Identity Registry operations.
#[async_trait]
pub trait IdentityOps: Send + Sync {
    /// Fixed payment required by `newAgent`.
    async fn registration_fee(&self) -> Result<U256, RegistryError>;

    /// Caller balance, for the local funds pre-check before simulating.
    async fn balance_of(&self, account: Address) -> Result<U256, RegistryError>;

    /// Dry-run `newAgent(domain, address)` with the fee attached.
    async fn simulate_register(&self, domain: &str, address: Address)
        -> Result<(), RegistryError>;

    /// Broadcast `newAgent(domain, address)`.
    async fn submit_register(&self, domain: &str, address: Address)
        -> Result<TxHash, RegistryError>;

    /// Look up a registered agent by id.
    async fn get_agent(&self, agent_id: u64) -> Result<Agent, RegistryError>;

    /// Look up a registered agent by its domain.
    async fn resolve_by_domain(&self, domain: &str) -> Result<Agent, RegistryError>;

    /// Look up a registered agent by its address.
    async fn resolve_by_address(&self, address: Address) -> Result<Agent, RegistryError>;

    /// Whether an agent id has been assigned.
    async fn agent_exists(&self, agent_id: u64) -> Result<bool, RegistryError>;

    /// Total number of registered agents.
    async fn agent_count(&self) -> Result<u64, RegistryError>;
}

/// Reputation Registry operations.
#[async_trait]
pub trait ReputationOps: Send + Sync {
    /// Dry-run `acceptFeedback(client, server)`.
    async fn simulate_accept_feedback(
        &self,
        client_agent_id: u64,
        server_agent_id: u64,
    ) -> Result<(), RegistryError>;

    /// Broadcast `acceptFeedback(client, server)`.
    async fn submit_accept_feedback(
        &self,
        client_agent_id: u64,
        server_agent_id: u64,
    ) -> Result<TxHash, RegistryError>;

    /// Whether feedback is authorized for the pair, and under which handle.
    async fn is_feedback_authorized(
        &self,
        client_agent_id: u64,
        server_agent_id: u64,
    ) -> Result<(bool, B256), RegistryError>;

    /// The authorization handle for the pair. Fails when none exists.
    async fn get_feedback_auth_id(
        &self,
        client_agent_id: u64,
        server_agent_id: u64,
    ) -> Result<B256, RegistryError>;
}

/// Validation Registry operations.
#[async_trait]
pub trait ValidationOps: Send + Sync {
    /// Dry-run `validationRequest(validator, server, dataHash)`.
    async fn simulate_validation_request(
        &self,
        validator_agent_id: u64,
        server_agent_id: u64,
        data_hash: B256,
    ) -> Result<(), RegistryError>;

    /// Broadcast `validationRequest(validator, server, dataHash)`.
    async fn submit_validation_request(
        &self,
        validator_agent_id: u64,
        server_agent_id: u64,
        data_hash: B256,
    ) -> Result<TxHash, RegistryError>;

    /// Look up an open request by its data hash.
    async fn get_validation_request(
        &self,
        data_hash: B256,
    ) -> Result<ValidationRequestRecord, RegistryError>;

    /// Whether a request exists for the hash, and whether it still awaits a
    /// validator response.
    async fn is_validation_pending(
        &self,
        data_hash: B256,
    ) -> Result<(bool, bool), RegistryError>;
}

/// Confirmation tracking for submitted transactions.
#[async_trait]
pub trait Confirmations: Send + Sync {
    /// Await finality for `tx_hash`, bounded by `timeout`.
    ///
    /// Exceeding the bound yields `RegistryError::Timeout`; the transaction
    /// may still confirm later out-of-band.
    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<TxReceipt, RegistryError>;
}

/// The full gateway surface the workflow engine consumes.
pub trait RegistryGateway: IdentityOps + ReputationOps + ValidationOps + Confirmations {}

impl<T: IdentityOps + ReputationOps + ValidationOps + Confirmations> RegistryGateway for T {}
