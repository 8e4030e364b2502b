//! In-memory registry gateway for tests and offline demo runs.
//!
//! Behaves like the real deployment: writes are two-phase, confirmation
//! produces receipts whose logs carry the genuine event signature hashes
//! and indexed topics, and registry invariants (unique domains, one open
//! request per data hash, one authorization per pair) are enforced at
//! simulate time. Failures can be scripted per attempt.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use alloy::sol_types::SolEvent;
use alloy_primitives::{keccak256, Address, B256, U256};
use async_trait::async_trait;
use common::{Agent, EventLog, RegistryError, TxHash, TxReceipt, ValidationRequestRecord};

use crate::config::RegistryConfig;
use crate::contracts::{IdentityRegistry, ReputationRegistry, ValidationRegistry};
use crate::gateway::{Confirmations, IdentityOps, ReputationOps, ValidationOps};

/// Default balance granted to unknown accounts (1 ether).
const DEFAULT_BALANCE_WEI: u128 = 1_000_000_000_000_000_000;

/// A broadcast write waiting for its receipt.
enum PendingWrite {
    Register { domain: String, address: Address },
    AcceptFeedback { client: u64, server: u64 },
    ValidationRequest { validator: u64, server: u64, data_hash: B256 },
}

#[derive(Default)]
struct MockState {
    balances: HashMap<Address, U256>,
    next_agent_id: u64,
    agents: HashMap<u64, Agent>,
    authorizations: HashMap<(u64, u64), B256>,
    requests: HashMap<B256, ValidationRequestRecord>,
    pending: HashMap<TxHash, PendingWrite>,
    nonce: u64,
    fail_next_simulation: Option<String>,
    revert_next_execution: bool,
    stall_receipts: bool,
}

/// Scriptable in-memory stand-in for the three registries.
pub struct MockGateway {
    config: RegistryConfig,
    fee: U256,
    state: Mutex<MockState>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            config: RegistryConfig::default(),
            fee: RegistryConfig::default_registration_fee(),
            state: Mutex::new(MockState {
                next_agent_id: 1,
                ..MockState::default()
            }),
        }
    }

    /// Make the next simulate call revert with `reason`.
    pub fn fail_next_simulation(&self, reason: impl Into<String>) {
        self.lock().fail_next_simulation = Some(reason.into());
    }

    /// Make the next confirmed transaction revert on-chain.
    pub fn revert_next_execution(&self) {
        self.lock().revert_next_execution = true;
    }

    /// Stop producing receipts, so confirmation waits hit their bound.
    pub fn stall_receipts(&self, stall: bool) {
        self.lock().stall_receipts = stall;
    }

    /// Override an account balance (defaults to 1 ether).
    pub fn set_balance(&self, account: Address, balance: U256) {
        self.lock().balances.insert(account, balance);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_scripted_simulation_failure(&self) -> Option<String> {
        self.lock().fail_next_simulation.take()
    }

    fn enqueue(&self, write: PendingWrite) -> TxHash {
        let mut state = self.lock();
        state.nonce += 1;
        let mut preimage = Vec::with_capacity(16);
        preimage.extend_from_slice(b"mock-tx:");
        preimage.extend_from_slice(&state.nonce.to_be_bytes());
        let tx_hash = keccak256(preimage);
        state.pending.insert(tx_hash, write);
        tx_hash
    }

    fn topic_u64(value: u64) -> B256 {
        B256::from(U256::from(value))
    }
}

#[async_trait]
impl IdentityOps for MockGateway {
    async fn registration_fee(&self) -> Result<U256, RegistryError> {
        Ok(self.fee)
    }

    async fn balance_of(&self, account: Address) -> Result<U256, RegistryError> {
        Ok(self
            .lock()
            .balances
            .get(&account)
            .copied()
            .unwrap_or(U256::from(DEFAULT_BALANCE_WEI)))
    }

    async fn simulate_register(
        &self,
        domain: &str,
        _address: Address,
    ) -> Result<(), RegistryError> {
        if let Some(reason) = self.take_scripted_simulation_failure() {
            return Err(RegistryError::Simulation(reason));
        }
        let state = self.lock();
        if state.agents.values().any(|agent| agent.domain == domain) {
            return Err(RegistryError::Simulation(format!(
                "domain {domain} already registered"
            )));
        }
        Ok(())
    }

    async fn submit_register(
        &self,
        domain: &str,
        address: Address,
    ) -> Result<TxHash, RegistryError> {
        Ok(self.enqueue(PendingWrite::Register {
            domain: domain.to_string(),
            address,
        }))
    }

    async fn get_agent(&self, agent_id: u64) -> Result<Agent, RegistryError> {
        self.lock()
            .agents
            .get(&agent_id)
            .cloned()
            .ok_or_else(|| RegistryError::Rpc(format!("agent {agent_id} not found")))
    }

    async fn resolve_by_domain(&self, domain: &str) -> Result<Agent, RegistryError> {
        self.lock()
            .agents
            .values()
            .find(|agent| agent.domain == domain)
            .cloned()
            .ok_or_else(|| RegistryError::Rpc(format!("no agent for domain {domain}")))
    }

    async fn resolve_by_address(&self, address: Address) -> Result<Agent, RegistryError> {
        self.lock()
            .agents
            .values()
            .find(|agent| agent.address == address)
            .cloned()
            .ok_or_else(|| RegistryError::Rpc(format!("no agent for address {address}")))
    }

    async fn agent_exists(&self, agent_id: u64) -> Result<bool, RegistryError> {
        Ok(self.lock().agents.contains_key(&agent_id))
    }

    async fn agent_count(&self) -> Result<u64, RegistryError> {
        Ok(self.lock().agents.len() as u64)
    }
}

#[async_trait]
impl ReputationOps for MockGateway {
    async fn simulate_accept_feedback(
        &self,
        client_agent_id: u64,
        server_agent_id: u64,
    ) -> Result<(), RegistryError> {
        if let Some(reason) = self.take_scripted_simulation_failure() {
            return Err(RegistryError::Simulation(reason));
        }
        let state = self.lock();
        if state
            .authorizations
            .contains_key(&(client_agent_id, server_agent_id))
        {
            return Err(RegistryError::Simulation(format!(
                "feedback already authorized for pair ({client_agent_id}, {server_agent_id})"
            )));
        }
        Ok(())
    }

    async fn submit_accept_feedback(
        &self,
        client_agent_id: u64,
        server_agent_id: u64,
    ) -> Result<TxHash, RegistryError> {
        Ok(self.enqueue(PendingWrite::AcceptFeedback {
            client: client_agent_id,
            server: server_agent_id,
        }))
    }

    async fn is_feedback_authorized(
        &self,
        client_agent_id: u64,
        server_agent_id: u64,
    ) -> Result<(bool, B256), RegistryError> {
        let state = self.lock();
        match state.authorizations.get(&(client_agent_id, server_agent_id)) {
            Some(auth_id) => Ok((true, *auth_id)),
            None => Ok((false, B256::ZERO)),
        }
    }

    async fn get_feedback_auth_id(
        &self,
        client_agent_id: u64,
        server_agent_id: u64,
    ) -> Result<B256, RegistryError> {
        self.lock()
            .authorizations
            .get(&(client_agent_id, server_agent_id))
            .copied()
            .ok_or_else(|| {
                RegistryError::Rpc(format!(
                    "no feedback authorization for pair ({client_agent_id}, {server_agent_id})"
                ))
            })
    }
}

#[async_trait]
impl ValidationOps for MockGateway {
    async fn simulate_validation_request(
        &self,
        _validator_agent_id: u64,
        _server_agent_id: u64,
        data_hash: B256,
    ) -> Result<(), RegistryError> {
        if let Some(reason) = self.take_scripted_simulation_failure() {
            return Err(RegistryError::Simulation(reason));
        }
        let state = self.lock();
        if state
            .requests
            .get(&data_hash)
            .is_some_and(|request| !request.responded)
        {
            return Err(RegistryError::Simulation(format!(
                "validation request already pending for {data_hash}"
            )));
        }
        Ok(())
    }

    async fn submit_validation_request(
        &self,
        validator_agent_id: u64,
        server_agent_id: u64,
        data_hash: B256,
    ) -> Result<TxHash, RegistryError> {
        Ok(self.enqueue(PendingWrite::ValidationRequest {
            validator: validator_agent_id,
            server: server_agent_id,
            data_hash,
        }))
    }

    async fn get_validation_request(
        &self,
        data_hash: B256,
    ) -> Result<ValidationRequestRecord, RegistryError> {
        self.lock()
            .requests
            .get(&data_hash)
            .cloned()
            .ok_or_else(|| RegistryError::Rpc(format!("no validation request for {data_hash}")))
    }

    async fn is_validation_pending(
        &self,
        data_hash: B256,
    ) -> Result<(bool, bool), RegistryError> {
        Ok(match self.lock().requests.get(&data_hash) {
            Some(request) => (true, !request.responded),
            None => (false, false),
        })
    }
}

#[async_trait]
impl Confirmations for MockGateway {
    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<TxReceipt, RegistryError> {
        let mut state = self.lock();

        if state.stall_receipts {
            return Err(RegistryError::Timeout {
                tx_hash,
                waited_secs: timeout.as_secs(),
            });
        }

        let write = state
            .pending
            .remove(&tx_hash)
            .ok_or_else(|| RegistryError::Rpc(format!("unknown transaction {tx_hash}")))?;

        if std::mem::take(&mut state.revert_next_execution) {
            return Ok(TxReceipt {
                tx_hash,
                block_number: Some(state.nonce),
                success: false,
                logs: vec![],
            });
        }

        let log = match write {
            PendingWrite::Register { domain, address } => {
                let agent_id = state.next_agent_id;
                state.next_agent_id += 1;
                state.agents.insert(
                    agent_id,
                    Agent {
                        agent_id,
                        domain,
                        address,
                    },
                );
                EventLog {
                    address: self.config.identity_registry,
                    topics: vec![
                        IdentityRegistry::AgentRegistered::SIGNATURE_HASH,
                        Self::topic_u64(agent_id),
                    ],
                    data: vec![],
                }
            }
            PendingWrite::AcceptFeedback { client, server } => {
                let mut preimage = Vec::with_capacity(24);
                preimage.extend_from_slice(&client.to_be_bytes());
                preimage.extend_from_slice(&server.to_be_bytes());
                preimage.extend_from_slice(&state.nonce.to_be_bytes());
                let auth_id = keccak256(preimage);
                state.authorizations.insert((client, server), auth_id);
                EventLog {
                    address: self.config.reputation_registry,
                    topics: vec![
                        ReputationRegistry::AuthFeedback::SIGNATURE_HASH,
                        Self::topic_u64(client),
                        Self::topic_u64(server),
                        auth_id,
                    ],
                    data: vec![],
                }
            }
            PendingWrite::ValidationRequest {
                validator,
                server,
                data_hash,
            } => {
                state.requests.insert(
                    data_hash,
                    ValidationRequestRecord {
                        data_hash,
                        validator_agent_id: validator,
                        server_agent_id: server,
                        responded: false,
                    },
                );
                EventLog {
                    address: self.config.validation_registry,
                    topics: vec![
                        ValidationRegistry::ValidationRequestEvent::SIGNATURE_HASH,
                        Self::topic_u64(validator),
                        Self::topic_u64(server),
                        data_hash,
                    ],
                    data: vec![],
                }
            }
        };

        Ok(TxReceipt {
            tx_hash,
            block_number: Some(state.nonce),
            success: true,
            logs: vec![log],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::extract_agent_id;
    use crate::reputation::extract_feedback_auth_id;

    #[tokio::test]
    async fn register_confirms_with_decodable_receipt() {
        let gateway = MockGateway::new();
        let address = Address::repeat_byte(0xAB);

        gateway
            .simulate_register("agent1.example.com", address)
            .await
            .unwrap();
        let tx_hash = gateway
            .submit_register("agent1.example.com", address)
            .await
            .unwrap();
        let receipt = gateway
            .wait_for_receipt(tx_hash, Duration::from_secs(30))
            .await
            .unwrap();

        assert!(receipt.success);
        assert_eq!(extract_agent_id(&receipt).unwrap(), 1);
        let agent = gateway.get_agent(1).await.unwrap();
        assert_eq!(agent.domain, "agent1.example.com");

        assert!(gateway.agent_exists(1).await.unwrap());
        assert!(!gateway.agent_exists(2).await.unwrap());
        assert_eq!(gateway.agent_count().await.unwrap(), 1);
        assert_eq!(
            gateway.resolve_by_domain("agent1.example.com").await.unwrap(),
            agent
        );
        assert_eq!(gateway.resolve_by_address(address).await.unwrap(), agent);
    }

    #[tokio::test]
    async fn duplicate_domain_reverts_at_simulate() {
        let gateway = MockGateway::new();
        let address = Address::repeat_byte(0x01);

        let tx = gateway.submit_register("taken.example.com", address).await.unwrap();
        gateway.wait_for_receipt(tx, Duration::from_secs(30)).await.unwrap();

        assert!(matches!(
            gateway.simulate_register("taken.example.com", address).await,
            Err(RegistryError::Simulation(_))
        ));
    }

    #[tokio::test]
    async fn feedback_authorization_round_trips() {
        let gateway = MockGateway::new();
        gateway.simulate_accept_feedback(1, 2).await.unwrap();
        let tx = gateway.submit_accept_feedback(1, 2).await.unwrap();
        let receipt = gateway.wait_for_receipt(tx, Duration::from_secs(30)).await.unwrap();

        let auth_id = extract_feedback_auth_id(&receipt).unwrap();
        assert_eq!(
            gateway.is_feedback_authorized(1, 2).await.unwrap(),
            (true, auth_id)
        );
        assert_eq!(gateway.get_feedback_auth_id(1, 2).await.unwrap(), auth_id);
        assert!(gateway.get_feedback_auth_id(2, 1).await.is_err());
        // A second authorization for the same pair is rejected up front.
        assert!(matches!(
            gateway.simulate_accept_feedback(1, 2).await,
            Err(RegistryError::Simulation(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_pending_data_hash_is_rejected() {
        let gateway = MockGateway::new();
        let hash = B256::repeat_byte(0x11);

        gateway.simulate_validation_request(3, 2, hash).await.unwrap();
        let tx = gateway.submit_validation_request(3, 2, hash).await.unwrap();
        gateway.wait_for_receipt(tx, Duration::from_secs(30)).await.unwrap();

        assert!(matches!(
            gateway.simulate_validation_request(3, 2, hash).await,
            Err(RegistryError::Simulation(_))
        ));
        let record = gateway.get_validation_request(hash).await.unwrap();
        assert!(!record.responded);
        assert_eq!(gateway.is_validation_pending(hash).await.unwrap(), (true, true));
        assert_eq!(
            gateway
                .is_validation_pending(B256::repeat_byte(0x22))
                .await
                .unwrap(),
            (false, false)
        );
    }

    #[tokio::test]
    async fn stalled_receipts_time_out() {
        let gateway = MockGateway::new();
        gateway.stall_receipts(true);
        let tx = gateway.submit_accept_feedback(1, 2).await.unwrap();
        assert!(matches!(
            gateway.wait_for_receipt(tx, Duration::from_secs(5)).await,
            Err(RegistryError::Timeout { .. })
        ));
    }
}
