//! Domain records produced by the three registries, plus the
//! transport-independent transaction receipt the trackers consume.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Agent identifier assigned by the Identity Registry.
pub type AgentId = u64;

/// Transaction hash of a submitted write operation.
pub type TxHash = B256;

/// A registered participant, as recorded by the Identity Registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: AgentId,
    pub domain: String,
    pub address: Address,
}

/// Feedback authorization handle returned by the Reputation Registry.
///
/// Unique per (client, server) pair at a given time; the registry mints
/// `auth_id` and announces it in the `AuthFeedback` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackAuthorization {
    pub auth_id: B256,
    pub client_agent_id: AgentId,
    pub server_agent_id: AgentId,
}

/// An open validation request on the Validation Registry.
///
/// `data_hash` is caller-supplied and must be unique while a prior request
/// for the same hash is still pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRequestRecord {
    pub data_hash: B256,
    pub validator_agent_id: AgentId,
    pub server_agent_id: AgentId,
    pub responded: bool,
}

/// One event log emitted during a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    /// Contract that emitted the event.
    pub address: Address,
    /// topics[0] is the event signature hash; indexed parameters follow.
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed parameters.
    pub data: Vec<u8>,
}

impl EventLog {
    /// The event signature hash, if the log carries any topics.
    pub fn signature(&self) -> Option<&B256> {
        self.topics.first()
    }

    /// Indexed parameter at position `n` (1-based, topic 0 is the signature).
    pub fn indexed(&self, n: usize) -> Option<&B256> {
        self.topics.get(n)
    }

    /// Decode an indexed `uint256` topic into a `u64` identifier.
    pub fn indexed_u64(&self, n: usize) -> Option<u64> {
        let topic = self.indexed(n)?;
        u64::try_from(U256::from_be_bytes(topic.0)).ok()
    }
}

/// Confirmation receipt for a submitted transaction.
///
/// Produced by the gateway once finality is reached; the workflow's
/// extraction functions read the step output identifiers out of `logs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    /// True when the transaction executed without reverting.
    pub success: bool,
    pub logs: Vec<EventLog>,
}

impl TxReceipt {
    /// Find the first log emitted with the given event signature hash.
    pub fn log_with_signature(&self, signature: &B256) -> Option<&EventLog> {
        self.logs
            .iter()
            .find(|log| log.signature() == Some(signature))
    }
}
