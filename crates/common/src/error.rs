//! Registry-layer error types.

use alloy_primitives::{B256, U256};
use thiserror::Error;

/// Errors produced by the registry gateway.
///
/// Simulate failures are deliberately a distinct kind from submit failures:
/// a reverted dry-run is cheap to retry after correcting input, while a
/// failed broadcast may already be partially committed on the remote side.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// Network or provider unreachable.
    #[error("registry connection error: {0}")]
    Connection(String),

    /// A read call failed at the contract level.
    #[error("registry read failed: {0}")]
    Rpc(String),

    /// The dry-run (`eth_call`) predicted a revert.
    #[error("simulation reverted: {0}")]
    Simulation(String),

    /// Broadcasting the transaction failed.
    #[error("transaction submission failed: {0}")]
    Submission(String),

    /// The transaction was included but reverted on-chain.
    #[error("transaction {tx_hash} reverted on-chain")]
    Execution { tx_hash: B256 },

    /// Confirmation was not observed within the bounded wait.
    ///
    /// The transaction may still confirm later out-of-band; callers must
    /// not report it as dropped.
    #[error("transaction {tx_hash} not confirmed within {waited_secs}s")]
    Timeout { tx_hash: B256, waited_secs: u64 },

    /// A confirmed receipt did not carry the expected event payload.
    #[error("failed to decode receipt: {0}")]
    Decode(String),

    /// Caller balance cannot cover the required payment.
    #[error("insufficient funds: need {required} wei, have {available} wei")]
    InsufficientFunds { required: U256, available: U256 },

    /// Bad gateway configuration (addresses, RPC URL, signer).
    #[error("registry configuration error: {0}")]
    Configuration(String),
}
