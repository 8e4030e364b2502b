//! Reputation Registry receipt decoding.
//!
//! `AuthFeedback(uint256 indexed agentClientId, uint256 indexed
//! agentServerId, bytes32 indexed feedbackAuthId)` — the opaque
//! authorization handle is indexed topic 3.

use alloy::sol_types::SolEvent;
use alloy_primitives::B256;
use common::{RegistryError, TxReceipt};

use crate::contracts::ReputationRegistry;

/// Extract the feedback authorization id from an `acceptFeedback` receipt.
pub fn extract_feedback_auth_id(receipt: &TxReceipt) -> Result<B256, RegistryError> {
    let log = receipt
        .log_with_signature(&ReputationRegistry::AuthFeedback::SIGNATURE_HASH)
        .ok_or_else(|| RegistryError::Decode("no AuthFeedback event in receipt".to_string()))?;

    log.indexed(3).copied().ok_or_else(|| {
        RegistryError::Decode("AuthFeedback feedbackAuthId topic missing".to_string())
    })
}
