//! Identity Registry receipt decoding.
//!
//! `AgentRegistered(uint256 indexed agentId, string agentDomain,
//! address agentAddress)` — the registry-assigned id is indexed topic 1;
//! domain and address travel in the data section but are already known to
//! the caller, so only the id is extracted.

use alloy::sol_types::SolEvent;
use common::{RegistryError, TxReceipt};

use crate::contracts::IdentityRegistry;

/// Extract the registry-assigned agent id from a registration receipt.
pub fn extract_agent_id(receipt: &TxReceipt) -> Result<u64, RegistryError> {
    let log = receipt
        .log_with_signature(&IdentityRegistry::AgentRegistered::SIGNATURE_HASH)
        .ok_or_else(|| {
            RegistryError::Decode("no AgentRegistered event in receipt".to_string())
        })?;

    log.indexed_u64(1).ok_or_else(|| {
        RegistryError::Decode("AgentRegistered agentId topic missing or out of range".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, U256};
    use common::EventLog;

    fn registration_receipt(agent_id: u64) -> TxReceipt {
        TxReceipt {
            tx_hash: B256::ZERO,
            block_number: Some(100),
            success: true,
            logs: vec![EventLog {
                address: Address::ZERO,
                topics: vec![
                    IdentityRegistry::AgentRegistered::SIGNATURE_HASH,
                    B256::from(U256::from(agent_id)),
                ],
                data: vec![],
            }],
        }
    }

    #[test]
    fn extracts_agent_id_from_indexed_topic() {
        assert_eq!(extract_agent_id(&registration_receipt(1)).unwrap(), 1);
        assert_eq!(extract_agent_id(&registration_receipt(42)).unwrap(), 42);
    }

    #[test]
    fn missing_event_is_a_decode_error() {
        let receipt = TxReceipt {
            tx_hash: B256::ZERO,
            block_number: Some(100),
            success: true,
            logs: vec![],
        };
        assert!(matches!(
            extract_agent_id(&receipt),
            Err(RegistryError::Decode(_))
        ));
    }

    #[test]
    fn unrelated_events_are_skipped() {
        let mut receipt = registration_receipt(7);
        receipt.logs.insert(
            0,
            EventLog {
                address: Address::ZERO,
                topics: vec![B256::ZERO],
                data: vec![],
            },
        );
        assert_eq!(extract_agent_id(&receipt).unwrap(), 7);
    }
}
