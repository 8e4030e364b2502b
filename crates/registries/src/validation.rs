//! Validation Registry receipt decoding.
//!
//! `ValidationRequestEvent(uint256 indexed agentValidatorId, uint256
//! indexed agentServerId, bytes32 indexed dataHash)` — the request call
//! returns no server-assigned identifier; the caller-supplied data hash is
//! echoed back as indexed topic 3 and cross-checked here.

use alloy::sol_types::SolEvent;
use alloy_primitives::B256;
use common::{RegistryError, TxReceipt};

use crate::contracts::ValidationRegistry;

/// Extract and verify the data hash from a `validationRequest` receipt.
pub fn extract_request_data_hash(
    receipt: &TxReceipt,
    submitted: B256,
) -> Result<B256, RegistryError> {
    let log = receipt
        .log_with_signature(&ValidationRegistry::ValidationRequestEvent::SIGNATURE_HASH)
        .ok_or_else(|| {
            RegistryError::Decode("no ValidationRequestEvent in receipt".to_string())
        })?;

    let echoed = log.indexed(3).copied().ok_or_else(|| {
        RegistryError::Decode("ValidationRequestEvent dataHash topic missing".to_string())
    })?;

    if echoed != submitted {
        return Err(RegistryError::Decode(format!(
            "receipt dataHash {echoed} does not match submitted {submitted}"
        )));
    }
    Ok(echoed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{b256, Address, B256, U256};
    use common::EventLog;

    fn request_receipt(data_hash: B256) -> TxReceipt {
        TxReceipt {
            tx_hash: B256::ZERO,
            block_number: Some(9),
            success: true,
            logs: vec![EventLog {
                address: Address::ZERO,
                topics: vec![
                    ValidationRegistry::ValidationRequestEvent::SIGNATURE_HASH,
                    B256::from(U256::from(3u64)),
                    B256::from(U256::from(2u64)),
                    data_hash,
                ],
                data: vec![],
            }],
        }
    }

    #[test]
    fn echoed_hash_round_trips() {
        let hash = b256!("0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef");
        assert_eq!(
            extract_request_data_hash(&request_receipt(hash), hash).unwrap(),
            hash
        );
    }

    #[test]
    fn mismatched_hash_is_rejected() {
        let submitted =
            b256!("0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef");
        let other = b256!("00000000000000000000000000000000000000000000000000000000000000ff");
        assert!(matches!(
            extract_request_data_hash(&request_receipt(other), submitted),
            Err(RegistryError::Decode(_))
        ));
    }
}
