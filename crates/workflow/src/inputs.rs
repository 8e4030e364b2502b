//! Caller-supplied parameters for the three write steps.

use alloy_primitives::B256;
use registries::config::{
    DEMO_AGENT_DOMAIN, DEMO_CLIENT_AGENT_ID, DEMO_DATA_HASH, DEMO_SERVER_AGENT_ID,
    DEMO_VALIDATOR_AGENT_ID,
};
use serde::Serialize;

/// Inputs for registration, feedback authorization and validation request.
///
/// Defaults mirror the demo deployment so a fresh run works without any
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepInputs {
    /// Domain registered for the new agent.
    pub domain: String,
    /// Agent pair for the feedback authorization.
    pub client_agent_id: u64,
    pub server_agent_id: u64,
    /// Validator assigned to the validation request.
    pub validator_agent_id: u64,
    /// Hash of the data to be validated.
    pub data_hash: B256,
}

impl Default for StepInputs {
    fn default() -> Self {
        Self {
            domain: DEMO_AGENT_DOMAIN.to_string(),
            client_agent_id: DEMO_CLIENT_AGENT_ID,
            server_agent_id: DEMO_SERVER_AGENT_ID,
            validator_agent_id: DEMO_VALIDATOR_AGENT_ID,
            data_hash: DEMO_DATA_HASH,
        }
    }
}

impl StepInputs {
    /// Local constraint check before any remote call.
    pub fn validate(&self) -> Result<(), String> {
        if self.domain.trim().is_empty() {
            return Err("agent domain must not be empty".to_string());
        }
        if self.client_agent_id == self.server_agent_id {
            return Err("client and server agent ids must differ".to_string());
        }
        if self.validator_agent_id == self.server_agent_id {
            return Err("validator and server agent ids must differ".to_string());
        }
        if self.data_hash == B256::ZERO {
            return Err("data hash must not be zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_defaults_are_valid() {
        assert!(StepInputs::default().validate().is_ok());
    }

    #[test]
    fn rejects_identical_agent_pair() {
        let inputs = StepInputs {
            client_agent_id: 2,
            server_agent_id: 2,
            ..StepInputs::default()
        };
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn rejects_zero_data_hash() {
        let inputs = StepInputs {
            data_hash: B256::ZERO,
            ..StepInputs::default()
        };
        assert!(inputs.validate().is_err());
    }
}
