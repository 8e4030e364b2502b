//! Shared domain types for the ERC-8004 trust workflow.
//!
//! Everything here is transport-independent: the registry bindings and the
//! workflow engine both speak in these types, so the orchestration core
//! never sees a provider or an RPC payload.

pub mod error;
pub mod types;

pub use error::RegistryError;
pub use types::{
    Agent, AgentId, EventLog, FeedbackAuthorization, TxHash, TxReceipt, ValidationRequestRecord,
};
