//! Typed bindings for the three ERC-8004 registries.
//!
//! One read and one write operation per registry, exposed behind the
//! [`gateway`] traits. Writes are two-phase (simulate, then submit) and
//! confirmation is a bounded receipt wait; step output identifiers are
//! decoded from the registries' events by the per-registry extraction
//! functions.

pub mod config;
pub mod contracts;
pub mod evm;
pub mod gateway;
pub mod identity;
pub mod mock;
pub mod reputation;
pub mod validation;

pub use config::RegistryConfig;
pub use evm::EvmRegistryClient;
pub use gateway::{Confirmations, IdentityOps, RegistryGateway, ReputationOps, ValidationOps};
pub use mock::MockGateway;
