//! Trust workflow orchestration.
//!
//! Composes the three registry writes into one ordered flow: register the
//! agent, authorize feedback, request validation. The [`machine`] module is
//! the pure state machine, [`tracker`] the per-attempt transaction
//! lifecycle, and [`engine`] the async driver that binds both to a registry
//! gateway.

pub mod engine;
pub mod inputs;
pub mod machine;
pub mod session;
pub mod tracker;

pub use engine::{WorkflowEngine, WorkflowError, DEFAULT_CONFIRMATION_TIMEOUT};
pub use inputs::StepInputs;
pub use machine::{transition, WorkflowEvent, WorkflowState, WorkflowStep};
pub use session::SessionContext;
pub use tracker::{FailureKind, StepFailure, StepOutput, TxPhase, TxTracker};
