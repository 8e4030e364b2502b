//! Workflow engine: drives the ordered registry writes.
//!
//! The engine owns the session, the state machine and one transaction
//! tracker for the current step. Every write is two-phase: `prepare` runs
//! the local checks and the remote dry-run, `submit` broadcasts and then
//! awaits finality before advancing the cursor. Remote failures are
//! recorded on the tracker (the attempt ends in `Failed`); caller mistakes
//! are returned as errors without starting an attempt.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use common::{Agent, FeedbackAuthorization, RegistryError, ValidationRequestRecord};
use registries::{identity, reputation, validation, RegistryGateway};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::inputs::StepInputs;
use crate::machine::{transition, WorkflowEvent, WorkflowState, WorkflowStep};
use crate::session::SessionContext;
use crate::tracker::{FailureKind, InvalidTransition, StepOutput, TxPhase, TxTracker};

/// Default bound on the confirmation wait.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors surfaced to the engine's caller.
///
/// Remote attempt failures are not listed here: those land on the tracker
/// as `Failed` with a [`FailureKind`] so the attempt history survives.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("no wallet session connected")]
    SessionDisconnected,

    #[error("step {requested:?} is not current (workflow is at {current:?})")]
    StepNotCurrent {
        requested: WorkflowStep,
        current: WorkflowStep,
    },

    #[error("step has no transaction to prepare or submit")]
    NoStepAction,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient funds: need {required} wei, have {available} wei")]
    InsufficientFunds { required: U256, available: U256 },

    #[error("previous attempt failed ({kind:?}): {message}; reset before retrying")]
    AttemptFailed { kind: FailureKind, message: String },

    #[error("no prepared transaction to submit (tracker is {0:?})")]
    NotReady(TxPhase),

    #[error("restart is only available once the workflow is complete")]
    RestartUnavailable,

    #[error("no attempt to reset")]
    ResetUnavailable,

    #[error(transparent)]
    Tracker(#[from] InvalidTransition),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Classify a gateway error for the tracker.
fn failure_kind(err: &RegistryError) -> FailureKind {
    match err {
        RegistryError::Connection(_) | RegistryError::Rpc(_) | RegistryError::Submission(_) => {
            FailureKind::Connection
        }
        RegistryError::Simulation(_) => FailureKind::Simulation,
        RegistryError::Execution { .. } | RegistryError::Decode(_) => FailureKind::Execution,
        RegistryError::Timeout { .. } => FailureKind::Timeout,
        RegistryError::InsufficientFunds { .. } | RegistryError::Configuration(_) => {
            FailureKind::Validation
        }
    }
}

/// Drives the registration, feedback and validation writes in order.
pub struct WorkflowEngine {
    gateway: Arc<dyn RegistryGateway>,
    session: SessionContext,
    state: WorkflowState,
    inputs: StepInputs,
    tracker: TxTracker,
    confirmation_timeout: Duration,
}

impl WorkflowEngine {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self {
            gateway,
            session: SessionContext::default(),
            state: WorkflowState::default(),
            inputs: StepInputs::default(),
            tracker: TxTracker::default(),
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }

    pub fn with_inputs(mut self, inputs: StepInputs) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn step(&self) -> WorkflowStep {
        self.state.step
    }

    pub fn tracker(&self) -> &TxTracker {
        &self.tracker
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn inputs(&self) -> &StepInputs {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut StepInputs {
        &mut self.inputs
    }

    /// Bind a wallet account and open the workflow.
    pub fn on_connect(&mut self, account: Address) {
        self.session.connect(account);
        if self.state.step == WorkflowStep::AwaitingSession {
            self.state = transition(&self.state, WorkflowEvent::SessionConnected);
        }
        info!(%account, step = ?self.state.step, "session connected");
    }

    /// Drop the session. Workflow progress is preserved; actions are
    /// disabled until a reconnect.
    pub fn on_disconnect(&mut self) {
        self.session.disconnect();
        self.state = transition(&self.state, WorkflowEvent::SessionDisconnected);
        info!(step = ?self.state.step, "session disconnected");
    }

    /// Run the dry-run for the current step.
    ///
    /// Caller mistakes (wrong step, bad input, insufficient funds, no
    /// session) return an error and leave the tracker at `Idle`. A remote
    /// simulation verdict is recorded on the tracker instead: the returned
    /// phase is `ReadyToSubmit` on success, `Failed` on a predicted revert.
    /// Calling again while an attempt is in flight is a no-op.
    pub async fn prepare(&mut self, step: WorkflowStep) -> Result<TxPhase, WorkflowError> {
        let account = self.require_current_step(step)?;

        if self.tracker.is_in_flight() {
            return Ok(self.tracker.phase());
        }
        if let Some(failure) = self.tracker.failure() {
            return Err(WorkflowError::AttemptFailed {
                kind: failure.kind,
                message: failure.message.clone(),
            });
        }
        if self.tracker.phase() == TxPhase::Confirmed {
            self.tracker = TxTracker::default();
        }

        self.inputs.validate().map_err(WorkflowError::InvalidInput)?;

        if step == WorkflowStep::Registering {
            let required = self.gateway.registration_fee().await?;
            let available = self.gateway.balance_of(account).await?;
            if available < required {
                return Err(WorkflowError::InsufficientFunds { required, available });
            }
        }

        self.tracker.begin_simulation()?;
        debug!(?step, attempt = self.tracker.attempt(), "simulating");

        let outcome = match step {
            WorkflowStep::Registering => {
                self.gateway
                    .simulate_register(&self.inputs.domain, account)
                    .await
            }
            WorkflowStep::AwaitingFeedbackAuth => {
                self.gateway
                    .simulate_accept_feedback(
                        self.inputs.client_agent_id,
                        self.inputs.server_agent_id,
                    )
                    .await
            }
            WorkflowStep::AwaitingValidation => {
                self.gateway
                    .simulate_validation_request(
                        self.inputs.validator_agent_id,
                        self.inputs.server_agent_id,
                        self.inputs.data_hash,
                    )
                    .await
            }
            // require_current_step already filtered non-write steps.
            _ => return Err(WorkflowError::NoStepAction),
        };

        match outcome {
            Ok(()) => {
                self.tracker.simulation_succeeded()?;
                debug!(?step, "simulation succeeded");
            }
            Err(e) => {
                warn!(?step, error = %e, "simulation failed");
                self.tracker.fail(failure_kind(&e), e.to_string())?;
            }
        }
        Ok(self.tracker.phase())
    }

    /// Broadcast the prepared transaction and await finality.
    ///
    /// Requires a prior successful `prepare` (`ReadyToSubmit`). On
    /// confirmation the cursor advances and the extracted identifier is
    /// recorded on the state. Broadcast, execution and timeout failures end
    /// the attempt in `Failed` on the tracker.
    pub async fn submit(&mut self, step: WorkflowStep) -> Result<TxPhase, WorkflowError> {
        let account = self.require_current_step(step)?;

        match self.tracker.phase() {
            TxPhase::ReadyToSubmit => {}
            TxPhase::Submitted | TxPhase::Pending => return Ok(self.tracker.phase()),
            other => return Err(WorkflowError::NotReady(other)),
        }

        let broadcast = match step {
            WorkflowStep::Registering => {
                self.gateway
                    .submit_register(&self.inputs.domain, account)
                    .await
            }
            WorkflowStep::AwaitingFeedbackAuth => {
                self.gateway
                    .submit_accept_feedback(
                        self.inputs.client_agent_id,
                        self.inputs.server_agent_id,
                    )
                    .await
            }
            WorkflowStep::AwaitingValidation => {
                self.gateway
                    .submit_validation_request(
                        self.inputs.validator_agent_id,
                        self.inputs.server_agent_id,
                        self.inputs.data_hash,
                    )
                    .await
            }
            _ => return Err(WorkflowError::NoStepAction),
        };

        let tx_hash = match broadcast {
            Ok(hash) => hash,
            Err(e) => {
                warn!(?step, error = %e, "broadcast failed");
                self.tracker.fail(failure_kind(&e), e.to_string())?;
                return Ok(self.tracker.phase());
            }
        };

        self.tracker.mark_submitted(tx_hash)?;
        self.tracker.mark_pending()?;
        info!(?step, %tx_hash, "awaiting confirmation");

        let receipt = match self
            .gateway
            .wait_for_receipt(tx_hash, self.confirmation_timeout)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(?step, %tx_hash, error = %e, "confirmation not observed");
                self.tracker.fail(failure_kind(&e), e.to_string())?;
                return Ok(self.tracker.phase());
            }
        };

        if !receipt.success {
            let err = RegistryError::Execution { tx_hash };
            warn!(?step, %tx_hash, "transaction reverted on-chain");
            self.tracker.fail(FailureKind::Execution, err.to_string())?;
            return Ok(self.tracker.phase());
        }

        let (output, event) = match step {
            WorkflowStep::Registering => {
                let agent_id = match identity::extract_agent_id(&receipt) {
                    Ok(id) => id,
                    Err(e) => return self.fail_decode(e),
                };
                let agent = Agent {
                    agent_id,
                    domain: self.inputs.domain.clone(),
                    address: account,
                };
                (
                    StepOutput::AgentId(agent_id),
                    WorkflowEvent::RegisterConfirmed(agent),
                )
            }
            WorkflowStep::AwaitingFeedbackAuth => {
                let auth_id = match reputation::extract_feedback_auth_id(&receipt) {
                    Ok(id) => id,
                    Err(e) => return self.fail_decode(e),
                };
                let auth = FeedbackAuthorization {
                    auth_id,
                    client_agent_id: self.inputs.client_agent_id,
                    server_agent_id: self.inputs.server_agent_id,
                };
                (
                    StepOutput::FeedbackAuthId(auth_id),
                    WorkflowEvent::FeedbackConfirmed(auth),
                )
            }
            WorkflowStep::AwaitingValidation => {
                let data_hash =
                    match validation::extract_request_data_hash(&receipt, self.inputs.data_hash) {
                        Ok(hash) => hash,
                        Err(e) => return self.fail_decode(e),
                    };
                let record = ValidationRequestRecord {
                    data_hash,
                    validator_agent_id: self.inputs.validator_agent_id,
                    server_agent_id: self.inputs.server_agent_id,
                    responded: false,
                };
                (
                    StepOutput::DataHash(data_hash),
                    WorkflowEvent::ValidationConfirmed(record),
                )
            }
            _ => return Err(WorkflowError::NoStepAction),
        };

        self.tracker.confirm(output)?;
        self.state = transition(&self.state, event);
        info!(?step, %tx_hash, next = ?self.state.step, "step confirmed");
        Ok(self.tracker.phase())
    }

    /// Discard a failed or unsubmitted attempt so the step can be retried.
    pub fn reset_attempt(&mut self) -> Result<(), WorkflowError> {
        if !self.session.can_act() {
            return Err(WorkflowError::SessionDisconnected);
        }
        if self.tracker.phase() == TxPhase::Idle {
            return Err(WorkflowError::ResetUnavailable);
        }
        self.tracker.reset()?;
        debug!(step = ?self.state.step, "attempt reset");
        Ok(())
    }

    /// Begin a fresh run. Only valid once the workflow is complete; all
    /// recorded outcomes are cleared atomically, the session is kept.
    pub fn restart(&mut self) -> Result<(), WorkflowError> {
        if !self.session.can_act() {
            return Err(WorkflowError::SessionDisconnected);
        }
        if self.state.step != WorkflowStep::Complete {
            return Err(WorkflowError::RestartUnavailable);
        }
        self.state = transition(&self.state, WorkflowEvent::Restart);
        self.tracker = TxTracker::default();
        info!("workflow restarted");
        Ok(())
    }

    fn fail_decode(&mut self, err: RegistryError) -> Result<TxPhase, WorkflowError> {
        warn!(error = %err, "receipt decoding failed");
        self.tracker.fail(failure_kind(&err), err.to_string())?;
        Ok(self.tracker.phase())
    }

    /// Session gate plus step-ordering gate. Returns the bound account.
    fn require_current_step(&self, step: WorkflowStep) -> Result<Address, WorkflowError> {
        let account = self
            .session
            .account()
            .filter(|_| self.session.can_act())
            .ok_or(WorkflowError::SessionDisconnected)?;
        if self.state.step != step {
            return Err(WorkflowError::StepNotCurrent {
                requested: step,
                current: self.state.step,
            });
        }
        if !step.has_submit_action() {
            return Err(WorkflowError::NoStepAction);
        }
        Ok(account)
    }
}
