//! Pure workflow state machine.
//!
//! The cursor advances only on confirmation events; failed or abandoned
//! attempts never move it. `transition` is a total function over
//! (state, event) pairs: combinations with no defined effect return the
//! state unchanged, so callers never have to pre-filter events.

use common::{Agent, FeedbackAuthorization, ValidationRequestRecord};
use serde::Serialize;

/// Position in the ordered three-transaction flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WorkflowStep {
    /// No session connected yet.
    #[default]
    AwaitingSession,
    /// Registration write is the current action.
    Registering,
    /// Feedback authorization write is the current action.
    AwaitingFeedbackAuth,
    /// Validation request write is the current action.
    AwaitingValidation,
    /// All three confirmations observed.
    Complete,
}

impl WorkflowStep {
    /// Whether this step has a write operation attached to it.
    pub fn has_submit_action(self) -> bool {
        matches!(
            self,
            WorkflowStep::Registering
                | WorkflowStep::AwaitingFeedbackAuth
                | WorkflowStep::AwaitingValidation
        )
    }
}

/// Accumulated workflow progress: the cursor plus the confirmed outcome of
/// every step already passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowState {
    pub step: WorkflowStep,
    pub agent: Option<Agent>,
    pub feedback: Option<FeedbackAuthorization>,
    pub validation: Option<ValidationRequestRecord>,
}

/// Events that can move the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    SessionConnected,
    SessionDisconnected,
    RegisterConfirmed(Agent),
    FeedbackConfirmed(FeedbackAuthorization),
    ValidationConfirmed(ValidationRequestRecord),
    Restart,
}

/// Apply one event to the state.
///
/// Confirmations only count at the step that issued them. Disconnecting
/// preserves all progress; the cursor stays where it was so a reconnect
/// resumes in place. `Restart` is only honored from `Complete` and clears
/// every recorded outcome in the same transition.
pub fn transition(state: &WorkflowState, event: WorkflowEvent) -> WorkflowState {
    let mut next = state.clone();
    match (state.step, event) {
        (WorkflowStep::AwaitingSession, WorkflowEvent::SessionConnected) => {
            next.step = WorkflowStep::Registering;
        }
        (WorkflowStep::Registering, WorkflowEvent::RegisterConfirmed(agent)) => {
            next.agent = Some(agent);
            next.step = WorkflowStep::AwaitingFeedbackAuth;
        }
        (WorkflowStep::AwaitingFeedbackAuth, WorkflowEvent::FeedbackConfirmed(auth)) => {
            next.feedback = Some(auth);
            next.step = WorkflowStep::AwaitingValidation;
        }
        (WorkflowStep::AwaitingValidation, WorkflowEvent::ValidationConfirmed(record)) => {
            next.validation = Some(record);
            next.step = WorkflowStep::Complete;
        }
        (WorkflowStep::Complete, WorkflowEvent::Restart) => {
            next = WorkflowState {
                step: WorkflowStep::Registering,
                ..WorkflowState::default()
            };
        }
        // Progress survives a disconnect; the session layer gates actions.
        (_, WorkflowEvent::SessionDisconnected) => {}
        _ => {}
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, B256};

    fn demo_agent() -> Agent {
        Agent {
            agent_id: 1,
            domain: "agent1.example.com".to_string(),
            address: address!("abcd000000000000000000000000000000001234"),
        }
    }

    fn demo_auth() -> FeedbackAuthorization {
        FeedbackAuthorization {
            auth_id: B256::repeat_byte(0x11),
            client_agent_id: 1,
            server_agent_id: 2,
        }
    }

    fn demo_validation() -> ValidationRequestRecord {
        ValidationRequestRecord {
            data_hash: B256::repeat_byte(0x22),
            validator_agent_id: 3,
            server_agent_id: 2,
            responded: false,
        }
    }

    #[test]
    fn ordered_flow_reaches_complete() {
        let mut state = WorkflowState::default();
        state = transition(&state, WorkflowEvent::SessionConnected);
        assert_eq!(state.step, WorkflowStep::Registering);

        state = transition(&state, WorkflowEvent::RegisterConfirmed(demo_agent()));
        assert_eq!(state.step, WorkflowStep::AwaitingFeedbackAuth);
        assert_eq!(state.agent.as_ref().map(|a| a.agent_id), Some(1));

        state = transition(&state, WorkflowEvent::FeedbackConfirmed(demo_auth()));
        assert_eq!(state.step, WorkflowStep::AwaitingValidation);

        state = transition(&state, WorkflowEvent::ValidationConfirmed(demo_validation()));
        assert_eq!(state.step, WorkflowStep::Complete);
        assert!(state.agent.is_some() && state.feedback.is_some() && state.validation.is_some());
    }

    #[test]
    fn out_of_order_confirmation_is_ignored() {
        let state = WorkflowState {
            step: WorkflowStep::Registering,
            ..WorkflowState::default()
        };
        let next = transition(&state, WorkflowEvent::FeedbackConfirmed(demo_auth()));
        assert_eq!(next, state);
    }

    #[test]
    fn restart_only_from_complete() {
        let mid = WorkflowState {
            step: WorkflowStep::AwaitingFeedbackAuth,
            agent: Some(demo_agent()),
            ..WorkflowState::default()
        };
        assert_eq!(transition(&mid, WorkflowEvent::Restart), mid);

        let done = WorkflowState {
            step: WorkflowStep::Complete,
            agent: Some(demo_agent()),
            feedback: Some(demo_auth()),
            validation: Some(demo_validation()),
        };
        let fresh = transition(&done, WorkflowEvent::Restart);
        assert_eq!(fresh.step, WorkflowStep::Registering);
        assert!(fresh.agent.is_none());
        assert!(fresh.feedback.is_none());
        assert!(fresh.validation.is_none());
    }

    #[test]
    fn disconnect_preserves_progress() {
        let state = WorkflowState {
            step: WorkflowStep::AwaitingValidation,
            agent: Some(demo_agent()),
            feedback: Some(demo_auth()),
            ..WorkflowState::default()
        };
        let next = transition(&state, WorkflowEvent::SessionDisconnected);
        assert_eq!(next, state);
    }

    #[test]
    fn only_write_steps_have_submit_actions() {
        assert!(!WorkflowStep::AwaitingSession.has_submit_action());
        assert!(WorkflowStep::Registering.has_submit_action());
        assert!(WorkflowStep::AwaitingFeedbackAuth.has_submit_action());
        assert!(WorkflowStep::AwaitingValidation.has_submit_action());
        assert!(!WorkflowStep::Complete.has_submit_action());
    }
}
