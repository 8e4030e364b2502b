//! End-to-end workflow flows against the in-memory registry gateway.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{address, Address, B256, U256};
use registries::{MockGateway, RegistryGateway, ReputationOps, ValidationOps};
use workflow::{
    FailureKind, StepInputs, TxPhase, WorkflowEngine, WorkflowError, WorkflowStep,
};

const WALLET: Address = address!("abcd000000000000000000000000000000001234");

fn engine_with(gateway: Arc<MockGateway>) -> WorkflowEngine {
    WorkflowEngine::new(gateway as Arc<dyn RegistryGateway>)
        .with_confirmation_timeout(Duration::from_secs(5))
}

async fn run_step(engine: &mut WorkflowEngine, step: WorkflowStep) {
    assert_eq!(engine.prepare(step).await.unwrap(), TxPhase::ReadyToSubmit);
    assert_eq!(engine.submit(step).await.unwrap(), TxPhase::Confirmed);
}

#[tokio::test]
async fn full_flow_reaches_complete() {
    let gateway = Arc::new(MockGateway::new());
    let mut engine = engine_with(gateway.clone());

    engine.on_connect(WALLET);
    assert_eq!(engine.step(), WorkflowStep::Registering);

    run_step(&mut engine, WorkflowStep::Registering).await;
    assert_eq!(engine.step(), WorkflowStep::AwaitingFeedbackAuth);

    run_step(&mut engine, WorkflowStep::AwaitingFeedbackAuth).await;
    assert_eq!(engine.step(), WorkflowStep::AwaitingValidation);

    run_step(&mut engine, WorkflowStep::AwaitingValidation).await;
    assert_eq!(engine.step(), WorkflowStep::Complete);

    let state = engine.state();
    assert!(state.agent.is_some());
    assert!(state.feedback.is_some());
    assert!(state.validation.is_some());
}

#[tokio::test]
async fn registration_records_assigned_agent() {
    let gateway = Arc::new(MockGateway::new());
    let mut engine = engine_with(gateway);
    engine.on_connect(WALLET);

    run_step(&mut engine, WorkflowStep::Registering).await;

    let agent = engine.state().agent.as_ref().unwrap();
    assert_eq!(agent.agent_id, 1);
    assert_eq!(agent.domain, "agent1.example.com");
    assert_eq!(agent.address, WALLET);
    assert_eq!(engine.step(), WorkflowStep::AwaitingFeedbackAuth);
}

#[tokio::test]
async fn feedback_auth_id_matches_registry_record() {
    let gateway = Arc::new(MockGateway::new());
    let mut engine = engine_with(gateway.clone());
    engine.on_connect(WALLET);

    run_step(&mut engine, WorkflowStep::Registering).await;
    run_step(&mut engine, WorkflowStep::AwaitingFeedbackAuth).await;

    let auth = engine.state().feedback.as_ref().unwrap().clone();
    let (authorized, auth_id) = gateway
        .is_feedback_authorized(auth.client_agent_id, auth.server_agent_id)
        .await
        .unwrap();
    assert!(authorized);
    assert_eq!(auth.auth_id, auth_id);
    assert_ne!(auth.auth_id, B256::ZERO);
}

#[tokio::test]
async fn validation_request_round_trips_data_hash() {
    let gateway = Arc::new(MockGateway::new());
    let mut engine = engine_with(gateway.clone());
    engine.on_connect(WALLET);

    run_step(&mut engine, WorkflowStep::Registering).await;
    run_step(&mut engine, WorkflowStep::AwaitingFeedbackAuth).await;
    run_step(&mut engine, WorkflowStep::AwaitingValidation).await;

    let recorded = engine.state().validation.as_ref().unwrap().clone();
    let on_registry = gateway
        .get_validation_request(recorded.data_hash)
        .await
        .unwrap();
    assert_eq!(recorded, on_registry);
    assert!(!on_registry.responded);
}

#[tokio::test]
async fn later_step_is_rejected_without_side_effects() {
    let gateway = Arc::new(MockGateway::new());
    let mut engine = engine_with(gateway);
    engine.on_connect(WALLET);

    let err = engine
        .prepare(WorkflowStep::AwaitingValidation)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::StepNotCurrent {
            requested: WorkflowStep::AwaitingValidation,
            current: WorkflowStep::Registering,
        }
    ));
    assert_eq!(engine.tracker().phase(), TxPhase::Idle);
    assert_eq!(engine.step(), WorkflowStep::Registering);
}

#[tokio::test]
async fn submit_without_prepare_is_rejected() {
    let gateway = Arc::new(MockGateway::new());
    let mut engine = engine_with(gateway);
    engine.on_connect(WALLET);

    let err = engine.submit(WorkflowStep::Registering).await.unwrap_err();
    assert!(matches!(err, WorkflowError::NotReady(TxPhase::Idle)));
}

#[tokio::test]
async fn simulation_revert_blocks_submission_until_reset() {
    let gateway = Arc::new(MockGateway::new());
    let mut engine = engine_with(gateway.clone());
    engine.on_connect(WALLET);

    gateway.fail_next_simulation("execution reverted: AgentAlreadyRegistered");
    assert_eq!(
        engine.prepare(WorkflowStep::Registering).await.unwrap(),
        TxPhase::Failed
    );
    let failure = engine.tracker().failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Simulation);
    assert!(engine.state().agent.is_none());
    assert_eq!(engine.step(), WorkflowStep::Registering);

    // No submission and no fresh attempt until the failure is acknowledged.
    assert!(matches!(
        engine.submit(WorkflowStep::Registering).await.unwrap_err(),
        WorkflowError::NotReady(TxPhase::Failed)
    ));
    assert!(matches!(
        engine.prepare(WorkflowStep::Registering).await.unwrap_err(),
        WorkflowError::AttemptFailed { .. }
    ));

    engine.reset_attempt().unwrap();
    run_step(&mut engine, WorkflowStep::Registering).await;
    assert_eq!(engine.step(), WorkflowStep::AwaitingFeedbackAuth);
}

#[tokio::test]
async fn execution_revert_ends_attempt_without_advancing() {
    let gateway = Arc::new(MockGateway::new());
    let mut engine = engine_with(gateway.clone());
    engine.on_connect(WALLET);

    assert_eq!(
        engine.prepare(WorkflowStep::Registering).await.unwrap(),
        TxPhase::ReadyToSubmit
    );
    gateway.revert_next_execution();
    assert_eq!(
        engine.submit(WorkflowStep::Registering).await.unwrap(),
        TxPhase::Failed
    );

    let failure = engine.tracker().failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Execution);
    assert!(engine.tracker().tx_hash().is_some());
    assert_eq!(engine.step(), WorkflowStep::Registering);
    assert!(engine.state().agent.is_none());
}

#[tokio::test]
async fn confirmation_timeout_is_reported_not_dropped() {
    let gateway = Arc::new(MockGateway::new());
    let mut engine = engine_with(gateway.clone());
    engine.on_connect(WALLET);

    engine.prepare(WorkflowStep::Registering).await.unwrap();
    gateway.stall_receipts(true);
    assert_eq!(
        engine.submit(WorkflowStep::Registering).await.unwrap(),
        TxPhase::Failed
    );

    let failure = engine.tracker().failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Timeout);
    // The hash stays visible so the caller can check the network later.
    assert!(engine.tracker().tx_hash().is_some());
    assert_eq!(engine.step(), WorkflowStep::Registering);
}

#[tokio::test]
async fn insufficient_funds_fails_before_simulation() {
    let gateway = Arc::new(MockGateway::new());
    gateway.set_balance(WALLET, U256::ZERO);
    let mut engine = engine_with(gateway);
    engine.on_connect(WALLET);

    let err = engine.prepare(WorkflowStep::Registering).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InsufficientFunds { .. }));
    assert_eq!(engine.tracker().phase(), TxPhase::Idle);
    assert_eq!(engine.tracker().attempt(), 0);
}

#[tokio::test]
async fn invalid_inputs_never_reach_the_gateway() {
    let gateway = Arc::new(MockGateway::new());
    let mut engine = engine_with(gateway).with_inputs(StepInputs {
        domain: "  ".to_string(),
        ..StepInputs::default()
    });
    engine.on_connect(WALLET);

    let err = engine.prepare(WorkflowStep::Registering).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidInput(_)));
    assert_eq!(engine.tracker().phase(), TxPhase::Idle);
}

#[tokio::test]
async fn disconnect_disables_actions_and_preserves_progress() {
    let gateway = Arc::new(MockGateway::new());
    let mut engine = engine_with(gateway);
    engine.on_connect(WALLET);

    run_step(&mut engine, WorkflowStep::Registering).await;
    engine.on_disconnect();

    assert!(matches!(
        engine
            .prepare(WorkflowStep::AwaitingFeedbackAuth)
            .await
            .unwrap_err(),
        WorkflowError::SessionDisconnected
    ));
    // Progress survives the disconnect.
    assert_eq!(engine.step(), WorkflowStep::AwaitingFeedbackAuth);
    assert!(engine.state().agent.is_some());

    engine.on_connect(WALLET);
    run_step(&mut engine, WorkflowStep::AwaitingFeedbackAuth).await;
    assert_eq!(engine.step(), WorkflowStep::AwaitingValidation);
}

#[tokio::test]
async fn restart_clears_outcomes_and_keeps_session() {
    let gateway = Arc::new(MockGateway::new());
    let mut engine = engine_with(gateway);
    engine.on_connect(WALLET);

    run_step(&mut engine, WorkflowStep::Registering).await;

    // Restart is rejected mid-flow.
    assert!(matches!(
        engine.restart().unwrap_err(),
        WorkflowError::RestartUnavailable
    ));

    run_step(&mut engine, WorkflowStep::AwaitingFeedbackAuth).await;
    run_step(&mut engine, WorkflowStep::AwaitingValidation).await;
    assert_eq!(engine.step(), WorkflowStep::Complete);

    engine.restart().unwrap();
    assert_eq!(engine.step(), WorkflowStep::Registering);
    assert!(engine.state().agent.is_none());
    assert!(engine.state().feedback.is_none());
    assert!(engine.state().validation.is_none());
    assert!(engine.session().can_act());
    assert_eq!(engine.tracker().phase(), TxPhase::Idle);
}

#[tokio::test]
async fn second_run_needs_fresh_inputs() {
    let gateway = Arc::new(MockGateway::new());
    let mut engine = engine_with(gateway);
    engine.on_connect(WALLET);

    run_step(&mut engine, WorkflowStep::Registering).await;
    run_step(&mut engine, WorkflowStep::AwaitingFeedbackAuth).await;
    run_step(&mut engine, WorkflowStep::AwaitingValidation).await;
    engine.restart().unwrap();

    // Same domain again: the registry rejects the dry-run, nothing advances.
    assert_eq!(
        engine.prepare(WorkflowStep::Registering).await.unwrap(),
        TxPhase::Failed
    );
    assert_eq!(
        engine.tracker().failure().unwrap().kind,
        FailureKind::Simulation
    );

    engine.reset_attempt().unwrap();
    engine.inputs_mut().domain = "agent2.example.com".to_string();
    run_step(&mut engine, WorkflowStep::Registering).await;
    assert_eq!(engine.state().agent.as_ref().unwrap().agent_id, 2);
}

#[tokio::test]
async fn prepare_twice_is_idempotent_while_ready() {
    let gateway = Arc::new(MockGateway::new());
    let mut engine = engine_with(gateway);
    engine.on_connect(WALLET);

    assert_eq!(
        engine.prepare(WorkflowStep::Registering).await.unwrap(),
        TxPhase::ReadyToSubmit
    );
    assert_eq!(
        engine.prepare(WorkflowStep::Registering).await.unwrap(),
        TxPhase::ReadyToSubmit
    );
    assert_eq!(engine.tracker().attempt(), 1);
}
