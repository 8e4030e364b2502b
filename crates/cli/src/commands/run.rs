//! Full workflow run: register, authorize feedback, request validation.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{bail, Result};
use registries::RegistryGateway;
use workflow::{StepInputs, TxPhase, WorkflowEngine, WorkflowStep};

/// Drive the three registry writes in order, stopping at the first attempt
/// that does not confirm.
pub async fn run_workflow(
    gateway: Arc<dyn RegistryGateway>,
    account: Address,
    inputs: StepInputs,
    confirmation_timeout_secs: u64,
) -> Result<()> {
    let mut engine = WorkflowEngine::new(gateway)
        .with_inputs(inputs)
        .with_confirmation_timeout(Duration::from_secs(confirmation_timeout_secs));

    engine.on_connect(account);

    println!("Trust Workflow");
    println!("==============");
    println!("  Account:    {account}");
    println!("  Domain:     {}", engine.inputs().domain);
    println!("  Data hash:  {}", engine.inputs().data_hash);

    for (label, step) in [
        ("Register agent", WorkflowStep::Registering),
        ("Authorize feedback", WorkflowStep::AwaitingFeedbackAuth),
        ("Request validation", WorkflowStep::AwaitingValidation),
    ] {
        drive_step(&mut engine, label, step).await?;
    }

    let state = engine.state();
    println!();
    println!("Workflow complete");
    println!("=================");
    if let Some(agent) = &state.agent {
        println!("  Agent id:         {}", agent.agent_id);
        println!("  Agent domain:     {}", agent.domain);
    }
    if let Some(auth) = &state.feedback {
        println!("  Feedback auth id: {}", auth.auth_id);
    }
    if let Some(validation) = &state.validation {
        println!("  Validation hash:  {}", validation.data_hash);
        println!("  Responded:        {}", validation.responded);
    }

    Ok(())
}

async fn drive_step(
    engine: &mut WorkflowEngine,
    label: &str,
    step: WorkflowStep,
) -> Result<()> {
    println!();
    println!("{label}...");

    if engine.prepare(step).await? == TxPhase::Failed {
        bail_with_failure(engine, label)?;
    }
    println!("  simulation ok");

    if engine.submit(step).await? != TxPhase::Confirmed {
        bail_with_failure(engine, label)?;
    }
    if let Some(tx_hash) = engine.tracker().tx_hash() {
        println!("  confirmed in {tx_hash}");
    }
    Ok(())
}

fn bail_with_failure(engine: &WorkflowEngine, label: &str) -> Result<()> {
    match engine.tracker().failure() {
        Some(failure) => bail!("{label} failed ({:?}): {}", failure.kind, failure.message),
        None => bail!("{label} failed in phase {:?}", engine.tracker().phase()),
    }
}
