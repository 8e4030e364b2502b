//! Transaction lifecycle tracking for one outstanding write operation.
//!
//! The tracker is a passive state object: the workflow engine drives it
//! through guarded transitions and attaches the outcome (extracted output
//! or failure) to the attempt that produced it. It never retries on its
//! own; a failed attempt only leaves `Failed` through an explicit reset,
//! since remote write operations are not idempotent.

use alloy_primitives::B256;
use common::TxHash;
use serde::Serialize;
use thiserror::Error;

/// Lifecycle phase of a single write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TxPhase {
    /// No operation started.
    #[default]
    Idle,
    /// Dry-run in flight.
    Simulating,
    /// Dry-run succeeded; awaiting the caller's submit trigger.
    ReadyToSubmit,
    /// Broadcast sent to the network.
    Submitted,
    /// Accepted into the pending pool; awaiting finality.
    Pending,
    /// Finality reached, output extracted.
    Confirmed,
    /// Attempt failed; requires an explicit reset before retrying.
    Failed,
}

/// Error classification for a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// Caller input failed local constraints before any remote call.
    Validation,
    /// The remote dry-run predicted a revert.
    Simulation,
    /// Included on-chain but reverted.
    Execution,
    /// Confirmation not observed within the bounded wait.
    Timeout,
    /// Wallet or network unreachable.
    Connection,
}

/// The failure attached to an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Identifier extracted from a confirmation receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepOutput {
    AgentId(u64),
    FeedbackAuthId(B256),
    DataHash(B256),
}

/// Invalid lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid tracker transition: cannot {action} from {from:?}")]
pub struct InvalidTransition {
    pub from: TxPhase,
    pub action: &'static str,
}

/// Tracks one write operation from dry-run to finality.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TxTracker {
    phase: TxPhase,
    tx_hash: Option<TxHash>,
    output: Option<StepOutput>,
    failure: Option<StepFailure>,
    attempt: u32,
}

impl TxTracker {
    pub fn phase(&self) -> TxPhase {
        self.phase
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        self.tx_hash
    }

    pub fn output(&self) -> Option<&StepOutput> {
        self.output.as_ref()
    }

    pub fn failure(&self) -> Option<&StepFailure> {
        self.failure.as_ref()
    }

    /// Attempts started since the last full reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// True while an attempt is between dry-run and finality.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self.phase,
            TxPhase::Simulating | TxPhase::ReadyToSubmit | TxPhase::Submitted | TxPhase::Pending
        )
    }

    /// True once the transaction has been broadcast and cannot be abandoned.
    pub fn is_broadcast(&self) -> bool {
        matches!(self.phase, TxPhase::Submitted | TxPhase::Pending)
    }

    /// `Idle -> Simulating`. Starts a fresh attempt.
    pub fn begin_simulation(&mut self) -> Result<(), InvalidTransition> {
        self.guard(TxPhase::Idle, "begin simulation")?;
        self.phase = TxPhase::Simulating;
        self.attempt += 1;
        Ok(())
    }

    /// `Simulating -> ReadyToSubmit`.
    pub fn simulation_succeeded(&mut self) -> Result<(), InvalidTransition> {
        self.guard(TxPhase::Simulating, "complete simulation")?;
        self.phase = TxPhase::ReadyToSubmit;
        Ok(())
    }

    /// `ReadyToSubmit -> Submitted`. Valid exactly once per attempt.
    pub fn mark_submitted(&mut self, tx_hash: TxHash) -> Result<(), InvalidTransition> {
        self.guard(TxPhase::ReadyToSubmit, "submit")?;
        self.phase = TxPhase::Submitted;
        self.tx_hash = Some(tx_hash);
        Ok(())
    }

    /// `Submitted -> Pending`. The network accepted the broadcast.
    pub fn mark_pending(&mut self) -> Result<(), InvalidTransition> {
        self.guard(TxPhase::Submitted, "mark pending")?;
        self.phase = TxPhase::Pending;
        Ok(())
    }

    /// `Pending -> Confirmed`, attaching the extracted output.
    pub fn confirm(&mut self, output: StepOutput) -> Result<(), InvalidTransition> {
        self.guard(TxPhase::Pending, "confirm")?;
        self.phase = TxPhase::Confirmed;
        self.output = Some(output);
        Ok(())
    }

    /// Transition to `Failed`, recording the failure on this attempt.
    ///
    /// Valid from any in-flight phase; `Idle`, `Confirmed` and `Failed`
    /// attempts have nothing left to fail.
    pub fn fail(&mut self, kind: FailureKind, message: impl Into<String>) -> Result<(), InvalidTransition> {
        if !self.is_in_flight() {
            return Err(InvalidTransition {
                from: self.phase,
                action: "fail",
            });
        }
        self.phase = TxPhase::Failed;
        self.failure = Some(StepFailure {
            kind,
            message: message.into(),
        });
        Ok(())
    }

    /// Abandon the current attempt and return to `Idle`.
    ///
    /// Rejected once broadcast: a submitted transaction cannot be
    /// withdrawn. Discarding a `Simulating`/`ReadyToSubmit`/`Failed`
    /// attempt has no remote side effect.
    pub fn reset(&mut self) -> Result<(), InvalidTransition> {
        if self.is_broadcast() {
            return Err(InvalidTransition {
                from: self.phase,
                action: "reset",
            });
        }
        let attempt = self.attempt;
        *self = TxTracker::default();
        self.attempt = attempt;
        Ok(())
    }

    fn guard(&self, expected: TxPhase, action: &'static str) -> Result<(), InvalidTransition> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(InvalidTransition {
                from: self.phase,
                action,
            })
        }
    }
}
