//! Readiness verdicts derived from machine descriptions.
//!
//! This module is intentionally free of I/O and async. It takes a snapshot in
//! and returns a verdict out, so the decision table can be tested exhaustively
//! without a control plane.

use crate::machines::{CheckStatus, MachineDescription, MachineState};

/// The ternary readiness judgment for one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The machine is started and every gate it has is green.
    Ready,
    /// The machine's lifecycle state is anything but `started`.
    NotStarted { state: MachineState },
    /// The machine is started but its health gate has not cleared yet.
    Waiting { reason: WaitReason },
}

/// Why a started machine is not ready yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitReason {
    /// Checks are configured but the control plane has reported no results.
    /// Not the same as having no gate at all: the gate exists, it just has
    /// not been evaluated.
    NoCheckResults,
    /// At least one reported check is not `passing`.
    FailingChecks(Vec<FailingCheck>),
    /// The status query itself failed this round; used by the orchestrator,
    /// never produced by `evaluate`.
    StatusUnavailable,
}

/// A reported check that is holding readiness back, kept for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailingCheck {
    pub name: String,
    pub status: CheckStatus,
    pub output: String,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Ready => write!(f, "ready"),
            Verdict::NotStarted { state } => write!(f, "not started (state: {state})"),
            Verdict::Waiting { reason } => write!(f, "waiting ({reason})"),
        }
    }
}

impl std::fmt::Display for WaitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitReason::NoCheckResults => write!(f, "no health check results yet"),
            WaitReason::FailingChecks(checks) => {
                write!(f, "{} check(s) not passing:", checks.len())?;
                for check in checks {
                    write!(f, " {}={}", check.name, check.status)?;
                }
                Ok(())
            }
            WaitReason::StatusUnavailable => write!(f, "status query failed"),
        }
    }
}

/// Decide readiness from one machine snapshot.
///
/// Lifecycle state is necessary but not sufficient: a started machine with
/// configured checks is only ready once every reported check is passing.
/// A started machine with no configured checks has no gate and is ready
/// immediately.
pub fn evaluate(machine: &MachineDescription) -> Verdict {
    if machine.state != MachineState::Started {
        return Verdict::NotStarted {
            state: machine.state,
        };
    }

    if !machine.has_configured_checks() {
        return Verdict::Ready;
    }

    if machine.checks.is_empty() {
        return Verdict::Waiting {
            reason: WaitReason::NoCheckResults,
        };
    }

    let failing: Vec<FailingCheck> = machine
        .checks
        .iter()
        .filter(|check| check.status != CheckStatus::Passing)
        .map(|check| FailingCheck {
            name: check.name.clone(),
            status: check.status,
            output: check.output.clone(),
        })
        .collect();

    if failing.is_empty() {
        Verdict::Ready
    } else {
        Verdict::Waiting {
            reason: WaitReason::FailingChecks(failing),
        }
    }
}
