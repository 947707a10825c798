//! Step execution engine: status rollup and guided step progression.
//!
//! The engine is a set of pure functions over an immutable
//! [`ExecutionState`]. Every operation validates its preconditions before
//! touching any step and returns a [`Transition`] describing the new state,
//! whether the session ended, and which aggregate status (if any) the caller
//! has to write back to the owning test case or flow run entry. Persisting
//! that result is the caller's job; nothing here performs I/O.
//!
//! ```text
//!            start                record(passed, not last)
//!   Idle ───────────▶ Running(i) ────────────────────────▶ Running(i+1)
//!    ▲                  │    ▲
//!    │ exit       pause │    │ resume
//!    │                  ▼    │
//!    └──────────────── Paused(i)
//!
//!   Running(i) ── record(failed | blocked | passed on last) ──▶ Terminal(agg)
//!   Terminal(agg) ── exit ──▶ Idle          Terminal(agg) ── start ──▶ Running(0)
//! ```
//!
//! # Examples
//!
//! ```rust
//! use flowcase_core::{
//!     execution::{self, ExecutionState, StepResult},
//!     models::{AggregateStatus, StepStatus, TestStep},
//! };
//!
//! let steps = vec![
//!     TestStep::pending(0, "Open login page", "Form is shown"),
//!     TestStep::pending(1, "Submit credentials", "Dashboard is shown"),
//! ];
//!
//! let started = execution::start_execution(&ExecutionState::new(steps))?;
//! assert_eq!(started.state.current_step, Some(0));
//!
//! let next = execution::record_step_result(&started.state, 0, StepResult::new(StepStatus::Passed))?;
//! assert!(!next.terminal);
//!
//! let done = execution::record_step_result(&next.state, 1, StepResult::new(StepStatus::Failed))?;
//! assert!(done.terminal);
//! assert_eq!(done.persist, Some(AggregateStatus::Failed));
//! # Ok::<(), flowcase_core::execution::ExecutionError>(())
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AggregateStatus, FlowRunEntry, StepStatus, TestStep};

#[cfg(test)]
mod tests;

/// Rejected engine operations. A rejected operation never mutates state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// A result was submitted for a step other than the current one
    #[error(
        "Step index {actual} does not match the current step ({})",
        .expected.map_or_else(|| "none".to_string(), |i| i.to_string())
    )]
    InvalidStepIndex {
        expected: Option<usize>,
        actual: usize,
    },
    /// The operation needs a running session
    #[error("No execution is running")]
    NotRunning,
    /// The operation needs a stopped session
    #[error("Execution is already running")]
    AlreadyRunning,
    /// Every step already has a final status
    #[error("Nothing to resume: no pending step remains")]
    NothingToResume,
    /// There is nothing to execute
    #[error("Cannot execute a test without steps")]
    NoSteps,
}

/// Result submitted for the current step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub status: StepStatus,
    /// What actually happened; keeps the previous value when `None`
    pub actual_result: Option<String>,
    /// Tester comments; keeps the previous value when `None`
    pub comments: Option<String>,
}

impl StepResult {
    pub fn new(status: StepStatus) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_actual_result(mut self, actual_result: impl Into<String>) -> Self {
        self.actual_result = Some(actual_result.into());
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }
}

/// Where a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionPhase {
    /// No session in progress and no final outcome
    Idle,
    /// Guided execution at the given step
    Running(usize),
    /// Session stopped at the given step, progress kept
    Paused(usize),
    /// Session finished with the given outcome
    Terminal(AggregateStatus),
}

/// Steps plus the position of a guided execution session.
///
/// Invariant: `current_step` is `None` or an index into `steps`,
/// `is_running` implies `current_step.is_some()`, and `is_finished` implies
/// neither running nor positioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionState {
    pub steps: Vec<TestStep>,
    pub current_step: Option<usize>,
    pub is_running: bool,
    /// Set by the step result that ended the session, cleared by anything
    /// that leaves the terminal phase (start, resume, exit).
    #[serde(default)]
    pub is_finished: bool,
}

impl ExecutionState {
    /// An idle session over `steps`.
    pub fn new(steps: Vec<TestStep>) -> Self {
        Self {
            steps,
            current_step: None,
            is_running: false,
            is_finished: false,
        }
    }

    /// Rolled-up status of the steps.
    pub fn aggregate(&self) -> AggregateStatus {
        aggregate_status(&self.steps)
    }

    /// Current phase. `Terminal` lasts until the session is left again, so
    /// exiting a finished session reports `Idle` while keeping its results.
    pub fn phase(&self) -> ExecutionPhase {
        match (self.is_running, self.current_step) {
            (true, Some(index)) => ExecutionPhase::Running(index),
            (false, Some(index)) => ExecutionPhase::Paused(index),
            (_, None) if self.is_finished => ExecutionPhase::Terminal(self.aggregate()),
            (_, None) => ExecutionPhase::Idle,
        }
    }

    /// A session that just ended with a final outcome.
    fn finished(steps: Vec<TestStep>) -> Self {
        Self {
            is_finished: true,
            ..Self::new(steps)
        }
    }
}

/// Outcome of an engine operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// State after the operation
    pub state: ExecutionState,
    /// Aggregate status the caller must store on the owning record
    pub persist: Option<AggregateStatus>,
    /// Whether the session ended with a final outcome
    pub terminal: bool,
}

impl Transition {
    fn ongoing(state: ExecutionState, persist: Option<AggregateStatus>) -> Self {
        Self {
            state,
            persist,
            terminal: false,
        }
    }
}

/// An engine operation, as requested by a tester.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionCommand {
    Start { executed_by: Option<String> },
    Record { step_index: usize, result: StepResult },
    Pause,
    Resume,
    Exit,
}

impl ExecutionCommand {
    /// Run the matching engine operation against `state`.
    pub fn apply(&self, state: &ExecutionState) -> Result<Transition, ExecutionError> {
        match self {
            ExecutionCommand::Start { .. } => start_execution(state),
            ExecutionCommand::Record { step_index, result } => {
                record_step_result(state, *step_index, result.clone())
            }
            ExecutionCommand::Pause => pause_execution(state),
            ExecutionCommand::Resume => resume_execution(state),
            ExecutionCommand::Exit => Ok(exit_execution(state)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExecutionCommand::Start { .. } => "start",
            ExecutionCommand::Record { .. } => "record",
            ExecutionCommand::Pause => "pause",
            ExecutionCommand::Resume => "resume",
            ExecutionCommand::Exit => "exit",
        }
    }
}

/// Stored result of an execution command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// The entry as persisted after the command
    pub entry: FlowRunEntry,
    /// Whether the command finished the session
    pub terminal: bool,
    /// Rolled-up status of the entry's steps
    pub aggregate: AggregateStatus,
}

/// Rolls step statuses up into one status.
///
/// Precedence, first match wins: every step passed → `passed`; any step
/// blocked → `blocked`; any step failed → `failed`; otherwise `pending`.
/// A blocked step outranks a failure because it means the case could not be
/// evaluated at all. An empty list has never run and yields `no_run`.
pub fn aggregate_status(steps: &[TestStep]) -> AggregateStatus {
    if steps.is_empty() {
        AggregateStatus::NoRun
    } else if steps.iter().all(|s| s.status == StepStatus::Passed) {
        AggregateStatus::Passed
    } else if steps.iter().any(|s| s.status == StepStatus::Blocked) {
        AggregateStatus::Blocked
    } else if steps.iter().any(|s| s.status == StepStatus::Failed) {
        AggregateStatus::Failed
    } else {
        AggregateStatus::Pending
    }
}

/// Starts a fresh session: every step back to `pending` with an empty actual
/// result, positioned on the first step.
pub fn start_execution(state: &ExecutionState) -> Result<Transition, ExecutionError> {
    if state.is_running {
        return Err(ExecutionError::AlreadyRunning);
    }
    if state.steps.is_empty() {
        return Err(ExecutionError::NoSteps);
    }

    let steps = state
        .steps
        .iter()
        .cloned()
        .map(|mut step| {
            step.status = StepStatus::Pending;
            step.actual_result.clear();
            step.executed_at = None;
            step
        })
        .collect();

    Ok(Transition::ongoing(
        ExecutionState {
            steps,
            current_step: Some(0),
            is_running: true,
            is_finished: false,
        },
        Some(AggregateStatus::Pending),
    ))
}

/// Records the result of the current step and advances the session.
///
/// A `passed` step moves to the next one, or ends the session on the last
/// step. `failed` and `blocked` end the session immediately. `pending` only
/// saves the provided result and comments.
pub fn record_step_result(
    state: &ExecutionState,
    step_index: usize,
    result: StepResult,
) -> Result<Transition, ExecutionError> {
    if !state.is_running {
        return Err(ExecutionError::NotRunning);
    }
    if state.current_step != Some(step_index) || step_index >= state.steps.len() {
        return Err(ExecutionError::InvalidStepIndex {
            expected: state.current_step,
            actual: step_index,
        });
    }

    let mut steps = state.steps.clone();
    let step = &mut steps[step_index];
    step.status = result.status;
    if let Some(actual) = result.actual_result {
        step.actual_result = actual;
    }
    if let Some(comments) = result.comments {
        step.comments = Some(comments);
    }

    let is_last = step_index + 1 == steps.len();
    let transition = match result.status {
        StepStatus::Pending => Transition::ongoing(
            ExecutionState {
                steps,
                current_step: Some(step_index),
                is_running: true,
                is_finished: false,
            },
            None,
        ),
        StepStatus::Passed if !is_last => Transition::ongoing(
            ExecutionState {
                steps,
                current_step: Some(step_index + 1),
                is_running: true,
                is_finished: false,
            },
            None,
        ),
        StepStatus::Passed | StepStatus::Failed | StepStatus::Blocked => {
            let aggregate = aggregate_status(&steps);
            Transition {
                state: ExecutionState::finished(steps),
                persist: Some(aggregate),
                terminal: true,
            }
        }
    };

    Ok(transition)
}

/// Stops a running session without losing its position or results.
pub fn pause_execution(state: &ExecutionState) -> Result<Transition, ExecutionError> {
    if !state.is_running {
        return Err(ExecutionError::NotRunning);
    }

    Ok(Transition::ongoing(
        ExecutionState {
            steps: state.steps.clone(),
            current_step: state.current_step,
            is_running: false,
            is_finished: false,
        },
        Some(AggregateStatus::Pending),
    ))
}

/// Continues a stopped session at the first pending step.
///
/// When every step already has a final status there is nothing to resume and
/// the operation is rejected. A resumed session is stored as `pending`, the
/// same as a started one.
pub fn resume_execution(state: &ExecutionState) -> Result<Transition, ExecutionError> {
    if state.is_running {
        return Err(ExecutionError::AlreadyRunning);
    }
    if state.steps.is_empty() {
        return Err(ExecutionError::NoSteps);
    }

    let index = state
        .steps
        .iter()
        .position(|step| step.status == StepStatus::Pending)
        .ok_or(ExecutionError::NothingToResume)?;

    Ok(Transition::ongoing(
        ExecutionState {
            steps: state.steps.clone(),
            current_step: Some(index),
            is_running: true,
            is_finished: false,
        },
        Some(AggregateStatus::Pending),
    ))
}

/// Leaves the session, keeping step data. An interrupted run is stored as
/// `pending` so it can be resumed later; a finished one keeps its outcome.
pub fn exit_execution(state: &ExecutionState) -> Transition {
    let persist = state.is_running.then_some(AggregateStatus::Pending);
    Transition::ongoing(ExecutionState::new(state.steps.clone()), persist)
}
