//! Flow run and flow run entry model definitions.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{AggregateStatus, FlowRunStatus, TestStep};
use crate::execution::ExecutionState;

/// A named execution session grouping selected test cases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowRun {
    pub id: u64,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: FlowRunStatus,

    /// Planned or actual start of the run
    pub start_date: Option<Timestamp>,

    /// Planned or actual end of the run
    pub end_date: Option<Timestamp>,

    #[serde(default)]
    pub labels: Vec<String>,

    /// Tester responsible for the run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,

    /// Test cases in the run (lazy-loaded by list queries)
    #[serde(default)]
    pub entries: Vec<FlowRunEntry>,
}

impl FlowRun {
    /// Human-facing identifier, e.g. `FR-7`.
    pub fn display_id(&self) -> String {
        format!("FR-{}", self.id)
    }
}

/// One test case inside a flow run.
///
/// Holds a snapshot of the case's steps taken when the case was added; the
/// run records results against this copy, never against the canonical case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowRunEntry {
    pub id: u64,

    pub flow_run_id: u64,

    /// Source test case (may no longer exist)
    pub test_case_id: u64,

    /// Title of the test case when it was added
    pub title: String,

    #[serde(default)]
    pub status: AggregateStatus,

    /// Overall notes about this execution
    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub steps: Vec<TestStep>,

    /// Step the tester is on, if a session exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<u32>,

    #[serde(default)]
    pub is_running: bool,

    /// The last session ended with a final outcome and was not left since
    #[serde(default)]
    pub is_finished: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_by: Option<String>,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,
}

impl FlowRunEntry {
    /// Human-facing identifier of the source case.
    pub fn case_display_id(&self) -> String {
        format!("TC-{}", self.test_case_id)
    }

    /// Snapshot of the entry's execution session for the engine.
    pub fn execution_state(&self) -> ExecutionState {
        ExecutionState {
            steps: self.steps.clone(),
            current_step: self.current_step.map(|i| i as usize),
            is_running: self.is_running,
            is_finished: self.is_finished,
        }
    }
}
