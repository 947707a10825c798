//! Guided execution of flow run entries.
//!
//! Every method loads the entry, runs the engine and stores the outcome in a
//! single transaction. Rejected commands return
//! [`TrackerError::Execution`](crate::TrackerError::Execution) and leave the
//! entry as it was.

use log::debug;

use super::Tracker;
use crate::{
    error::Result,
    execution::{ExecutionCommand, ExecutionReport, StepResult},
    models::TestCase,
    params::{EntryId, RecordStep, StartExecution},
};

impl Tracker {
    async fn execute(&self, entry_id: u64, command: ExecutionCommand) -> Result<ExecutionReport> {
        let name = command.name();
        let report = self
            .with_database(move |db| db.execute_command(entry_id, &command))
            .await?;
        debug!(
            "Execution {name} on entry {entry_id} stored, status {}",
            report.entry.status
        );
        Ok(report)
    }

    /// Starts a fresh session on an entry: all steps back to `pending`,
    /// positioned on the first step.
    pub async fn start_execution(&self, params: &StartExecution) -> Result<ExecutionReport> {
        self.execute(
            params.entry_id,
            ExecutionCommand::Start {
                executed_by: params.executed_by.clone(),
            },
        )
        .await
    }

    /// Records the result of the current step.
    pub async fn record_step_result(&self, params: &RecordStep) -> Result<ExecutionReport> {
        let result = StepResult {
            status: params.status,
            actual_result: params.actual_result.clone(),
            comments: params.comments.clone(),
        };
        self.execute(
            params.entry_id,
            ExecutionCommand::Record {
                step_index: params.step_index,
                result,
            },
        )
        .await
    }

    /// Pauses a running session, keeping its position.
    pub async fn pause_execution(&self, params: &EntryId) -> Result<ExecutionReport> {
        self.execute(params.entry_id, ExecutionCommand::Pause).await
    }

    /// Resumes a session at its first pending step.
    pub async fn resume_execution(&self, params: &EntryId) -> Result<ExecutionReport> {
        self.execute(params.entry_id, ExecutionCommand::Resume).await
    }

    /// Leaves a session. An interrupted session is stored as `pending`.
    pub async fn exit_execution(&self, params: &EntryId) -> Result<ExecutionReport> {
        self.execute(params.entry_id, ExecutionCommand::Exit).await
    }

    /// Writes an executed entry's step results and status back to its
    /// source test case.
    pub async fn apply_entry(&self, params: &EntryId) -> Result<TestCase> {
        let entry_id = params.entry_id;
        let case = self
            .with_database(move |db| db.apply_entry_to_case(entry_id))
            .await?;
        debug!("Applied entry {entry_id} to {}", case.display_id());
        Ok(case)
    }
}
