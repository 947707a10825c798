//! Persistence of guided execution sessions.
//!
//! An execution command loads the entry, runs the engine and writes the
//! resulting state back without releasing the transaction, so two testers
//! working on the same entry cannot interleave half-applied transitions.

use jiff::Timestamp;
use log::debug;
use rusqlite::params;

use super::{
    case_queries::{load_test_case, set_test_case_status},
    run_queries::{load_entry, touch_flow_run},
    utils::timestamp_text,
};
use crate::{
    error::{DatabaseResultExt, Result, TrackerError},
    execution::{aggregate_status, ExecutionCommand, ExecutionReport},
    models::{AggregateStatus, TestCase},
};

const UPDATE_RUN_STEP_SQL: &str = "UPDATE run_steps SET actual_result = ?1, status = ?2, comments = ?3, executed_at = CASE WHEN ?2 = 'pending' THEN NULL ELSE COALESCE(executed_at, ?4) END WHERE id = ?5 AND entry_id = ?6";
const UPDATE_ENTRY_SESSION_SQL: &str = "UPDATE flow_run_entries SET current_step = ?1, is_running = ?2, is_finished = ?3, status = ?4, updated_at = ?5 WHERE id = ?6";
const MARK_ENTRY_STARTED_SQL: &str = "UPDATE flow_run_entries SET start_time = ?1, end_time = NULL, executed_by = COALESCE(?2, executed_by) WHERE id = ?3";
const MARK_ENTRY_RESUMED_SQL: &str =
    "UPDATE flow_run_entries SET start_time = COALESCE(start_time, ?1) WHERE id = ?2";
const MARK_ENTRY_FINISHED_SQL: &str = "UPDATE flow_run_entries SET end_time = ?1 WHERE id = ?2";
const APPLY_CASE_STEP_SQL: &str = "UPDATE test_steps SET actual_result = ?1, status = ?2, comments = ?3, executed_at = ?4 WHERE id = ?5";

impl super::Database {
    /// Runs an execution command against a flow run entry and stores the
    /// outcome.
    ///
    /// Engine rejections surface as [`TrackerError::Execution`] and leave the
    /// stored entry untouched.
    pub fn execute_command(
        &mut self,
        entry_id: u64,
        command: &ExecutionCommand,
    ) -> Result<ExecutionReport> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let entry = load_entry(&tx, entry_id)?.ok_or(TrackerError::EntryNotFound { id: entry_id })?;
        let transition = command.apply(&entry.execution_state())?;

        debug!(
            "Execution {} on entry {}: current step {:?}, running {}, persist {:?}",
            command.name(),
            entry_id,
            transition.state.current_step,
            transition.state.is_running,
            transition.persist
        );

        let now = Timestamp::now().to_string();

        for step in &transition.state.steps {
            tx.execute(
                UPDATE_RUN_STEP_SQL,
                params![
                    step.actual_result,
                    step.status.as_str(),
                    step.comments,
                    &now,
                    step.id as i64,
                    entry_id as i64
                ],
            )
            .db_context("Failed to update run step")?;
        }

        let status = transition.persist.unwrap_or(entry.status);
        tx.execute(
            UPDATE_ENTRY_SESSION_SQL,
            params![
                transition.state.current_step.map(|i| i as i64),
                transition.state.is_running,
                transition.state.is_finished,
                status.as_str(),
                &now,
                entry_id as i64
            ],
        )
        .db_context("Failed to update execution session")?;

        if let ExecutionCommand::Start { executed_by } = command {
            tx.execute(
                MARK_ENTRY_STARTED_SQL,
                params![&now, executed_by, entry_id as i64],
            )
            .db_context("Failed to record execution start")?;
        }
        if let ExecutionCommand::Resume = command {
            tx.execute(MARK_ENTRY_RESUMED_SQL, params![&now, entry_id as i64])
                .db_context("Failed to record execution start")?;
        }
        if transition.terminal {
            tx.execute(MARK_ENTRY_FINISHED_SQL, params![&now, entry_id as i64])
                .db_context("Failed to record execution end")?;
        }

        touch_flow_run(&tx, entry.flow_run_id, &now)?;

        let entry = load_entry(&tx, entry_id)?.ok_or(TrackerError::EntryNotFound { id: entry_id })?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(ExecutionReport {
            aggregate: aggregate_status(&entry.steps),
            terminal: transition.terminal,
            entry,
        })
    }

    /// Copies an executed entry's step results and status onto its source
    /// test case, step by step in order.
    pub fn apply_entry_to_case(&mut self, entry_id: u64) -> Result<TestCase> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let entry = load_entry(&tx, entry_id)?.ok_or(TrackerError::EntryNotFound { id: entry_id })?;
        if entry.status == AggregateStatus::NoRun {
            return Err(TrackerError::invalid_input("entry_id")
                .with_reason(format!("Entry {entry_id} has not been executed yet")));
        }
        if entry.is_running {
            return Err(TrackerError::invalid_input("entry_id").with_reason(format!(
                "Entry {entry_id} is still running; pause or exit it first"
            )));
        }

        let case = load_test_case(&tx, entry.test_case_id)?.ok_or(TrackerError::TestCaseNotFound {
            id: entry.test_case_id,
        })?;
        if case.steps.len() != entry.steps.len() {
            return Err(TrackerError::invalid_input("entry_id").with_reason(format!(
                "{} has {} steps but the entry has {}; re-add the case to the run",
                case.display_id(),
                case.steps.len(),
                entry.steps.len()
            )));
        }

        for (canonical, executed) in case.steps.iter().zip(&entry.steps) {
            tx.execute(
                APPLY_CASE_STEP_SQL,
                params![
                    executed.actual_result,
                    executed.status.as_str(),
                    executed.comments,
                    timestamp_text(executed.executed_at),
                    canonical.id as i64
                ],
            )
            .db_context("Failed to apply step result")?;
        }

        set_test_case_status(&tx, case.id, entry.status, &Timestamp::now().to_string())?;

        let case = load_test_case(&tx, case.id)?.ok_or(TrackerError::TestCaseNotFound { id: case.id })?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(case)
    }
}
