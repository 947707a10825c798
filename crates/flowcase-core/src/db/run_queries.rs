//! Flow run CRUD operations and test case snapshots.

use std::cmp::Reverse;

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    case_queries::load_test_case,
    suite_queries::load_suite,
    utils::{
        get_enum, get_id, get_optional_timestamp, get_string_list, get_timestamp, load_steps,
        timestamp_text, to_json_list,
    },
};
use crate::{
    error::{DatabaseResultExt, Result, TrackerError},
    models::{AggregateStatus, FlowRun, FlowRunEntry, FlowRunFilter},
    params::{CreateFlowRun, UpdateFlowRun},
};

const RUN_COLUMNS: &str = "id, title, description, status, start_date, end_date, labels, assigned_to, created_at, updated_at";
const ENTRY_COLUMNS: &str = "id, flow_run_id, test_case_id, title, status, notes, current_step, is_running, start_time, end_time, executed_by, created_at, updated_at, is_finished";
const INSERT_RUN_SQL: &str = "INSERT INTO flow_runs (title, description, status, start_date, end_date, labels, assigned_to, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";
const UPDATE_RUN_SQL: &str = "UPDATE flow_runs SET title = ?1, description = ?2, status = ?3, start_date = ?4, end_date = ?5, labels = ?6, assigned_to = ?7, updated_at = ?8 WHERE id = ?9";
const TOUCH_RUN_SQL: &str = "UPDATE flow_runs SET updated_at = ?1 WHERE id = ?2";
const DELETE_RUN_SQL: &str = "DELETE FROM flow_runs WHERE id = ?1";
const SELECT_ENTRY_ID_SQL: &str =
    "SELECT id FROM flow_run_entries WHERE flow_run_id = ?1 AND test_case_id = ?2";
const INSERT_ENTRY_SQL: &str = "INSERT INTO flow_run_entries (flow_run_id, test_case_id, title, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const RESET_ENTRY_SQL: &str = "UPDATE flow_run_entries SET title = ?1, status = ?2, current_step = NULL, is_running = 0, is_finished = 0, start_time = NULL, end_time = NULL, executed_by = NULL, updated_at = ?3 WHERE id = ?4";
const DELETE_ENTRY_STEPS_SQL: &str = "DELETE FROM run_steps WHERE entry_id = ?1";
const INSERT_RUN_STEP_SQL: &str = "INSERT INTO run_steps (entry_id, step_order, description, expected_result, attachments) VALUES (?1, ?2, ?3, ?4, ?5)";
const DELETE_ENTRY_SQL: &str = "DELETE FROM flow_run_entries WHERE id = ?1";
const UPDATE_ENTRY_NOTES_SQL: &str =
    "UPDATE flow_run_entries SET notes = ?1, updated_at = ?2 WHERE id = ?3";

fn build_run_from_row(row: &rusqlite::Row) -> rusqlite::Result<FlowRun> {
    Ok(FlowRun {
        id: get_id(row, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: get_enum(row, 3)?,
        start_date: get_optional_timestamp(row, 4)?,
        end_date: get_optional_timestamp(row, 5)?,
        labels: get_string_list(row, 6)?,
        assigned_to: row.get(7)?,
        created_at: get_timestamp(row, 8)?,
        updated_at: get_timestamp(row, 9)?,
        entries: Vec::new(),
    })
}

fn build_entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<FlowRunEntry> {
    Ok(FlowRunEntry {
        id: get_id(row, 0)?,
        flow_run_id: get_id(row, 1)?,
        test_case_id: get_id(row, 2)?,
        title: row.get(3)?,
        status: get_enum(row, 4)?,
        notes: row.get(5)?,
        current_step: row.get::<_, Option<i64>>(6)?.map(|i| i as u32),
        is_running: row.get(7)?,
        start_time: get_optional_timestamp(row, 8)?,
        end_time: get_optional_timestamp(row, 9)?,
        executed_by: row.get(10)?,
        created_at: get_timestamp(row, 11)?,
        updated_at: get_timestamp(row, 12)?,
        is_finished: row.get(13)?,
        steps: Vec::new(),
    })
}

/// Load one entry with its step snapshot.
pub(crate) fn load_entry(conn: &Connection, id: u64) -> Result<Option<FlowRunEntry>> {
    let entry = conn
        .query_row(
            &format!("SELECT {ENTRY_COLUMNS} FROM flow_run_entries WHERE id = ?1"),
            params![id as i64],
            build_entry_from_row,
        )
        .optional()
        .db_context("Failed to query flow run entry")?;

    match entry {
        Some(mut entry) => {
            entry.steps = load_steps(conn, "run_steps", "entry_id", entry.id)?;
            Ok(Some(entry))
        }
        None => Ok(None),
    }
}

fn load_entries(conn: &Connection, run_id: u64, with_steps: bool) -> Result<Vec<FlowRunEntry>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM flow_run_entries WHERE flow_run_id = ?1 ORDER BY id"
        ))
        .db_context("Failed to prepare query")?;

    let mut entries = stmt
        .query_map(params![run_id as i64], build_entry_from_row)
        .db_context("Failed to query flow run entries")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .db_context("Failed to read flow run entries")?;

    if with_steps {
        for entry in &mut entries {
            entry.steps = load_steps(conn, "run_steps", "entry_id", entry.id)?;
        }
    }

    Ok(entries)
}

fn load_flow_run(conn: &Connection, id: u64) -> Result<Option<FlowRun>> {
    let run = conn
        .query_row(
            &format!("SELECT {RUN_COLUMNS} FROM flow_runs WHERE id = ?1"),
            params![id as i64],
            build_run_from_row,
        )
        .optional()
        .db_context("Failed to query flow run")?;

    match run {
        Some(mut run) => {
            run.entries = load_entries(conn, run.id, true)?;
            Ok(Some(run))
        }
        None => Ok(None),
    }
}

fn require_flow_run(conn: &Connection, id: u64) -> Result<()> {
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM flow_runs WHERE id = ?1)",
            params![id as i64],
            |row| row.get(0),
        )
        .db_context("Failed to check flow run existence")?;

    if exists {
        Ok(())
    } else {
        Err(TrackerError::FlowRunNotFound { id })
    }
}

/// Copy a test case and its steps into a flow run. A case already in the run
/// gets a fresh snapshot in its existing entry.
fn snapshot_case(conn: &Connection, run_id: u64, test_case_id: u64, now: &str) -> Result<u64> {
    let case = load_test_case(conn, test_case_id)?
        .ok_or(TrackerError::TestCaseNotFound { id: test_case_id })?;

    let existing: Option<i64> = conn
        .query_row(
            SELECT_ENTRY_ID_SQL,
            params![run_id as i64, test_case_id as i64],
            |row| row.get(0),
        )
        .optional()
        .db_context("Failed to query flow run entry")?;

    let entry_id = match existing {
        Some(id) => {
            conn.execute(
                RESET_ENTRY_SQL,
                params![case.title, AggregateStatus::NoRun.as_str(), now, id],
            )
            .db_context("Failed to reset flow run entry")?;
            conn.execute(DELETE_ENTRY_STEPS_SQL, params![id])
                .db_context("Failed to delete entry steps")?;
            id as u64
        }
        None => {
            conn.execute(
                INSERT_ENTRY_SQL,
                params![
                    run_id as i64,
                    test_case_id as i64,
                    case.title,
                    AggregateStatus::NoRun.as_str(),
                    now,
                    now
                ],
            )
            .db_context("Failed to insert flow run entry")?;
            conn.last_insert_rowid() as u64
        }
    };

    let mut stmt = conn
        .prepare(INSERT_RUN_STEP_SQL)
        .db_context("Failed to prepare step insert")?;
    for step in &case.steps {
        stmt.execute(params![
            entry_id as i64,
            step.order as i64,
            step.description,
            step.expected_result,
            to_json_list(&step.attachments)?
        ])
        .db_context("Failed to copy step into flow run")?;
    }

    Ok(entry_id)
}

pub(crate) fn touch_flow_run(conn: &Connection, id: u64, now: &str) -> Result<()> {
    conn.execute(TOUCH_RUN_SQL, params![now, id as i64])
        .db_context("Failed to update flow run timestamp")?;
    Ok(())
}

impl super::Database {
    /// Creates a flow run and snapshots the listed test cases into it.
    pub fn create_flow_run(
        &mut self,
        params: &CreateFlowRun,
        start_date: Option<Timestamp>,
        end_date: Option<Timestamp>,
    ) -> Result<FlowRun> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now().to_string();
        tx.execute(
            INSERT_RUN_SQL,
            params![
                params.title.trim(),
                params.description,
                params.status.unwrap_or_default().as_str(),
                timestamp_text(start_date),
                timestamp_text(end_date),
                to_json_list(&params.labels)?,
                params.assigned_to,
                &now,
                &now
            ],
        )
        .db_context("Failed to insert flow run")?;

        let id = tx.last_insert_rowid() as u64;
        for case_id in &params.test_cases {
            snapshot_case(&tx, id, *case_id, &now)?;
        }

        let run = load_flow_run(&tx, id)?.ok_or(TrackerError::FlowRunNotFound { id })?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(run)
    }

    /// Retrieves a flow run with every entry and its steps.
    pub fn get_flow_run(&self, id: u64) -> Result<Option<FlowRun>> {
        load_flow_run(&self.connection, id)
    }

    /// Lists flow runs matching `filter`, newest start date first.
    ///
    /// Entries are loaded without their steps.
    pub fn list_flow_runs(&self, filter: &FlowRunFilter) -> Result<Vec<FlowRun>> {
        let mut query = format!("SELECT {RUN_COLUMNS} FROM flow_runs");
        let status = filter.status.map(|s| s.as_str());
        let mut params_vec: Vec<&dyn rusqlite::ToSql> = Vec::new();

        if let Some(ref status) = status {
            query.push_str(" WHERE status = ?");
            params_vec.push(status);
        }

        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let runs = stmt
            .query_map(&params_vec[..], build_run_from_row)
            .db_context("Failed to query flow runs")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read flow runs")?;

        let mut runs = filter.apply(runs);
        // Stored dates have a variable number of fractional digits, so their
        // text does not sort chronologically.
        runs.sort_by_key(|run| {
            (
                run.start_date.is_none(),
                Reverse(run.start_date),
                Reverse(run.id),
            )
        });
        for run in &mut runs {
            run.entries = load_entries(&self.connection, run.id, false)?;
        }

        Ok(runs)
    }

    /// Updates the given fields of a flow run. Returns `None` if it does not
    /// exist.
    pub fn update_flow_run(
        &mut self,
        params: &UpdateFlowRun,
        start_date: Option<Timestamp>,
        end_date: Option<Timestamp>,
    ) -> Result<Option<FlowRun>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let Some(existing) = load_flow_run(&tx, params.id)? else {
            return Ok(None);
        };

        let start_date = start_date.or(existing.start_date);
        let end_date = end_date.or(existing.end_date);
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                return Err(TrackerError::invalid_input("end_date")
                    .with_reason("End date must not be before the start date"));
            }
        }

        let now = Timestamp::now().to_string();
        tx.execute(
            UPDATE_RUN_SQL,
            params![
                params.title.as_deref().map(str::trim).unwrap_or(&existing.title),
                params.description.as_deref().unwrap_or(&existing.description),
                params.status.unwrap_or(existing.status).as_str(),
                timestamp_text(start_date),
                timestamp_text(end_date),
                to_json_list(params.labels.as_ref().unwrap_or(&existing.labels))?,
                params.assigned_to.as_ref().or(existing.assigned_to.as_ref()),
                &now,
                params.id as i64
            ],
        )
        .db_context("Failed to update flow run")?;

        let run = load_flow_run(&tx, params.id)?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(run)
    }

    /// Deletes a flow run and all of its entries.
    pub fn delete_flow_run(&mut self, id: u64) -> Result<Option<FlowRun>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let Some(run) = load_flow_run(&tx, id)? else {
            return Ok(None);
        };

        tx.execute(DELETE_RUN_SQL, params![id as i64])
            .db_context("Failed to delete flow run")?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Some(run))
    }

    /// Snapshots a test case into a flow run with status `no_run`.
    pub fn add_case_to_flow_run(&mut self, run_id: u64, test_case_id: u64) -> Result<FlowRunEntry> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        require_flow_run(&tx, run_id)?;
        let now = Timestamp::now().to_string();
        let entry_id = snapshot_case(&tx, run_id, test_case_id, &now)?;
        touch_flow_run(&tx, run_id, &now)?;

        let entry = load_entry(&tx, entry_id)?.ok_or(TrackerError::EntryNotFound { id: entry_id })?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(entry)
    }

    /// Snapshots every member of a suite into a flow run.
    pub fn add_suite_to_flow_run(&mut self, run_id: u64, suite_id: u64) -> Result<Vec<FlowRunEntry>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        require_flow_run(&tx, run_id)?;
        let suite = load_suite(&tx, suite_id)?.ok_or(TrackerError::SuiteNotFound { id: suite_id })?;

        let now = Timestamp::now().to_string();
        let mut entries = Vec::with_capacity(suite.test_cases.len());
        for case_id in &suite.test_cases {
            let entry_id = snapshot_case(&tx, run_id, *case_id, &now)?;
            let entry =
                load_entry(&tx, entry_id)?.ok_or(TrackerError::EntryNotFound { id: entry_id })?;
            entries.push(entry);
        }
        touch_flow_run(&tx, run_id, &now)?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(entries)
    }

    /// Removes a test case's entry from a flow run. Returns the removed entry,
    /// or `None` if the case was not part of the run.
    pub fn remove_case_from_flow_run(
        &mut self,
        run_id: u64,
        test_case_id: u64,
    ) -> Result<Option<FlowRunEntry>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        require_flow_run(&tx, run_id)?;
        let entry_id: Option<i64> = tx
            .query_row(
                SELECT_ENTRY_ID_SQL,
                params![run_id as i64, test_case_id as i64],
                |row| row.get(0),
            )
            .optional()
            .db_context("Failed to query flow run entry")?;

        let Some(entry_id) = entry_id else {
            return Ok(None);
        };

        let entry = load_entry(&tx, entry_id as u64)?;
        tx.execute(DELETE_ENTRY_SQL, params![entry_id])
            .db_context("Failed to delete flow run entry")?;
        touch_flow_run(&tx, run_id, &Timestamp::now().to_string())?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(entry)
    }

    /// Retrieves a flow run entry with its steps.
    pub fn get_entry(&self, id: u64) -> Result<Option<FlowRunEntry>> {
        load_entry(&self.connection, id)
    }

    /// Replaces the notes of a flow run entry.
    pub fn set_entry_notes(&mut self, id: u64, notes: &str) -> Result<Option<FlowRunEntry>> {
        let changed = self
            .connection
            .execute(
                UPDATE_ENTRY_NOTES_SQL,
                params![notes, Timestamp::now().to_string(), id as i64],
            )
            .db_context("Failed to update entry notes")?;

        if changed == 0 {
            return Ok(None);
        }
        self.get_entry(id)
    }
}
