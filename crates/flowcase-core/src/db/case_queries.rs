//! Test case and test step CRUD operations.

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};

use super::utils::{
    build_step_from_row, get_enum, get_id, get_string_list, get_timestamp, insert_case_steps,
    load_steps, timestamp_text, to_json_list, STEP_COLUMNS,
};
use crate::{
    error::{DatabaseResultExt, Result, TrackerError},
    execution::aggregate_status,
    models::{AggregateStatus, TestCase, TestCaseFilter, TestStep},
    params::{CreateTestCase, UpdateTestCase, UpdateTestStep},
};

const CASE_COLUMNS: &str =
    "id, title, description, status, priority, labels, created_at, updated_at";
const INSERT_CASE_SQL: &str = "INSERT INTO test_cases (title, description, status, priority, labels, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
const UPDATE_CASE_SQL: &str = "UPDATE test_cases SET title = ?1, description = ?2, priority = ?3, labels = ?4, updated_at = ?5 WHERE id = ?6";
const UPDATE_CASE_STATUS_SQL: &str =
    "UPDATE test_cases SET status = ?1, updated_at = ?2 WHERE id = ?3";
const CHECK_CASE_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM test_cases WHERE id = ?1)";
const DELETE_CASE_STEPS_SQL: &str = "DELETE FROM test_steps WHERE test_case_id = ?1";
const DELETE_CASE_SQL: &str = "DELETE FROM test_cases WHERE id = ?1";
const SELECT_STEP_OWNER_SQL: &str = "SELECT test_case_id FROM test_steps WHERE id = ?1";
const UPDATE_STEP_SQL: &str = "UPDATE test_steps SET description = ?1, expected_result = ?2, actual_result = ?3, status = ?4, comments = ?5, attachments = ?6, executed_at = ?7 WHERE id = ?8";

fn build_case_from_row(row: &rusqlite::Row) -> rusqlite::Result<TestCase> {
    Ok(TestCase {
        id: get_id(row, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: get_enum(row, 3)?,
        priority: get_enum(row, 4)?,
        labels: get_string_list(row, 5)?,
        created_at: get_timestamp(row, 6)?,
        updated_at: get_timestamp(row, 7)?,
        steps: Vec::new(),
    })
}

/// Load a test case with its steps through any connection or transaction.
pub(crate) fn load_test_case(conn: &Connection, id: u64) -> Result<Option<TestCase>> {
    let case = conn
        .query_row(
            &format!("SELECT {CASE_COLUMNS} FROM test_cases WHERE id = ?1"),
            params![id as i64],
            build_case_from_row,
        )
        .optional()
        .db_context("Failed to query test case")?;

    match case {
        Some(mut case) => {
            case.steps = load_steps(conn, "test_steps", "test_case_id", case.id)?;
            Ok(Some(case))
        }
        None => Ok(None),
    }
}

pub(crate) fn test_case_exists(conn: &Connection, id: u64) -> Result<bool> {
    conn.query_row(CHECK_CASE_EXISTS_SQL, params![id as i64], |row| row.get(0))
        .db_context("Failed to check test case existence")
}

pub(crate) fn set_test_case_status(
    conn: &Connection,
    id: u64,
    status: AggregateStatus,
    now: &str,
) -> Result<()> {
    conn.execute(
        UPDATE_CASE_STATUS_SQL,
        params![status.as_str(), now, id as i64],
    )
    .db_context("Failed to update test case status")?;
    Ok(())
}

impl super::Database {
    /// Creates a test case and its steps. The case starts as `no_run` with
    /// every step `pending`.
    pub fn create_test_case(&mut self, params: &CreateTestCase) -> Result<TestCase> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now().to_string();
        let labels = to_json_list(&params.labels)?;

        tx.execute(
            INSERT_CASE_SQL,
            params![
                params.title.trim(),
                params.description,
                AggregateStatus::NoRun.as_str(),
                params.priority.as_str(),
                labels,
                &now,
                &now
            ],
        )
        .db_context("Failed to insert test case")?;

        let id = tx.last_insert_rowid() as u64;
        insert_case_steps(&tx, id, &params.steps)?;

        let case = load_test_case(&tx, id)?.ok_or(TrackerError::TestCaseNotFound { id })?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(case)
    }

    /// Retrieves a test case and its steps by ID.
    pub fn get_test_case(&self, id: u64) -> Result<Option<TestCase>> {
        load_test_case(&self.connection, id)
    }

    /// Lists test cases matching `filter`, oldest first.
    ///
    /// Priority and status are filtered in SQL; free text and labels are
    /// matched in memory since labels are stored as JSON.
    pub fn list_test_cases(&self, filter: &TestCaseFilter) -> Result<Vec<TestCase>> {
        let mut query = format!("SELECT {CASE_COLUMNS} FROM test_cases");
        let mut conditions = Vec::new();
        let mut params_vec: Vec<&dyn rusqlite::ToSql> = Vec::new();

        let priority = filter.priority.map(|p| p.as_str());
        let status = filter.status.map(|s| s.as_str());

        if let Some(ref priority) = priority {
            conditions.push("priority = ?");
            params_vec.push(priority);
        }
        if let Some(ref status) = status {
            conditions.push("status = ?");
            params_vec.push(status);
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY id");

        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let cases = stmt
            .query_map(&params_vec[..], build_case_from_row)
            .db_context("Failed to query test cases")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read test cases")?;

        let mut cases = filter.apply(cases);
        for case in &mut cases {
            case.steps = load_steps(&self.connection, "test_steps", "test_case_id", case.id)?;
        }

        Ok(cases)
    }

    /// Updates the given fields of a test case.
    ///
    /// Replacing the steps discards their results and resets the case to
    /// `no_run`. Returns `None` if the case does not exist.
    pub fn update_test_case(&mut self, params: &UpdateTestCase) -> Result<Option<TestCase>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let Some(existing) = load_test_case(&tx, params.id)? else {
            return Ok(None);
        };

        let now = Timestamp::now().to_string();
        let title = params
            .title
            .as_deref()
            .map(str::trim)
            .unwrap_or(&existing.title);
        let description = params
            .description
            .as_deref()
            .unwrap_or(&existing.description);
        let priority = params.priority.unwrap_or(existing.priority);
        let labels = to_json_list(params.labels.as_ref().unwrap_or(&existing.labels))?;

        tx.execute(
            UPDATE_CASE_SQL,
            params![
                title,
                description,
                priority.as_str(),
                labels,
                &now,
                params.id as i64
            ],
        )
        .db_context("Failed to update test case")?;

        if let Some(steps) = &params.steps {
            tx.execute(DELETE_CASE_STEPS_SQL, params![params.id as i64])
                .db_context("Failed to delete test steps")?;
            insert_case_steps(&tx, params.id, steps)?;
            set_test_case_status(&tx, params.id, AggregateStatus::NoRun, &now)?;
        }

        let case = load_test_case(&tx, params.id)?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(case)
    }

    /// Deletes a test case, its steps and suite memberships. Flow run entries
    /// created from it keep their snapshot.
    ///
    /// Returns the deleted case, or `None` if it did not exist.
    pub fn delete_test_case(&mut self, id: u64) -> Result<Option<TestCase>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let Some(case) = load_test_case(&tx, id)? else {
            return Ok(None);
        };

        tx.execute(DELETE_CASE_SQL, params![id as i64])
            .db_context("Failed to delete test case")?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Some(case))
    }

    /// Retrieves a single test case step by ID.
    pub fn get_test_step(&self, id: u64) -> Result<Option<TestStep>> {
        self.connection
            .query_row(
                &format!("SELECT {STEP_COLUMNS} FROM test_steps WHERE id = ?1"),
                params![id as i64],
                build_step_from_row,
            )
            .optional()
            .db_context("Failed to query test step")
    }

    /// Updates a single step of a test case.
    ///
    /// A status change stamps `executed_at` (cleared again for `pending`) and
    /// recomputes the owning case's aggregate status.
    pub fn update_test_step(&mut self, params: &UpdateTestStep) -> Result<Option<TestStep>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let owner: Option<i64> = tx
            .query_row(SELECT_STEP_OWNER_SQL, params![params.id as i64], |row| {
                row.get(0)
            })
            .optional()
            .db_context("Failed to query step owner")?;
        let Some(case_id) = owner.map(|id| id as u64) else {
            return Ok(None);
        };

        let existing = tx
            .query_row(
                &format!("SELECT {STEP_COLUMNS} FROM test_steps WHERE id = ?1"),
                params![params.id as i64],
                build_step_from_row,
            )
            .db_context("Failed to query test step")?;

        let now = Timestamp::now();
        let status = params.status.unwrap_or(existing.status);
        let status_changed = status != existing.status;
        let executed_at = if !status_changed {
            existing.executed_at
        } else if status.is_final() {
            Some(now)
        } else {
            None
        };

        let attachments =
            to_json_list(params.attachments.as_ref().unwrap_or(&existing.attachments))?;
        let comments = params.comments.clone().or(existing.comments);

        tx.execute(
            UPDATE_STEP_SQL,
            params![
                params.description.as_deref().unwrap_or(&existing.description),
                params
                    .expected_result
                    .as_deref()
                    .unwrap_or(&existing.expected_result),
                params
                    .actual_result
                    .as_deref()
                    .unwrap_or(&existing.actual_result),
                status.as_str(),
                comments,
                attachments,
                timestamp_text(executed_at),
                params.id as i64
            ],
        )
        .db_context("Failed to update test step")?;

        let now = now.to_string();
        if status_changed {
            let steps = load_steps(&tx, "test_steps", "test_case_id", case_id)?;
            set_test_case_status(&tx, case_id, aggregate_status(&steps), &now)?;
        } else {
            tx.execute(
                "UPDATE test_cases SET updated_at = ?1 WHERE id = ?2",
                params![&now, case_id as i64],
            )
            .db_context("Failed to update test case timestamp")?;
        }

        let step = tx
            .query_row(
                &format!("SELECT {STEP_COLUMNS} FROM test_steps WHERE id = ?1"),
                params![params.id as i64],
                build_step_from_row,
            )
            .db_context("Failed to query test step")?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Some(step))
    }
}
