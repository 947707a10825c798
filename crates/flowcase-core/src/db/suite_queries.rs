//! Test suite CRUD and membership operations.

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    case_queries::test_case_exists,
    utils::{get_id, get_string_list, get_timestamp, to_json_list},
};
use crate::{
    error::{DatabaseResultExt, Result, TrackerError},
    models::{SuiteFilter, TestSuite},
};

const SUITE_COLUMNS: &str = "id, name, labels, created_at, updated_at";
const INSERT_SUITE_SQL: &str =
    "INSERT INTO test_suites (name, labels, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)";
const UPDATE_SUITE_SQL: &str =
    "UPDATE test_suites SET name = ?1, labels = ?2, updated_at = ?3 WHERE id = ?4";
const TOUCH_SUITE_SQL: &str = "UPDATE test_suites SET updated_at = ?1 WHERE id = ?2";
const DELETE_SUITE_SQL: &str = "DELETE FROM test_suites WHERE id = ?1";
const SELECT_MEMBERS_SQL: &str =
    "SELECT test_case_id FROM suite_cases WHERE suite_id = ?1 ORDER BY position";
const INSERT_MEMBER_SQL: &str = "INSERT OR IGNORE INTO suite_cases (suite_id, test_case_id, position) VALUES (?1, ?2, (SELECT COALESCE(MAX(position), -1) + 1 FROM suite_cases WHERE suite_id = ?1))";
const DELETE_MEMBER_SQL: &str =
    "DELETE FROM suite_cases WHERE suite_id = ?1 AND test_case_id = ?2";

fn build_suite_from_row(row: &rusqlite::Row) -> rusqlite::Result<TestSuite> {
    Ok(TestSuite {
        id: get_id(row, 0)?,
        name: row.get(1)?,
        labels: get_string_list(row, 2)?,
        created_at: get_timestamp(row, 3)?,
        updated_at: get_timestamp(row, 4)?,
        test_cases: Vec::new(),
    })
}

fn load_members(conn: &Connection, suite_id: u64) -> Result<Vec<u64>> {
    let mut stmt = conn
        .prepare(SELECT_MEMBERS_SQL)
        .db_context("Failed to prepare query")?;
    let ids = stmt
        .query_map(params![suite_id as i64], |row| get_id(row, 0))
        .db_context("Failed to query suite members")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .db_context("Failed to read suite members")?;
    Ok(ids)
}

pub(crate) fn load_suite(conn: &Connection, id: u64) -> Result<Option<TestSuite>> {
    let suite = conn
        .query_row(
            &format!("SELECT {SUITE_COLUMNS} FROM test_suites WHERE id = ?1"),
            params![id as i64],
            build_suite_from_row,
        )
        .optional()
        .db_context("Failed to query test suite")?;

    match suite {
        Some(mut suite) => {
            suite.test_cases = load_members(conn, suite.id)?;
            Ok(Some(suite))
        }
        None => Ok(None),
    }
}

fn insert_member(conn: &Connection, suite_id: u64, test_case_id: u64) -> Result<()> {
    if !test_case_exists(conn, test_case_id)? {
        return Err(TrackerError::TestCaseNotFound { id: test_case_id });
    }
    conn.execute(
        INSERT_MEMBER_SQL,
        params![suite_id as i64, test_case_id as i64],
    )
    .db_context("Failed to add test case to suite")?;
    Ok(())
}

impl super::Database {
    /// Creates a suite with optional initial members.
    pub fn create_suite(
        &mut self,
        name: &str,
        labels: &[String],
        test_cases: &[u64],
    ) -> Result<TestSuite> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now().to_string();
        tx.execute(
            INSERT_SUITE_SQL,
            params![name.trim(), to_json_list(labels)?, &now, &now],
        )
        .db_context("Failed to insert test suite")?;

        let id = tx.last_insert_rowid() as u64;
        for case_id in test_cases {
            insert_member(&tx, id, *case_id)?;
        }

        let suite = load_suite(&tx, id)?.ok_or(TrackerError::SuiteNotFound { id })?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(suite)
    }

    /// Retrieves a suite and its member IDs.
    pub fn get_suite(&self, id: u64) -> Result<Option<TestSuite>> {
        load_suite(&self.connection, id)
    }

    /// Lists suites matching `filter`, oldest first.
    pub fn list_suites(&self, filter: &SuiteFilter) -> Result<Vec<TestSuite>> {
        let mut stmt = self
            .connection
            .prepare(&format!("SELECT {SUITE_COLUMNS} FROM test_suites ORDER BY id"))
            .db_context("Failed to prepare query")?;

        let suites = stmt
            .query_map([], build_suite_from_row)
            .db_context("Failed to query test suites")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read test suites")?;

        let mut suites = filter.apply(suites);
        for suite in &mut suites {
            suite.test_cases = load_members(&self.connection, suite.id)?;
        }

        Ok(suites)
    }

    /// Renames or relabels a suite. Returns `None` if it does not exist.
    pub fn update_suite(
        &mut self,
        id: u64,
        name: Option<&str>,
        labels: Option<&[String]>,
    ) -> Result<Option<TestSuite>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let Some(existing) = load_suite(&tx, id)? else {
            return Ok(None);
        };

        let now = Timestamp::now().to_string();
        tx.execute(
            UPDATE_SUITE_SQL,
            params![
                name.map(str::trim).unwrap_or(&existing.name),
                to_json_list(labels.unwrap_or(&existing.labels))?,
                &now,
                id as i64
            ],
        )
        .db_context("Failed to update test suite")?;

        let suite = load_suite(&tx, id)?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(suite)
    }

    /// Deletes a suite. Member test cases are kept.
    pub fn delete_suite(&mut self, id: u64) -> Result<Option<TestSuite>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let Some(suite) = load_suite(&tx, id)? else {
            return Ok(None);
        };

        tx.execute(DELETE_SUITE_SQL, params![id as i64])
            .db_context("Failed to delete test suite")?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Some(suite))
    }

    /// Adds a test case to a suite. Adding an existing member is a no-op.
    pub fn add_case_to_suite(&mut self, suite_id: u64, test_case_id: u64) -> Result<TestSuite> {
        self.change_membership(suite_id, |tx| insert_member(tx, suite_id, test_case_id))
    }

    /// Removes a test case from a suite. Removing a non-member is a no-op.
    pub fn remove_case_from_suite(
        &mut self,
        suite_id: u64,
        test_case_id: u64,
    ) -> Result<TestSuite> {
        self.change_membership(suite_id, |tx| {
            tx.execute(
                DELETE_MEMBER_SQL,
                params![suite_id as i64, test_case_id as i64],
            )
            .db_context("Failed to remove test case from suite")?;
            Ok(())
        })
    }

    fn change_membership<F>(&mut self, suite_id: u64, change: F) -> Result<TestSuite>
    where
        F: FnOnce(&Connection) -> Result<()>,
    {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        if load_suite(&tx, suite_id)?.is_none() {
            return Err(TrackerError::SuiteNotFound { id: suite_id });
        }

        change(&tx)?;
        tx.execute(
            TOUCH_SUITE_SQL,
            params![Timestamp::now().to_string(), suite_id as i64],
        )
        .db_context("Failed to update suite timestamp")?;

        let suite = load_suite(&tx, suite_id)?.ok_or(TrackerError::SuiteNotFound { id: suite_id })?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(suite)
    }
}
