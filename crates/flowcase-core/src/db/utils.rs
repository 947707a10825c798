//! Row conversion helpers shared by the query modules.

use std::str::FromStr;

use jiff::Timestamp;
use rusqlite::{params, types::Type, Connection, Row};

use crate::{
    error::{DatabaseResultExt, Result},
    models::TestStep,
    params::NewStep,
};

/// Step columns shared by `test_steps` and `run_steps`, in the order
/// [`build_step_from_row`] reads them.
pub(crate) const STEP_COLUMNS: &str = "id, description, expected_result, actual_result, status, comments, attachments, executed_at, step_order";

fn conversion_error(index: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, message.into())
}

pub(crate) fn get_id(row: &Row, index: usize) -> rusqlite::Result<u64> {
    Ok(row.get::<_, i64>(index)? as u64)
}

pub(crate) fn get_timestamp(row: &Row, index: usize) -> rusqlite::Result<Timestamp> {
    row.get::<_, String>(index)?
        .parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

pub(crate) fn get_optional_timestamp(
    row: &Row,
    index: usize,
) -> rusqlite::Result<Option<Timestamp>> {
    row.get::<_, Option<String>>(index)?
        .map(|s| {
            s.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

/// Parse a text column into one of the status enums.
pub(crate) fn get_enum<T>(row: &Row, index: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let value: String = row.get(index)?;
    value.parse::<T>().map_err(|e| conversion_error(index, e))
}

/// Decode a JSON array column.
pub(crate) fn get_string_list(row: &Row, index: usize) -> rusqlite::Result<Vec<String>> {
    let value: String = row.get(index)?;
    serde_json::from_str(&value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

pub(crate) fn to_json_list(items: &[String]) -> Result<String> {
    Ok(serde_json::to_string(items)?)
}

pub(crate) fn timestamp_text(value: Option<Timestamp>) -> Option<String> {
    value.map(|ts| ts.to_string())
}

/// Build a step from a row selected with [`STEP_COLUMNS`].
pub(crate) fn build_step_from_row(row: &Row) -> rusqlite::Result<TestStep> {
    Ok(TestStep {
        id: get_id(row, 0)?,
        description: row.get(1)?,
        expected_result: row.get(2)?,
        actual_result: row.get(3)?,
        status: get_enum(row, 4)?,
        comments: row.get(5)?,
        attachments: get_string_list(row, 6)?,
        executed_at: get_optional_timestamp(row, 7)?,
        order: row.get::<_, i64>(8)? as u32,
    })
}

/// Load the ordered steps of `table` owned by `owner_id` through
/// `owner_column`.
pub(crate) fn load_steps(
    conn: &Connection,
    table: &str,
    owner_column: &str,
    owner_id: u64,
) -> Result<Vec<TestStep>> {
    let sql = format!(
        "SELECT {STEP_COLUMNS} FROM {table} WHERE {owner_column} = ?1 ORDER BY step_order"
    );
    let mut stmt = conn.prepare(&sql).db_context("Failed to prepare step query")?;
    let steps = stmt
        .query_map(params![owner_id as i64], build_step_from_row)
        .db_context("Failed to query steps")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .db_context("Failed to read steps")?;
    Ok(steps)
}

/// Insert fresh pending steps for a test case.
pub(crate) fn insert_case_steps(conn: &Connection, case_id: u64, steps: &[NewStep]) -> Result<()> {
    let mut stmt = conn
        .prepare(
            "INSERT INTO test_steps (test_case_id, step_order, description, expected_result) VALUES (?1, ?2, ?3, ?4)",
        )
        .db_context("Failed to prepare step insert")?;

    for (order, step) in steps.iter().enumerate() {
        stmt.execute(params![
            case_id as i64,
            order as i64,
            step.description.trim(),
            step.expected_result
        ])
        .db_context("Failed to insert step")?;
    }

    Ok(())
}
