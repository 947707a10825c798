//! Database operations and SQLite management.
//!
//! Low-level storage for test cases, suites and flow runs. Each query module
//! extends [`Database`] with the operations for one aggregate; execution
//! sessions are loaded, advanced and written back inside a single
//! transaction (see [`execution_queries`]).

use std::path::Path;

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod case_queries;
pub mod execution_queries;
pub mod migrations;
pub mod run_queries;
pub mod suite_queries;
pub mod utils;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
