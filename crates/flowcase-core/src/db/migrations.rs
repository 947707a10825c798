//! Database schema initialization and migrations.

use log::debug;

use crate::error::{DatabaseResultExt, Result, TrackerError};

/// Schema version written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 2;

/// Version 1 databases predate the finished-session marker on entries.
const MIGRATE_V1_TO_V2_SQL: &str = "ALTER TABLE flow_run_entries ADD COLUMN is_finished INTEGER NOT NULL DEFAULT 0 CHECK (is_finished IN (0, 1))";

impl super::Database {
    /// Initializes the database schema using the embedded SQL file.
    pub(super) fn initialize_schema(&self) -> Result<()> {
        // Foreign keys are off by default in SQLite, per connection
        self.connection
            .execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;

        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;

        self.apply_migrations()
    }

    /// Current schema version of the open database.
    pub fn schema_version(&self) -> Result<i64> {
        self.connection
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .db_context("Failed to read schema version")
    }

    /// Bring an existing database up to [`SCHEMA_VERSION`].
    ///
    /// A fresh database (version 0) already has the current schema from
    /// `schema.sql`; only the version number is written.
    fn apply_migrations(&self) -> Result<()> {
        let version = self.schema_version()?;

        if version > SCHEMA_VERSION {
            return Err(TrackerError::Configuration {
                message: format!(
                    "Database schema version {version} is newer than supported version {SCHEMA_VERSION}"
                ),
            });
        }

        if version == 1 {
            debug!("Adding is_finished to flow_run_entries");
            self.connection
                .execute(MIGRATE_V1_TO_V2_SQL, [])
                .db_context("Failed to migrate schema to version 2")?;
        }

        if version < SCHEMA_VERSION {
            debug!("Migrating database schema from version {version} to {SCHEMA_VERSION}");
            self.connection
                .pragma_update(None, "user_version", SCHEMA_VERSION)
                .db_context("Failed to update schema version")?;
        }

        Ok(())
    }
}
