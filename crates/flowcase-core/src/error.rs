//! Error types for the tracker library.

use std::path::PathBuf;

use thiserror::Error;

pub use crate::execution::ExecutionError;

/// Error type for all tracker operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Test case with ID {id} not found")]
    TestCaseNotFound { id: u64 },
    #[error("Test suite with ID {id} not found")]
    SuiteNotFound { id: u64 },
    #[error("Flow run with ID {id} not found")]
    FlowRunNotFound { id: u64 },
    /// Flow run entry not found for the given ID
    #[error("Flow run entry with ID {id} not found")]
    EntryNotFound { id: u64 },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// Execution engine rejected the operation
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> TrackerError {
        TrackerError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> TrackerError {
        TrackerError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl TrackerError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Whether the error means the addressed record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TrackerError::TestCaseNotFound { .. }
                | TrackerError::SuiteNotFound { .. }
                | TrackerError::FlowRunNotFound { .. }
                | TrackerError::EntryNotFound { .. }
        )
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| TrackerError::database(message).with_source(e))
    }
}

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_builder() {
        let err = TrackerError::invalid_input("title").with_reason("Title cannot be empty");
        assert_eq!(
            err.to_string(),
            "Invalid input for field 'title': Title cannot be empty"
        );
    }

    #[test]
    fn test_execution_error_converts() {
        let err: TrackerError = ExecutionError::NotRunning.into();
        assert!(matches!(err, TrackerError::Execution(ExecutionError::NotRunning)));
        assert_eq!(err.to_string(), "Execution error: No execution is running");
    }

    #[test]
    fn test_db_context() {
        let result: std::result::Result<(), rusqlite::Error> =
            Err(rusqlite::Error::QueryReturnedNoRows);
        let err = result.db_context("Failed to load test case").unwrap_err();
        assert!(err.to_string().contains("Failed to load test case"));
        assert!(!err.is_not_found());
        assert!(TrackerError::EntryNotFound { id: 3 }.is_not_found());
    }
}
