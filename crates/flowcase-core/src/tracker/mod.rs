//! High-level tracker API for test cases, suites and flow runs.
//!
//! [`Tracker`] is the async entry point used by every interface. Each
//! operation opens its own database connection on the blocking thread pool,
//! so a `Tracker` is cheap to clone and share.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  CLI / MCP      │    │    Tracker      │    │    Database     │
//! │  (params)       │───▶│ (validation,    │───▶│   (via db/)     │
//! │                 │    │  spawn_blocking)│    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: configures the database location
//! - [`case_ops`]: test cases and their steps
//! - [`suite_ops`]: suites and membership
//! - [`run_ops`]: flow runs, entries, metrics and labels
//! - [`execution_ops`]: guided step execution of flow run entries
//!
//! # Examples
//!
//! ```rust,no_run
//! use flowcase_core::{
//!     params::{CreateFlowRun, CreateTestCase, NewStep, RecordStep, StartExecution},
//!     models::StepStatus,
//!     TrackerBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tracker = TrackerBuilder::new()
//!     .with_database_path(Some("flowcase.db"))
//!     .build()
//!     .await?;
//!
//! let case = tracker
//!     .create_test_case(&CreateTestCase {
//!         title: "Login".to_string(),
//!         steps: vec![NewStep::new("Submit valid credentials", "Dashboard is shown")],
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let run = tracker
//!     .create_flow_run(&CreateFlowRun {
//!         title: "Release 1.4".to_string(),
//!         test_cases: vec![case.id],
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let entry_id = run.entries[0].id;
//! tracker
//!     .start_execution(&StartExecution { entry_id, executed_by: None })
//!     .await?;
//! let report = tracker
//!     .record_step_result(&RecordStep {
//!         entry_id,
//!         step_index: 0,
//!         status: StepStatus::Passed,
//!         ..Default::default()
//!     })
//!     .await?;
//! assert!(report.terminal);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use tokio::task;

use crate::{
    db::Database,
    error::{Result, TrackerError},
};

pub mod builder;
pub mod case_ops;
pub mod execution_ops;
pub mod run_ops;
pub mod suite_ops;


pub use builder::TrackerBuilder;

/// Main interface for managing test cases, suites and flow runs.
#[derive(Debug, Clone)]
pub struct Tracker {
    pub(crate) db_path: PathBuf,
}

impl Tracker {
    pub(crate) fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Location of the database file.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// Run `operation` against a fresh connection on the blocking pool.
    async fn with_database<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            operation(&mut db)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
