//! Core library for the Flowcase test management application.
//!
//! This crate provides the business logic for managing test cases, test
//! suites and flow runs, together with the execution engine that walks a
//! tester through the steps of a flow run entry and rolls step results up
//! into an overall status.
//!
//! # Architecture
//!
//! - [`execution`]: the pure execution engine (no I/O). Commands are applied
//!   to an [`ExecutionState`] and yield a [`Transition`] describing the new
//!   state and the status to persist.
//! - [`db`]: SQLite storage. Engine transitions are stored in one
//!   transaction per command.
//! - [`tracker`]: the async API used by the CLI and the MCP server.
//! - [`models`] and [`display`]: domain types and their markdown rendering.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use flowcase_core::{
//!     params::{CreateFlowRun, CreateTestCase, EntryId, NewStep, RecordStep, StartExecution},
//!     StepStatus, TrackerBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tracker = TrackerBuilder::new()
//!     .with_database_path(Some("test.db"))
//!     .build()
//!     .await?;
//!
//! let case = tracker
//!     .create_test_case(&CreateTestCase {
//!         title: "Password reset".to_string(),
//!         steps: vec![
//!             NewStep::new("Request a reset link", "Email is sent"),
//!             NewStep::new("Open the link", "Reset form is shown"),
//!         ],
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let run = tracker
//!     .create_flow_run(&CreateFlowRun {
//!         title: "Sprint 12 regression".to_string(),
//!         test_cases: vec![case.id],
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let entry_id = run.entries[0].id;
//! tracker
//!     .start_execution(&StartExecution { entry_id, executed_by: Some("dana".to_string()) })
//!     .await?;
//! let report = tracker
//!     .record_step_result(&RecordStep {
//!         entry_id,
//!         step_index: 0,
//!         status: StepStatus::Passed,
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{report}");
//!
//! // Leave the session; the entry stays pending and can be resumed later
//! tracker.exit_execution(&EntryId { entry_id }).await?;
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod display;
pub mod error;
pub mod execution;
pub mod models;
pub mod params;
pub mod tracker;

// Re-export commonly used types
pub use db::Database;
pub use display::{
    CreateResult, DeleteResult, FlowRunEntries, FlowRunSummaries, Labels, LocalDateTime,
    OperationStatus, Suites, TestCases, UpdateResult,
};
pub use error::{Result, TrackerError};
pub use execution::{
    aggregate_status, ExecutionCommand, ExecutionError, ExecutionPhase, ExecutionReport,
    ExecutionState, StepResult, Transition,
};
pub use models::{
    AggregateStatus, FlowRun, FlowRunEntry, FlowRunMetrics, FlowRunStatus, FlowRunSummary,
    Priority, StepStatus, SuiteWithCases, TestCase, TestStep, TestSuite,
};
pub use params::{
    AddSuiteToRun, CreateFlowRun, CreateSuite, CreateTestCase, EntryId, EntryNotes, Id,
    ListFlowRuns, ListSuites, ListTestCases, NewStep, RecordStep, RunMembership,
    StartExecution, SuiteMembership, UpdateFlowRun, UpdateSuite, UpdateTestCase, UpdateTestStep,
};
pub use tracker::{Tracker, TrackerBuilder};
