//! Display formatting and result types.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! this module adds newtype wrappers for collections and operation results so
//! the same data can be shown as a listing, a creation confirmation or a
//! deletion notice. All output is markdown.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Collections &   │    │   Formatted     │
//! │ (TestCase, Run) │───▶│ Result Wrappers │───▶│    Output       │
//! │                 │    │                 │    │  (Terminal/MCP) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: listings (TestCases, Suites, FlowRunSummaries, ...)
//! - [`results`]: CreateResult, UpdateResult, DeleteResult
//! - [`status`]: OperationStatus
//! - [`datetime`]: local time formatting
//! - [`models`]: Display implementations for domain models
//!
//! # Examples
//!
//! ```rust
//! use flowcase_core::display::{Labels, OperationStatus};
//!
//! let labels = Labels(vec!["api".to_string(), "smoke".to_string()]);
//! assert_eq!(labels.to_string(), "- api\n- smoke\n");
//!
//! let status = OperationStatus::success("Removed TC-3 from TS-1");
//! println!("{status}");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{FlowRunEntries, FlowRunSummaries, Labels, Suites, TestCases};
pub use datetime::{LocalDate, LocalDateTime};
pub use results::{CreateResult, DeleteResult, Resource, UpdateResult};
pub use status::OperationStatus;
