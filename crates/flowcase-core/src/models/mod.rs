//! Data models for test cases, suites and flow runs.
//!
//! This module contains the core domain models of the Flowcase test
//! management system. Display implementations for these models live in
//! [`crate::display::models`] so that data structures and presentation stay
//! separate.
//!
//! ## Model Overview
//!
//! - [`TestCase`]: a titled, prioritised, labelled case owning ordered
//!   [`TestStep`]s and a rolled-up [`AggregateStatus`]
//! - [`TestSuite`]: a named group of test case IDs
//! - [`FlowRun`]: an execution session holding one [`FlowRunEntry`] per
//!   selected test case; each entry carries a scratch copy of the case's steps
//! - [`FlowRunMetrics`] / [`FlowRunSummary`]: counts derived from entry
//!   statuses
//!
//! Statuses are closed enumerations. Step statuses ([`StepStatus`]) and
//! aggregate statuses ([`AggregateStatus`]) are distinct types because
//! `no_run` is meaningful only for a whole case.
//!
//! # Examples
//!
//! ```rust
//! use flowcase_core::models::{StepStatus, TestStep};
//!
//! let step = TestStep::pending(0, "Open the login page", "Login form is shown");
//! assert_eq!(step.status, StepStatus::Pending);
//! assert!(step.actual_result.is_empty());
//! println!("{}", step);
//! ```

pub mod filters;
pub mod flow_run;
pub mod metrics;
pub mod status;
pub mod step;
pub mod suite;
pub mod test_case;


pub use filters::{FlowRunFilter, Labeled, SuiteFilter, TestCaseFilter};
pub use flow_run::{FlowRun, FlowRunEntry};
pub use metrics::{FlowRunMetrics, FlowRunSummary};
pub use status::{AggregateStatus, FlowRunStatus, Priority, StepStatus};
pub use step::TestStep;
pub use suite::{SuiteWithCases, TestSuite};
pub use test_case::TestCase;
