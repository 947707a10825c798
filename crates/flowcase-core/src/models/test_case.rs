//! Test case model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{AggregateStatus, Priority, TestStep};

/// A test case with its ordered steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestCase {
    /// Unique identifier for the test case
    pub id: u64,

    /// Short title
    pub title: String,

    /// Detailed description
    #[serde(default)]
    pub description: String,

    /// Rolled-up status; `no_run` until the case is first executed
    #[serde(default)]
    pub status: AggregateStatus,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub labels: Vec<String>,

    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<TestStep>,

    /// Timestamp when the test case was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the test case was last modified (UTC)
    pub updated_at: Timestamp,
}

impl TestCase {
    /// Human-facing identifier, e.g. `TC-12`.
    pub fn display_id(&self) -> String {
        format!("TC-{}", self.id)
    }
}
