//! Test suite model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::TestCase;

/// A named, labelled group of test cases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestSuite {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Member test case IDs in insertion order
    #[serde(default)]
    pub test_cases: Vec<u64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TestSuite {
    /// Human-facing identifier, e.g. `TS-3`.
    pub fn display_id(&self) -> String {
        format!("TS-{}", self.id)
    }
}

/// A suite together with its resolved member cases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuiteWithCases {
    pub suite: TestSuite,
    pub cases: Vec<TestCase>,
}
