//! Test step model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::StepStatus;

/// A single instruction and its expected outcome.
///
/// The same record is used for the canonical steps of a test case and for
/// the scratch copies held by a flow run entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestStep {
    /// Unique identifier for the step
    pub id: u64,

    /// What the tester has to do
    pub description: String,

    /// What should happen
    pub expected_result: String,

    /// What actually happened (empty until recorded)
    #[serde(default)]
    pub actual_result: String,

    /// Current status of the step
    #[serde(default)]
    pub status: StepStatus,

    /// Free-form tester comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    /// Attachment references (file paths, URLs)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,

    /// When a final status was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<Timestamp>,

    /// Position of the step within its parent (0-indexed)
    pub order: u32,
}

impl TestStep {
    /// Builds a fresh pending step that has not been stored yet.
    pub fn pending(order: u32, description: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            id: 0,
            description: description.into(),
            expected_result: expected.into(),
            actual_result: String::new(),
            status: StepStatus::Pending,
            comments: None,
            attachments: Vec::new(),
            executed_at: None,
            order,
        }
    }
}
