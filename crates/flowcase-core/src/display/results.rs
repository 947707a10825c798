//! Result wrapper types for displaying operation outcomes.
//!
//! Create, update and delete results share one format for every resource;
//! the [`Resource`] trait supplies the noun and the reference shown in the
//! headline.

use std::fmt;

use crate::models::{FlowRun, FlowRunEntry, TestCase, TestStep, TestSuite};

/// A stored record that operation results can refer to.
pub trait Resource: fmt::Display {
    /// Lowercase noun, e.g. "test case"
    fn kind(&self) -> &'static str;
    /// Identifier shown to users, e.g. "TC-4"
    fn reference(&self) -> String;
    /// Human-readable name
    fn name(&self) -> &str;
}

impl Resource for TestCase {
    fn kind(&self) -> &'static str {
        "test case"
    }
    fn reference(&self) -> String {
        self.display_id()
    }
    fn name(&self) -> &str {
        &self.title
    }
}

impl Resource for TestStep {
    fn kind(&self) -> &'static str {
        "step"
    }
    fn reference(&self) -> String {
        format!("ID: {}", self.id)
    }
    fn name(&self) -> &str {
        &self.description
    }
}

impl Resource for TestSuite {
    fn kind(&self) -> &'static str {
        "test suite"
    }
    fn reference(&self) -> String {
        self.display_id()
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl Resource for FlowRun {
    fn kind(&self) -> &'static str {
        "flow run"
    }
    fn reference(&self) -> String {
        self.display_id()
    }
    fn name(&self) -> &str {
        &self.title
    }
}

impl Resource for FlowRunEntry {
    fn kind(&self) -> &'static str {
        "flow run entry"
    }
    fn reference(&self) -> String {
        format!("entry {}", self.id)
    }
    fn name(&self) -> &str {
        &self.title
    }
}

/// Result of a create operation.
///
/// # Examples
///
/// ```rust
/// use flowcase_core::{
///     display::CreateResult,
///     models::{AggregateStatus, Priority, TestCase},
/// };
/// use jiff::Timestamp;
///
/// let case = TestCase {
///     id: 1,
///     title: "Login".to_string(),
///     description: String::new(),
///     status: AggregateStatus::NoRun,
///     priority: Priority::High,
///     labels: vec![],
///     steps: vec![],
///     created_at: Timestamp::now(),
///     updated_at: Timestamp::now(),
/// };
///
/// let output = CreateResult::new(case).to_string();
/// assert!(output.starts_with("Created test case TC-1"));
/// ```
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl<T: Resource> fmt::Display for CreateResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Created {} {}",
            self.resource.kind(),
            self.resource.reference()
        )?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Result of an update operation, optionally listing what changed.
pub struct UpdateResult<T> {
    pub resource: T,
    pub changes: Vec<String>,
}

impl<T> UpdateResult<T> {
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    pub fn with_changes(resource: T, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }
}

impl<T: Resource> fmt::Display for UpdateResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Updated {} {}",
            self.resource.kind(),
            self.resource.reference()
        )?;

        if !self.changes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Changes made:")?;
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
        }

        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Result of a delete operation.
pub struct DeleteResult<T> {
    pub resource: T,
}

impl<T> DeleteResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl<T: Resource> fmt::Display for DeleteResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deleted {} '{}' ({})",
            self.resource.kind(),
            self.resource.name(),
            self.resource.reference()
        )
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::{TestStep, TestSuite};

    fn suite() -> TestSuite {
        TestSuite {
            id: 2,
            name: "Smoke".to_string(),
            labels: vec!["fast".to_string()],
            test_cases: vec![1, 4],
            created_at: Timestamp::from_second(1_704_067_200).unwrap(),
            updated_at: Timestamp::from_second(1_704_067_200).unwrap(),
        }
    }

    #[test]
    fn test_update_result_lists_changes() {
        let result = UpdateResult::with_changes(suite(), vec!["Renamed suite".to_string()]);
        let output = result.to_string();

        assert!(output.starts_with("Updated test suite TS-2"));
        assert!(output.contains("Changes made:\n- Renamed suite"));
        assert!(output.contains("- Test cases: TC-1, TC-4"));
    }

    #[test]
    fn test_delete_result() {
        assert_eq!(
            DeleteResult::new(suite()).to_string(),
            "Deleted test suite 'Smoke' (TS-2)\n"
        );
    }

    #[test]
    fn test_update_step_result() {
        let mut step = TestStep::pending(0, "Open page", "Page loads");
        step.id = 9;
        let output = UpdateResult::new(step).to_string();
        assert!(output.starts_with("Updated step ID: 9"));
    }
}
