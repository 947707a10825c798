//! Parameter structures for Flowcase operations
//!
//! Shared parameter structures used by every interface (CLI, MCP) without
//! framework-specific derives. Interface layers wrap them:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! CLI argument structs convert with `From`, and the MCP server deserializes
//! core params through a transparent wrapper. JSON schema derives are only
//! compiled with the `schema` feature.
//!
//! Dates are accepted as strings (`YYYY-MM-DD` or RFC 3339) and parsed with
//! [`parse_date_bound`], so every interface reports bad dates the same way.

use jiff::{
    civil::{Date, Time},
    tz::TimeZone,
    Timestamp,
};
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    models::{AggregateStatus, FlowRunStatus, Priority, StepStatus},
    Result, TrackerError,
};

/// Generic parameters for operations requiring just an ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: u64,
}

/// Parameters addressing a flow run entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct EntryId {
    /// ID of the flow run entry
    pub entry_id: u64,
}

/// A step to create.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct NewStep {
    /// What the tester has to do
    pub description: String,
    /// What should happen
    #[serde(default)]
    pub expected_result: String,
}

impl NewStep {
    pub fn new(description: impl Into<String>, expected_result: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            expected_result: expected_result.into(),
        }
    }
}

/// Parameters for creating a test case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateTestCase {
    /// Title of the test case (required)
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Priority: 'high', 'medium' (default) or 'low'
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Ordered steps of the test case
    #[serde(default)]
    pub steps: Vec<NewStep>,
}

impl CreateTestCase {
    /// Check the title and every step description.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flowcase_core::params::{CreateTestCase, NewStep};
    ///
    /// let params = CreateTestCase {
    ///     title: "Login".to_string(),
    ///     steps: vec![NewStep::new("Open page", "Form shown")],
    ///     ..Default::default()
    /// };
    /// assert!(params.validate().is_ok());
    ///
    /// let params = CreateTestCase::default();
    /// assert!(params.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        validate_steps(&self.steps)
    }
}

/// Parameters for updating a test case. Absent fields are left unchanged.
///
/// Replacing `steps` discards recorded step results and resets the case to
/// `no_run`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateTestCase {
    /// Test case ID to update (required)
    pub id: u64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    /// Replacement label set
    pub labels: Option<Vec<String>>,
    /// Replacement step list
    pub steps: Option<Vec<NewStep>>,
}

impl UpdateTestCase {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(steps) = &self.steps {
            validate_steps(steps)?;
        }
        Ok(())
    }
}

/// Parameters for listing test cases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListTestCases {
    /// Case-insensitive text searched in title and description
    pub query: Option<String>,
    /// Show cases carrying any of these labels
    #[serde(default)]
    pub labels: Vec<String>,
    pub priority: Option<Priority>,
    pub status: Option<AggregateStatus>,
}

/// Parameters for updating a single step of a test case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateTestStep {
    /// Step ID to update (required)
    pub id: u64,
    /// New status: 'pending', 'passed', 'failed' or 'blocked'
    pub status: Option<StepStatus>,
    pub description: Option<String>,
    pub expected_result: Option<String>,
    pub actual_result: Option<String>,
    pub comments: Option<String>,
    /// Replacement attachment references
    pub attachments: Option<Vec<String>>,
}

impl UpdateTestStep {
    pub fn validate(&self) -> Result<()> {
        if let Some(description) = &self.description {
            require_text("description", description)?;
        }
        Ok(())
    }
}

/// Parameters for creating a test suite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateSuite {
    /// Name of the suite (required)
    pub name: String,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Initial member test case IDs
    #[serde(default)]
    pub test_cases: Vec<u64>,
}

impl CreateSuite {
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)
    }
}

/// Parameters for updating a suite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateSuite {
    pub id: u64,
    pub name: Option<String>,
    pub labels: Option<Vec<String>>,
}

impl UpdateSuite {
    pub fn validate(&self) -> Result<()> {
        match &self.name {
            Some(name) => require_text("name", name),
            None => Ok(()),
        }
    }
}

/// Parameters for listing suites.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListSuites {
    /// Case-insensitive text searched in the suite name
    pub query: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// A test case inside a suite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SuiteMembership {
    pub suite_id: u64,
    pub test_case_id: u64,
}

/// Parameters for creating a flow run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateFlowRun {
    /// Title of the run (required)
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Initial status, 'draft' when omitted
    pub status: Option<FlowRunStatus>,
    /// Start date (YYYY-MM-DD or RFC 3339)
    pub start_date: Option<String>,
    /// End date (YYYY-MM-DD or RFC 3339)
    pub end_date: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Tester responsible for the run
    pub assigned_to: Option<String>,
    /// Test case IDs to snapshot into the run
    #[serde(default)]
    pub test_cases: Vec<u64>,
}

impl CreateFlowRun {
    /// Validate the title and parse the date range.
    pub fn validate(&self) -> Result<(Option<Timestamp>, Option<Timestamp>)> {
        require_text("title", &self.title)?;
        parse_date_range(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

/// Parameters for updating a flow run. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateFlowRun {
    pub id: u64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<FlowRunStatus>,
    /// Start date (YYYY-MM-DD or RFC 3339)
    pub start_date: Option<String>,
    /// End date (YYYY-MM-DD or RFC 3339)
    pub end_date: Option<String>,
    pub labels: Option<Vec<String>>,
    pub assigned_to: Option<String>,
}

impl UpdateFlowRun {
    /// Validate the title and parse whichever dates are given.
    pub fn validate(&self) -> Result<(Option<Timestamp>, Option<Timestamp>)> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        parse_date_range(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

/// Parameters for listing flow runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListFlowRuns {
    /// Case-insensitive text searched in title and description
    pub query: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub status: Option<FlowRunStatus>,
    /// Only runs starting on or after this date
    pub started_after: Option<String>,
    /// Only runs starting on or before this date
    pub started_before: Option<String>,
    /// Only runs assigned to this tester
    pub assigned_to: Option<String>,
}

/// A test case inside a flow run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RunMembership {
    pub flow_run_id: u64,
    pub test_case_id: u64,
}

/// Parameters for adding every case of a suite to a flow run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AddSuiteToRun {
    pub flow_run_id: u64,
    pub suite_id: u64,
}

/// Parameters for changing the notes of a flow run entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct EntryNotes {
    pub entry_id: u64,
    /// Overall notes about this execution
    pub notes: String,
}

/// Parameters for starting guided execution of a flow run entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct StartExecution {
    pub entry_id: u64,
    /// Name of the tester running the steps
    pub executed_by: Option<String>,
}

/// Parameters for recording the result of the current step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RecordStep {
    pub entry_id: u64,
    /// 0-based index of the current step
    pub step_index: usize,
    /// Result: 'passed', 'failed', 'blocked' or 'pending'
    pub status: StepStatus,
    /// What actually happened
    pub actual_result: Option<String>,
    pub comments: Option<String>,
}

/// Parse a date filter or date field.
///
/// Accepts an RFC 3339 timestamp or a plain `YYYY-MM-DD` date. Plain dates are
/// read in UTC, as the start of the day or, with `end_of_day`, its last
/// instant.
///
/// # Examples
///
/// ```rust
/// use flowcase_core::params::parse_date_bound;
///
/// let start = parse_date_bound("started_after", "2024-03-01", false)?;
/// assert_eq!(start.to_string(), "2024-03-01T00:00:00Z");
///
/// let exact = parse_date_bound("started_after", "2024-03-01T12:30:00Z", false)?;
/// assert!(exact > start);
///
/// assert!(parse_date_bound("started_after", "next week", false).is_err());
/// # flowcase_core::Result::<()>::Ok(())
/// ```
pub fn parse_date_bound(field: &str, value: &str, end_of_day: bool) -> Result<Timestamp> {
    let value = value.trim();
    if let Ok(timestamp) = value.parse::<Timestamp>() {
        return Ok(timestamp);
    }

    let invalid = || {
        TrackerError::invalid_input(field).with_reason(format!(
            "Invalid date '{value}'. Use YYYY-MM-DD or an RFC 3339 timestamp"
        ))
    };

    let date: Date = value.parse().map_err(|_| invalid())?;
    let time = if end_of_day { Time::MAX } else { Time::MIN };
    date.to_datetime(time)
        .to_zoned(TimeZone::UTC)
        .map(|zoned| zoned.timestamp())
        .map_err(|_| invalid())
}

fn parse_date_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(Option<Timestamp>, Option<Timestamp>)> {
    let start = start
        .map(|s| parse_date_bound("start_date", s, false))
        .transpose()?;
    let end = end
        .map(|s| parse_date_bound("end_date", s, false))
        .transpose()?;

    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(TrackerError::invalid_input("end_date")
                .with_reason("End date must not be before the start date"));
        }
    }

    Ok((start, end))
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TrackerError::invalid_input(field).with_reason(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn validate_steps(steps: &[NewStep]) -> Result<()> {
    for (index, step) in steps.iter().enumerate() {
        if step.description.trim().is_empty() {
            return Err(TrackerError::invalid_input("steps").with_reason(format!(
                "Step {} has an empty description",
                index + 1
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_case_requires_title() {
        let params = CreateTestCase {
            title: "   ".to_string(),
            ..Default::default()
        };

        match params.validate().unwrap_err() {
            TrackerError::InvalidInput { field, reason } => {
                assert_eq!(field, "title");
                assert!(reason.contains("cannot be empty"));
            }
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_test_case_rejects_blank_step() {
        let params = CreateTestCase {
            title: "Checkout".to_string(),
            steps: vec![NewStep::new("Add item", "Cart shows 1"), NewStep::new("", "")],
            ..Default::default()
        };

        match params.validate().unwrap_err() {
            TrackerError::InvalidInput { field, reason } => {
                assert_eq!(field, "steps");
                assert!(reason.contains("Step 2"));
            }
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn test_update_test_case_only_checks_given_fields() {
        let mut params = UpdateTestCase {
            id: 1,
            ..Default::default()
        };
        assert!(params.validate().is_ok());

        params.title = Some(String::new());
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_create_test_case_deserializes_defaults() {
        let params: CreateTestCase =
            serde_json::from_str(r#"{"title": "Search", "steps": [{"description": "Type"}]}"#)
                .unwrap();

        assert_eq!(params.priority, Priority::Medium);
        assert!(params.labels.is_empty());
        assert_eq!(params.steps[0].expected_result, "");
    }

    #[test]
    fn test_record_step_status_from_json() {
        let params: RecordStep =
            serde_json::from_str(r#"{"entry_id": 4, "step_index": 1, "status": "blocked"}"#)
                .unwrap();

        assert_eq!(params.status, StepStatus::Blocked);
        assert_eq!(params.step_index, 1);
        assert!(params.actual_result.is_none());
    }

    #[test]
    fn test_parse_date_bound_plain_date() {
        let start = parse_date_bound("started_after", "2024-01-15", false).unwrap();
        let end = parse_date_bound("started_before", "2024-01-15", true).unwrap();

        assert_eq!(start.to_string(), "2024-01-15T00:00:00Z");
        assert!(end > start);
        assert!(end.to_string().starts_with("2024-01-15T23:59:59"));
    }

    #[test]
    fn test_parse_date_bound_rejects_garbage() {
        match parse_date_bound("started_before", "15/01/2024", true).unwrap_err() {
            TrackerError::InvalidInput { field, reason } => {
                assert_eq!(field, "started_before");
                assert!(reason.contains("15/01/2024"));
            }
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_flow_run_date_range() {
        let mut params = CreateFlowRun {
            title: "Release 2.0".to_string(),
            start_date: Some("2024-05-01".to_string()),
            end_date: Some("2024-05-03".to_string()),
            ..Default::default()
        };
        let (start, end) = params.validate().unwrap();
        assert!(start.unwrap() < end.unwrap());

        params.end_date = Some("2024-04-30".to_string());
        match params.validate().unwrap_err() {
            TrackerError::InvalidInput { field, .. } => assert_eq!(field, "end_date"),
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_suite_requires_name() {
        assert!(CreateSuite::default().validate().is_err());
        assert!(CreateSuite {
            name: "Smoke".to_string(),
            ..Default::default()
        }
        .validate()
        .is_ok());
    }
}
