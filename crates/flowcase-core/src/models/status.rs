//! Status and priority enumerations for steps, test cases and flow runs.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of step statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step has not been evaluated yet
    #[default]
    Pending,

    /// Step produced the expected result
    Passed,

    /// Step ran and produced a different result
    Failed,

    /// Step could not be evaluated
    Blocked,
}

impl FromStr for StepStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(StepStatus::Pending),
            "passed" | "pass" => Ok(StepStatus::Passed),
            "failed" | "fail" => Ok(StepStatus::Failed),
            "blocked" => Ok(StepStatus::Blocked),
            _ => Err(format!("Invalid step status: {s}")),
        }
    }
}

impl StepStatus {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Passed => "passed",
            StepStatus::Failed => "failed",
            StepStatus::Blocked => "blocked",
        }
    }

    /// Whether this status finishes the step.
    pub fn is_final(&self) -> bool {
        !matches!(self, StepStatus::Pending)
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flowcase_core::models::StepStatus;
    ///
    /// assert_eq!(StepStatus::Passed.with_icon(), "✓ Passed");
    /// assert_eq!(StepStatus::Blocked.with_icon(), "⚠ Blocked");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            StepStatus::Pending => "○ Pending",
            StepStatus::Passed => "✓ Passed",
            StepStatus::Failed => "✗ Failed",
            StepStatus::Blocked => "⚠ Blocked",
        }
    }
}

/// Derived overall status of a test case or flow run entry.
///
/// `NoRun` exists only at this level: a case that has never been executed.
/// Every other value is the rollup of step statuses, see
/// [`crate::execution::aggregate_status`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    #[default]
    NoRun,
    Pending,
    Passed,
    Failed,
    Blocked,
}

impl FromStr for AggregateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "no_run" | "norun" | "no-run" => Ok(AggregateStatus::NoRun),
            "pending" => Ok(AggregateStatus::Pending),
            "passed" => Ok(AggregateStatus::Passed),
            "failed" => Ok(AggregateStatus::Failed),
            "blocked" => Ok(AggregateStatus::Blocked),
            _ => Err(format!("Invalid test status: {s}")),
        }
    }
}

impl AggregateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateStatus::NoRun => "no_run",
            AggregateStatus::Pending => "pending",
            AggregateStatus::Passed => "passed",
            AggregateStatus::Failed => "failed",
            AggregateStatus::Blocked => "blocked",
        }
    }

    pub fn with_icon(&self) -> &'static str {
        match self {
            AggregateStatus::NoRun => "– No Run",
            AggregateStatus::Pending => "○ Pending",
            AggregateStatus::Passed => "✓ Passed",
            AggregateStatus::Failed => "✗ Failed",
            AggregateStatus::Blocked => "⚠ Blocked",
        }
    }
}

/// Importance of a test case.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(format!("Invalid priority: {s}")),
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Lifecycle status of a flow run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum FlowRunStatus {
    /// Run is being prepared
    #[default]
    Draft,

    /// Test cases are being executed
    InProgress,

    /// Execution is finished
    Completed,

    /// Run is kept for reference only
    Archived,
}

impl FromStr for FlowRunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(FlowRunStatus::Draft),
            "in_progress" | "inprogress" | "in-progress" => Ok(FlowRunStatus::InProgress),
            "completed" => Ok(FlowRunStatus::Completed),
            "archived" => Ok(FlowRunStatus::Archived),
            _ => Err(format!("Invalid flow run status: {s}")),
        }
    }
}

impl FlowRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowRunStatus::Draft => "draft",
            FlowRunStatus::InProgress => "in_progress",
            FlowRunStatus::Completed => "completed",
            FlowRunStatus::Archived => "archived",
        }
    }
}
