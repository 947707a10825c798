//! Free-text and label filters over in-memory collections.

use std::collections::BTreeSet;

use jiff::Timestamp;

use super::{AggregateStatus, FlowRun, FlowRunStatus, Priority, TestCase, TestSuite};

/// Anything that carries labels.
pub trait Labeled {
    fn labels(&self) -> &[String];
}

impl Labeled for TestCase {
    fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl Labeled for TestSuite {
    fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl Labeled for FlowRun {
    fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Sorted, deduplicated set of labels used across `items`.
///
/// # Examples
///
/// ```rust
/// use flowcase_core::models::{filters::unique_labels, TestSuite};
/// use jiff::Timestamp;
///
/// let suite = |labels: &[&str]| TestSuite {
///     id: 1,
///     name: "Smoke".to_string(),
///     labels: labels.iter().map(|l| l.to_string()).collect(),
///     test_cases: vec![],
///     created_at: Timestamp::UNIX_EPOCH,
///     updated_at: Timestamp::UNIX_EPOCH,
/// };
/// let suites = vec![suite(&["ui", "login"]), suite(&["api", "login"])];
/// assert_eq!(unique_labels(&suites), vec!["api", "login", "ui"]);
/// ```
pub fn unique_labels<T: Labeled>(items: &[T]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.labels().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Case-insensitive substring match over any of `fields`. An empty query
/// matches everything.
fn matches_query(query: Option<&str>, fields: &[&str]) -> bool {
    match query.map(str::trim) {
        None | Some("") => true,
        Some(q) => {
            let needle = q.to_lowercase();
            fields
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        }
    }
}

/// An item matches when it carries at least one selected label. No selection
/// matches everything.
fn matches_labels(selected: &[String], labels: &[String]) -> bool {
    selected.is_empty() || selected.iter().any(|label| labels.contains(label))
}

/// Filter options for test case listings.
#[derive(Debug, Clone, Default)]
pub struct TestCaseFilter {
    /// Text searched in title and description
    pub query: Option<String>,
    pub labels: Vec<String>,
    pub priority: Option<Priority>,
    pub status: Option<AggregateStatus>,
}

impl TestCaseFilter {
    pub fn matches(&self, case: &TestCase) -> bool {
        matches_query(self.query.as_deref(), &[&case.title, &case.description])
            && matches_labels(&self.labels, &case.labels)
            && self.priority.map_or(true, |p| p == case.priority)
            && self.status.map_or(true, |s| s == case.status)
    }

    pub fn apply(&self, cases: Vec<TestCase>) -> Vec<TestCase> {
        cases.into_iter().filter(|c| self.matches(c)).collect()
    }
}

/// Filter options for suite listings.
#[derive(Debug, Clone, Default)]
pub struct SuiteFilter {
    /// Text searched in the suite name
    pub query: Option<String>,
    pub labels: Vec<String>,
}

impl SuiteFilter {
    pub fn matches(&self, suite: &TestSuite) -> bool {
        matches_query(self.query.as_deref(), &[&suite.name])
            && matches_labels(&self.labels, &suite.labels)
    }

    pub fn apply(&self, suites: Vec<TestSuite>) -> Vec<TestSuite> {
        suites.into_iter().filter(|s| self.matches(s)).collect()
    }
}

/// Filter options for flow run listings.
#[derive(Debug, Clone, Default)]
pub struct FlowRunFilter {
    /// Text searched in title and description
    pub query: Option<String>,
    pub labels: Vec<String>,
    pub status: Option<FlowRunStatus>,
    /// Only runs starting at or after this instant
    pub started_after: Option<Timestamp>,
    /// Only runs starting at or before this instant
    pub started_before: Option<Timestamp>,
    /// Exact tester name
    pub assigned_to: Option<String>,
}

impl FlowRunFilter {
    pub fn matches(&self, run: &FlowRun) -> bool {
        let in_range = match (self.started_after, self.started_before) {
            (None, None) => true,
            (after, before) => run.start_date.is_some_and(|start| {
                after.map_or(true, |a| start >= a) && before.map_or(true, |b| start <= b)
            }),
        };

        matches_query(self.query.as_deref(), &[&run.title, &run.description])
            && matches_labels(&self.labels, &run.labels)
            && self.status.map_or(true, |s| s == run.status)
            && in_range
            && self
                .assigned_to
                .as_ref()
                .map_or(true, |who| run.assigned_to.as_ref() == Some(who))
    }

    pub fn apply(&self, runs: Vec<FlowRun>) -> Vec<FlowRun> {
        runs.into_iter().filter(|r| self.matches(r)).collect()
    }
}

impl From<&crate::params::ListTestCases> for TestCaseFilter {
    fn from(params: &crate::params::ListTestCases) -> Self {
        Self {
            query: params.query.clone(),
            labels: params.labels.clone(),
            priority: params.priority,
            status: params.status,
        }
    }
}

impl From<&crate::params::ListSuites> for SuiteFilter {
    fn from(params: &crate::params::ListSuites) -> Self {
        Self {
            query: params.query.clone(),
            labels: params.labels.clone(),
        }
    }
}

impl TryFrom<&crate::params::ListFlowRuns> for FlowRunFilter {
    type Error = crate::TrackerError;

    /// Convert list parameters into a filter, parsing the date bounds.
    ///
    /// Bounds accept either an RFC 3339 timestamp or a plain `YYYY-MM-DD`
    /// date; a plain upper bound covers the whole day.
    fn try_from(params: &crate::params::ListFlowRuns) -> Result<Self, Self::Error> {
        use crate::params::parse_date_bound;

        Ok(Self {
            query: params.query.clone(),
            labels: params.labels.clone(),
            status: params.status,
            started_after: params
                .started_after
                .as_deref()
                .map(|s| parse_date_bound("started_after", s, false))
                .transpose()?,
            started_before: params
                .started_before
                .as_deref()
                .map(|s| parse_date_bound("started_before", s, true))
                .transpose()?,
            assigned_to: params.assigned_to.clone(),
        })
    }
}
