//! Flow run metrics and summaries.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{AggregateStatus, FlowRun, FlowRunStatus};

/// Counts of entry statuses within a flow run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowRunMetrics {
    pub passed: u32,
    pub failed: u32,
    pub blocked: u32,
    pub pending: u32,
    pub no_run: u32,
    pub total: u32,
}

impl FlowRunMetrics {
    /// Tallies a sequence of entry statuses.
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = AggregateStatus>,
    {
        statuses.into_iter().fold(Self::default(), |mut acc, status| {
            match status {
                AggregateStatus::Passed => acc.passed += 1,
                AggregateStatus::Failed => acc.failed += 1,
                AggregateStatus::Blocked => acc.blocked += 1,
                AggregateStatus::Pending => acc.pending += 1,
                AggregateStatus::NoRun => acc.no_run += 1,
            }
            acc.total += 1;
            acc
        })
    }

    /// Share of `value` in the total, rounded to a whole percent.
    pub fn percentage(&self, value: u32) -> u32 {
        if self.total == 0 {
            0
        } else {
            ((f64::from(value) / f64::from(self.total)) * 100.0).round() as u32
        }
    }

    /// Number of entries with a final result.
    pub fn executed(&self) -> u32 {
        self.passed + self.failed + self.blocked
    }
}

impl From<&FlowRun> for FlowRunMetrics {
    fn from(run: &FlowRun) -> Self {
        Self::from_statuses(run.entries.iter().map(|entry| entry.status))
    }
}

/// Summary information about a flow run with entry statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRunSummary {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: FlowRunStatus,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub labels: Vec<String>,
    pub assigned_to: Option<String>,
    pub created_at: Timestamp,
    pub metrics: FlowRunMetrics,
}

impl From<&FlowRun> for FlowRunSummary {
    fn from(run: &FlowRun) -> Self {
        Self {
            id: run.id,
            title: run.title.clone(),
            description: run.description.clone(),
            status: run.status,
            start_date: run.start_date,
            end_date: run.end_date,
            labels: run.labels.clone(),
            assigned_to: run.assigned_to.clone(),
            created_at: run.created_at,
            metrics: run.into(),
        }
    }
}
