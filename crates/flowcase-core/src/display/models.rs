//! Display implementations for domain models.
//!
//! Everything renders as markdown so the CLI can pass it through the terminal
//! renderer and the MCP server can return it verbatim.

use std::fmt;

use super::datetime::{LocalDate, LocalDateTime};
use crate::{
    execution::{ExecutionPhase, ExecutionReport},
    models::{
        AggregateStatus, FlowRun, FlowRunEntry, FlowRunMetrics, FlowRunStatus, FlowRunSummary,
        Priority, StepStatus, SuiteWithCases, TestCase, TestStep, TestSuite,
    },
};

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for AggregateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for FlowRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn fmt_labels(f: &mut fmt::Formatter<'_>, labels: &[String]) -> fmt::Result {
    if !labels.is_empty() {
        writeln!(f, "- Labels: {}", labels.join(", "))?;
    }
    Ok(())
}

impl fmt::Display for TestStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({})",
            self.order + 1,
            self.description,
            self.status.with_icon()
        )?;
        writeln!(f)?;
        writeln!(f, "- Step ID: {}", self.id)?;
        if !self.expected_result.is_empty() {
            writeln!(f, "- Expected: {}", self.expected_result)?;
        }
        if !self.actual_result.is_empty() {
            writeln!(f, "- Actual: {}", self.actual_result)?;
        }
        if let Some(comments) = &self.comments {
            writeln!(f, "- Comments: {comments}")?;
        }
        if let Some(executed_at) = &self.executed_at {
            writeln!(f, "- Executed: {}", LocalDateTime(executed_at))?;
        }
        if !self.attachments.is_empty() {
            writeln!(f, "- Attachments:")?;
            for attachment in &self.attachments {
                writeln!(f, "  - {attachment}")?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.display_id(), self.title)?;
        writeln!(f)?;

        writeln!(f, "- Status: {}", self.status.with_icon())?;
        writeln!(f, "- Priority: {}", self.priority)?;
        fmt_labels(f, &self.labels)?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        if !self.description.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.description)?;
        }

        if self.steps.is_empty() {
            writeln!(f, "\nNo steps in this test case.")?;
        } else {
            writeln!(f, "\n## Steps")?;
            writeln!(f)?;
            for step in &self.steps {
                write!(f, "{step}")?;
            }
        }

        Ok(())
    }
}

impl TestCase {
    /// Compact listing form used by collections.
    pub(crate) fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## {}. {} ({})",
            self.display_id(),
            self.title,
            self.status.with_icon()
        )?;
        writeln!(f)?;
        writeln!(f, "- **Priority**: {}", self.priority)?;
        if !self.labels.is_empty() {
            writeln!(f, "- **Labels**: {}", self.labels.join(", "))?;
        }
        writeln!(f, "- **Steps**: {}", self.steps.len())?;
        writeln!(f)
    }
}

impl fmt::Display for TestSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.display_id(), self.name)?;
        writeln!(f)?;
        fmt_labels(f, &self.labels)?;
        if self.test_cases.is_empty() {
            writeln!(f, "- Test cases: none")?;
        } else {
            let ids: Vec<String> = self.test_cases.iter().map(|id| format!("TC-{id}")).collect();
            writeln!(f, "- Test cases: {}", ids.join(", "))?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))
    }
}

impl TestSuite {
    pub(crate) fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## {}. {} ({} test cases)",
            self.display_id(),
            self.name,
            self.test_cases.len()
        )?;
        writeln!(f)?;
        if !self.labels.is_empty() {
            writeln!(f, "- **Labels**: {}", self.labels.join(", "))?;
        }
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)
    }
}

impl fmt::Display for SuiteWithCases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suite = &self.suite;
        writeln!(f, "# {}. {}", suite.display_id(), suite.name)?;
        writeln!(f)?;
        fmt_labels(f, &suite.labels)?;
        writeln!(f, "- Created: {}", LocalDateTime(&suite.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&suite.updated_at))?;

        if self.cases.is_empty() {
            writeln!(f, "\nNo test cases in this suite.")
        } else {
            writeln!(f, "\n## Test Cases")?;
            writeln!(f)?;
            for case in &self.cases {
                writeln!(
                    f,
                    "- {} {} ({}, {})",
                    case.display_id(),
                    case.title,
                    case.status.with_icon(),
                    case.priority
                )?;
            }
            Ok(())
        }
    }
}

impl fmt::Display for FlowRunMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "| Status | Count | Share |")?;
        writeln!(f, "|---|---:|---:|")?;
        for (status, count) in [
            (AggregateStatus::Passed, self.passed),
            (AggregateStatus::Failed, self.failed),
            (AggregateStatus::Blocked, self.blocked),
            (AggregateStatus::Pending, self.pending),
            (AggregateStatus::NoRun, self.no_run),
        ] {
            writeln!(
                f,
                "| {} | {} | {}% |",
                status.with_icon(),
                count,
                self.percentage(count)
            )?;
        }
        writeln!(f, "| Total | {} | |", self.total)
    }
}

impl fmt::Display for FlowRunEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## Entry {}: {}. {} ({})",
            self.id,
            self.case_display_id(),
            self.title,
            self.status.with_icon()
        )?;
        writeln!(f)?;

        let total = self.steps.len();
        match self.execution_state().phase() {
            ExecutionPhase::Running(i) => {
                writeln!(f, "- Session: running at step {} of {total}", i + 1)?
            }
            ExecutionPhase::Paused(i) => {
                writeln!(f, "- Session: paused at step {} of {total}", i + 1)?
            }
            ExecutionPhase::Idle | ExecutionPhase::Terminal(_) => {
                writeln!(f, "- Session: not running")?
            }
        }
        if let Some(executed_by) = &self.executed_by {
            writeln!(f, "- Executed by: {executed_by}")?;
        }
        if let Some(start) = &self.start_time {
            writeln!(f, "- Started: {}", LocalDateTime(start))?;
        }
        if let Some(end) = &self.end_time {
            writeln!(f, "- Finished: {}", LocalDateTime(end))?;
        }

        if !self.notes.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.notes)?;
        }

        if !self.steps.is_empty() {
            writeln!(f)?;
            for step in &self.steps {
                write!(f, "{step}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for FlowRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.display_id(), self.title)?;
        writeln!(f)?;

        writeln!(f, "- Status: {}", self.status)?;
        writeln!(f, "- Start: {}", LocalDate(self.start_date.as_ref()))?;
        writeln!(f, "- End: {}", LocalDate(self.end_date.as_ref()))?;
        if let Some(assigned_to) = &self.assigned_to {
            writeln!(f, "- Assigned to: {assigned_to}")?;
        }
        fmt_labels(f, &self.labels)?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        if !self.description.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.description)?;
        }

        if self.entries.is_empty() {
            return writeln!(f, "\nNo test cases in this flow run.");
        }

        writeln!(f, "\n## Metrics")?;
        writeln!(f)?;
        write!(f, "{}", FlowRunMetrics::from(self))?;

        writeln!(f, "\n## Test Cases")?;
        writeln!(f)?;
        for entry in &self.entries {
            let executed = entry.steps.iter().filter(|s| s.status.is_final()).count();
            let marker = if entry.is_running { " ▶" } else { "" };
            writeln!(
                f,
                "- Entry {}: {}. {} ({}, {executed}/{} steps){marker}",
                entry.id,
                entry.case_display_id(),
                entry.title,
                entry.status.with_icon(),
                entry.steps.len()
            )?;
        }

        Ok(())
    }
}

impl fmt::Display for FlowRunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## FR-{}. {} ({})", self.id, self.title, self.status)?;
        writeln!(f)?;

        if !self.description.is_empty() {
            writeln!(f, "- **Description**: {}", self.description)?;
        }
        writeln!(
            f,
            "- **Dates**: {} → {}",
            LocalDate(self.start_date.as_ref()),
            LocalDate(self.end_date.as_ref())
        )?;
        if let Some(assigned_to) = &self.assigned_to {
            writeln!(f, "- **Assigned to**: {assigned_to}")?;
        }
        if !self.labels.is_empty() {
            writeln!(f, "- **Labels**: {}", self.labels.join(", "))?;
        }

        let m = &self.metrics;
        writeln!(
            f,
            "- **Progress**: {}/{} executed ({} passed, {} failed, {} blocked, {} pending, {} not run)",
            m.executed(),
            m.total,
            m.passed,
            m.failed,
            m.blocked,
            m.pending,
            m.no_run
        )?;
        writeln!(f)
    }
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.entry.execution_state();
        let total = state.steps.len();

        match state.phase() {
            ExecutionPhase::Running(i) => {
                writeln!(f, "Execution running: step {} of {total}", i + 1)?;
                if let Some(step) = state.steps.get(i) {
                    writeln!(f)?;
                    writeln!(f, "**Next:** {}", step.description)?;
                    if !step.expected_result.is_empty() {
                        writeln!(f)?;
                        writeln!(f, "**Expected:** {}", step.expected_result)?;
                    }
                }
            }
            ExecutionPhase::Paused(i) => {
                writeln!(f, "Execution paused at step {} of {total}", i + 1)?
            }
            ExecutionPhase::Terminal(outcome) if self.terminal => {
                writeln!(f, "Execution finished: {}", outcome.with_icon())?
            }
            ExecutionPhase::Terminal(_) | ExecutionPhase::Idle => {
                writeln!(f, "Execution stopped ({})", self.entry.status.with_icon())?
            }
        }

        writeln!(f)?;
        write!(f, "{}", self.entry)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;

    fn ts() -> Timestamp {
        Timestamp::from_second(1_704_067_200).unwrap() // 2024-01-01 00:00:00 UTC
    }

    fn step(order: u32, status: StepStatus) -> TestStep {
        let mut step = TestStep::pending(order, format!("Do thing {order}"), "It works");
        step.id = u64::from(order) + 10;
        step.status = status;
        step
    }

    fn entry(statuses: &[StepStatus]) -> FlowRunEntry {
        FlowRunEntry {
            id: 3,
            flow_run_id: 1,
            test_case_id: 7,
            title: "Checkout".to_string(),
            status: AggregateStatus::Pending,
            notes: String::new(),
            steps: statuses
                .iter()
                .enumerate()
                .map(|(i, s)| step(i as u32, *s))
                .collect(),
            current_step: None,
            is_running: false,
            is_finished: false,
            start_time: None,
            end_time: None,
            executed_by: Some("ana".to_string()),
            created_at: ts(),
            updated_at: ts(),
        }
    }

    #[test]
    fn test_step_display() {
        let mut s = step(1, StepStatus::Failed);
        s.actual_result = "Error 500".to_string();
        s.comments = Some("Only on staging".to_string());
        let output = s.to_string();

        assert!(output.starts_with("### 2. Do thing 1 (✗ Failed)"));
        assert!(output.contains("- Step ID: 11"));
        assert!(output.contains("- Expected: It works"));
        assert!(output.contains("- Actual: Error 500"));
        assert!(output.contains("- Comments: Only on staging"));
    }

    #[test]
    fn test_metrics_table() {
        let metrics = FlowRunMetrics::from_statuses([
            AggregateStatus::Passed,
            AggregateStatus::Passed,
            AggregateStatus::Failed,
            AggregateStatus::NoRun,
        ]);
        let output = metrics.to_string();

        assert!(output.contains("| ✓ Passed | 2 | 50% |"));
        assert!(output.contains("| ✗ Failed | 1 | 25% |"));
        assert!(output.contains("| – No Run | 1 | 25% |"));
        assert!(output.contains("| Total | 4 | |"));
    }

    #[test]
    fn test_entry_display_running() {
        let mut e = entry(&[StepStatus::Passed, StepStatus::Pending]);
        e.current_step = Some(1);
        e.is_running = true;
        let output = e.to_string();

        assert!(output.contains("## Entry 3: TC-7. Checkout (○ Pending)"));
        assert!(output.contains("running at step 2 of 2"));
        assert!(output.contains("Executed by: ana"));
    }

    #[test]
    fn test_execution_report_running_shows_next_step() {
        let mut e = entry(&[StepStatus::Passed, StepStatus::Pending]);
        e.current_step = Some(1);
        e.is_running = true;
        let report = ExecutionReport {
            entry: e,
            terminal: false,
            aggregate: AggregateStatus::Pending,
        };
        let output = report.to_string();

        assert!(output.starts_with("Execution running: step 2 of 2"));
        assert!(output.contains("**Next:** Do thing 1"));
    }

    #[test]
    fn test_execution_report_finished() {
        let mut e = entry(&[StepStatus::Passed, StepStatus::Blocked]);
        e.status = AggregateStatus::Blocked;
        let report = ExecutionReport {
            entry: e,
            terminal: true,
            aggregate: AggregateStatus::Blocked,
        };

        assert!(report
            .to_string()
            .starts_with("Execution finished: ⚠ Blocked"));
    }

    #[test]
    fn test_flow_run_display_lists_entries() {
        let mut e = entry(&[StepStatus::Passed, StepStatus::Pending]);
        e.is_running = true;
        e.current_step = Some(1);
        let run = FlowRun {
            id: 1,
            title: "Release 3".to_string(),
            description: "Regression pass".to_string(),
            status: FlowRunStatus::InProgress,
            start_date: Some(ts()),
            end_date: None,
            labels: vec!["release".to_string()],
            assigned_to: None,
            created_at: ts(),
            updated_at: ts(),
            entries: vec![e],
        };
        let output = run.to_string();

        assert!(output.starts_with("# FR-1. Release 3"));
        assert!(output.contains("- Status: in_progress"));
        assert!(output.contains("- End: -"));
        assert!(output.contains("## Metrics"));
        assert!(output.contains("Entry 3: TC-7. Checkout (○ Pending, 1/2 steps) ▶"));
    }
}
