//! Command-line argument definitions using clap.
//!
//! Argument structs wrap the core parameter types and convert into them with
//! `From`, so core params stay free of clap attributes:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Tracker
//! ```

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use flowcase_core::{
    models::{AggregateStatus, FlowRunStatus, Priority, StepStatus},
    params::*,
};

/// Flowcase: manage test cases, suites and flow runs from the terminal
///
/// Test cases hold ordered steps with expected results. Flow runs snapshot
/// test cases and guide a tester through them step by step, rolling step
/// results up into an overall status. The `serve` command exposes the same
/// operations over MCP (Model Context Protocol).
#[derive(Parser)]
#[command(version, about, name = "flowcase")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/flowcase/flowcase.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage test cases and their steps
    #[command(alias = "c")]
    Case {
        #[command(subcommand)]
        command: CaseCommands,
    },
    /// Manage test suites
    #[command(alias = "s")]
    Suite {
        #[command(subcommand)]
        command: SuiteCommands,
    },
    /// Manage flow runs and execute their test cases
    #[command(alias = "r")]
    Run {
        #[command(subcommand)]
        command: RunCommands,
    },
    /// List every label in use
    Labels,
    /// Start the MCP server
    Serve,
}

// ============================================================================
// Value enums
// ============================================================================

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    High,
    Medium,
    Low,
}

impl From<PriorityArg> for Priority {
    fn from(val: PriorityArg) -> Self {
        match val {
            PriorityArg::High => Priority::High,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::Low => Priority::Low,
        }
    }
}

/// Result of a single step
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum StepStatusArg {
    /// Not evaluated yet
    Pending,
    /// Produced the expected result
    Passed,
    /// Produced a different result
    Failed,
    /// Could not be evaluated
    Blocked,
}

impl From<StepStatusArg> for StepStatus {
    fn from(val: StepStatusArg) -> Self {
        match val {
            StepStatusArg::Pending => StepStatus::Pending,
            StepStatusArg::Passed => StepStatus::Passed,
            StepStatusArg::Failed => StepStatus::Failed,
            StepStatusArg::Blocked => StepStatus::Blocked,
        }
    }
}

/// Overall status of a test case
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum CaseStatusArg {
    NoRun,
    Pending,
    Passed,
    Failed,
    Blocked,
}

impl From<CaseStatusArg> for AggregateStatus {
    fn from(val: CaseStatusArg) -> Self {
        match val {
            CaseStatusArg::NoRun => AggregateStatus::NoRun,
            CaseStatusArg::Pending => AggregateStatus::Pending,
            CaseStatusArg::Passed => AggregateStatus::Passed,
            CaseStatusArg::Failed => AggregateStatus::Failed,
            CaseStatusArg::Blocked => AggregateStatus::Blocked,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum RunStatusArg {
    Draft,
    InProgress,
    Completed,
    Archived,
}

impl From<RunStatusArg> for FlowRunStatus {
    fn from(val: RunStatusArg) -> Self {
        match val {
            RunStatusArg::Draft => FlowRunStatus::Draft,
            RunStatusArg::InProgress => FlowRunStatus::InProgress,
            RunStatusArg::Completed => FlowRunStatus::Completed,
            RunStatusArg::Archived => FlowRunStatus::Archived,
        }
    }
}

/// Parse a `--step` value of the form `description::expected result`.
///
/// The expected result is optional.
fn parse_step(value: &str) -> Result<NewStep, String> {
    let (description, expected) = match value.split_once("::") {
        Some((description, expected)) => (description.trim(), expected.trim()),
        None => (value.trim(), ""),
    };
    if description.is_empty() {
        return Err("step description cannot be empty".to_string());
    }
    Ok(NewStep::new(description, expected))
}

/// A single numeric ID argument
#[derive(ClapArgs)]
pub struct IdArgs {
    #[arg(help = "Unique identifier")]
    pub id: u64,
}

impl From<IdArgs> for Id {
    fn from(val: IdArgs) -> Self {
        Id { id: val.id }
    }
}

/// Delete a record permanently
#[derive(ClapArgs)]
pub struct DeleteArgs {
    #[arg(help = "Unique identifier of the record to permanently delete")]
    pub id: u64,
    /// Confirm the deletion (required to prevent accidental deletion)
    #[arg(long)]
    pub confirm: bool,
}

// ============================================================================
// Test cases
// ============================================================================

/// Create a new test case
#[derive(ClapArgs)]
pub struct CreateCaseArgs {
    /// Title of the test case
    pub title: String,
    #[arg(short, long, default_value = "", help = "Detailed description")]
    pub description: String,
    #[arg(short, long, value_enum, default_value = "medium")]
    pub priority: PriorityArg,
    #[arg(short, long, value_delimiter = ',', help = "Labels as comma-separated list")]
    pub labels: Vec<String>,
    /// Steps in order, each as "description::expected result"
    #[arg(short, long = "step", value_parser = parse_step)]
    pub steps: Vec<NewStep>,
}

impl From<CreateCaseArgs> for CreateTestCase {
    fn from(val: CreateCaseArgs) -> Self {
        CreateTestCase {
            title: val.title,
            description: val.description,
            priority: val.priority.into(),
            labels: val.labels,
            steps: val.steps,
        }
    }
}

/// List test cases
#[derive(ClapArgs)]
pub struct ListCasesArgs {
    #[arg(short, long, help = "Text searched in title and description")]
    pub query: Option<String>,
    #[arg(short, long, value_delimiter = ',', help = "Show cases with any of these labels")]
    pub labels: Vec<String>,
    #[arg(short, long, value_enum)]
    pub priority: Option<PriorityArg>,
    #[arg(short, long, value_enum)]
    pub status: Option<CaseStatusArg>,
}

impl From<ListCasesArgs> for ListTestCases {
    fn from(val: ListCasesArgs) -> Self {
        ListTestCases {
            query: val.query,
            labels: val.labels,
            priority: val.priority.map(Into::into),
            status: val.status.map(Into::into),
        }
    }
}

/// Update a test case
///
/// Passing any --step replaces all steps and resets the case to no_run.
#[derive(ClapArgs)]
pub struct UpdateCaseArgs {
    pub id: u64,
    #[arg(short, long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(short, long, value_enum)]
    pub priority: Option<PriorityArg>,
    #[arg(short, long, value_delimiter = ',', help = "Replacement labels")]
    pub labels: Option<Vec<String>>,
    /// Replacement steps, each as "description::expected result"
    #[arg(short, long = "step", value_parser = parse_step)]
    pub steps: Vec<NewStep>,
}

impl From<UpdateCaseArgs> for UpdateTestCase {
    fn from(val: UpdateCaseArgs) -> Self {
        UpdateTestCase {
            id: val.id,
            title: val.title,
            description: val.description,
            priority: val.priority.map(Into::into),
            labels: val.labels,
            steps: (!val.steps.is_empty()).then_some(val.steps),
        }
    }
}

/// Update a single step of a test case
#[derive(ClapArgs)]
pub struct UpdateStepArgs {
    #[arg(help = "Step ID as shown by 'case show'")]
    pub id: u64,
    #[arg(short, long, value_enum)]
    pub status: Option<StepStatusArg>,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(short, long)]
    pub expected: Option<String>,
    #[arg(short, long, help = "What actually happened")]
    pub actual: Option<String>,
    #[arg(short, long)]
    pub comments: Option<String>,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Attachment references (file paths, URLs) as comma-separated list"
    )]
    pub attachments: Option<Vec<String>>,
}

impl From<UpdateStepArgs> for UpdateTestStep {
    fn from(val: UpdateStepArgs) -> Self {
        UpdateTestStep {
            id: val.id,
            status: val.status.map(Into::into),
            description: val.description,
            expected_result: val.expected,
            actual_result: val.actual,
            comments: val.comments,
            attachments: val.attachments,
        }
    }
}

#[derive(Subcommand)]
pub enum CaseCommands {
    /// Create a new test case
    #[command(alias = "c")]
    Create(CreateCaseArgs),
    /// List test cases
    #[command(aliases = ["l", "ls"])]
    List(ListCasesArgs),
    /// Show a test case with its steps
    #[command(alias = "s")]
    Show(IdArgs),
    /// Update a test case
    #[command(alias = "u")]
    Update(UpdateCaseArgs),
    /// Delete a test case permanently
    #[command(aliases = ["d", "rm"])]
    Delete(DeleteArgs),
    /// Show a single step
    Step(IdArgs),
    /// Update a single step; a status change recomputes the case status
    #[command(alias = "us")]
    UpdateStep(UpdateStepArgs),
}

// ============================================================================
// Suites
// ============================================================================

/// Create a new test suite
#[derive(ClapArgs)]
pub struct CreateSuiteArgs {
    /// Name of the suite
    pub name: String,
    #[arg(short, long, value_delimiter = ',')]
    pub labels: Vec<String>,
    #[arg(short, long, value_delimiter = ',', help = "Member test case IDs")]
    pub cases: Vec<u64>,
}

impl From<CreateSuiteArgs> for CreateSuite {
    fn from(val: CreateSuiteArgs) -> Self {
        CreateSuite {
            name: val.name,
            labels: val.labels,
            test_cases: val.cases,
        }
    }
}

/// List test suites
#[derive(ClapArgs)]
pub struct ListSuitesArgs {
    #[arg(short, long, help = "Text searched in the suite name")]
    pub query: Option<String>,
    #[arg(short, long, value_delimiter = ',')]
    pub labels: Vec<String>,
}

impl From<ListSuitesArgs> for ListSuites {
    fn from(val: ListSuitesArgs) -> Self {
        ListSuites {
            query: val.query,
            labels: val.labels,
        }
    }
}

/// Rename or relabel a suite
#[derive(ClapArgs)]
pub struct UpdateSuiteArgs {
    pub id: u64,
    #[arg(short, long)]
    pub name: Option<String>,
    #[arg(short, long, value_delimiter = ',', help = "Replacement labels")]
    pub labels: Option<Vec<String>>,
}

impl From<UpdateSuiteArgs> for UpdateSuite {
    fn from(val: UpdateSuiteArgs) -> Self {
        UpdateSuite {
            id: val.id,
            name: val.name,
            labels: val.labels,
        }
    }
}

/// A test case inside a suite
#[derive(ClapArgs)]
pub struct SuiteMemberArgs {
    pub suite_id: u64,
    pub test_case_id: u64,
}

impl From<SuiteMemberArgs> for SuiteMembership {
    fn from(val: SuiteMemberArgs) -> Self {
        SuiteMembership {
            suite_id: val.suite_id,
            test_case_id: val.test_case_id,
        }
    }
}

#[derive(Subcommand)]
pub enum SuiteCommands {
    /// Create a new test suite
    #[command(alias = "c")]
    Create(CreateSuiteArgs),
    /// List test suites
    #[command(aliases = ["l", "ls"])]
    List(ListSuitesArgs),
    /// Show a suite with its test cases
    #[command(alias = "s")]
    Show(IdArgs),
    /// Rename or relabel a suite
    #[command(alias = "u")]
    Update(UpdateSuiteArgs),
    /// Delete a suite; its test cases are kept
    #[command(aliases = ["d", "rm"])]
    Delete(DeleteArgs),
    /// Add a test case to a suite
    #[command(alias = "a")]
    Add(SuiteMemberArgs),
    /// Remove a test case from a suite
    Remove(SuiteMemberArgs),
}

// ============================================================================
// Flow runs
// ============================================================================

/// Create a new flow run
#[derive(ClapArgs)]
pub struct CreateRunArgs {
    /// Title of the flow run
    pub title: String,
    #[arg(short, long, default_value = "")]
    pub description: String,
    #[arg(short, long, value_enum)]
    pub status: Option<RunStatusArg>,
    #[arg(long, help = "Start date (YYYY-MM-DD or RFC 3339)")]
    pub start: Option<String>,
    #[arg(long, help = "End date (YYYY-MM-DD or RFC 3339)")]
    pub end: Option<String>,
    #[arg(short, long, value_delimiter = ',')]
    pub labels: Vec<String>,
    #[arg(short, long, help = "Tester responsible for the run")]
    pub assignee: Option<String>,
    #[arg(short, long, value_delimiter = ',', help = "Test case IDs to include")]
    pub cases: Vec<u64>,
}

impl From<CreateRunArgs> for CreateFlowRun {
    fn from(val: CreateRunArgs) -> Self {
        CreateFlowRun {
            title: val.title,
            description: val.description,
            status: val.status.map(Into::into),
            start_date: val.start,
            end_date: val.end,
            labels: val.labels,
            assigned_to: val.assignee,
            test_cases: val.cases,
        }
    }
}

/// List flow runs, newest start date first
#[derive(ClapArgs, Default)]
pub struct ListRunsArgs {
    #[arg(short, long, help = "Text searched in title and description")]
    pub query: Option<String>,
    #[arg(short, long, value_delimiter = ',')]
    pub labels: Vec<String>,
    #[arg(short, long, value_enum)]
    pub status: Option<RunStatusArg>,
    #[arg(long, help = "Only runs starting on or after this date")]
    pub after: Option<String>,
    #[arg(long, help = "Only runs starting on or before this date")]
    pub before: Option<String>,
    #[arg(short, long)]
    pub assignee: Option<String>,
}

impl From<ListRunsArgs> for ListFlowRuns {
    fn from(val: ListRunsArgs) -> Self {
        ListFlowRuns {
            query: val.query,
            labels: val.labels,
            status: val.status.map(Into::into),
            started_after: val.after,
            started_before: val.before,
            assigned_to: val.assignee,
        }
    }
}

/// Update a flow run
#[derive(ClapArgs)]
pub struct UpdateRunArgs {
    pub id: u64,
    #[arg(short, long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(short, long, value_enum)]
    pub status: Option<RunStatusArg>,
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub end: Option<String>,
    #[arg(short, long, value_delimiter = ',', help = "Replacement labels")]
    pub labels: Option<Vec<String>>,
    #[arg(short, long)]
    pub assignee: Option<String>,
}

impl From<UpdateRunArgs> for UpdateFlowRun {
    fn from(val: UpdateRunArgs) -> Self {
        UpdateFlowRun {
            id: val.id,
            title: val.title,
            description: val.description,
            status: val.status.map(Into::into),
            start_date: val.start,
            end_date: val.end,
            labels: val.labels,
            assigned_to: val.assignee,
        }
    }
}

/// A test case inside a flow run
#[derive(ClapArgs)]
pub struct RunMemberArgs {
    pub run_id: u64,
    pub test_case_id: u64,
}

impl From<RunMemberArgs> for RunMembership {
    fn from(val: RunMemberArgs) -> Self {
        RunMembership {
            flow_run_id: val.run_id,
            test_case_id: val.test_case_id,
        }
    }
}

/// Add every test case of a suite to a flow run
#[derive(ClapArgs)]
pub struct AddSuiteArgs {
    pub run_id: u64,
    pub suite_id: u64,
}

impl From<AddSuiteArgs> for AddSuiteToRun {
    fn from(val: AddSuiteArgs) -> Self {
        AddSuiteToRun {
            flow_run_id: val.run_id,
            suite_id: val.suite_id,
        }
    }
}

/// A flow run entry ID argument
#[derive(ClapArgs)]
pub struct EntryArgs {
    #[arg(help = "Entry ID as shown by 'run show'")]
    pub entry_id: u64,
}

impl From<EntryArgs> for EntryId {
    fn from(val: EntryArgs) -> Self {
        EntryId {
            entry_id: val.entry_id,
        }
    }
}

/// Replace the notes of an entry
#[derive(ClapArgs)]
pub struct NotesArgs {
    pub entry_id: u64,
    pub notes: String,
}

impl From<NotesArgs> for EntryNotes {
    fn from(val: NotesArgs) -> Self {
        EntryNotes {
            entry_id: val.entry_id,
            notes: val.notes,
        }
    }
}

/// Start executing an entry from its first step
#[derive(ClapArgs)]
pub struct StartArgs {
    pub entry_id: u64,
    #[arg(short, long, help = "Name of the tester")]
    pub by: Option<String>,
}

impl From<StartArgs> for StartExecution {
    fn from(val: StartArgs) -> Self {
        StartExecution {
            entry_id: val.entry_id,
            executed_by: val.by,
        }
    }
}

/// Record the result of the current step
#[derive(ClapArgs)]
pub struct RecordArgs {
    pub entry_id: u64,
    /// Step number as shown in the session (1 = first step)
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub step: u32,
    #[arg(value_enum)]
    pub status: StepStatusArg,
    #[arg(short, long, help = "What actually happened")]
    pub actual: Option<String>,
    #[arg(short, long)]
    pub comments: Option<String>,
}

impl From<RecordArgs> for RecordStep {
    fn from(val: RecordArgs) -> Self {
        RecordStep {
            entry_id: val.entry_id,
            step_index: val.step.saturating_sub(1) as usize,
            status: val.status.into(),
            actual_result: val.actual,
            comments: val.comments,
        }
    }
}

#[derive(Subcommand)]
pub enum RunCommands {
    /// Create a new flow run
    #[command(alias = "c")]
    Create(CreateRunArgs),
    /// List flow runs
    #[command(aliases = ["l", "ls"])]
    List(ListRunsArgs),
    /// Show a flow run with its entries and metrics
    #[command(alias = "s")]
    Show(IdArgs),
    /// Update a flow run
    #[command(alias = "u")]
    Update(UpdateRunArgs),
    /// Delete a flow run permanently
    #[command(aliases = ["d", "rm"])]
    Delete(DeleteArgs),
    /// Add a test case to a flow run (re-adding refreshes its snapshot)
    #[command(alias = "a")]
    Add(RunMemberArgs),
    /// Add every test case of a suite to a flow run
    AddSuite(AddSuiteArgs),
    /// Remove a test case from a flow run
    Remove(RunMemberArgs),
    /// Show a single entry with its steps
    #[command(alias = "e")]
    Entry(EntryArgs),
    /// Replace the notes of an entry
    Notes(NotesArgs),
    /// Show status counts of a flow run
    #[command(alias = "m")]
    Metrics(IdArgs),
    /// Start executing an entry from its first step
    Start(StartArgs),
    /// Record the result of the current step
    Record(RecordArgs),
    /// Pause a running entry
    Pause(EntryArgs),
    /// Resume an entry at its first pending step
    Resume(EntryArgs),
    /// Leave an entry's session; an unfinished entry stays pending
    Exit(EntryArgs),
    /// Copy an entry's results back to its test case
    Apply(EntryArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_step_with_expected_result() {
        let step = parse_step("Open the page :: Page loads").unwrap();
        assert_eq!(step.description, "Open the page");
        assert_eq!(step.expected_result, "Page loads");
    }

    #[test]
    fn test_parse_step_without_expected_result() {
        let step = parse_step("Click submit").unwrap();
        assert_eq!(step.description, "Click submit");
        assert!(step.expected_result.is_empty());
    }

    #[test]
    fn test_parse_step_rejects_empty_description() {
        assert!(parse_step(" :: Page loads").is_err());
    }

    #[test]
    fn test_record_args_use_one_based_steps() {
        let params = RecordStep::from(RecordArgs {
            entry_id: 4,
            step: 2,
            status: StepStatusArg::Failed,
            actual: None,
            comments: None,
        });
        assert_eq!(params.step_index, 1);
        assert_eq!(params.status, StepStatus::Failed);
    }

    #[test]
    fn test_args_parse() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
