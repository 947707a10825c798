//! MCP server implementation for Flowcase
//!
//! Exposes test case, suite and flow run management plus guided step
//! execution as Model Context Protocol tools over stdio.

use std::future::Future;

use anyhow::Result;
use flowcase_core::Tracker;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use tokio::signal::unix::{signal, SignalKind};

pub mod errors;
pub mod handlers;

pub use handlers::{
    AddSuiteToRun, CreateFlowRun, CreateSuite, CreateTestCase, EntryId, EntryNotes, Id,
    ListFlowRuns, ListSuites, ListTestCases, McpResult, RecordStep, RunMembership,
    StartExecution, SuiteMembership, UpdateFlowRun, UpdateSuite, UpdateTestCase, UpdateTestStep,
};

/// MCP server for Flowcase
#[derive(Clone)]
pub struct FlowcaseMcpServer {
    tracker: Tracker,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl FlowcaseMcpServer {
    /// Create a new Flowcase MCP server
    pub fn new(tracker: Tracker) -> Self {
        Self {
            tracker,
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> handlers::McpHandlers {
        handlers::McpHandlers::new(self.tracker.clone())
    }

    #[tool(
        name = "create_test_case",
        description = "Create a test case with a title (required), optional description, priority (high/medium/low, default medium), labels and an ordered list of steps. Each step needs a description and an expected result. Returns the new TC-id."
    )]
    async fn create_test_case(&self, params: Parameters<CreateTestCase>) -> McpResult {
        self.handlers().create_test_case(params).await
    }

    #[tool(
        name = "list_test_cases",
        description = "List test cases. Filter by free-text query (title and description), labels (any may match), priority, or aggregate status (no_run/pending/passed/failed/blocked). Returns a table with IDs, titles, priorities and statuses."
    )]
    async fn list_test_cases(&self, params: Parameters<ListTestCases>) -> McpResult {
        self.handlers().list_test_cases(params).await
    }

    #[tool(
        name = "show_test_case",
        description = "Show a test case with its labels, aggregate status and every step with expected result, actual result, status and comments."
    )]
    async fn show_test_case(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_test_case(params).await
    }

    #[tool(
        name = "update_test_case",
        description = "Update fields of a test case. Only provided fields change. Providing steps replaces the whole step list, which resets step results."
    )]
    async fn update_test_case(&self, params: Parameters<UpdateTestCase>) -> McpResult {
        self.handlers().update_test_case(params).await
    }

    #[tool(
        name = "delete_test_case",
        description = "Permanently delete a test case and its steps. The case is removed from every suite; flow run entries keep their snapshot. This cannot be undone."
    )]
    async fn delete_test_case(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().delete_test_case(params).await
    }

    #[tool(
        name = "show_step",
        description = "Show a single test step by its step ID."
    )]
    async fn show_step(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_step(params).await
    }

    #[tool(
        name = "update_step",
        description = "Update one step directly: description, expected result, actual result, status (pending/passed/failed/blocked), comments or attachments. The case's aggregate status is recomputed."
    )]
    async fn update_step(&self, params: Parameters<UpdateTestStep>) -> McpResult {
        self.handlers().update_step(params).await
    }

    #[tool(
        name = "create_suite",
        description = "Create a test suite: a named, labelled collection of test cases. Optionally pass the IDs of test cases to include."
    )]
    async fn create_suite(&self, params: Parameters<CreateSuite>) -> McpResult {
        self.handlers().create_suite(params).await
    }

    #[tool(
        name = "list_suites",
        description = "List test suites, optionally filtered by a free-text query or labels."
    )]
    async fn list_suites(&self, params: Parameters<ListSuites>) -> McpResult {
        self.handlers().list_suites(params).await
    }

    #[tool(
        name = "show_suite",
        description = "Show a test suite and the test cases it contains with their aggregate statuses."
    )]
    async fn show_suite(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_suite(params).await
    }

    #[tool(
        name = "update_suite",
        description = "Update a suite's name, description or labels. Only provided fields change."
    )]
    async fn update_suite(&self, params: Parameters<UpdateSuite>) -> McpResult {
        self.handlers().update_suite(params).await
    }

    #[tool(
        name = "delete_suite",
        description = "Permanently delete a test suite. Its test cases are kept. This cannot be undone."
    )]
    async fn delete_suite(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().delete_suite(params).await
    }

    #[tool(
        name = "add_case_to_suite",
        description = "Add a test case to a suite. Adding a case that is already a member changes nothing."
    )]
    async fn add_case_to_suite(&self, params: Parameters<SuiteMembership>) -> McpResult {
        self.handlers().add_case_to_suite(params).await
    }

    #[tool(
        name = "remove_case_from_suite",
        description = "Remove a test case from a suite. The test case itself is kept."
    )]
    async fn remove_case_from_suite(&self, params: Parameters<SuiteMembership>) -> McpResult {
        self.handlers().remove_case_from_suite(params).await
    }

    #[tool(
        name = "create_flow_run",
        description = "Create a flow run: a scheduled execution of test cases. Provide a title, optional description, assignee, start and end dates (YYYY-MM-DD or RFC 3339) and test case IDs. Each case is copied into the run as an entry with fresh step results."
    )]
    async fn create_flow_run(&self, params: Parameters<CreateFlowRun>) -> McpResult {
        self.handlers().create_flow_run(params).await
    }

    #[tool(
        name = "list_flow_runs",
        description = "List flow runs with progress. Filter by status (draft/in_progress/completed/archived), start date range (started_after, started_before) or assignee. Runs are ordered by start date, newest first."
    )]
    async fn list_flow_runs(&self, params: Parameters<ListFlowRuns>) -> McpResult {
        self.handlers().list_flow_runs(params).await
    }

    #[tool(
        name = "show_flow_run",
        description = "Show a flow run with every entry, its entry ID, aggregate status and progress. Use the entry ID for execution tools."
    )]
    async fn show_flow_run(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_flow_run(params).await
    }

    #[tool(
        name = "update_flow_run",
        description = "Update a flow run's title, description, status, assignee or dates. Only provided fields change. The end date must not precede the start date."
    )]
    async fn update_flow_run(&self, params: Parameters<UpdateFlowRun>) -> McpResult {
        self.handlers().update_flow_run(params).await
    }

    #[tool(
        name = "delete_flow_run",
        description = "Permanently delete a flow run and all its entries. This cannot be undone."
    )]
    async fn delete_flow_run(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().delete_flow_run(params).await
    }

    #[tool(
        name = "add_case_to_flow_run",
        description = "Add a test case to a flow run as a new entry. Adding a case that is already in the run resets its entry to a fresh snapshot."
    )]
    async fn add_case_to_flow_run(&self, params: Parameters<RunMembership>) -> McpResult {
        self.handlers().add_case_to_flow_run(params).await
    }

    #[tool(
        name = "add_suite_to_flow_run",
        description = "Add every test case of a suite to a flow run."
    )]
    async fn add_suite_to_flow_run(&self, params: Parameters<AddSuiteToRun>) -> McpResult {
        self.handlers().add_suite_to_flow_run(params).await
    }

    #[tool(
        name = "remove_case_from_flow_run",
        description = "Remove a test case's entry from a flow run, discarding its recorded results."
    )]
    async fn remove_case_from_flow_run(&self, params: Parameters<RunMembership>) -> McpResult {
        self.handlers().remove_case_from_flow_run(params).await
    }

    #[tool(
        name = "show_entry",
        description = "Show a flow run entry: its snapshot of steps with recorded results, aggregate status, execution state and notes."
    )]
    async fn show_entry(&self, params: Parameters<EntryId>) -> McpResult {
        self.handlers().show_entry(params).await
    }

    #[tool(
        name = "set_entry_notes",
        description = "Set the overall notes of a flow run entry."
    )]
    async fn set_entry_notes(&self, params: Parameters<EntryNotes>) -> McpResult {
        self.handlers().set_entry_notes(params).await
    }

    #[tool(
        name = "flow_run_metrics",
        description = "Summarize a flow run: entry counts and percentage shares per aggregate status (passed/failed/blocked/pending/no run)."
    )]
    async fn flow_run_metrics(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().flow_run_metrics(params).await
    }

    #[tool(
        name = "start_execution",
        description = "Start guided execution of a flow run entry. All step results are cleared and the first step becomes current. Optionally name the tester in executed_by."
    )]
    async fn start_execution(&self, params: Parameters<StartExecution>) -> McpResult {
        self.handlers().start_execution(params).await
    }

    #[tool(
        name = "record_step_result",
        description = "Record the result of the current step (step_index is 0-based and must equal the current step). status is pending, passed, failed or blocked; actual_result and comments are optional. A failed or blocked step ends the session; after the last step the session completes."
    )]
    async fn record_step_result(&self, params: Parameters<RecordStep>) -> McpResult {
        self.handlers().record_step_result(params).await
    }

    #[tool(
        name = "pause_execution",
        description = "Pause a running execution. Recording is rejected until it is resumed."
    )]
    async fn pause_execution(&self, params: Parameters<EntryId>) -> McpResult {
        self.handlers().pause_execution(params).await
    }

    #[tool(
        name = "resume_execution",
        description = "Resume execution at the first step that has no final result."
    )]
    async fn resume_execution(&self, params: Parameters<EntryId>) -> McpResult {
        self.handlers().resume_execution(params).await
    }

    #[tool(
        name = "exit_execution",
        description = "Stop a running or paused execution. Steps already recorded keep their results; the rest stay pending."
    )]
    async fn exit_execution(&self, params: Parameters<EntryId>) -> McpResult {
        self.handlers().exit_execution(params).await
    }

    #[tool(
        name = "apply_entry",
        description = "Copy the step results of an executed flow run entry back onto its source test case, updating the case's aggregate status."
    )]
    async fn apply_entry(&self, params: Parameters<EntryId>) -> McpResult {
        self.handlers().apply_entry(params).await
    }

    #[tool(
        name = "list_labels",
        description = "List every label used by test cases, suites and flow runs."
    )]
    async fn list_labels(&self) -> McpResult {
        self.handlers().list_labels().await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for FlowcaseMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "flowcase".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(r#"Flowcase manages manual test cases and records their execution.

## Core Concepts
- **Test cases** (TC-n): a title, preconditions, priority, labels and ordered steps, each with an expected result
- **Suites** (TS-n): named collections of test cases
- **Flow runs** (FR-n): scheduled executions; each test case added to a run becomes an entry holding its own copy of the steps
- **Aggregate status**: passed when every step passed, else blocked if any step is blocked, else failed if any step failed, else pending; a case without steps is no_run

## Executing a Test Case
1. Create or pick a flow run with `create_flow_run` / `list_flow_runs`
2. Add cases with `add_case_to_flow_run` or `add_suite_to_flow_run`
3. Look up the entry ID with `show_flow_run`
4. Call `start_execution`, then `record_step_result` once per step in order (step_index starts at 0)
5. A failed or blocked step ends the session; `pause_execution`, `resume_execution` and `exit_execution` control the session in between
6. Optionally copy the results back to the test case with `apply_entry`

## Tool Categories
- **Test Cases**: create_test_case, list_test_cases, show_test_case, update_test_case, delete_test_case, show_step, update_step
- **Suites**: create_suite, list_suites, show_suite, update_suite, delete_suite, add_case_to_suite, remove_case_from_suite
- **Flow Runs**: create_flow_run, list_flow_runs, show_flow_run, update_flow_run, delete_flow_run, add_case_to_flow_run, add_suite_to_flow_run, remove_case_from_flow_run, show_entry, set_entry_notes, flow_run_metrics
- **Execution**: start_execution, record_step_result, pause_execution, resume_execution, exit_execution, apply_entry
- **Labels**: list_labels"#.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: FlowcaseMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Flowcase MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use flowcase_core::TrackerBuilder;
    use tempfile::TempDir;

    use super::*;

    async fn create_server() -> (FlowcaseMcpServer, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let tracker = TrackerBuilder::new()
            .with_database_path(Some(temp_dir.path().join("test.db")))
            .build()
            .await
            .unwrap();
        (FlowcaseMcpServer::new(tracker), temp_dir)
    }

    #[tokio::test]
    async fn test_server_info() {
        let (server, _dir) = create_server().await;
        let info = server.get_info();
        assert_eq!(info.server_info.name, "flowcase");
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.prompts.is_none());
    }

    #[tokio::test]
    async fn test_all_tools_registered() {
        let (server, _dir) = create_server().await;
        let tools = server.tool_router.list_all();
        let names: Vec<_> = tools.iter().map(|t| t.name.to_string()).collect();

        for expected in [
            "create_test_case",
            "show_flow_run",
            "start_execution",
            "record_step_result",
            "apply_entry",
            "list_labels",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing tool {expected}");
        }
        assert_eq!(tools.len(), 32);
    }
}
