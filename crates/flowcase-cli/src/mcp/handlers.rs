//! MCP tool handlers implementation

use flowcase_core::{
    display::{CreateResult, DeleteResult, OperationStatus, UpdateResult},
    params as core, Tracker,
};
use log::debug;
use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::Deserialize;

use super::errors::{not_found, to_mcp_error};

// ============================================================================
// Generic Parameter Wrapper
// ============================================================================
//
// Core parameter types derive JsonSchema behind the `schema` feature. The
// transparent wrapper passes (de)serialization straight through to them and
// keeps the MCP layer's signatures in one place.

/// Generic MCP wrapper for core parameter types
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

pub type Id = McpParams<core::Id>;
pub type EntryId = McpParams<core::EntryId>;
pub type CreateTestCase = McpParams<core::CreateTestCase>;
pub type UpdateTestCase = McpParams<core::UpdateTestCase>;
pub type ListTestCases = McpParams<core::ListTestCases>;
pub type UpdateTestStep = McpParams<core::UpdateTestStep>;
pub type CreateSuite = McpParams<core::CreateSuite>;
pub type UpdateSuite = McpParams<core::UpdateSuite>;
pub type ListSuites = McpParams<core::ListSuites>;
pub type SuiteMembership = McpParams<core::SuiteMembership>;
pub type CreateFlowRun = McpParams<core::CreateFlowRun>;
pub type UpdateFlowRun = McpParams<core::UpdateFlowRun>;
pub type ListFlowRuns = McpParams<core::ListFlowRuns>;
pub type RunMembership = McpParams<core::RunMembership>;
pub type AddSuiteToRun = McpParams<core::AddSuiteToRun>;
pub type EntryNotes = McpParams<core::EntryNotes>;
pub type StartExecution = McpParams<core::StartExecution>;
pub type RecordStep = McpParams<core::RecordStep>;

pub type McpResult = Result<CallToolResult, McpError>;

fn text(output: impl ToString) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(
        output.to_string(),
    )]))
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    tracker: Tracker,
}

impl McpHandlers {
    pub fn new(tracker: Tracker) -> Self {
        Self { tracker }
    }

    // ------------------------------------------------------------------------
    // Test cases
    // ------------------------------------------------------------------------

    pub async fn create_test_case(
        &self,
        Parameters(params): Parameters<CreateTestCase>,
    ) -> McpResult {
        debug!("create_test_case: {:?}", params);

        let case = self
            .tracker
            .create_test_case(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to create test case", &e))?;

        text(CreateResult::new(case))
    }

    pub async fn list_test_cases(&self, Parameters(params): Parameters<ListTestCases>) -> McpResult {
        debug!("list_test_cases: {:?}", params);

        let cases = self
            .tracker
            .list_test_cases(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list test cases", &e))?;

        text(format!("# Test Cases\n\n{cases}"))
    }

    pub async fn show_test_case(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_test_case: {:?}", params);

        let id = params.as_ref().id;
        let case = self
            .tracker
            .get_test_case(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get test case", &e))?
            .ok_or_else(|| not_found("Test case", id))?;

        text(case)
    }

    pub async fn update_test_case(
        &self,
        Parameters(params): Parameters<UpdateTestCase>,
    ) -> McpResult {
        debug!("update_test_case: {:?}", params);

        let id = params.as_ref().id;
        let case = self
            .tracker
            .update_test_case(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update test case", &e))?
            .ok_or_else(|| not_found("Test case", id))?;

        text(UpdateResult::new(case))
    }

    pub async fn delete_test_case(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("delete_test_case: {:?}", params);

        let id = params.as_ref().id;
        let case = self
            .tracker
            .delete_test_case(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to delete test case", &e))?
            .ok_or_else(|| not_found("Test case", id))?;

        text(DeleteResult::new(case))
    }

    pub async fn show_step(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_step: {:?}", params);

        let id = params.as_ref().id;
        let step = self
            .tracker
            .get_test_step(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get step", &e))?
            .ok_or_else(|| not_found("Step", id))?;

        text(step)
    }

    pub async fn update_step(&self, Parameters(params): Parameters<UpdateTestStep>) -> McpResult {
        debug!("update_step: {:?}", params);

        let id = params.as_ref().id;
        let step = self
            .tracker
            .update_test_step(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update step", &e))?
            .ok_or_else(|| not_found("Step", id))?;

        text(UpdateResult::new(step))
    }

    // ------------------------------------------------------------------------
    // Suites
    // ------------------------------------------------------------------------

    pub async fn create_suite(&self, Parameters(params): Parameters<CreateSuite>) -> McpResult {
        debug!("create_suite: {:?}", params);

        let suite = self
            .tracker
            .create_suite(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to create test suite", &e))?;

        text(CreateResult::new(suite))
    }

    pub async fn list_suites(&self, Parameters(params): Parameters<ListSuites>) -> McpResult {
        debug!("list_suites: {:?}", params);

        let suites = self
            .tracker
            .list_suites(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list test suites", &e))?;

        text(format!("# Test Suites\n\n{suites}"))
    }

    pub async fn show_suite(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_suite: {:?}", params);

        let id = params.as_ref().id;
        let suite = self
            .tracker
            .get_suite(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get test suite", &e))?
            .ok_or_else(|| not_found("Test suite", id))?;

        text(suite)
    }

    pub async fn update_suite(&self, Parameters(params): Parameters<UpdateSuite>) -> McpResult {
        debug!("update_suite: {:?}", params);

        let id = params.as_ref().id;
        let suite = self
            .tracker
            .update_suite(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update test suite", &e))?
            .ok_or_else(|| not_found("Test suite", id))?;

        text(UpdateResult::new(suite))
    }

    pub async fn delete_suite(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("delete_suite: {:?}", params);

        let id = params.as_ref().id;
        let suite = self
            .tracker
            .delete_suite(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to delete test suite", &e))?
            .ok_or_else(|| not_found("Test suite", id))?;

        text(DeleteResult::new(suite))
    }

    pub async fn add_case_to_suite(
        &self,
        Parameters(params): Parameters<SuiteMembership>,
    ) -> McpResult {
        debug!("add_case_to_suite: {:?}", params);

        let case_id = params.as_ref().test_case_id;
        let suite = self
            .tracker
            .add_case_to_suite(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to add test case to suite", &e))?;

        text(OperationStatus::success(format!(
            "Added TC-{case_id} to {} ({} test cases)",
            suite.display_id(),
            suite.test_cases.len()
        )))
    }

    pub async fn remove_case_from_suite(
        &self,
        Parameters(params): Parameters<SuiteMembership>,
    ) -> McpResult {
        debug!("remove_case_from_suite: {:?}", params);

        let case_id = params.as_ref().test_case_id;
        let suite = self
            .tracker
            .remove_case_from_suite(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to remove test case from suite", &e))?;

        text(OperationStatus::success(format!(
            "Removed TC-{case_id} from {} ({} test cases)",
            suite.display_id(),
            suite.test_cases.len()
        )))
    }

    // ------------------------------------------------------------------------
    // Flow runs
    // ------------------------------------------------------------------------

    pub async fn create_flow_run(&self, Parameters(params): Parameters<CreateFlowRun>) -> McpResult {
        debug!("create_flow_run: {:?}", params);

        let run = self
            .tracker
            .create_flow_run(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to create flow run", &e))?;

        text(CreateResult::new(run))
    }

    pub async fn list_flow_runs(&self, Parameters(params): Parameters<ListFlowRuns>) -> McpResult {
        debug!("list_flow_runs: {:?}", params);

        let runs = self
            .tracker
            .list_flow_runs(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list flow runs", &e))?;

        text(format!("# Flow Runs\n\n{runs}"))
    }

    pub async fn show_flow_run(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_flow_run: {:?}", params);

        let id = params.as_ref().id;
        let run = self
            .tracker
            .get_flow_run(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get flow run", &e))?
            .ok_or_else(|| not_found("Flow run", id))?;

        text(run)
    }

    pub async fn update_flow_run(&self, Parameters(params): Parameters<UpdateFlowRun>) -> McpResult {
        debug!("update_flow_run: {:?}", params);

        let id = params.as_ref().id;
        let run = self
            .tracker
            .update_flow_run(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update flow run", &e))?
            .ok_or_else(|| not_found("Flow run", id))?;

        text(UpdateResult::new(run))
    }

    pub async fn delete_flow_run(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("delete_flow_run: {:?}", params);

        let id = params.as_ref().id;
        let run = self
            .tracker
            .delete_flow_run(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to delete flow run", &e))?
            .ok_or_else(|| not_found("Flow run", id))?;

        text(DeleteResult::new(run))
    }

    pub async fn add_case_to_flow_run(
        &self,
        Parameters(params): Parameters<RunMembership>,
    ) -> McpResult {
        debug!("add_case_to_flow_run: {:?}", params);

        let run_id = params.as_ref().flow_run_id;
        let entry = self
            .tracker
            .add_case_to_flow_run(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to add test case to flow run", &e))?;

        let status = OperationStatus::success(format!(
            "Added {} to FR-{run_id} as entry {}",
            entry.case_display_id(),
            entry.id
        ));
        text(format!("{status}\n{entry}"))
    }

    pub async fn add_suite_to_flow_run(
        &self,
        Parameters(params): Parameters<AddSuiteToRun>,
    ) -> McpResult {
        debug!("add_suite_to_flow_run: {:?}", params);

        let core::AddSuiteToRun {
            flow_run_id,
            suite_id,
        } = params.as_ref().clone();
        let entries = self
            .tracker
            .add_suite_to_flow_run(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to add suite to flow run", &e))?;

        let status = OperationStatus::success(format!(
            "Added {} test cases from TS-{suite_id} to FR-{flow_run_id}",
            entries.len()
        ));
        text(format!("{status}\n{entries}"))
    }

    pub async fn remove_case_from_flow_run(
        &self,
        Parameters(params): Parameters<RunMembership>,
    ) -> McpResult {
        debug!("remove_case_from_flow_run: {:?}", params);

        let core::RunMembership {
            flow_run_id,
            test_case_id,
        } = params.as_ref().clone();
        let removed = self
            .tracker
            .remove_case_from_flow_run(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to remove test case from flow run", &e))?;

        match removed {
            Some(entry) => text(OperationStatus::success(format!(
                "Removed entry {} (TC-{test_case_id}) from FR-{flow_run_id}",
                entry.id
            ))),
            None => Err(McpError::invalid_params(
                format!("TC-{test_case_id} is not part of FR-{flow_run_id}"),
                None,
            )),
        }
    }

    pub async fn show_entry(&self, Parameters(params): Parameters<EntryId>) -> McpResult {
        debug!("show_entry: {:?}", params);

        let entry_id = params.as_ref().entry_id;
        let entry = self
            .tracker
            .get_entry(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get flow run entry", &e))?
            .ok_or_else(|| not_found("Flow run entry", entry_id))?;

        text(entry)
    }

    pub async fn set_entry_notes(&self, Parameters(params): Parameters<EntryNotes>) -> McpResult {
        debug!("set_entry_notes: {:?}", params);

        let entry_id = params.as_ref().entry_id;
        let entry = self
            .tracker
            .set_entry_notes(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update entry notes", &e))?
            .ok_or_else(|| not_found("Flow run entry", entry_id))?;

        text(UpdateResult::with_changes(entry, vec!["notes".to_string()]))
    }

    pub async fn flow_run_metrics(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("flow_run_metrics: {:?}", params);

        let id = params.as_ref().id;
        let metrics = self
            .tracker
            .flow_run_metrics(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to compute flow run metrics", &e))?
            .ok_or_else(|| not_found("Flow run", id))?;

        text(format!("# FR-{id} Metrics\n\n{metrics}"))
    }

    pub async fn list_labels(&self) -> McpResult {
        debug!("list_labels");

        let labels = self
            .tracker
            .labels()
            .await
            .map_err(|e| to_mcp_error("Failed to list labels", &e))?;

        text(format!("# Labels\n\n{labels}"))
    }

    // ------------------------------------------------------------------------
    // Guided execution
    // ------------------------------------------------------------------------

    pub async fn start_execution(
        &self,
        Parameters(params): Parameters<StartExecution>,
    ) -> McpResult {
        debug!("start_execution: {:?}", params);

        let report = self
            .tracker
            .start_execution(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to start execution", &e))?;

        text(report)
    }

    pub async fn record_step_result(&self, Parameters(params): Parameters<RecordStep>) -> McpResult {
        debug!("record_step_result: {:?}", params);

        let report = self
            .tracker
            .record_step_result(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to record step result", &e))?;

        text(report)
    }

    pub async fn pause_execution(&self, Parameters(params): Parameters<EntryId>) -> McpResult {
        debug!("pause_execution: {:?}", params);

        let report = self
            .tracker
            .pause_execution(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to pause execution", &e))?;

        text(report)
    }

    pub async fn resume_execution(&self, Parameters(params): Parameters<EntryId>) -> McpResult {
        debug!("resume_execution: {:?}", params);

        let report = self
            .tracker
            .resume_execution(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to resume execution", &e))?;

        text(report)
    }

    pub async fn exit_execution(&self, Parameters(params): Parameters<EntryId>) -> McpResult {
        debug!("exit_execution: {:?}", params);

        let report = self
            .tracker
            .exit_execution(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to exit execution", &e))?;

        text(report)
    }

    pub async fn apply_entry(&self, Parameters(params): Parameters<EntryId>) -> McpResult {
        debug!("apply_entry: {:?}", params);

        let entry_id = params.as_ref().entry_id;
        let case = self
            .tracker
            .apply_entry(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to apply entry to test case", &e))?;

        text(UpdateResult::with_changes(
            case,
            vec![format!("results copied from entry {entry_id}")],
        ))
    }
}
