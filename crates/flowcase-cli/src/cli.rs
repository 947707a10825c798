//! Command handlers for the terminal interface
//!
//! Each handler converts clap arguments into core parameters, calls the
//! tracker and renders the Display output of the result as markdown.

use anyhow::{bail, Context, Result};
use flowcase_core::{
    display::{CreateResult, DeleteResult, OperationStatus, UpdateResult},
    params::{EntryId, Id, ListFlowRuns, UpdateFlowRun, UpdateTestCase},
    Tracker,
};
use log::debug;

use crate::{
    args::{CaseCommands, DeleteArgs, RunCommands, SuiteCommands},
    renderer::TerminalRenderer,
};

pub struct Cli {
    tracker: Tracker,
    renderer: TerminalRenderer,
}

/// Names of the fields an update touches, for the "Changes made" list.
fn changed_fields(fields: &[(&str, bool)]) -> Vec<String> {
    fields
        .iter()
        .filter(|(_, changed)| *changed)
        .map(|(name, _)| (*name).to_string())
        .collect()
}

fn case_changes(params: &UpdateTestCase) -> Vec<String> {
    changed_fields(&[
        ("title", params.title.is_some()),
        ("description", params.description.is_some()),
        ("priority", params.priority.is_some()),
        ("labels", params.labels.is_some()),
        ("steps (status reset to no_run)", params.steps.is_some()),
    ])
}

fn run_changes(params: &UpdateFlowRun) -> Vec<String> {
    changed_fields(&[
        ("title", params.title.is_some()),
        ("description", params.description.is_some()),
        ("status", params.status.is_some()),
        ("start date", params.start_date.is_some()),
        ("end date", params.end_date.is_some()),
        ("labels", params.labels.is_some()),
        ("assignee", params.assigned_to.is_some()),
    ])
}

fn require_confirmation(args: &DeleteArgs, what: &str) -> Result<()> {
    if !args.confirm {
        bail!(
            "Deleting {what} {} is permanent. Re-run with --confirm to proceed",
            args.id
        );
    }
    Ok(())
}

impl Cli {
    pub fn new(tracker: Tracker, renderer: TerminalRenderer) -> Self {
        Self { tracker, renderer }
    }

    fn print(&self, output: impl ToString) {
        self.renderer.render(&output.to_string());
    }

    pub async fn handle_case_command(&self, command: CaseCommands) -> Result<()> {
        match command {
            CaseCommands::Create(args) => {
                let case = self
                    .tracker
                    .create_test_case(&args.into())
                    .await
                    .context("Failed to create test case")?;
                self.print(CreateResult::new(case));
            }
            CaseCommands::List(args) => {
                let cases = self
                    .tracker
                    .list_test_cases(&args.into())
                    .await
                    .context("Failed to list test cases")?;
                self.print(format!("# Test Cases\n\n{cases}"));
            }
            CaseCommands::Show(args) => {
                let id = args.id;
                let Some(case) = self
                    .tracker
                    .get_test_case(&args.into())
                    .await
                    .context("Failed to get test case")?
                else {
                    bail!("Test case with ID {id} not found");
                };
                self.print(case);
            }
            CaseCommands::Update(args) => {
                let params: UpdateTestCase = args.into();
                let changes = case_changes(&params);
                let Some(case) = self
                    .tracker
                    .update_test_case(&params)
                    .await
                    .context("Failed to update test case")?
                else {
                    bail!("Test case with ID {} not found", params.id);
                };
                self.print(UpdateResult::with_changes(case, changes));
            }
            CaseCommands::Delete(args) => {
                require_confirmation(&args, "test case")?;
                let Some(case) = self
                    .tracker
                    .delete_test_case(&Id { id: args.id })
                    .await
                    .context("Failed to delete test case")?
                else {
                    bail!("Test case with ID {} not found", args.id);
                };
                self.print(DeleteResult::new(case));
            }
            CaseCommands::Step(args) => {
                let id = args.id;
                let Some(step) = self
                    .tracker
                    .get_test_step(&args.into())
                    .await
                    .context("Failed to get step")?
                else {
                    bail!("Step with ID {id} not found");
                };
                self.print(step);
            }
            CaseCommands::UpdateStep(args) => {
                let id = args.id;
                let Some(step) = self
                    .tracker
                    .update_test_step(&args.into())
                    .await
                    .context("Failed to update step")?
                else {
                    bail!("Step with ID {id} not found");
                };
                self.print(UpdateResult::new(step));
            }
        }
        Ok(())
    }

    pub async fn handle_suite_command(&self, command: SuiteCommands) -> Result<()> {
        match command {
            SuiteCommands::Create(args) => {
                let suite = self
                    .tracker
                    .create_suite(&args.into())
                    .await
                    .context("Failed to create test suite")?;
                self.print(CreateResult::new(suite));
            }
            SuiteCommands::List(args) => {
                let suites = self
                    .tracker
                    .list_suites(&args.into())
                    .await
                    .context("Failed to list test suites")?;
                self.print(format!("# Test Suites\n\n{suites}"));
            }
            SuiteCommands::Show(args) => {
                let id = args.id;
                let Some(suite) = self
                    .tracker
                    .get_suite(&args.into())
                    .await
                    .context("Failed to get test suite")?
                else {
                    bail!("Test suite with ID {id} not found");
                };
                self.print(suite);
            }
            SuiteCommands::Update(args) => {
                let id = args.id;
                let Some(suite) = self
                    .tracker
                    .update_suite(&args.into())
                    .await
                    .context("Failed to update test suite")?
                else {
                    bail!("Test suite with ID {id} not found");
                };
                self.print(UpdateResult::new(suite));
            }
            SuiteCommands::Delete(args) => {
                require_confirmation(&args, "test suite")?;
                let Some(suite) = self
                    .tracker
                    .delete_suite(&Id { id: args.id })
                    .await
                    .context("Failed to delete test suite")?
                else {
                    bail!("Test suite with ID {} not found", args.id);
                };
                self.print(DeleteResult::new(suite));
            }
            SuiteCommands::Add(args) => {
                let case_id = args.test_case_id;
                let suite = self
                    .tracker
                    .add_case_to_suite(&args.into())
                    .await
                    .context("Failed to add test case to suite")?;
                self.print(OperationStatus::success(format!(
                    "Added TC-{case_id} to {} ({} test cases)",
                    suite.display_id(),
                    suite.test_cases.len()
                )));
            }
            SuiteCommands::Remove(args) => {
                let case_id = args.test_case_id;
                let suite = self
                    .tracker
                    .remove_case_from_suite(&args.into())
                    .await
                    .context("Failed to remove test case from suite")?;
                self.print(OperationStatus::success(format!(
                    "Removed TC-{case_id} from {} ({} test cases)",
                    suite.display_id(),
                    suite.test_cases.len()
                )));
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    pub async fn handle_run_command(&self, command: RunCommands) -> Result<()> {
        match command {
            RunCommands::Create(args) => {
                let run = self
                    .tracker
                    .create_flow_run(&args.into())
                    .await
                    .context("Failed to create flow run")?;
                self.print(CreateResult::new(run));
            }
            RunCommands::List(args) => self.list_flow_runs(&args.into()).await?,
            RunCommands::Show(args) => {
                let id = args.id;
                let Some(run) = self
                    .tracker
                    .get_flow_run(&args.into())
                    .await
                    .context("Failed to get flow run")?
                else {
                    bail!("Flow run with ID {id} not found");
                };
                self.print(run);
            }
            RunCommands::Update(args) => {
                let params: UpdateFlowRun = args.into();
                let changes = run_changes(&params);
                let Some(run) = self
                    .tracker
                    .update_flow_run(&params)
                    .await
                    .context("Failed to update flow run")?
                else {
                    bail!("Flow run with ID {} not found", params.id);
                };
                self.print(UpdateResult::with_changes(run, changes));
            }
            RunCommands::Delete(args) => {
                require_confirmation(&args, "flow run")?;
                let Some(run) = self
                    .tracker
                    .delete_flow_run(&Id { id: args.id })
                    .await
                    .context("Failed to delete flow run")?
                else {
                    bail!("Flow run with ID {} not found", args.id);
                };
                self.print(DeleteResult::new(run));
            }
            RunCommands::Add(args) => {
                let run_id = args.run_id;
                let entry = self
                    .tracker
                    .add_case_to_flow_run(&args.into())
                    .await
                    .context("Failed to add test case to flow run")?;
                self.print(format!(
                    "{}\n{entry}",
                    OperationStatus::success(format!(
                        "Added {} to FR-{run_id} as entry {}",
                        entry.case_display_id(),
                        entry.id
                    ))
                ));
            }
            RunCommands::AddSuite(args) => {
                let (run_id, suite_id) = (args.run_id, args.suite_id);
                let entries = self
                    .tracker
                    .add_suite_to_flow_run(&args.into())
                    .await
                    .context("Failed to add suite to flow run")?;
                self.print(format!(
                    "{}\n{entries}",
                    OperationStatus::success(format!(
                        "Added {} test cases from TS-{suite_id} to FR-{run_id}",
                        entries.len()
                    ))
                ));
            }
            RunCommands::Remove(args) => {
                let (run_id, case_id) = (args.run_id, args.test_case_id);
                let removed = self
                    .tracker
                    .remove_case_from_flow_run(&args.into())
                    .await
                    .context("Failed to remove test case from flow run")?;
                let status = match removed {
                    Some(entry) => OperationStatus::success(format!(
                        "Removed entry {} (TC-{case_id}) from FR-{run_id}",
                        entry.id
                    )),
                    None => OperationStatus::failure(format!(
                        "TC-{case_id} is not part of FR-{run_id}"
                    )),
                };
                self.print(status);
            }
            RunCommands::Entry(args) => {
                let entry_id = args.entry_id;
                let Some(entry) = self
                    .tracker
                    .get_entry(&args.into())
                    .await
                    .context("Failed to get flow run entry")?
                else {
                    bail!("Flow run entry with ID {entry_id} not found");
                };
                self.print(entry);
            }
            RunCommands::Notes(args) => {
                let entry_id = args.entry_id;
                let Some(entry) = self
                    .tracker
                    .set_entry_notes(&args.into())
                    .await
                    .context("Failed to update entry notes")?
                else {
                    bail!("Flow run entry with ID {entry_id} not found");
                };
                self.print(UpdateResult::with_changes(entry, vec!["notes".to_string()]));
            }
            RunCommands::Metrics(args) => {
                let id = args.id;
                let Some(metrics) = self
                    .tracker
                    .flow_run_metrics(&args.into())
                    .await
                    .context("Failed to compute flow run metrics")?
                else {
                    bail!("Flow run with ID {id} not found");
                };
                self.print(format!("# FR-{id} Metrics\n\n{metrics}"));
            }
            RunCommands::Start(args) => {
                let report = self
                    .tracker
                    .start_execution(&args.into())
                    .await
                    .context("Failed to start execution")?;
                self.print(report);
            }
            RunCommands::Record(args) => {
                let report = self
                    .tracker
                    .record_step_result(&args.into())
                    .await
                    .context("Failed to record step result")?;
                self.print(report);
            }
            RunCommands::Pause(args) => {
                let report = self
                    .tracker
                    .pause_execution(&args.into())
                    .await
                    .context("Failed to pause execution")?;
                self.print(report);
            }
            RunCommands::Resume(args) => {
                let report = self
                    .tracker
                    .resume_execution(&args.into())
                    .await
                    .context("Failed to resume execution")?;
                self.print(report);
            }
            RunCommands::Exit(args) => {
                let report = self
                    .tracker
                    .exit_execution(&args.into())
                    .await
                    .context("Failed to exit execution")?;
                self.print(report);
            }
            RunCommands::Apply(args) => {
                let params: EntryId = args.into();
                let case = self
                    .tracker
                    .apply_entry(&params)
                    .await
                    .context("Failed to apply entry to test case")?;
                self.print(UpdateResult::with_changes(
                    case,
                    vec![format!("results copied from entry {}", params.entry_id)],
                ));
            }
        }
        Ok(())
    }

    pub async fn list_flow_runs(&self, params: &ListFlowRuns) -> Result<()> {
        debug!("Listing flow runs");
        let runs = self
            .tracker
            .list_flow_runs(params)
            .await
            .context("Failed to list flow runs")?;
        self.print(format!("# Flow Runs\n\n{runs}"));
        Ok(())
    }

    pub async fn list_labels(&self) -> Result<()> {
        let labels = self
            .tracker
            .labels()
            .await
            .context("Failed to list labels")?;
        self.print(format!("# Labels\n\n{labels}"));
        Ok(())
    }
}
