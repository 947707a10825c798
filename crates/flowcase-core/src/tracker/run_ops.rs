//! Flow run operations for the Tracker.

use std::collections::BTreeSet;

use log::debug;

use super::Tracker;
use crate::{
    display::{FlowRunEntries, FlowRunSummaries, Labels},
    error::Result,
    models::{
        filters::unique_labels, FlowRun, FlowRunEntry, FlowRunFilter, FlowRunMetrics,
        FlowRunSummary, SuiteFilter, TestCaseFilter,
    },
    params::{
        AddSuiteToRun, CreateFlowRun, EntryId, EntryNotes, Id, ListFlowRuns, RunMembership,
        UpdateFlowRun,
    },
};

impl Tracker {
    /// Creates a flow run and snapshots the listed test cases into it.
    pub async fn create_flow_run(&self, params: &CreateFlowRun) -> Result<FlowRun> {
        let (start_date, end_date) = params.validate()?;
        let params = params.clone();

        let run = self
            .with_database(move |db| db.create_flow_run(&params, start_date, end_date))
            .await?;
        debug!(
            "Created flow run {} with {} test cases",
            run.display_id(),
            run.entries.len()
        );
        Ok(run)
    }

    /// Retrieves a flow run with its entries and their steps.
    pub async fn get_flow_run(&self, params: &Id) -> Result<Option<FlowRun>> {
        let id = params.id;
        self.with_database(move |db| db.get_flow_run(id)).await
    }

    /// Lists flow runs as summaries with entry metrics.
    ///
    /// Date bounds in `params` accept `YYYY-MM-DD` or RFC 3339; a plain upper
    /// bound includes the whole day.
    pub async fn list_flow_runs(&self, params: &ListFlowRuns) -> Result<FlowRunSummaries> {
        let filter = FlowRunFilter::try_from(params)?;
        let runs = self
            .with_database(move |db| db.list_flow_runs(&filter))
            .await?;
        Ok(FlowRunSummaries(runs.iter().map(FlowRunSummary::from).collect()))
    }

    /// Updates a flow run. Returns `None` if it does not exist.
    pub async fn update_flow_run(&self, params: &UpdateFlowRun) -> Result<Option<FlowRun>> {
        let (start_date, end_date) = params.validate()?;
        let params = params.clone();
        self.with_database(move |db| db.update_flow_run(&params, start_date, end_date))
            .await
    }

    /// Deletes a flow run with all its entries.
    pub async fn delete_flow_run(&self, params: &Id) -> Result<Option<FlowRun>> {
        let id = params.id;
        self.with_database(move |db| db.delete_flow_run(id)).await
    }

    /// Snapshots a test case into a flow run. Re-adding a case replaces its
    /// snapshot and discards recorded results.
    pub async fn add_case_to_flow_run(&self, params: &RunMembership) -> Result<FlowRunEntry> {
        let (run_id, case_id) = (params.flow_run_id, params.test_case_id);
        self.with_database(move |db| db.add_case_to_flow_run(run_id, case_id))
            .await
    }

    /// Snapshots every member of a suite into a flow run.
    pub async fn add_suite_to_flow_run(&self, params: &AddSuiteToRun) -> Result<FlowRunEntries> {
        let (run_id, suite_id) = (params.flow_run_id, params.suite_id);
        let entries = self
            .with_database(move |db| db.add_suite_to_flow_run(run_id, suite_id))
            .await?;
        Ok(FlowRunEntries(entries))
    }

    /// Removes a test case's entry from a flow run.
    pub async fn remove_case_from_flow_run(
        &self,
        params: &RunMembership,
    ) -> Result<Option<FlowRunEntry>> {
        let (run_id, case_id) = (params.flow_run_id, params.test_case_id);
        self.with_database(move |db| db.remove_case_from_flow_run(run_id, case_id))
            .await
    }

    /// Retrieves a flow run entry with its steps.
    pub async fn get_entry(&self, params: &EntryId) -> Result<Option<FlowRunEntry>> {
        let id = params.entry_id;
        self.with_database(move |db| db.get_entry(id)).await
    }

    /// Replaces the notes of a flow run entry.
    pub async fn set_entry_notes(&self, params: &EntryNotes) -> Result<Option<FlowRunEntry>> {
        let params = params.clone();
        self.with_database(move |db| db.set_entry_notes(params.entry_id, &params.notes))
            .await
    }

    /// Entry status counts of a flow run.
    pub async fn flow_run_metrics(&self, params: &Id) -> Result<Option<FlowRunMetrics>> {
        Ok(self
            .get_flow_run(params)
            .await?
            .map(|run| FlowRunMetrics::from(&run)))
    }

    /// Every label used by test cases, suites or flow runs, sorted and
    /// deduplicated.
    pub async fn labels(&self) -> Result<Labels> {
        self.with_database(|db| {
            let mut labels = BTreeSet::new();
            labels.extend(unique_labels(&db.list_test_cases(&TestCaseFilter::default())?));
            labels.extend(unique_labels(&db.list_suites(&SuiteFilter::default())?));
            labels.extend(unique_labels(&db.list_flow_runs(&FlowRunFilter::default())?));
            Ok(Labels(labels.into_iter().collect()))
        })
        .await
    }
}
