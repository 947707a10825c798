//! Test suite operations for the Tracker.

use log::debug;

use super::Tracker;
use crate::{
    display::Suites,
    error::Result,
    models::{SuiteFilter, SuiteWithCases, TestSuite},
    params::{CreateSuite, Id, ListSuites, SuiteMembership, UpdateSuite},
};

impl Tracker {
    /// Creates a suite, optionally with initial members.
    pub async fn create_suite(&self, params: &CreateSuite) -> Result<TestSuite> {
        params.validate()?;
        let params = params.clone();

        let suite = self
            .with_database(move |db| db.create_suite(&params.name, &params.labels, &params.test_cases))
            .await?;
        debug!("Created test suite {}", suite.display_id());
        Ok(suite)
    }

    /// Retrieves a suite with its member test cases resolved.
    ///
    /// Members are returned in suite order.
    pub async fn get_suite(&self, params: &Id) -> Result<Option<SuiteWithCases>> {
        let id = params.id;
        self.with_database(move |db| {
            let Some(suite) = db.get_suite(id)? else {
                return Ok(None);
            };
            let mut cases = Vec::with_capacity(suite.test_cases.len());
            for case_id in &suite.test_cases {
                if let Some(case) = db.get_test_case(*case_id)? {
                    cases.push(case);
                }
            }
            Ok(Some(SuiteWithCases { suite, cases }))
        })
        .await
    }

    /// Lists suites matching the search text and labels in `params`.
    pub async fn list_suites(&self, params: &ListSuites) -> Result<Suites> {
        let filter = SuiteFilter::from(params);
        let suites = self.with_database(move |db| db.list_suites(&filter)).await?;
        Ok(Suites(suites))
    }

    /// Renames or relabels a suite. Returns `None` if it does not exist.
    pub async fn update_suite(&self, params: &UpdateSuite) -> Result<Option<TestSuite>> {
        params.validate()?;
        let params = params.clone();
        self.with_database(move |db| {
            db.update_suite(params.id, params.name.as_deref(), params.labels.as_deref())
        })
        .await
    }

    /// Deletes a suite and returns it. Member test cases are kept.
    pub async fn delete_suite(&self, params: &Id) -> Result<Option<TestSuite>> {
        let id = params.id;
        self.with_database(move |db| db.delete_suite(id)).await
    }

    /// Adds a test case to a suite; adding an existing member changes nothing.
    pub async fn add_case_to_suite(&self, params: &SuiteMembership) -> Result<TestSuite> {
        let (suite_id, case_id) = (params.suite_id, params.test_case_id);
        self.with_database(move |db| db.add_case_to_suite(suite_id, case_id))
            .await
    }

    /// Removes a test case from a suite.
    pub async fn remove_case_from_suite(&self, params: &SuiteMembership) -> Result<TestSuite> {
        let (suite_id, case_id) = (params.suite_id, params.test_case_id);
        self.with_database(move |db| db.remove_case_from_suite(suite_id, case_id))
            .await
    }
}
