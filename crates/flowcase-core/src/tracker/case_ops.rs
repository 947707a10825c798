//! Test case operations for the Tracker.

use log::debug;

use super::Tracker;
use crate::{
    display::TestCases,
    error::Result,
    models::{TestCase, TestCaseFilter, TestStep},
    params::{CreateTestCase, Id, ListTestCases, UpdateTestCase, UpdateTestStep},
};

impl Tracker {
    /// Creates a test case with its steps. New cases start as `no_run`.
    pub async fn create_test_case(&self, params: &CreateTestCase) -> Result<TestCase> {
        params.validate()?;
        let params = params.clone();

        let case = self
            .with_database(move |db| db.create_test_case(&params))
            .await?;
        debug!("Created test case {}", case.display_id());
        Ok(case)
    }

    /// Retrieves a test case with its steps.
    pub async fn get_test_case(&self, params: &Id) -> Result<Option<TestCase>> {
        let id = params.id;
        self.with_database(move |db| db.get_test_case(id)).await
    }

    /// Lists test cases matching the search text, labels, priority and
    /// status in `params`.
    pub async fn list_test_cases(&self, params: &ListTestCases) -> Result<TestCases> {
        let filter = TestCaseFilter::from(params);
        let cases = self
            .with_database(move |db| db.list_test_cases(&filter))
            .await?;
        Ok(TestCases(cases))
    }

    /// Updates a test case. Returns `None` if it does not exist.
    pub async fn update_test_case(&self, params: &UpdateTestCase) -> Result<Option<TestCase>> {
        params.validate()?;
        let params = params.clone();
        self.with_database(move |db| db.update_test_case(&params))
            .await
    }

    /// Deletes a test case and returns it. Flow runs keep their copies.
    pub async fn delete_test_case(&self, params: &Id) -> Result<Option<TestCase>> {
        let id = params.id;
        let deleted = self.with_database(move |db| db.delete_test_case(id)).await?;
        if let Some(case) = &deleted {
            debug!("Deleted test case {}", case.display_id());
        }
        Ok(deleted)
    }

    /// Retrieves a single test case step.
    pub async fn get_test_step(&self, params: &Id) -> Result<Option<TestStep>> {
        let id = params.id;
        self.with_database(move |db| db.get_test_step(id)).await
    }

    /// Updates a single step; a status change recomputes the case status.
    pub async fn update_test_step(&self, params: &UpdateTestStep) -> Result<Option<TestStep>> {
        params.validate()?;
        let params = params.clone();
        self.with_database(move |db| db.update_test_step(&params))
            .await
    }
}
