use flowcase_core::{params::NewStep, CreateTestCase, Tracker, TrackerBuilder};
use tempfile::TempDir;

/// Helper function to create a test tracker
pub async fn create_test_tracker() -> (TempDir, Tracker) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let tracker = TrackerBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create tracker");
    (temp_dir, tracker)
}

/// Parameters for a test case with `steps` numbered steps
#[allow(dead_code)]
pub fn case_with_steps(title: &str, steps: usize) -> CreateTestCase {
    CreateTestCase {
        title: title.to_string(),
        steps: (1..=steps)
            .map(|n| NewStep::new(format!("Step {n}"), format!("Result {n}")))
            .collect(),
        ..Default::default()
    }
}
