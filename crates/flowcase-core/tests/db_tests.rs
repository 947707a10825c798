use flowcase_core::{
    db::migrations::SCHEMA_VERSION,
    models::{SuiteFilter, TestCaseFilter},
    params::NewStep,
    AggregateStatus, CreateFlowRun, CreateTestCase, Database, ExecutionCommand, ExecutionError,
    ExecutionPhase, StepResult, StepStatus, TrackerError, UpdateTestStep,
};
use tempfile::NamedTempFile;

/// Helper function to create a temporary database for testing
fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

fn create_case(db: &mut Database, title: &str, steps: &[&str]) -> u64 {
    db.create_test_case(&CreateTestCase {
        title: title.to_string(),
        steps: steps
            .iter()
            .map(|s| NewStep::new(*s, format!("{s} works")))
            .collect(),
        ..Default::default()
    })
    .expect("Failed to create test case")
    .id
}

fn create_run(db: &mut Database, test_cases: Vec<u64>) -> u64 {
    db.create_flow_run(
        &CreateFlowRun {
            title: "Nightly".to_string(),
            test_cases,
            ..Default::default()
        },
        None,
        None,
    )
    .expect("Failed to create flow run")
    .id
}

#[test]
fn test_database_initialization() {
    let (temp_file, db) = create_test_db();

    assert!(temp_file.path().exists());
    assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
}

#[test]
fn test_reopening_database_keeps_data() {
    let (temp_file, mut db) = create_test_db();
    let id = create_case(&mut db, "Persistent", &["One"]);
    drop(db);

    let db = Database::new(temp_file.path()).expect("Failed to reopen database");
    let case = db.get_test_case(id).unwrap().expect("Case should exist");
    assert_eq!(case.title, "Persistent");
    assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
}

#[test]
fn test_create_test_case_with_ordered_steps() {
    let (_temp_file, mut db) = create_test_db();

    let id = create_case(&mut db, "Ordered", &["First", "Second", "Third"]);
    let case = db.get_test_case(id).unwrap().unwrap();

    assert_eq!(case.status, AggregateStatus::NoRun);
    let orders: Vec<_> = case.steps.iter().map(|s| s.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert!(case
        .steps
        .iter()
        .all(|s| s.status == StepStatus::Pending && s.executed_at.is_none()));
}

#[test]
fn test_update_test_step_recomputes_case_status() {
    let (_temp_file, mut db) = create_test_db();
    let id = create_case(&mut db, "Rollup", &["A", "B"]);
    let steps = db.get_test_case(id).unwrap().unwrap().steps;

    let step = db
        .update_test_step(&UpdateTestStep {
            id: steps[0].id,
            status: Some(StepStatus::Passed),
            actual_result: Some("Worked".to_string()),
            ..Default::default()
        })
        .unwrap()
        .expect("Step should exist");
    assert_eq!(step.status, StepStatus::Passed);
    assert!(step.executed_at.is_some());
    assert_eq!(
        db.get_test_case(id).unwrap().unwrap().status,
        AggregateStatus::Pending
    );

    db.update_test_step(&UpdateTestStep {
        id: steps[1].id,
        status: Some(StepStatus::Blocked),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(
        db.get_test_case(id).unwrap().unwrap().status,
        AggregateStatus::Blocked
    );

    // Back to pending clears the execution time
    let step = db
        .update_test_step(&UpdateTestStep {
            id: steps[1].id,
            status: Some(StepStatus::Pending),
            ..Default::default()
        })
        .unwrap()
        .unwrap();
    assert!(step.executed_at.is_none());

    let missing = db
        .update_test_step(&UpdateTestStep {
            id: 9999,
            status: Some(StepStatus::Passed),
            ..Default::default()
        })
        .unwrap();
    assert!(missing.is_none());
}

#[test]
fn test_list_test_cases_by_status() {
    let (_temp_file, mut db) = create_test_db();
    let id = create_case(&mut db, "Will fail", &["A"]);
    create_case(&mut db, "Untouched", &["A"]);

    let step_id = db.get_test_case(id).unwrap().unwrap().steps[0].id;
    db.update_test_step(&UpdateTestStep {
        id: step_id,
        status: Some(StepStatus::Failed),
        ..Default::default()
    })
    .unwrap();

    let failed = db
        .list_test_cases(&TestCaseFilter {
            status: Some(AggregateStatus::Failed),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].title, "Will fail");
}

#[test]
fn test_flow_run_snapshot_is_independent_of_case() {
    let (_temp_file, mut db) = create_test_db();
    let case_id = create_case(&mut db, "Snapshot", &["Open", "Close"]);
    let run_id = create_run(&mut db, vec![case_id]);

    let run = db.get_flow_run(run_id).unwrap().unwrap();
    assert_eq!(run.entries.len(), 1);
    let entry = &run.entries[0];
    assert_eq!(entry.status, AggregateStatus::NoRun);
    assert_eq!(entry.steps.len(), 2);
    assert_eq!(entry.steps[0].description, "Open");

    // Deleting the case keeps the run's copy
    db.delete_test_case(case_id).unwrap().expect("Case existed");
    let entry = db.get_entry(entry.id).unwrap().expect("Entry survives");
    assert_eq!(entry.title, "Snapshot");
    assert_eq!(entry.steps.len(), 2);
}

#[test]
fn test_flow_runs_listed_by_start_date() {
    let (_temp_file, mut db) = create_test_db();
    let run = |title: &str| CreateFlowRun {
        title: title.to_string(),
        ..Default::default()
    };
    let on_the_second: jiff::Timestamp = "2024-03-01T10:00:00Z".parse().unwrap();
    let half_past: jiff::Timestamp = "2024-03-01T10:00:00.5Z".parse().unwrap();
    let earlier: jiff::Timestamp = "2024-02-28T23:59:59.999Z".parse().unwrap();

    db.create_flow_run(&run("Half past"), Some(half_past), None)
        .unwrap();
    db.create_flow_run(&run("Unscheduled"), None, None).unwrap();
    db.create_flow_run(&run("On the second"), Some(on_the_second), None)
        .unwrap();
    db.create_flow_run(&run("Earlier"), Some(earlier), None)
        .unwrap();

    let titles: Vec<_> = db
        .list_flow_runs(&Default::default())
        .unwrap()
        .into_iter()
        .map(|run| run.title)
        .collect();
    assert_eq!(
        titles,
        vec!["Half past", "On the second", "Earlier", "Unscheduled"]
    );
}

#[test]
fn test_create_flow_run_with_unknown_case_rolls_back() {
    let (_temp_file, mut db) = create_test_db();

    let err = db
        .create_flow_run(
            &CreateFlowRun {
                title: "Broken".to_string(),
                test_cases: vec![404],
                ..Default::default()
            },
            None,
            None,
        )
        .unwrap_err();
    assert!(matches!(err, TrackerError::TestCaseNotFound { id: 404 }));

    let runs = db.list_flow_runs(&Default::default()).unwrap();
    assert!(runs.is_empty());
}

#[test]
fn test_delete_flow_run_cascades_entries() {
    let (_temp_file, mut db) = create_test_db();
    let case_id = create_case(&mut db, "Cascade", &["A"]);
    let run_id = create_run(&mut db, vec![case_id]);
    let entry_id = db.get_flow_run(run_id).unwrap().unwrap().entries[0].id;

    let deleted = db.delete_flow_run(run_id).unwrap().expect("Run existed");
    assert_eq!(deleted.entries.len(), 1);
    assert!(db.get_entry(entry_id).unwrap().is_none());
    assert!(db.delete_flow_run(run_id).unwrap().is_none());
}

#[test]
fn test_delete_suite_keeps_cases() {
    let (_temp_file, mut db) = create_test_db();
    let case_id = create_case(&mut db, "Member", &["A"]);
    let suite = db
        .create_suite("Smoke", &["fast".to_string()], &[case_id])
        .unwrap();

    db.delete_suite(suite.id).unwrap().expect("Suite existed");

    assert!(db.get_test_case(case_id).unwrap().is_some());
    assert!(db.list_suites(&SuiteFilter::default()).unwrap().is_empty());
}

#[test]
fn test_execute_command_persists_session() {
    let (_temp_file, mut db) = create_test_db();
    let case_id = create_case(&mut db, "Session", &["A", "B"]);
    let run_id = create_run(&mut db, vec![case_id]);
    let entry_id = db.get_flow_run(run_id).unwrap().unwrap().entries[0].id;

    let report = db
        .execute_command(
            entry_id,
            &ExecutionCommand::Start {
                executed_by: Some("kim".to_string()),
            },
        )
        .unwrap();
    assert!(!report.terminal);
    assert_eq!(report.entry.current_step, Some(0));
    assert!(report.entry.is_running);
    assert_eq!(report.entry.status, AggregateStatus::Pending);
    assert_eq!(report.entry.executed_by.as_deref(), Some("kim"));
    assert!(report.entry.start_time.is_some());

    db.execute_command(
        entry_id,
        &ExecutionCommand::Record {
            step_index: 0,
            result: StepResult::new(StepStatus::Passed).with_actual_result("Fine"),
        },
    )
    .unwrap();

    // State survives a fresh load
    let entry = db.get_entry(entry_id).unwrap().unwrap();
    assert_eq!(entry.current_step, Some(1));
    assert_eq!(entry.steps[0].actual_result, "Fine");
    assert!(entry.steps[0].executed_at.is_some());
    assert!(entry.steps[1].executed_at.is_none());
}

#[test]
fn test_resume_of_unstarted_entry_marks_it_pending() {
    let (_temp_file, mut db) = create_test_db();
    let case_id = create_case(&mut db, "Resumed", &["A", "B"]);
    let run_id = create_run(&mut db, vec![case_id]);
    let entry_id = db.get_flow_run(run_id).unwrap().unwrap().entries[0].id;

    let report = db.execute_command(entry_id, &ExecutionCommand::Resume).unwrap();
    assert_eq!(report.entry.status, AggregateStatus::Pending);
    assert!(report.entry.is_running);
    assert_eq!(report.entry.current_step, Some(0));
    let started = report.entry.start_time.expect("resume records a start time");

    // A second resume after pausing keeps the first start time
    db.execute_command(entry_id, &ExecutionCommand::Pause).unwrap();
    let report = db.execute_command(entry_id, &ExecutionCommand::Resume).unwrap();
    assert_eq!(report.entry.start_time, Some(started));

    for step_index in 0..2 {
        db.execute_command(
            entry_id,
            &ExecutionCommand::Record {
                step_index,
                result: StepResult::new(StepStatus::Passed),
            },
        )
        .unwrap();
    }
    let entry = db.get_entry(entry_id).unwrap().unwrap();
    assert_eq!(entry.status, AggregateStatus::Passed);
    assert!(entry.start_time.is_some());
    assert!(entry.end_time.is_some());
}

#[test]
fn test_exit_after_finish_returns_entry_to_idle() {
    let (_temp_file, mut db) = create_test_db();
    let case_id = create_case(&mut db, "Finished", &["A"]);
    let run_id = create_run(&mut db, vec![case_id]);
    let entry_id = db.get_flow_run(run_id).unwrap().unwrap().entries[0].id;

    db.execute_command(entry_id, &ExecutionCommand::Start { executed_by: None })
        .unwrap();
    let report = db
        .execute_command(
            entry_id,
            &ExecutionCommand::Record {
                step_index: 0,
                result: StepResult::new(StepStatus::Failed),
            },
        )
        .unwrap();
    assert!(report.terminal);

    let entry = db.get_entry(entry_id).unwrap().unwrap();
    assert!(entry.is_finished);
    assert_eq!(
        entry.execution_state().phase(),
        ExecutionPhase::Terminal(AggregateStatus::Failed)
    );

    db.execute_command(entry_id, &ExecutionCommand::Exit).unwrap();

    let entry = db.get_entry(entry_id).unwrap().unwrap();
    assert!(!entry.is_finished);
    assert_eq!(entry.execution_state().phase(), ExecutionPhase::Idle);
    assert_eq!(entry.status, AggregateStatus::Failed);
    assert_eq!(entry.steps[0].status, StepStatus::Failed);
}

#[test]
fn test_version_one_database_is_migrated() {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    {
        let schema = include_str!("../assets/schema.sql").replace(
            "    is_finished INTEGER NOT NULL DEFAULT 0 CHECK (is_finished IN (0, 1)),\n",
            "",
        );
        let conn = rusqlite::Connection::open(temp_file.path()).unwrap();
        conn.execute_batch(&schema).unwrap();
        conn.pragma_update(None, "user_version", 1).unwrap();
    }

    let mut db = Database::new(temp_file.path()).unwrap();
    assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);

    let case_id = create_case(&mut db, "Migrated", &["A"]);
    let run_id = create_run(&mut db, vec![case_id]);
    let entry = &db.get_flow_run(run_id).unwrap().unwrap().entries[0];
    assert!(!entry.is_finished);
}

#[test]
fn test_rejected_command_leaves_entry_untouched() {
    let (_temp_file, mut db) = create_test_db();
    let case_id = create_case(&mut db, "Guarded", &["A", "B"]);
    let run_id = create_run(&mut db, vec![case_id]);
    let entry_id = db.get_flow_run(run_id).unwrap().unwrap().entries[0].id;

    db.execute_command(entry_id, &ExecutionCommand::Start { executed_by: None })
        .unwrap();
    let before = db.get_entry(entry_id).unwrap().unwrap();

    let err = db
        .execute_command(
            entry_id,
            &ExecutionCommand::Record {
                step_index: 1,
                result: StepResult::new(StepStatus::Passed),
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        TrackerError::Execution(ExecutionError::InvalidStepIndex {
            expected: Some(0),
            actual: 1
        })
    ));

    let after = db.get_entry(entry_id).unwrap().unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_execute_command_on_missing_entry() {
    let (_temp_file, mut db) = create_test_db();

    let err = db
        .execute_command(77, &ExecutionCommand::Pause)
        .unwrap_err();
    assert!(matches!(err, TrackerError::EntryNotFound { id: 77 }));
    assert!(err.is_not_found());
}
