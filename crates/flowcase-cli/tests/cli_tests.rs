use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper function to create a temporary directory for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Helper function to create a Command bound to `db_path` with --no-color
fn flowcase_cmd(db_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("flowcase").expect("Failed to find flowcase binary");
    cmd.arg("--no-color")
        .arg("--database-file")
        .arg(db_path);
    cmd
}

/// Creates TC-1 with two steps.
fn create_login_case(db_path: &Path) {
    flowcase_cmd(db_path)
        .args([
            "case",
            "create",
            "Login works",
            "--labels",
            "auth,smoke",
            "--step",
            "Open login page::Form is shown",
            "--step",
            "Submit valid credentials::Dashboard is shown",
        ])
        .assert()
        .success();
}

#[test]
fn test_cli_create_case_success() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    flowcase_cmd(&db_path)
        .args([
            "case",
            "create",
            "Login works",
            "--priority",
            "high",
            "--step",
            "Open login page::Form is shown",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created test case TC-1"))
        .stdout(predicate::str::contains("# TC-1. Login works"))
        .stdout(predicate::str::contains("Open login page"))
        .stdout(predicate::str::contains("– No Run"));
}

#[test]
fn test_cli_create_case_rejects_step_without_description() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    flowcase_cmd(&db_path)
        .args(["case", "create", "Broken", "--step", "::Nothing to do"])
        .assert()
        .failure();
}

#[test]
fn test_cli_list_cases() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    flowcase_cmd(&db_path)
        .args(["case", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Test Cases"))
        .stdout(predicate::str::contains("No test cases found."));

    create_login_case(&db_path);
    flowcase_cmd(&db_path)
        .args(["case", "create", "Logout works", "--labels", "auth"])
        .assert()
        .success();

    flowcase_cmd(&db_path)
        .args(["case", "list", "--labels", "smoke"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Login works"))
        .stdout(predicate::str::contains("Logout works").not());

    flowcase_cmd(&db_path)
        .args(["c", "ls", "--query", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logout works"))
        .stdout(predicate::str::contains("Login works").not());
}

#[test]
fn test_cli_show_missing_case_fails() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    flowcase_cmd(&db_path)
        .args(["case", "show", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Test case with ID 42 not found"));
}

#[test]
fn test_cli_missing_step_fails() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    create_login_case(&db_path);

    flowcase_cmd(&db_path)
        .args(["case", "step", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Step with ID 99 not found"));

    flowcase_cmd(&db_path)
        .args(["case", "update-step", "99", "--status", "passed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Step with ID 99 not found"));
}

#[test]
fn test_cli_update_case_lists_changes() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    create_login_case(&db_path);

    flowcase_cmd(&db_path)
        .args(["case", "update", "1", "--title", "Login with SSO"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated test case TC-1"))
        .stdout(predicate::str::contains("- title"))
        .stdout(predicate::str::contains("Login with SSO"));
}

#[test]
fn test_cli_delete_requires_confirmation() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    create_login_case(&db_path);

    flowcase_cmd(&db_path)
        .args(["case", "delete", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--confirm"));

    // Still there
    flowcase_cmd(&db_path)
        .args(["case", "show", "1"])
        .assert()
        .success();

    flowcase_cmd(&db_path)
        .args(["case", "delete", "1", "--confirm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted test case 'Login works' (TC-1)"));

    flowcase_cmd(&db_path)
        .args(["case", "show", "1"])
        .assert()
        .failure();
}

#[test]
fn test_cli_suite_membership() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    create_login_case(&db_path);

    flowcase_cmd(&db_path)
        .args(["suite", "create", "Smoke", "--cases", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created test suite TS-1"));

    flowcase_cmd(&db_path)
        .args(["suite", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Login works"));

    flowcase_cmd(&db_path)
        .args(["suite", "remove", "1", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed TC-1 from TS-1"));
}

#[test]
fn test_cli_default_lists_flow_runs() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    flowcase_cmd(&db_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Flow Runs"))
        .stdout(predicate::str::contains("No flow runs found."));

    flowcase_cmd(&db_path)
        .args(["run", "create", "Release 1.0", "--start", "2024-03-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created flow run FR-1"));

    flowcase_cmd(&db_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Release 1.0"));
}

#[test]
fn test_cli_run_rejects_bad_date() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    flowcase_cmd(&db_path)
        .args(["run", "create", "Release", "--start", "next tuesday"])
        .assert()
        .failure();
}

#[test]
fn test_cli_guided_execution() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    create_login_case(&db_path);

    flowcase_cmd(&db_path)
        .args(["run", "create", "Nightly", "--cases", "1"])
        .assert()
        .success();

    flowcase_cmd(&db_path)
        .args(["run", "start", "1", "--by", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Execution running: step 1 of 2"))
        .stdout(predicate::str::contains("Open login page"));

    // Steps must be recorded in order
    flowcase_cmd(&db_path)
        .args(["run", "record", "1", "2", "passed"])
        .assert()
        .failure();

    flowcase_cmd(&db_path)
        .args(["run", "record", "1", "1", "passed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Execution running: step 2 of 2"));

    flowcase_cmd(&db_path)
        .args([
            "run",
            "record",
            "1",
            "2",
            "failed",
            "--actual",
            "Error 500",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Execution finished: ✗ Failed"))
        .stdout(predicate::str::contains("Error 500"));

    flowcase_cmd(&db_path)
        .args(["run", "metrics", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# FR-1 Metrics"))
        .stdout(predicate::str::contains("| ✗ Failed | 1 | 100% |"));

    flowcase_cmd(&db_path)
        .args(["run", "apply", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated test case TC-1"))
        .stdout(predicate::str::contains("results copied from entry 1"));

    flowcase_cmd(&db_path)
        .args(["case", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- Status: ✗ Failed"));
}

#[test]
fn test_cli_pause_and_resume() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    create_login_case(&db_path);

    flowcase_cmd(&db_path)
        .args(["run", "create", "Nightly", "--cases", "1"])
        .assert()
        .success();
    flowcase_cmd(&db_path)
        .args(["run", "start", "1"])
        .assert()
        .success();
    flowcase_cmd(&db_path)
        .args(["run", "record", "1", "1", "passed"])
        .assert()
        .success();

    flowcase_cmd(&db_path)
        .args(["run", "pause", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Execution paused at step 2 of 2"));

    flowcase_cmd(&db_path)
        .args(["run", "record", "1", "2", "passed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No execution is running"));

    flowcase_cmd(&db_path)
        .args(["run", "resume", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Execution running: step 2 of 2"));
}

#[test]
fn test_cli_labels() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    create_login_case(&db_path);

    flowcase_cmd(&db_path)
        .args(["run", "create", "Nightly", "--labels", "nightly"])
        .assert()
        .success();

    flowcase_cmd(&db_path)
        .arg("labels")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Labels"))
        .stdout(predicate::str::contains("- auth\n- nightly\n- smoke\n"));
}
