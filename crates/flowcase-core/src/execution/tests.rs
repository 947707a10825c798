use super::*;

fn steps(statuses: &[StepStatus]) -> Vec<TestStep> {
    statuses
        .iter()
        .enumerate()
        .map(|(i, status)| {
            let mut step = TestStep::pending(i as u32, format!("Step {i}"), format!("Expected {i}"));
            step.id = i as u64 + 1;
            step.status = *status;
            step
        })
        .collect()
}

fn running_at(statuses: &[StepStatus], index: usize) -> ExecutionState {
    ExecutionState {
        steps: steps(statuses),
        current_step: Some(index),
        is_running: true,
        is_finished: false,
    }
}

use StepStatus::{Blocked, Failed, Passed, Pending};

#[test]
fn test_aggregate_precedence() {
    assert_eq!(aggregate_status(&steps(&[Passed, Passed, Passed])), AggregateStatus::Passed);
    assert_eq!(aggregate_status(&steps(&[Passed, Failed, Blocked])), AggregateStatus::Blocked);
    assert_eq!(aggregate_status(&steps(&[Failed, Blocked])), AggregateStatus::Blocked);
    assert_eq!(aggregate_status(&steps(&[Passed, Failed, Pending])), AggregateStatus::Failed);
    assert_eq!(aggregate_status(&steps(&[Passed, Pending])), AggregateStatus::Pending);
    assert_eq!(aggregate_status(&steps(&[Pending, Pending])), AggregateStatus::Pending);
}

#[test]
fn test_aggregate_empty_is_no_run() {
    assert_eq!(aggregate_status(&[]), AggregateStatus::NoRun);
    assert_eq!(ExecutionState::new(vec![]).phase(), ExecutionPhase::Idle);
}

#[test]
fn test_aggregate_ignores_order() {
    let forward = steps(&[Failed, Pending, Blocked, Passed]);
    let mut reversed = forward.clone();
    reversed.reverse();
    assert_eq!(aggregate_status(&forward), aggregate_status(&reversed));
}

#[test]
fn test_start_resets_steps() {
    let mut state = ExecutionState::new(steps(&[Passed, Failed, Blocked]));
    state.steps[1].actual_result = "Crashed".to_string();
    state.steps[1].comments = Some("Seen on staging".to_string());

    let transition = start_execution(&state).unwrap();

    assert_eq!(transition.state.current_step, Some(0));
    assert!(transition.state.is_running);
    assert_eq!(transition.persist, Some(AggregateStatus::Pending));
    assert!(!transition.terminal);
    for step in &transition.state.steps {
        assert_eq!(step.status, Pending);
        assert!(step.actual_result.is_empty());
    }
    // Comments are kept, only results are cleared
    assert_eq!(
        transition.state.steps[1].comments.as_deref(),
        Some("Seen on staging")
    );
    assert_eq!(transition.state.phase(), ExecutionPhase::Running(0));
}

#[test]
fn test_start_rejects_empty_steps() {
    let state = ExecutionState::new(vec![]);
    assert_eq!(start_execution(&state), Err(ExecutionError::NoSteps));
}

#[test]
fn test_start_rejects_running_session() {
    let state = running_at(&[Pending, Pending], 1);
    assert_eq!(start_execution(&state), Err(ExecutionError::AlreadyRunning));
}

#[test]
fn test_passed_advances_to_next_step() {
    let state = running_at(&[Pending, Pending, Pending], 0);

    let transition = record_step_result(
        &state,
        0,
        StepResult::new(Passed).with_actual_result("Form shown"),
    )
    .unwrap();

    assert_eq!(transition.state.current_step, Some(1));
    assert!(transition.state.is_running);
    assert!(!transition.terminal);
    assert_eq!(transition.persist, None);
    assert_eq!(transition.state.steps[0].status, Passed);
    assert_eq!(transition.state.steps[0].actual_result, "Form shown");
}

#[test]
fn test_passing_every_step_finishes_passed() {
    let mut state = start_execution(&ExecutionState::new(steps(&[Pending, Pending, Pending])))
        .unwrap()
        .state;

    let mut last = None;
    for index in 0..3 {
        let transition = record_step_result(&state, index, StepResult::new(Passed)).unwrap();
        state = transition.state.clone();
        last = Some(transition);
    }

    let last = last.unwrap();
    assert!(last.terminal);
    assert_eq!(last.persist, Some(AggregateStatus::Passed));
    assert!(!last.state.is_running);
    assert_eq!(last.state.current_step, None);
    assert_eq!(
        last.state.phase(),
        ExecutionPhase::Terminal(AggregateStatus::Passed)
    );
}

#[test]
fn test_failure_ends_session_immediately() {
    let state = running_at(&[Passed, Pending, Pending], 1);

    let transition = record_step_result(
        &state,
        1,
        StepResult::new(Failed)
            .with_actual_result("Error 500")
            .with_comments("Reproducible"),
    )
    .unwrap();

    assert!(transition.terminal);
    assert_eq!(transition.persist, Some(AggregateStatus::Failed));
    assert!(!transition.state.is_running);
    assert_eq!(transition.state.current_step, None);
    assert_eq!(transition.state.steps[1].actual_result, "Error 500");
    assert_eq!(transition.state.steps[1].comments.as_deref(), Some("Reproducible"));
    // Later steps are left untouched
    assert_eq!(transition.state.steps[2].status, Pending);
}

#[test]
fn test_blocked_ends_session_as_blocked() {
    let state = running_at(&[Pending, Pending], 0);

    let transition = record_step_result(&state, 0, StepResult::new(Blocked)).unwrap();

    assert!(transition.terminal);
    assert_eq!(transition.persist, Some(AggregateStatus::Blocked));
}

#[test]
fn test_pending_result_keeps_position() {
    let state = running_at(&[Passed, Pending], 1);

    let transition = record_step_result(
        &state,
        1,
        StepResult::new(Pending).with_comments("Waiting for test data"),
    )
    .unwrap();

    assert!(!transition.terminal);
    assert_eq!(transition.persist, None);
    assert_eq!(transition.state.current_step, Some(1));
    assert!(transition.state.is_running);
    assert_eq!(
        transition.state.steps[1].comments.as_deref(),
        Some("Waiting for test data")
    );
}

#[test]
fn test_record_rejects_wrong_index() {
    let state = running_at(&[Pending, Pending, Pending], 1);

    for index in [0, 2, 3, 99] {
        let err = record_step_result(&state, index, StepResult::new(Passed)).unwrap_err();
        assert_eq!(
            err,
            ExecutionError::InvalidStepIndex {
                expected: Some(1),
                actual: index
            }
        );
    }
}

#[test]
fn test_record_rejects_when_not_running() {
    let state = ExecutionState::new(steps(&[Pending]));
    assert_eq!(
        record_step_result(&state, 0, StepResult::new(Passed)),
        Err(ExecutionError::NotRunning)
    );
}

#[test]
fn test_rejected_operations_leave_state_untouched() {
    let state = running_at(&[Passed, Pending], 1);
    let before = state.clone();

    let _ = record_step_result(&state, 0, StepResult::new(Failed));
    let _ = start_execution(&state);
    let _ = resume_execution(&state);

    assert_eq!(state, before);
}

#[test]
fn test_pause_keeps_progress() {
    let state = running_at(&[Passed, Pending, Pending], 1);

    let transition = pause_execution(&state).unwrap();

    assert!(!transition.state.is_running);
    assert_eq!(transition.state.current_step, Some(1));
    assert_eq!(transition.state.steps, state.steps);
    assert_eq!(transition.persist, Some(AggregateStatus::Pending));
    assert_eq!(transition.state.phase(), ExecutionPhase::Paused(1));
}

#[test]
fn test_pause_requires_running_session() {
    let state = ExecutionState::new(steps(&[Pending]));
    assert_eq!(pause_execution(&state), Err(ExecutionError::NotRunning));
}

#[test]
fn test_resume_jumps_to_first_pending_step() {
    let state = ExecutionState {
        steps: steps(&[Passed, Passed, Pending, Pending]),
        current_step: Some(1),
        is_running: false,
        is_finished: false,
    };

    let transition = resume_execution(&state).unwrap();

    assert_eq!(transition.state.current_step, Some(2));
    assert!(transition.state.is_running);
    assert_eq!(transition.persist, Some(AggregateStatus::Pending));
}

#[test]
fn test_resume_never_started_session() {
    let state = ExecutionState::new(steps(&[Pending, Pending, Pending]));
    assert_eq!(state.phase(), ExecutionPhase::Idle);

    let transition = resume_execution(&state).unwrap();

    assert_eq!(transition.state.phase(), ExecutionPhase::Running(0));
    assert_eq!(transition.persist, Some(AggregateStatus::Pending));
    assert!(!transition.terminal);
}

#[test]
fn test_resume_with_nothing_pending_is_rejected() {
    let state = ExecutionState::new(steps(&[Passed, Failed]));
    assert_eq!(resume_execution(&state), Err(ExecutionError::NothingToResume));
}

#[test]
fn test_resume_rejects_running_session() {
    let state = running_at(&[Pending], 0);
    assert_eq!(resume_execution(&state), Err(ExecutionError::AlreadyRunning));
}

#[test]
fn test_pause_then_resume_returns_to_same_step() {
    let state = running_at(&[Passed, Pending, Pending], 1);

    let paused = pause_execution(&state).unwrap();
    let resumed = resume_execution(&paused.state).unwrap();

    assert_eq!(resumed.state, state);
}

#[test]
fn test_exit_from_running_persists_pending() {
    let state = running_at(&[Passed, Pending], 1);

    let transition = exit_execution(&state);

    assert_eq!(transition.persist, Some(AggregateStatus::Pending));
    assert!(!transition.state.is_running);
    assert_eq!(transition.state.current_step, None);
    assert_eq!(transition.state.steps, state.steps);
    assert_eq!(transition.state.phase(), ExecutionPhase::Idle);
}

#[test]
fn test_exit_when_stopped_persists_nothing() {
    let state = ExecutionState {
        steps: steps(&[Passed, Pending]),
        current_step: Some(1),
        is_running: false,
        is_finished: false,
    };

    let transition = exit_execution(&state);

    assert_eq!(transition.persist, None);
    assert_eq!(transition.state.current_step, None);
}

#[test]
fn test_exit_after_terminal_returns_to_idle() {
    let state = running_at(&[Passed, Pending], 1);
    let finished = record_step_result(&state, 1, StepResult::new(Failed)).unwrap();
    assert!(finished.state.is_finished);
    assert_eq!(
        finished.state.phase(),
        ExecutionPhase::Terminal(AggregateStatus::Failed)
    );

    let exited = exit_execution(&finished.state);

    assert_eq!(exited.state.phase(), ExecutionPhase::Idle);
    assert!(!exited.state.is_finished);
    // Results survive and the stored outcome is left alone
    assert_eq!(exited.state.steps, finished.state.steps);
    assert_eq!(exited.persist, None);
}

#[test]
fn test_stopped_without_outcome_is_idle() {
    // Failed steps alone do not make a session terminal
    let state = ExecutionState::new(steps(&[Passed, Failed]));
    assert_eq!(state.phase(), ExecutionPhase::Idle);
}

#[test]
fn test_restart_after_terminal() {
    let state = running_at(&[Passed, Pending], 1);
    let finished = record_step_result(&state, 1, StepResult::new(Failed)).unwrap();
    assert!(finished.terminal);

    let restarted = start_execution(&finished.state).unwrap();

    assert_eq!(restarted.state.phase(), ExecutionPhase::Running(0));
    assert!(!restarted.state.is_finished);
    assert!(restarted.state.steps.iter().all(|s| s.status == Pending));
}

#[test]
fn test_error_messages() {
    let err = ExecutionError::InvalidStepIndex {
        expected: Some(2),
        actual: 0,
    };
    assert_eq!(
        err.to_string(),
        "Step index 0 does not match the current step (2)"
    );

    let err = ExecutionError::InvalidStepIndex {
        expected: None,
        actual: 1,
    };
    assert!(err.to_string().contains("(none)"));
}
