//! Test: steps run in order and stop at the first nonzero exit

use crate::helpers::*;
use minici::core::JobStatus;

/// Push to main with a green build job and a red lint job: the lint
/// failure fails the run, the build result is still reported.
#[tokio::test]
async fn test_push_to_main_with_failing_lint() {
    let yaml = r#"
name: CI
on:
  events: [push]
  branches: [main]
jobs:
  build:
    steps:
      - run: compile
      - run: test
  lint:
    steps:
      - run: check
"#;

    let runner = MockRunner::new().on("check", Script::Exit(1));
    let outcome = run_with_mock(yaml, runner, &push("main")).await;

    assert_run_failure(&outcome);
    assert_eq!(outcome.results.len(), 2);
    assert_job_result(&outcome, "build", JobStatus::Success, None, Some(0));
    assert_job_result(&outcome, "lint", JobStatus::Failure, Some(0), Some(1));
    assert_eq!(outcome.exit_code(), 1);
}

#[tokio::test]
async fn test_steps_after_a_failure_never_run() {
    let yaml = r#"
name: CI
on:
  events: [push]
jobs:
  build:
    steps:
      - run: step-one
      - run: step-two
      - run: step-three
"#;

    let runner = MockRunner::new().on("step-two", Script::Exit(9));
    let log = runner.log();

    let outcome = run_with_mock(yaml, runner, &push("main")).await;

    assert_job_result(&outcome, "build", JobStatus::Failure, Some(1), Some(9));
    assert_eq!(log.calls(), vec!["step-one", "step-two"]);
}

#[tokio::test]
async fn test_steps_run_in_declared_order() {
    let yaml = r#"
name: CI
on:
  events: [push]
jobs:
  build:
    steps:
      - run: first
      - run: second
      - run: third
"#;

    let runner = MockRunner::new();
    let log = runner.log();

    run_with_mock(yaml, runner, &push("main")).await;

    assert_eq!(log.calls(), vec!["first", "second", "third"]);
}

/// Re-running an unchanged job reproduces the same result
#[tokio::test]
async fn test_rerun_reports_the_same_result() {
    let yaml = r#"
name: CI
on:
  events: [push]
jobs:
  build:
    steps:
      - run: compile
      - run: test
"#;

    let first = run_with_mock(
        yaml,
        MockRunner::new().on("test", Script::Exit(4)),
        &push("main"),
    )
    .await;
    let second = run_with_mock(
        yaml,
        MockRunner::new().on("test", Script::Exit(4)),
        &push("main"),
    )
    .await;

    let a = first.result("build").unwrap();
    let b = second.result("build").unwrap();
    assert_eq!(a.status, b.status);
    assert_eq!(a.failed_step, b.failed_step);
    assert_eq!(a.exit_code, b.exit_code);
}
