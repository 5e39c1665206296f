//! Test: per-job results fold into one pipeline verdict

use crate::helpers::*;
use minici::core::{JobStatus, OverallStatus};

#[tokio::test]
async fn test_all_jobs_green_is_an_overall_success() {
    let yaml = r#"
name: CI
on:
  events: [push]
jobs:
  build:
    steps:
      - run: compile
  lint:
    steps:
      - run: check
  docs:
    steps:
      - run: rustdoc
"#;

    let outcome = run_with_mock(yaml, MockRunner::new(), &push("main")).await;

    assert_run_success(&outcome);
    assert_eq!(outcome.results.len(), 3);
    assert_eq!(outcome.exit_code(), 0);
    for result in &outcome.results {
        assert_eq!(result.status, JobStatus::Success);
    }
}

#[tokio::test]
async fn test_a_job_error_fails_the_run_with_generic_exit_code() {
    let yaml = r#"
name: CI
on:
  events: [push]
jobs:
  build:
    steps:
      - run: compile
  deploy:
    steps:
      - run: ship
"#;

    let runner = MockRunner::new().on("ship", Script::Fail("ship".into()));
    let outcome = run_with_mock(yaml, runner, &push("main")).await;

    assert_run_failure(&outcome);
    assert_job_result(&outcome, "deploy", JobStatus::Error, Some(0), None);
    // the errored job has no exit code to echo, so fall back to 1
    assert_eq!(outcome.exit_code(), 1);
}

#[tokio::test]
async fn test_results_keep_job_declaration_order() {
    let yaml = r#"
name: CI
on:
  events: [push]
jobs:
  zeta:
    steps:
      - run: z
  alpha:
    steps:
      - run: a
  mid:
    steps:
      - run: m
"#;

    let runner = MockRunner::new().on("a", Script::Exit(2));
    let outcome = run_with_mock(yaml, runner, &push("main")).await;

    let names: Vec<&str> = outcome.results.iter().map(|r| r.job_name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    assert_eq!(outcome.overall, OverallStatus::Failure);
}

#[tokio::test]
async fn test_exit_code_echoes_the_first_failing_job() {
    let yaml = r#"
name: CI
on:
  events: [push]
jobs:
  ok:
    steps:
      - run: fine
  first-red:
    steps:
      - run: boom
  second-red:
    steps:
      - run: crash
"#;

    let runner = MockRunner::new()
        .on("boom", Script::Exit(42))
        .on("crash", Script::Exit(7));
    let outcome = run_with_mock(yaml, runner, &push("main")).await;

    assert_run_failure(&outcome);
    assert_eq!(outcome.exit_code(), 42);
}

#[tokio::test]
async fn test_success_and_failure_are_both_reported() {
    let yaml = r#"
name: CI
on:
  events: [push]
jobs:
  build:
    steps:
      - run: compile
  lint:
    steps:
      - run: check
"#;

    let runner = MockRunner::new().on("check", Script::Exit(1));
    let outcome = run_with_mock(yaml, runner, &push("main")).await;

    assert_job_result(&outcome, "build", JobStatus::Success, None, Some(0));
    assert_job_result(&outcome, "lint", JobStatus::Failure, Some(0), Some(1));
    assert_eq!(outcome.overall, OverallStatus::Failure);
}
