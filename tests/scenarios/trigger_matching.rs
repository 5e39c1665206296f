//! Test: trigger matching selects which jobs run for an event

use crate::helpers::*;
use minici::core::JobStatus;

const MAIN_ONLY: &str = r#"
name: CI
on:
  events: [push, pull_request]
  branches: [main]
jobs:
  build:
    steps:
      - run: cargo build
  lint:
    steps:
      - run: cargo clippy
"#;

/// An event no rule matches runs nothing and still succeeds
#[tokio::test]
async fn test_unmatched_event_is_an_empty_success() {
    let runner = MockRunner::new();
    let log = runner.log();

    let outcome = run_with_mock(MAIN_ONLY, runner, &pull_request("feature/x")).await;

    assert_run_success(&outcome);
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(log.call_count(), 0);
}

#[tokio::test]
async fn test_matching_event_runs_every_job() {
    let runner = MockRunner::new();
    let log = runner.log();

    let outcome = run_with_mock(MAIN_ONLY, runner, &push("main")).await;

    assert_run_success(&outcome);
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(log.call_count(), 2);
}

#[tokio::test]
async fn test_declared_kind_on_wrong_branch_does_not_match() {
    let runner = MockRunner::new();
    let log = runner.log();

    let outcome = run_with_mock(MAIN_ONLY, runner, &push("develop")).await;

    assert!(outcome.results.is_empty());
    assert_eq!(log.call_count(), 0);
}

#[tokio::test]
async fn test_per_job_triggers_select_a_subset() {
    let yaml = r#"
name: CI
on:
  events: [push]
jobs:
  build:
    steps:
      - run: cargo build
  deploy:
    on:
      events: [manual]
    steps:
      - run: scripts/deploy.sh
"#;

    let runner = MockRunner::new();
    let log = runner.log();

    let outcome = run_with_mock(yaml, runner, &push("main")).await;

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].job_name, "build");
    assert_eq!(log.calls(), vec!["cargo build"]);
}

#[tokio::test]
async fn test_manual_event_reaches_manual_jobs() {
    let yaml = r#"
name: CI
jobs:
  deploy:
    on:
      events: [manual]
    steps:
      - run: scripts/deploy.sh
"#;

    let outcome = run_with_mock(yaml, MockRunner::new(), &manual("main")).await;

    assert_run_success(&outcome);
    assert_job_result(&outcome, "deploy", JobStatus::Success, None, Some(0));
}

#[tokio::test]
async fn test_wildcard_branch_filter_uses_glob_matching() {
    let yaml = r#"
name: CI
on:
  events: [push]
  branches: ["release/*"]
jobs:
  build:
    steps:
      - run: cargo build
"#;

    let matched = run_with_mock(yaml, MockRunner::new(), &push("release/1.2")).await;
    assert_eq!(matched.results.len(), 1);

    let unmatched = run_with_mock(yaml, MockRunner::new(), &push("main")).await;
    assert!(unmatched.results.is_empty());
}

#[tokio::test]
async fn test_empty_branch_list_matches_any_branch() {
    let yaml = r#"
name: CI
on:
  events: [push]
jobs:
  build:
    steps:
      - run: cargo build
"#;

    for branch in ["main", "develop", "feature/long/nested"] {
        let outcome = run_with_mock(yaml, MockRunner::new(), &push(branch)).await;
        assert_eq!(outcome.results.len(), 1, "branch {}", branch);
    }
}
