//! Test: independent jobs run concurrently, not back to back

use crate::helpers::*;
use minici::core::JobStatus;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_independent_jobs_overlap() {
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

    let runner = MockRunner::new()
        .on("compile", Script::Delay(50, 0))
        .on("check", Script::Delay(50, 0))
        .on("rustdoc", Script::Delay(50, 0));
    let log = runner.log();

    let outcome = run_with_mock(yaml, runner, &push("main")).await;

    assert_run_success(&outcome);
    assert_eq!(log.max_concurrent(), 3);
}

/// Three jobs sleeping 100ms each finish in about the longest sleep,
/// not the sum of all three.
#[tokio::test]
async fn test_wall_clock_tracks_the_slowest_job() {
    let yaml = r#"
name: CI
on:
  events: [push]
jobs:
  a:
    steps:
      - run: slow-a
  b:
    steps:
      - run: slow-b
  c:
    steps:
      - run: slow-c
"#;

    let runner = MockRunner::new()
        .on("slow-a", Script::Delay(100, 0))
        .on("slow-b", Script::Delay(100, 0))
        .on("slow-c", Script::Delay(100, 0));

    let started = Instant::now();
    let outcome = run_with_mock(yaml, runner, &push("main")).await;
    let elapsed = started.elapsed();

    assert_run_success(&outcome);
    assert!(
        elapsed < Duration::from_millis(250),
        "three 100ms jobs took {elapsed:?}, expected roughly one sleep"
    );
}

#[tokio::test]
async fn test_a_fast_failure_does_not_cancel_slower_siblings() {
    let yaml = r#"
name: CI
on:
  events: [push]
jobs:
  quick:
    steps:
      - run: fail-fast
  slow:
    steps:
      - run: keep-going
"#;

    let runner = MockRunner::new()
        .on("fail-fast", Script::Delay(10, 1))
        .on("keep-going", Script::Delay(100, 0));
    let log = runner.log();

    let outcome = run_with_mock(yaml, runner, &push("main")).await;

    assert_run_failure(&outcome);
    assert_job_result(&outcome, "quick", JobStatus::Failure, Some(0), Some(1));
    assert_job_result(&outcome, "slow", JobStatus::Success, None, Some(0));
    assert_eq!(log.call_count(), 2);
}

/// Steps inside a single job stay sequential even while jobs overlap.
#[tokio::test]
async fn test_steps_within_a_job_do_not_overlap() {
    let yaml = r#"
name: CI
on:
  events: [push]
jobs:
  build:
    steps:
      - run: one
      - run: two
      - run: three
"#;

    let runner = MockRunner::new()
        .on("one", Script::Delay(20, 0))
        .on("two", Script::Delay(20, 0))
        .on("three", Script::Delay(20, 0));
    let log = runner.log();

    let outcome = run_with_mock(yaml, runner, &push("main")).await;

    assert_run_success(&outcome);
    assert_eq!(log.max_concurrent(), 1);
    assert_eq!(log.calls(), vec!["one", "two", "three"]);
}
