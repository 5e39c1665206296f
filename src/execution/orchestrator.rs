//! Pipeline orchestrator - fans matching jobs out and folds their results

use crate::core::{Event, Job, PipelineDefinition, PipelineOutcome, RunResult};
use crate::execution::cancel::CancelSignal;
use crate::execution::events::{EventBus, PipelineEvent};
use crate::execution::process::ProcessRunner;
use crate::execution::runner::JobRunner;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Lifecycle of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Pending,
    Matching,
    /// No job's trigger matched the event; terminal
    NoMatch,
    Running,
    Aggregating,
    Completed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::NoMatch | RunState::Completed)
    }

    /// Legal transitions between states
    pub fn can_advance_to(self, next: RunState) -> bool {
        matches!(
            (self, next),
            (RunState::Pending, RunState::Matching)
                | (RunState::Matching, RunState::NoMatch)
                | (RunState::Matching, RunState::Running)
                | (RunState::Running, RunState::Aggregating)
                | (RunState::Aggregating, RunState::Completed)
        )
    }
}

/// Drives a pipeline run end to end.
///
/// Matching jobs execute concurrently in their own tasks. One job's
/// failure never cancels a sibling; every started job contributes a
/// result, in the order jobs are declared.
pub struct Orchestrator<R> {
    pipeline: Arc<PipelineDefinition>,
    runner: Arc<JobRunner<R>>,
    events: EventBus,
}

impl<R: ProcessRunner + 'static> Orchestrator<R> {
    pub fn new(pipeline: PipelineDefinition, runner: JobRunner<R>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            runner: Arc::new(runner),
            events: EventBus::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&self, handler: F)
    where
        F: Fn(PipelineEvent) + Send + Sync + 'static,
    {
        self.events.add_handler(handler);
    }

    /// Run the pipeline for one event.
    ///
    /// Always produces an outcome: when nothing matches, the outcome is
    /// an empty success.
    pub async fn run(&self, event: &Event, cancel: CancelSignal) -> PipelineOutcome {
        let run_id = Uuid::new_v4();
        let mut state = RunState::Pending;

        info!(
            "Starting pipeline run: {} ({}) for {} on '{}'",
            self.pipeline.name,
            run_id,
            event.kind,
            event.branch
        );
        self.events.emit(PipelineEvent::RunStarted {
            run_id,
            pipeline_name: self.pipeline.name.clone(),
            event_kind: event.kind,
            branch: event.branch.clone(),
        });

        self.advance(&mut state, RunState::Matching);
        let matching: Vec<&Job> = self
            .pipeline
            .jobs
            .values()
            .filter(|job| job.trigger.matches(event))
            .collect();

        if matching.is_empty() {
            self.advance(&mut state, RunState::NoMatch);
            info!(
                "No jobs match {} on '{}'; nothing to run",
                event.kind, event.branch
            );
            let outcome =
                PipelineOutcome::from_results(run_id, self.pipeline.name.clone(), Vec::new());
            self.events.emit(PipelineEvent::RunCompleted {
                run_id,
                overall: outcome.overall,
            });
            return outcome;
        }

        debug!(
            "{} of {} jobs match",
            matching.len(),
            self.pipeline.jobs.len()
        );

        self.advance(&mut state, RunState::Running);
        let mut handles = Vec::with_capacity(matching.len());
        for job in matching {
            let job = job.clone();
            let job_name = job.name.clone();
            let pipeline = Arc::clone(&self.pipeline);
            let runner = Arc::clone(&self.runner);
            let event = event.clone();
            let events = self.events.clone();
            let cancel = cancel.clone();

            let handle = tokio::spawn(async move {
                runner
                    .run_job(run_id, &pipeline, &job, &event, &events, &cancel)
                    .await
            });
            handles.push((job_name, handle));
        }

        self.advance(&mut state, RunState::Aggregating);

        // Join barrier: every spawned job reports, in declaration order.
        let mut results: Vec<RunResult> = Vec::with_capacity(handles.len());
        for (job_name, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!("Job task for '{}' ended abnormally: {}", job_name, e);
                    results.push(RunResult::aborted(job_name, e.to_string()));
                }
            }
        }

        let outcome = PipelineOutcome::from_results(run_id, self.pipeline.name.clone(), results);
        self.advance(&mut state, RunState::Completed);

        info!(
            "Pipeline run finished: {} - {:?}",
            self.pipeline.name, outcome.overall
        );
        self.events.emit(PipelineEvent::RunCompleted {
            run_id,
            overall: outcome.overall,
        });
        outcome
    }

    fn advance(&self, state: &mut RunState, next: RunState) {
        debug_assert!(state.can_advance_to(next), "{:?} -> {:?}", state, next);
        debug!("Run state: {:?} -> {:?}", state, next);
        *state = next;
    }
}
