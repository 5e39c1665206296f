//! Job runner - wraps one step sequence with a workspace and merged environment

use crate::core::{
    BuiltinAction, Event, Job, JobStatus, PipelineDefinition, RunResult, Step, StepAction,
};
use crate::execution::cancel::CancelSignal;
use crate::execution::events::{EventBus, PipelineEvent};
use crate::execution::executor::{StepExecutor, StepsOutcome};
use crate::execution::process::ProcessRunner;
use crate::execution::workspace::Workspace;
use chrono::Utc;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Runs one job at a time: creates its workspace, merges its
/// environment, delegates to the step executor, and reports a single
/// result. The workspace is released however the job ends.
pub struct JobRunner<R> {
    executor: StepExecutor<R>,
    workspace_root: PathBuf,
    keep_workspaces: bool,
}

impl<R: ProcessRunner> JobRunner<R> {
    pub fn new(runner: R, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            executor: StepExecutor::new(runner),
            workspace_root: workspace_root.into(),
            keep_workspaces: false,
        }
    }

    /// Leave workspaces on disk after jobs end, for debugging
    pub fn keep_workspaces(mut self, keep: bool) -> Self {
        self.keep_workspaces = keep;
        self
    }

    /// Run one job against one event and record the result.
    ///
    /// Never returns an error: anything that stops the job is folded
    /// into the result's status.
    pub async fn run_job(
        &self,
        run_id: Uuid,
        pipeline: &PipelineDefinition,
        job: &Job,
        event: &Event,
        events: &EventBus,
        cancel: &CancelSignal,
    ) -> RunResult {
        let started_at = Utc::now();
        info!("Starting job: {}", job.name);
        events.emit(PipelineEvent::JobStarted {
            job_name: job.name.clone(),
        });

        let path = self
            .workspace_root
            .join(format!("{}-{}", run_id.simple(), job.name));
        let mut workspace = match Workspace::create(path) {
            Ok(workspace) => workspace,
            Err(e) => {
                error!("Failed to create workspace for '{}': {}", job.name, e);
                let result = RunResult {
                    job_name: job.name.clone(),
                    status: JobStatus::Error,
                    failed_step: None,
                    exit_code: None,
                    error: Some(format!("failed to create workspace: {}", e)),
                    started_at,
                    finished_at: Utc::now(),
                };
                events.emit(PipelineEvent::JobCompleted {
                    job_name: job.name.clone(),
                    status: result.status,
                });
                return result;
            }
        };
        if self.keep_workspaces {
            workspace.keep();
        }

        let env = self.merged_env(run_id, pipeline, job, event, workspace.path());
        let steps = resolve_builtins(&job.steps, event);

        let outcome = self
            .executor
            .execute(&job.name, &steps, &env, workspace.path(), events, cancel)
            .await;
        let finished_at = Utc::now();

        let result = match outcome {
            StepsOutcome::Completed { steps_run } => {
                info!("Job '{}' succeeded ({} steps)", job.name, steps_run);
                RunResult {
                    job_name: job.name.clone(),
                    status: JobStatus::Success,
                    failed_step: None,
                    exit_code: Some(0),
                    error: None,
                    started_at,
                    finished_at,
                }
            }
            StepsOutcome::Failed {
                step_index,
                exit_code,
            } => {
                warn!(
                    "Job '{}' failed at step {} with exit code {}",
                    job.name, step_index, exit_code
                );
                RunResult {
                    job_name: job.name.clone(),
                    status: JobStatus::Failure,
                    failed_step: Some(step_index),
                    exit_code: Some(exit_code),
                    error: None,
                    started_at,
                    finished_at,
                }
            }
            StepsOutcome::Errored { step_index, error } => {
                error!("Job '{}' errored at step {}: {}", job.name, step_index, error);
                RunResult {
                    job_name: job.name.clone(),
                    status: JobStatus::Error,
                    failed_step: Some(step_index),
                    exit_code: None,
                    error: Some(error.to_string()),
                    started_at,
                    finished_at,
                }
            }
            StepsOutcome::Cancelled { step_index } => {
                warn!("Job '{}' cancelled at step {}", job.name, step_index);
                RunResult {
                    job_name: job.name.clone(),
                    status: JobStatus::Error,
                    failed_step: Some(step_index),
                    exit_code: None,
                    error: Some("cancelled".to_string()),
                    started_at,
                    finished_at,
                }
            }
        };

        events.emit(PipelineEvent::JobCompleted {
            job_name: job.name.clone(),
            status: result.status,
        });
        result
    }

    /// Entries layered over the inherited base environment: pipeline
    /// entries first, then job entries, then the injected CI set.
    /// Job entries override pipeline entries with the same key.
    fn merged_env(
        &self,
        run_id: Uuid,
        pipeline: &PipelineDefinition,
        job: &Job,
        event: &Event,
        workspace: &Path,
    ) -> Vec<(String, String)> {
        let mut env: IndexMap<String, String> = IndexMap::new();
        for (key, value) in &pipeline.env {
            env.insert(key.clone(), value.clone());
        }
        for (key, value) in &job.env {
            env.insert(key.clone(), value.clone());
        }

        env.insert("CI".to_string(), "true".to_string());
        env.insert("CI_PIPELINE".to_string(), pipeline.name.clone());
        env.insert("CI_RUN_ID".to_string(), run_id.simple().to_string());
        env.insert("CI_JOB".to_string(), job.name.clone());
        env.insert("CI_EVENT".to_string(), event.kind.as_str().to_string());
        env.insert("CI_BRANCH".to_string(), event.branch.clone());
        env.insert("CI_WORKSPACE".to_string(), workspace.display().to_string());

        env.into_iter().collect()
    }
}

/// Fill in checkout parameters the config left blank: the repository
/// comes from the event's `repository` metadata, the reference from the
/// event branch.
fn resolve_builtins(steps: &[Step], event: &Event) -> Vec<Step> {
    steps
        .iter()
        .map(|step| match &step.action {
            StepAction::Builtin(BuiltinAction::Checkout {
                repository,
                reference,
            }) => {
                let mut resolved = step.clone();
                resolved.action = StepAction::Builtin(BuiltinAction::Checkout {
                    repository: repository
                        .clone()
                        .or_else(|| event.metadata("repository").map(String::from)),
                    reference: reference.clone().or_else(|| Some(event.branch.clone())),
                });
                resolved
            }
            StepAction::Run(_) => step.clone(),
        })
        .collect()
}
