//! Step executor - runs a job's steps in order, stopping at the first failure

use crate::core::{BuiltinAction, Step, StepAction};
use crate::execution::cancel::CancelSignal;
use crate::execution::events::{EventBus, PipelineEvent};
use crate::execution::process::{Invocation, LaunchError, ProcessRunner};
use std::path::Path;
use tracing::{error, info, warn};

/// Exit codes the shell reserves for commands it could not run
const SHELL_NOT_EXECUTABLE: i32 = 126;
const SHELL_NOT_FOUND: i32 = 127;

/// Result of running one job's step sequence
#[derive(Debug)]
pub enum StepsOutcome {
    /// Every step exited zero
    Completed { steps_run: usize },
    /// A step ran and exited nonzero; later steps were skipped
    Failed { step_index: usize, exit_code: i32 },
    /// A step could not produce an exit status
    Errored { step_index: usize, error: LaunchError },
    /// Cancellation arrived before the sequence finished
    Cancelled { step_index: usize },
}

/// Executes a job's steps sequentially inside its workspace
pub struct StepExecutor<R> {
    runner: R,
}

impl<R: ProcessRunner> StepExecutor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Run `steps` in order with `env` layered over the inherited
    /// environment, failing fast on the first nonzero exit.
    pub async fn execute(
        &self,
        job_name: &str,
        steps: &[Step],
        env: &[(String, String)],
        workspace: &Path,
        events: &EventBus,
        cancel: &CancelSignal,
    ) -> StepsOutcome {
        for (index, step) in steps.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!("[{}] cancelled before step '{}'", job_name, step.name);
                return StepsOutcome::Cancelled { step_index: index };
            }

            info!(
                "[{}] step {}/{}: {}",
                job_name,
                index + 1,
                steps.len(),
                step.name
            );
            events.emit(PipelineEvent::StepStarted {
                job_name: job_name.to_string(),
                step_index: index,
                step_name: step.name.clone(),
            });

            let invocation = match self.invocation_for(step, env, workspace) {
                Ok(invocation) => invocation.tagged(format!("{}/{}", job_name, step.name)),
                Err(error) => {
                    error!("[{}] step '{}' is not runnable: {}", job_name, step.name, error);
                    events.emit(PipelineEvent::StepErrored {
                        job_name: job_name.to_string(),
                        step_index: index,
                        step_name: step.name.clone(),
                        error: error.to_string(),
                    });
                    return StepsOutcome::Errored {
                        step_index: index,
                        error,
                    };
                }
            };

            let result = tokio::select! {
                result = self.runner.run(&invocation) => result,
                _ = cancel.cancelled() => {
                    warn!("[{}] cancelled during step '{}'", job_name, step.name);
                    return StepsOutcome::Cancelled { step_index: index };
                }
            };

            match result {
                Ok(0) => {
                    info!("[{}] step '{}' succeeded", job_name, step.name);
                    events.emit(PipelineEvent::StepCompleted {
                        job_name: job_name.to_string(),
                        step_index: index,
                        step_name: step.name.clone(),
                    });
                }
                Ok(code) if invocation.via_shell && code == SHELL_NOT_FOUND => {
                    let error = LaunchError::NotFound(invocation.display_line());
                    error!("[{}] step '{}': {}", job_name, step.name, error);
                    events.emit(PipelineEvent::StepErrored {
                        job_name: job_name.to_string(),
                        step_index: index,
                        step_name: step.name.clone(),
                        error: error.to_string(),
                    });
                    return StepsOutcome::Errored {
                        step_index: index,
                        error,
                    };
                }
                Ok(code) if invocation.via_shell && code == SHELL_NOT_EXECUTABLE => {
                    let error = LaunchError::NotExecutable(invocation.display_line());
                    error!("[{}] step '{}': {}", job_name, step.name, error);
                    events.emit(PipelineEvent::StepErrored {
                        job_name: job_name.to_string(),
                        step_index: index,
                        step_name: step.name.clone(),
                        error: error.to_string(),
                    });
                    return StepsOutcome::Errored {
                        step_index: index,
                        error,
                    };
                }
                Ok(code) => {
                    warn!(
                        "[{}] step '{}' exited with code {}",
                        job_name, step.name, code
                    );
                    events.emit(PipelineEvent::StepFailed {
                        job_name: job_name.to_string(),
                        step_index: index,
                        step_name: step.name.clone(),
                        exit_code: code,
                    });
                    return StepsOutcome::Failed {
                        step_index: index,
                        exit_code: code,
                    };
                }
                Err(error) => {
                    error!("[{}] step '{}': {}", job_name, step.name, error);
                    events.emit(PipelineEvent::StepErrored {
                        job_name: job_name.to_string(),
                        step_index: index,
                        step_name: step.name.clone(),
                        error: error.to_string(),
                    });
                    return StepsOutcome::Errored {
                        step_index: index,
                        error,
                    };
                }
            }
        }

        StepsOutcome::Completed {
            steps_run: steps.len(),
        }
    }

    /// Build the invocation for a step relative to the job workspace
    fn invocation_for(
        &self,
        step: &Step,
        env: &[(String, String)],
        workspace: &Path,
    ) -> Result<Invocation, LaunchError> {
        let cwd = match &step.working_dir {
            Some(dir) => {
                let cwd = workspace.join(dir);
                if !cwd.is_dir() {
                    return Err(LaunchError::Invalid(format!(
                        "working directory '{}' does not exist",
                        dir
                    )));
                }
                cwd
            }
            None => workspace.to_path_buf(),
        };

        let invocation = match &step.action {
            StepAction::Run(command_line) => Invocation::shell(command_line, cwd),
            StepAction::Builtin(BuiltinAction::Checkout {
                repository,
                reference,
            }) => {
                let repository = repository.as_deref().ok_or_else(|| {
                    LaunchError::Invalid(
                        "checkout has no repository: set 'with: repository' \
                         or event metadata 'repository'"
                            .to_string(),
                    )
                })?;

                let mut args = vec!["clone".to_string(), "--depth".to_string(), "1".to_string()];
                if let Some(reference) = reference {
                    args.push("--branch".to_string());
                    args.push(reference.clone());
                }
                args.push(repository.to_string());
                args.push(".".to_string());

                Invocation::program("git", args, cwd)
            }
        };

        Ok(invocation.with_env(env.to_vec()))
    }
}
