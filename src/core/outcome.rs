//! Run results and the aggregated pipeline outcome

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal status of one job run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Every step exited zero
    Success,
    /// A step ran and exited non-zero
    Failure,
    /// A step could not be run at all, or the run was interrupted
    Error,
}

/// The recorded result of one job run. Created by the job runner when
/// the job ends; immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub job_name: String,

    pub status: JobStatus,

    /// Index of the step that stopped the job (0-based)
    pub failed_step: Option<usize>,

    /// Exit code of the last step that ran. Absent for launch errors
    /// and cancelled runs, where no exit status exists.
    pub exit_code: Option<i32>,

    /// Diagnostic for error results
    pub error: Option<String>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Success
    }

    /// Result for a job whose task ended without reporting (panicked or
    /// was aborted)
    pub fn aborted(job_name: impl Into<String>, detail: String) -> Self {
        let now = Utc::now();
        RunResult {
            job_name: job_name.into(),
            status: JobStatus::Error,
            failed_step: None,
            exit_code: None,
            error: Some(detail),
            started_at: now,
            finished_at: now,
        }
    }
}

/// Overall verdict for a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Success,
    Failure,
}

/// Aggregated outcome of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub run_id: Uuid,

    pub pipeline_name: String,

    pub overall: OverallStatus,

    /// Per-job results, in job declaration order
    pub results: Vec<RunResult>,
}

impl PipelineOutcome {
    /// Fold per-job results into the overall verdict. An empty result
    /// list (no job matched) is a success.
    pub fn from_results(
        run_id: Uuid,
        pipeline_name: impl Into<String>,
        results: Vec<RunResult>,
    ) -> Self {
        let overall = if results.iter().all(RunResult::is_success) {
            OverallStatus::Success
        } else {
            OverallStatus::Failure
        };
        Self {
            run_id,
            pipeline_name: pipeline_name.into(),
            overall,
            results,
        }
    }

    pub fn is_success(&self) -> bool {
        self.overall == OverallStatus::Success
    }

    /// Get the result for a job by name
    pub fn result(&self, job_name: &str) -> Option<&RunResult> {
        self.results.iter().find(|r| r.job_name == job_name)
    }

    /// Process exit code for this outcome: 0 on success, otherwise the
    /// first failing job's exit code when it has one, else 1.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            return 0;
        }
        self.results
            .iter()
            .find(|r| !r.is_success())
            .and_then(|r| r.exit_code)
            .unwrap_or(1)
    }
}
