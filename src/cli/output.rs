//! CLI output formatting

use crate::core::{JobStatus, OverallStatus, RunResult};
use crate::execution::PipelineEvent;
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format a job status for display
pub fn format_job_status(status: JobStatus) -> String {
    match status {
        JobStatus::Success => style("SUCCESS").green().to_string(),
        JobStatus::Failure => style("FAILURE").red().to_string(),
        JobStatus::Error => style("ERROR").yellow().to_string(),
    }
}

/// Format an overall run status for display
pub fn format_overall_status(status: OverallStatus) -> String {
    match status {
        OverallStatus::Success => style("SUCCESS").green().to_string(),
        OverallStatus::Failure => style("FAILURE").red().to_string(),
    }
}

/// Format a pipeline event for display
pub fn format_pipeline_event(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::RunStarted {
            run_id,
            pipeline_name,
            event_kind,
            branch,
        } => format!(
            "{} Starting {} ({}) for {} on {}",
            ROCKET,
            style(pipeline_name).bold(),
            style(&run_id.to_string()[..8]).dim(),
            style(event_kind).cyan(),
            style(branch).cyan()
        ),
        PipelineEvent::JobStarted { job_name } => {
            format!("{} {}", SPINNER, style(job_name).cyan())
        }
        PipelineEvent::StepStarted {
            job_name,
            step_name,
            ..
        } => format!(
            "{} {} / {}",
            SPINNER,
            style(job_name).dim(),
            style(step_name).cyan()
        ),
        PipelineEvent::StepCompleted {
            job_name,
            step_name,
            ..
        } => format!(
            "{} {} / {}",
            CHECK,
            style(job_name).dim(),
            style(step_name).green()
        ),
        PipelineEvent::StepFailed {
            job_name,
            step_name,
            exit_code,
            ..
        } => format!(
            "{} {} / {} (exit {})",
            CROSS,
            style(job_name).dim(),
            style(step_name).red(),
            style(exit_code).red()
        ),
        PipelineEvent::StepErrored {
            job_name,
            step_name,
            error,
            ..
        } => format!(
            "{} {} / {}: {}",
            CROSS,
            style(job_name).dim(),
            style(step_name).red(),
            style(error).dim()
        ),
        PipelineEvent::JobCompleted { job_name, status } => match status {
            JobStatus::Success => format!("{} {}", CHECK, style(job_name).green()),
            JobStatus::Failure => format!("{} {}", CROSS, style(job_name).red()),
            JobStatus::Error => format!("{} {}", WARN, style(job_name).yellow()),
        },
        PipelineEvent::RunCompleted { run_id, overall } => format!(
            "{} Run ({}) finished: {}",
            INFO,
            style(&run_id.to_string()[..8]).dim(),
            format_overall_status(*overall)
        ),
    }
}

/// Format one job's result as a summary line
pub fn format_run_result(result: &RunResult) -> String {
    let icon = match result.status {
        JobStatus::Success => CHECK,
        JobStatus::Failure => CROSS,
        JobStatus::Error => WARN,
    };

    let mut line = format!(
        "{} {} - {}",
        icon,
        style(&result.job_name).bold(),
        format_job_status(result.status)
    );

    if let Some(step) = result.failed_step {
        line.push_str(&format!(" at step {}", step + 1));
    }
    if result.status == JobStatus::Failure {
        if let Some(code) = result.exit_code {
            line.push_str(&format!(" (exit {})", code));
        }
    }
    if let Some(error) = &result.error {
        line.push_str(&format!(": {}", style(error).dim()));
    }

    line
}
