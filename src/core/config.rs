//! Pipeline configuration from YAML

use crate::core::event::EventKind;
use crate::core::job::BuiltinAction;
use crate::core::PipelineDefinition;
use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name
    pub name: String,

    /// Default trigger for jobs that declare none
    #[serde(default, rename = "on")]
    pub trigger: Option<TriggerConfig>,

    /// Pipeline-level environment, merged beneath each job's own
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Root directory per-job workspaces are created under
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,

    /// Jobs, keyed by name; declaration order is preserved
    pub jobs: IndexMap<String, JobConfig>,
}

/// Trigger configuration (`on:` block)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Event kinds that activate the job
    pub events: Vec<EventKind>,

    /// Branch filters; empty means any branch. A filter containing a
    /// wildcard is a glob pattern, otherwise it is an exact name.
    #[serde(default)]
    pub branches: Vec<String>,
}

/// Job configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Per-job trigger, overriding the pipeline default
    #[serde(default, rename = "on")]
    pub trigger: Option<TriggerConfig>,

    /// Job-level environment entries
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Ordered steps
    pub steps: Vec<StepConfig>,
}

/// Step configuration as defined in YAML. Exactly one of `run` and
/// `uses` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Display name; defaults to the command or action name
    #[serde(default)]
    pub name: Option<String>,

    /// Shell command line
    #[serde(default)]
    pub run: Option<String>,

    /// Built-in action name
    #[serde(default)]
    pub uses: Option<String>,

    /// Parameters for the built-in action
    #[serde(default)]
    pub with: HashMap<String, String>,

    /// Directory to run in, relative to the job workspace
    #[serde(default)]
    pub working_directory: Option<String>,
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        if self.jobs.is_empty() {
            anyhow::bail!("Pipeline '{}' declares no jobs", self.name);
        }

        for (job_name, job) in &self.jobs {
            if !is_valid_job_name(job_name) {
                anyhow::bail!(
                    "Invalid job name '{}': use letters, digits, '-' and '_'",
                    job_name
                );
            }

            match job.trigger.as_ref().or(self.trigger.as_ref()) {
                None => anyhow::bail!(
                    "Job '{}' has no 'on' block and the pipeline declares no default",
                    job_name
                ),
                Some(trigger) if trigger.events.is_empty() => {
                    anyhow::bail!("Job '{}' trigger lists no events", job_name)
                }
                Some(_) => {}
            }

            if job.steps.is_empty() {
                anyhow::bail!("Job '{}' has no steps", job_name);
            }

            for (index, step) in job.steps.iter().enumerate() {
                self.validate_step(job_name, index, step)?;
            }
        }

        Ok(())
    }

    fn validate_step(&self, job_name: &str, index: usize, step: &StepConfig) -> Result<()> {
        match (&step.run, &step.uses) {
            (Some(_), Some(_)) => anyhow::bail!(
                "Job '{}' step {} sets both 'run' and 'uses'",
                job_name,
                index + 1
            ),
            (None, None) => anyhow::bail!(
                "Job '{}' step {} sets neither 'run' nor 'uses'",
                job_name,
                index + 1
            ),
            _ => {}
        }

        if !step.with.is_empty() && step.uses.is_none() {
            anyhow::bail!(
                "Job '{}' step {} has 'with' parameters but no 'uses' action",
                job_name,
                index + 1
            );
        }

        if let Some(uses) = &step.uses {
            if BuiltinAction::parse(uses, &step.with).is_none() {
                anyhow::bail!(
                    "Job '{}' step {} uses unknown action '{}'",
                    job_name,
                    index + 1,
                    uses
                );
            }
        }

        if let Some(dir) = &step.working_directory {
            let path = Path::new(dir);
            if path.is_absolute() {
                anyhow::bail!(
                    "Job '{}' step {} working_directory must be relative: {}",
                    job_name,
                    index + 1,
                    dir
                );
            }
            if path
                .components()
                .any(|c| matches!(c, Component::ParentDir))
            {
                anyhow::bail!(
                    "Job '{}' step {} working_directory must not contain '..': {}",
                    job_name,
                    index + 1,
                    dir
                );
            }
        }

        Ok(())
    }

    /// Convert config to the pipeline domain model
    pub fn to_definition(&self) -> PipelineDefinition {
        PipelineDefinition::from_config(self)
    }
}

fn is_valid_job_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
