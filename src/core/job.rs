//! Job and step domain model

use crate::core::config::{JobConfig, PipelineConfig, StepConfig, TriggerConfig};
use crate::core::trigger::TriggerRule;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::PathBuf;

/// What a step does when it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// A command line run through the platform shell
    Run(String),
    /// A named action the runner provides itself
    Builtin(BuiltinAction),
}

/// Built-in actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltinAction {
    /// Fetch the repository into the job workspace. Parameters default
    /// from the event (`repository` metadata, event branch).
    Checkout {
        repository: Option<String>,
        reference: Option<String>,
    },
}

impl BuiltinAction {
    /// Resolve a `uses:` name and its `with:` parameters. Unknown names
    /// return `None` and are rejected at load time.
    pub fn parse(kind: &str, params: &HashMap<String, String>) -> Option<Self> {
        match kind {
            "checkout" => Some(BuiltinAction::Checkout {
                repository: params.get("repository").cloned(),
                reference: params.get("ref").cloned(),
            }),
            _ => None,
        }
    }
}

/// One step of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Display name
    pub name: String,

    /// What to execute
    pub action: StepAction,

    /// Directory to run in, relative to the job workspace
    pub working_dir: Option<String>,
}

impl Step {
    /// A shell command step
    pub fn run(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: StepAction::Run(command.into()),
            working_dir: None,
        }
    }

    /// A built-in action step
    pub fn builtin(name: impl Into<String>, action: BuiltinAction) -> Self {
        Self {
            name: name.into(),
            action: StepAction::Builtin(action),
            working_dir: None,
        }
    }

    /// Run the step in a subdirectory of the workspace
    pub fn in_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Build a step from its config block. Assumes the config has been
    /// validated: exactly one of `run`/`uses` is set, and `uses` names a
    /// known action.
    pub fn from_config(config: &StepConfig) -> Self {
        if let Some(run) = &config.run {
            return Step {
                name: config.name.clone().unwrap_or_else(|| run.clone()),
                action: StepAction::Run(run.clone()),
                working_dir: config.working_directory.clone(),
            };
        }

        let uses = config.uses.clone().unwrap_or_default();
        let action = BuiltinAction::parse(&uses, &config.with)
            .map(StepAction::Builtin)
            .unwrap_or_else(|| StepAction::Run(String::new()));
        Step {
            name: config.name.clone().unwrap_or(uses),
            action,
            working_dir: config.working_directory.clone(),
        }
    }
}

/// An independently runnable unit: an ordered list of steps plus the
/// trigger that activates it. Jobs never reference each other's state.
#[derive(Debug, Clone)]
pub struct Job {
    pub name: String,
    pub trigger: TriggerRule,
    pub steps: Vec<Step>,
    pub env: HashMap<String, String>,
}

impl Job {
    pub fn new(name: impl Into<String>, trigger: TriggerRule) -> Self {
        Self {
            name: name.into(),
            trigger,
            steps: Vec::new(),
            env: HashMap::new(),
        }
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Build a job from its config block, falling back to the
    /// pipeline-level trigger when the job declares none
    pub fn from_config(
        name: &str,
        config: &JobConfig,
        default_trigger: Option<&TriggerConfig>,
    ) -> Self {
        let trigger = config
            .trigger
            .as_ref()
            .or(default_trigger)
            .map(TriggerRule::from_config)
            .unwrap_or_default();

        Job {
            name: name.to_string(),
            trigger,
            steps: config.steps.iter().map(Step::from_config).collect(),
            env: config.env.clone(),
        }
    }
}

/// A full pipeline definition: loaded once at startup, never mutated
/// afterwards, shared read-only across concurrent job runs
#[derive(Debug, Clone)]
pub struct PipelineDefinition {
    pub name: String,

    /// Pipeline-level environment, merged beneath each job's own
    pub env: HashMap<String, String>,

    /// Root directory per-job workspaces are created under
    pub workspace_root: PathBuf,

    /// Jobs in declaration order
    pub jobs: IndexMap<String, Job>,
}

impl PipelineDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            env: HashMap::new(),
            workspace_root: default_workspace_root(),
            jobs: IndexMap::new(),
        }
    }

    pub fn with_job(mut self, job: Job) -> Self {
        self.jobs.insert(job.name.clone(), job);
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Get a job by name
    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.get(name)
    }

    /// Create a definition from configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        let jobs = config
            .jobs
            .iter()
            .map(|(name, job_config)| {
                (
                    name.clone(),
                    Job::from_config(name, job_config, config.trigger.as_ref()),
                )
            })
            .collect();

        PipelineDefinition {
            name: config.name.clone(),
            env: config.env.clone(),
            workspace_root: config
                .workspace_root
                .clone()
                .unwrap_or_else(default_workspace_root),
            jobs,
        }
    }
}

/// Default location for per-job workspaces
pub fn default_workspace_root() -> PathBuf {
    std::env::temp_dir().join("minici")
}
