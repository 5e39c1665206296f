//! minici - a minimal CI pipeline runner
//!
//! Events trigger jobs, jobs run their steps in order inside isolated
//! workspaces, and the orchestrator fans matching jobs out concurrently
//! before folding their results into a single outcome.

pub mod cli;
pub mod core;
pub mod execution;

// Re-export commonly used types
pub use crate::core::{
    Event, EventKind, Job, JobStatus, OverallStatus, PipelineDefinition, PipelineOutcome,
    RunResult, Step, TriggerRule,
};
pub use crate::execution::{
    cancel_channel, CancelSignal, EventBus, JobRunner, Orchestrator, PipelineEvent, SystemRunner,
};
