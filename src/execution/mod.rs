//! Pipeline execution engine

pub mod cancel;
pub mod events;
pub mod executor;
pub mod orchestrator;
pub mod process;
pub mod runner;
pub mod workspace;

pub use cancel::{cancel_channel, CancelHandle, CancelSignal};
pub use events::{EventBus, EventHandler, PipelineEvent};
pub use executor::{StepExecutor, StepsOutcome};
pub use orchestrator::{Orchestrator, RunState};
pub use process::{Invocation, LaunchError, ProcessRunner, SystemRunner};
pub use runner::JobRunner;
pub use workspace::Workspace;
