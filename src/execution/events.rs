//! Events emitted while a pipeline run is in flight

use crate::core::{EventKind, JobStatus, OverallStatus};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Events that can occur during a pipeline run
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    RunStarted {
        run_id: Uuid,
        pipeline_name: String,
        event_kind: EventKind,
        branch: String,
    },
    JobStarted {
        job_name: String,
    },
    StepStarted {
        job_name: String,
        step_index: usize,
        step_name: String,
    },
    StepCompleted {
        job_name: String,
        step_index: usize,
        step_name: String,
    },
    StepFailed {
        job_name: String,
        step_index: usize,
        step_name: String,
        exit_code: i32,
    },
    StepErrored {
        job_name: String,
        step_index: usize,
        step_name: String,
        error: String,
    },
    JobCompleted {
        job_name: String,
        status: JobStatus,
    },
    RunCompleted {
        run_id: Uuid,
        overall: OverallStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(PipelineEvent) + Send + Sync>;

/// Fan-out to registered handlers; cloned into every job task
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<Mutex<Vec<EventHandler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add an event handler
    pub fn add_handler<F>(&self, handler: F)
    where
        F: Fn(PipelineEvent) + Send + Sync + 'static,
    {
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.push(Arc::new(handler));
        }
    }

    /// Emit an event to all handlers
    pub fn emit(&self, event: PipelineEvent) {
        if let Ok(handlers) = self.handlers.lock() {
            for handler in handlers.iter() {
                handler(event.clone());
            }
        }
    }
}
