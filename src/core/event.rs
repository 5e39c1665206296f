//! Source-control events that trigger pipeline runs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Kind of event delivered by the source-control host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Commits pushed to a branch
    Push,
    /// A pull request opened or updated
    PullRequest,
    /// A run requested by hand
    Manual,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Push => "push",
            EventKind::PullRequest => "pull_request",
            EventKind::Manual => "manual",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single incoming event, consumed by one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// What happened
    pub kind: EventKind,

    /// Branch the event refers to
    pub branch: String,

    /// Provider-specific context (repository, sha, actor, ...)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Event {
    /// Create an event with empty metadata
    pub fn new(kind: EventKind, branch: impl Into<String>) -> Self {
        Self {
            kind,
            branch: branch.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add one metadata entry
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    /// Load an event from a JSON payload file (webhook shaped)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!("Failed to read event payload {}", path.as_ref().display())
        })?;
        let event: Event =
            serde_json::from_str(&content).context("Failed to parse event payload")?;
        Ok(event)
    }

    /// Look up a metadata entry
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}
