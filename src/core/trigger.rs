//! Trigger rules deciding which events activate a job

use crate::core::config::TriggerConfig;
use crate::core::event::{Event, EventKind};
use std::collections::HashSet;

/// Characters that turn a branch filter into a glob pattern
const GLOB_TOKENS: &[char] = &['*', '?', '['];

/// A single branch filter, exact name or glob
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchPattern {
    Exact(String),
    Glob(String),
}

impl BranchPattern {
    /// Parse a filter string; a wildcard token makes it a glob
    pub fn parse(filter: &str) -> Self {
        if filter.contains(GLOB_TOKENS) {
            BranchPattern::Glob(filter.to_string())
        } else {
            BranchPattern::Exact(filter.to_string())
        }
    }

    pub fn matches(&self, branch: &str) -> bool {
        match self {
            BranchPattern::Exact(name) => name == branch,
            BranchPattern::Glob(pattern) => glob_match::glob_match(pattern, branch),
        }
    }
}

/// Decides whether an event activates a job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerRule {
    /// Event kinds this rule listens for
    pub event_kinds: HashSet<EventKind>,

    /// Branch filters; empty means any branch
    pub branch_filters: Vec<BranchPattern>,
}

impl TriggerRule {
    pub fn new(event_kinds: impl IntoIterator<Item = EventKind>) -> Self {
        Self {
            event_kinds: event_kinds.into_iter().collect(),
            branch_filters: Vec::new(),
        }
    }

    /// Restrict the rule to the given branch filters
    pub fn with_branches<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.branch_filters = filters
            .into_iter()
            .map(|f| BranchPattern::parse(f.as_ref()))
            .collect();
        self
    }

    /// Build a rule from its `on:` config block
    pub fn from_config(config: &TriggerConfig) -> Self {
        Self {
            event_kinds: config.events.iter().copied().collect(),
            branch_filters: config
                .branches
                .iter()
                .map(|f| BranchPattern::parse(f))
                .collect(),
        }
    }

    /// True when the event kind is declared and the branch passes a
    /// filter. An empty filter list matches every branch.
    pub fn matches(&self, event: &Event) -> bool {
        if !self.event_kinds.contains(&event.kind) {
            return false;
        }
        self.branch_filters.is_empty()
            || self
                .branch_filters
                .iter()
                .any(|filter| filter.matches(&event.branch))
    }
}
