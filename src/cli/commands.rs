//! CLI command definitions

use crate::core::EventKind;
use clap::Args;
use std::path::PathBuf;

/// Run the pipeline for an event
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to pipeline YAML file
    #[arg(short, long, default_value = "ci.yml")]
    pub file: String,

    /// Event kind to run for
    #[arg(short, long, value_enum, required_unless_present = "event_file")]
    pub event: Option<EventKindArg>,

    /// Branch the event refers to
    #[arg(short, long, default_value = "main")]
    pub branch: String,

    /// Event metadata entries (key=value)
    #[arg(long = "meta", value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,

    /// Read the event from a JSON payload file instead of flags
    #[arg(long, conflicts_with_all = ["event", "branch", "metadata"])]
    pub event_file: Option<String>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,

    /// Leave job workspaces on disk after the run
    #[arg(long)]
    pub keep_workspaces: bool,

    /// Directory job workspaces are created under
    #[arg(long)]
    pub workspace_root: Option<PathBuf>,
}

/// Validate a pipeline configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long, default_value = "ci.yml")]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Event kind argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EventKindArg {
    Push,
    #[clap(name = "pull-request", alias = "pull_request")]
    PullRequest,
    Manual,
}

impl From<EventKindArg> for EventKind {
    fn from(arg: EventKindArg) -> Self {
        match arg {
            EventKindArg::Push => EventKind::Push,
            EventKindArg::PullRequest => EventKind::PullRequest,
            EventKindArg::Manual => EventKind::Manual,
        }
    }
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!("Invalid key=value pair: {}", s));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}
