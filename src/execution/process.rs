//! Process launching - the seam between step logic and the operating system

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

/// Errors that prevent a command from producing an exit status
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("command not found: {0}")]
    NotFound(String),

    #[error("not executable: {0}")]
    NotExecutable(String),

    #[error("failed to spawn '{0}': {1}")]
    Spawn(String, #[source] std::io::Error),

    #[error("failed to wait for '{0}': {1}")]
    Wait(String, #[source] std::io::Error),

    #[error("invalid step: {0}")]
    Invalid(String),
}

/// A fully resolved command, ready to hand to the operating system
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Entries layered over the inherited process environment
    pub env: Vec<(String, String)>,
    /// Set when the command line runs under the platform shell
    pub via_shell: bool,
    /// Prefix for forwarded output lines, so interleaved logs stay
    /// attributable to their job and step
    pub log_tag: String,
}

impl Invocation {
    /// Run a command line under the platform shell
    pub fn shell(command_line: &str, cwd: PathBuf) -> Self {
        #[cfg(unix)]
        let (program, args) = (
            "sh".to_string(),
            vec!["-c".to_string(), command_line.to_string()],
        );

        #[cfg(windows)]
        let (program, args) = (
            "cmd".to_string(),
            vec!["/C".to_string(), command_line.to_string()],
        );

        Self {
            program,
            args,
            cwd,
            env: Vec::new(),
            via_shell: true,
            log_tag: String::new(),
        }
    }

    /// Run a program directly, without a shell
    pub fn program<I, S>(program: &str, args: I, cwd: PathBuf) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd,
            env: Vec::new(),
            via_shell: false,
            log_tag: String::new(),
        }
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    /// Tag forwarded output lines, usually with `job/step`
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.log_tag = tag.into();
        self
    }

    /// The command as a human-readable line, for logs and mocks
    pub fn display_line(&self) -> String {
        if self.via_shell {
            self.args.last().cloned().unwrap_or_default()
        } else {
            let mut line = self.program.clone();
            for arg in &self.args {
                line.push(' ');
                line.push_str(arg);
            }
            line
        }
    }
}

/// Trait for launching processes - allows tests to script exit codes
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run the invocation to completion and report its exit code.
    ///
    /// A process killed by a signal reports -1. Dropping the returned
    /// future kills the child.
    async fn run(&self, invocation: &Invocation) -> Result<i32, LaunchError>;
}

/// Launches real processes, forwarding their output line by line with
/// the invocation's log tag
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

/// Copy lines from a child stream to ours, prefixed with the tag
async fn forward_lines<R>(stream: R, tag: String, to_stderr: bool)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match (tag.is_empty(), to_stderr) {
            (true, false) => println!("{}", line),
            (true, true) => eprintln!("{}", line),
            (false, false) => println!("[{}] {}", tag, line),
            (false, true) => eprintln!("[{}] {}", tag, line),
        }
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<i32, LaunchError> {
        debug!(
            "Spawning '{}' with args {:?} in {}",
            invocation.program,
            invocation.args,
            invocation.cwd.display()
        );

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => LaunchError::NotFound(invocation.program.clone()),
            ErrorKind::PermissionDenied => LaunchError::NotExecutable(invocation.program.clone()),
            _ => LaunchError::Spawn(invocation.program.clone(), e),
        })?;

        // Drain pipes concurrently with the wait. If this future is
        // dropped the child is killed and the forwarders stop at EOF.
        let stdout_task = child
            .stdout
            .take()
            .map(|out| tokio::spawn(forward_lines(out, invocation.log_tag.clone(), false)));
        let stderr_task = child
            .stderr
            .take()
            .map(|err| tokio::spawn(forward_lines(err, invocation.log_tag.clone(), true)));

        let status = child
            .wait()
            .await
            .map_err(|e| LaunchError::Wait(invocation.program.clone(), e))?;

        if let Some(task) = stdout_task {
            let _ = task.await;
        }
        if let Some(task) = stderr_task {
            let _ = task.await;
        }

        Ok(status.code().unwrap_or(-1))
    }
}
