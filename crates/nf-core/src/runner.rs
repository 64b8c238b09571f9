//! Running the user's command
//!
//! A failing command is an expected outcome here, not an error: every
//! path through [`CommandRunner::run`] ends in an [`ExitOutcome`].

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

/// Result of running a command to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Whether the command exited with status 0
    pub succeeded: bool,
    /// Exit code, if the process exited normally
    pub code: Option<i32>,
}

impl ExitOutcome {
    /// Outcome for a command that never ran
    pub fn not_started() -> Self {
        Self {
            succeeded: false,
            code: None,
        }
    }
}

impl From<std::process::ExitStatus> for ExitOutcome {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            succeeded: status.success(),
            code: status.code(),
        }
    }
}

/// Executes a command and reports how it ended
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion
    async fn run(&self, command: &[String]) -> ExitOutcome;
}

/// Runs commands as child processes attached to the current terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a new process runner
    pub fn new() -> Self {
        Self
    }

    /// Build the process for a token list.
    ///
    /// A single token with whitespace in it is a shell line such as
    /// `"make && make test"` and goes through the platform shell.
    pub fn build(command: &[String]) -> Option<Command> {
        let (program, args) = command.split_first()?;

        if args.is_empty() && program.trim().contains(char::is_whitespace) {
            return Some(shell_command(program));
        }

        let mut cmd = Command::new(program);
        cmd.args(args);
        Some(cmd)
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &[String]) -> ExitOutcome {
        let Some(mut cmd) = Self::build(command) else {
            tracing::warn!("Empty command, nothing to run");
            return ExitOutcome::not_started();
        };

        // Environment and stdio are inherited so output streams straight through
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        tracing::info!("Command: [{}]", command.join(", "));

        match cmd.status().await {
            Ok(status) => {
                let outcome = ExitOutcome::from(status);
                tracing::debug!("Command exited with {:?}", outcome.code);
                outcome
            }
            Err(e) => {
                tracing::error!("Failed to run {}: {}", command[0], e);
                ExitOutcome::not_started()
            }
        }
    }
}

#[cfg(unix)]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}
