//! Local actions run in response to notifications

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use nf_core::error::ActionError;
use nf_core::{ActionSpec, ProcessRunner};

/// Performs a configured action
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Run the action to completion
    async fn execute(&self, action: &ActionSpec) -> Result<(), ActionError>;
}

/// Runs actions as local processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    /// Create a new process executor
    pub fn new() -> Self {
        Self
    }

    async fn run_tokens(&self, tokens: &[String]) -> Result<(), ActionError> {
        let mut cmd = ProcessRunner::build(tokens).ok_or(ActionError::Empty)?;
        let program = tokens[0].clone();

        cmd.stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let status = cmd
            .status()
            .await
            .map_err(|source| ActionError::Spawn {
                program: program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ActionError::Failed {
                program,
                code: status.code(),
            })
        }
    }
}

#[async_trait]
impl ActionExecutor for ProcessExecutor {
    async fn execute(&self, action: &ActionSpec) -> Result<(), ActionError> {
        match action {
            ActionSpec::Command(tokens) => self.run_tokens(tokens).await,
            ActionSpec::FocusTerminal => focus_terminal().await,
        }
    }
}

#[cfg(target_os = "macos")]
async fn focus_terminal() -> Result<(), ActionError> {
    let status = tokio::process::Command::new("osascript")
        .args(["-e", "activate application \"Terminal\""])
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(ActionError::Focus)?;

    if status.success() {
        Ok(())
    } else {
        Err(ActionError::Failed {
            program: "osascript".to_string(),
            code: status.code(),
        })
    }
}

#[cfg(not(target_os = "macos"))]
async fn focus_terminal() -> Result<(), ActionError> {
    use tokio::io::AsyncWriteExt;

    // No portable way to raise a window; ring the bell instead
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"\x07").await.map_err(ActionError::Focus)?;
    stdout.flush().await.map_err(ActionError::Focus)
}

/// Run an action on its own task without waiting for it.
///
/// Failures are logged against `label`, never returned.
pub fn dispatch(
    executor: Arc<dyn ActionExecutor>,
    action: ActionSpec,
    label: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::debug!("Running {} for [{}]", action, label);
        if let Err(e) = executor.execute(&action).await {
            tracing::warn!("Action {} for [{}] failed: {}", action, label, e);
        }
    })
}
