//! HTTP client for the coordinator's listener

use std::time::{Duration, Instant};

use reqwest::StatusCode;

use nf_core::config::AgentConfig;
use nf_core::CommandRunner;
use nf_protocol::{NotificationKind, HOST_PARAM};

use crate::error::AgentError;

/// What happened in one [`AgentClient::run_and_notify`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Notification that was sent
    pub kind: NotificationKind,
    /// Time spent running the command
    pub elapsed: Duration,
    /// Exit code of the command, if one ran and exited normally
    pub exit_code: Option<i32>,
}

/// Talks to the coordinator through the reverse tunnel
pub struct AgentClient {
    http: reqwest::Client,
    base_url: String,
    identity: String,
}

impl AgentClient {
    /// Create a client from agent settings
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(AgentError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            identity: config.identity(),
        })
    }

    /// Identity declared in every request
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Check that the tunnel and the listener both answer
    pub async fn validate_connection(&self) -> Result<(), AgentError> {
        self.notify(NotificationKind::Validate).await?;
        tracing::info!("Server is online and reachable");
        Ok(())
    }

    /// Send a single notification
    pub async fn notify(&self, kind: NotificationKind) -> Result<(), AgentError> {
        let url = format!("{}{}", self.base_url, kind.path());
        tracing::debug!("GET {}?{}={}", url, HOST_PARAM, self.identity);

        let response = self
            .http
            .get(&url)
            .query(&[(HOST_PARAM, self.identity.as_str())])
            .send()
            .await
            .map_err(|source| AgentError::ConnectionUnavailable {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AgentError::UnexpectedResponse {
                url,
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// Run `command` and report how it ended.
    ///
    /// An empty command sends a success notification straight away. Either
    /// way exactly one notification is sent.
    pub async fn run_and_notify<R>(
        &self,
        command: &[String],
        runner: &R,
    ) -> Result<RunReport, AgentError>
    where
        R: CommandRunner + ?Sized,
    {
        if command.is_empty() {
            tracing::info!("No command given, notifying immediately");
            self.notify(NotificationKind::Success).await?;
            return Ok(RunReport {
                kind: NotificationKind::Success,
                elapsed: Duration::ZERO,
                exit_code: None,
            });
        }

        let started = Instant::now();
        let outcome = runner.run(command).await;
        let elapsed = started.elapsed();

        let kind = NotificationKind::for_outcome(outcome.succeeded);
        match kind {
            NotificationKind::Success => tracing::info!("Command done, notifying"),
            _ => tracing::info!("Command errored, notifying"),
        }
        self.notify(kind).await?;

        Ok(RunReport {
            kind,
            elapsed,
            exit_code: outcome.code,
        })
    }
}
