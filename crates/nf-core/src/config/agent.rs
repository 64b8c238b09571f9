//! Agent configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use nf_protocol::DEFAULT_PORT;

use super::serde_utils::duration_secs;

/// Configuration for the remote agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Tunnel port on the remote side
    pub port: u16,

    /// Identity sent with every request (defaults to $HOSTNAME, then the OS hostname)
    pub host_name: Option<String>,

    /// Per-request timeout
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host_name: None,
            request_timeout: Duration::from_secs(20),
        }
    }
}

impl AgentConfig {
    /// Get the declared identity, falling back to the environment and hostname
    pub fn identity(&self) -> String {
        self.host_name
            .clone()
            .or_else(|| std::env::var("HOSTNAME").ok().filter(|h| !h.is_empty()))
            .unwrap_or_else(|| gethostname::gethostname().to_string_lossy().into_owned())
    }

    /// Base URL of the listener as seen through the tunnel
    pub fn base_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}
