//! Coordinator configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use nf_protocol::DEFAULT_PORT;

use super::serde_utils::duration_secs;
use crate::error::ConfigError;
use crate::types::{ActionSpec, HostSet};

/// Configuration for the local coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Interface the notification listener binds to
    pub bind_host: String,

    /// Port shared by the reverse tunnels and the listener
    pub port: u16,

    /// Action run when an agent reports success
    pub success_action: ActionSpec,

    /// Action run when an agent reports failure
    pub failure_action: ActionSpec,

    /// Extra hosts by logical name, merged with ssh config discovery
    pub hosts: BTreeMap<String, String>,

    /// Tunnel process settings
    pub tunnel: TunnelConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            success_action: ActionSpec::default_success(),
            failure_action: ActionSpec::default_failure(),
            hosts: BTreeMap::new(),
            tunnel: TunnelConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Address the listener binds to
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    /// Hosts declared in the config file
    pub fn configured_hosts(&self) -> Result<HostSet, ConfigError> {
        HostSet::from_pairs(self.hosts.iter().map(|(n, a)| (n.clone(), a.clone())))
    }
}

/// How tunnel processes are launched and torn down
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelConfig {
    /// Remote-login program
    pub ssh_program: String,

    /// Arguments inserted before the generated ones
    pub ssh_args: Vec<String>,

    /// Text in the session output that signals a successful login
    pub login_marker: String,

    /// How long to wait for the login marker
    #[serde(with = "duration_secs")]
    pub login_timeout: Duration,

    /// How long a tunnel may take to exit after being asked to
    #[serde(with = "duration_secs")]
    pub close_grace: Duration,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            ssh_program: "ssh".to_string(),
            ssh_args: vec![],
            login_marker: "Success".to_string(),
            login_timeout: Duration::from_secs(30),
            close_grace: Duration::from_secs(10),
        }
    }
}

impl TunnelConfig {
    /// Full argument list for a reverse forward of `port` to `address`
    pub fn command_args(&self, address: &str, port: u16) -> Vec<String> {
        let mut args = self.ssh_args.clone();
        args.extend([
            "-tt".to_string(),
            address.to_string(),
            "-R".to_string(),
            format!("{}:localhost:{}", port, port),
        ]);
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.port, 10934);
        assert_eq!(config.listen_address(), "0.0.0.0:10934");
        assert_eq!(config.tunnel.close_grace, Duration::from_secs(10));
    }

    #[test]
    fn test_command_args() {
        let tunnel = TunnelConfig {
            ssh_args: vec!["-o".into(), "BatchMode=yes".into()],
            ..TunnelConfig::default()
        };
        assert_eq!(
            tunnel.command_args("10.0.0.5", 9000),
            vec!["-o", "BatchMode=yes", "-tt", "10.0.0.5", "-R", "9000:localhost:9000"]
        );
    }

    #[test]
    fn test_configured_hosts() {
        let mut config = CoordinatorConfig::default();
        config.hosts.insert("build1".into(), "10.0.0.5".into());
        let hosts = config.configured_hosts().unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts.get("build1").unwrap().address, "10.0.0.5");
    }
}
