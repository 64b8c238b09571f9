//! Core error types for notificate

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the coordinator side
#[derive(Error, Debug)]
pub enum NotificateError {
    /// A tunnel could not be established
    #[error(transparent)]
    Tunnel(#[from] TunnelConnectError),

    /// Listener could not bind the shared port
    #[error("Failed to bind notification listener to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Listener failed while serving
    #[error("Notification listener failed: {0}")]
    Listener(#[source] std::io::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A reverse tunnel did not reach the established state
#[derive(Error, Debug)]
#[error("Error connecting to {host}: {reason}")]
pub struct TunnelConnectError {
    /// Logical name of the host
    pub host: String,
    /// What went wrong
    pub reason: ConnectFailure,
}

impl TunnelConnectError {
    /// Create a new connect error for a host
    pub fn new(host: impl Into<String>, reason: ConnectFailure) -> Self {
        Self {
            host: host.into(),
            reason,
        }
    }
}

/// Reasons a tunnel failed to connect
#[derive(Error, Debug)]
pub enum ConnectFailure {
    /// The tunnel process could not be started
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Login marker not seen within the timeout
    #[error("login marker {marker:?} not seen within {timeout:?}")]
    Timeout { marker: String, timeout: Duration },

    /// The process ended before printing the login marker
    #[error("process exited before login{}", last_line_suffix(.last_line))]
    ExitedEarly { last_line: Option<String> },

    /// Reading the process output failed
    #[error("failed to read tunnel output: {0}")]
    Read(#[source] std::io::Error),
}

fn last_line_suffix(last_line: &Option<String>) -> String {
    match last_line {
        Some(line) => format!(" (last output: {})", line),
        None => String::new(),
    }
}

/// Errors raised while invoking a configured action
#[derive(Error, Debug)]
pub enum ActionError {
    /// Action has no program to run
    #[error("Action has no command")]
    Empty,

    /// Action process could not be started
    #[error("Failed to start action {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Action process exited unsuccessfully
    #[error("Action {program} exited with status {code:?}")]
    Failed { program: String, code: Option<i32> },

    /// Terminal affordance could not be performed
    #[error("Failed to focus terminal: {0}")]
    Focus(#[source] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Action has no tokens
    #[error("Command should have at least one argument")]
    EmptyAction,

    /// Two hosts share a logical name
    #[error("Duplicate host name: {0}")]
    DuplicateHost(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tunnel_connect_error_names_host() {
        let err = TunnelConnectError::new(
            "build1",
            ConnectFailure::ExitedEarly {
                last_line: Some("Permission denied (publickey).".to_string()),
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("build1"));
        assert!(msg.contains("Permission denied"));
    }

    #[test]
    fn test_exited_early_without_output() {
        let reason = ConnectFailure::ExitedEarly { last_line: None };
        assert_eq!(reason.to_string(), "process exited before login");
    }

    #[test]
    fn test_tunnel_error_is_transparent() {
        let err: NotificateError = TunnelConnectError::new(
            "build1",
            ConnectFailure::Timeout {
                marker: "Success".to_string(),
                timeout: Duration::from_secs(30),
            },
        )
        .into();
        assert!(err.to_string().starts_with("Error connecting to build1"));
    }
}
