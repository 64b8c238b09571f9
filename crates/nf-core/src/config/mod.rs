//! Configuration management for notificate

mod agent;
mod coordinator;
pub mod serde_utils;

pub use agent::AgentConfig;
pub use coordinator::{CoordinatorConfig, TunnelConfig};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Whole configuration file, one section per role
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Local coordinator settings
    pub coordinator: CoordinatorConfig,
    /// Remote agent settings
    pub agent: AgentConfig,
}

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notificate")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load the config file, falling back to defaults.
///
/// An explicitly requested path must exist and parse. The default path is
/// optional: when it is missing or broken the defaults are used and a
/// warning is logged.
pub fn load_config_file(explicit: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    let default_path = default_config_path();
    if !default_path.exists() {
        tracing::debug!("No config at {:?}, using defaults", default_path);
        return Ok(ConfigFile::default());
    }

    Ok(load_config(&default_path).unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from {:?}: {}", default_path, e);
        ConfigFile::default()
    }))
}

/// Save configuration to a file
pub fn save_config<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write config: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionSpec;
    use std::time::Duration;

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = load_config_file(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[coordinator]
port = 9000
success_action = ["echo", "done"]

[coordinator.hosts]
build1 = "10.0.0.5"

[coordinator.tunnel]
close_grace = 3

[agent]
port = 9000
"#,
        )
        .unwrap();

        let config = load_config_file(Some(&path)).unwrap();
        assert_eq!(config.coordinator.port, 9000);
        assert_eq!(
            config.coordinator.success_action,
            ActionSpec::Command(vec!["echo".into(), "done".into()])
        );
        assert_eq!(config.coordinator.failure_action, ActionSpec::default_failure());
        assert_eq!(
            config.coordinator.hosts.get("build1").map(String::as_str),
            Some("10.0.0.5")
        );
        assert_eq!(config.coordinator.tunnel.close_grace, Duration::from_secs(3));
        assert_eq!(config.coordinator.tunnel.login_marker, "Success");
        assert_eq!(config.agent.port, 9000);
    }

    #[test]
    fn test_empty_action_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[coordinator]\nsuccess_action = []\n").unwrap();
        assert!(load_config_file(Some(&path)).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ConfigFile::default();
        config.coordinator.failure_action = ActionSpec::FocusTerminal;
        save_config(&path, &config).unwrap();

        let reloaded: ConfigFile = load_config(&path).unwrap();
        assert_eq!(reloaded.coordinator.failure_action, ActionSpec::FocusTerminal);
        assert_eq!(reloaded.coordinator.port, config.coordinator.port);
    }
}
