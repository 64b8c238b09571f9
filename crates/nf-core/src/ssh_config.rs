//! Host discovery from the user's ssh config
//!
//! Only `Host` / `HostName` pairs are read. Aliases containing wildcards
//! are patterns, not machines, and are skipped. Everything else in the
//! file is ignored.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::{Host, HostSet};

/// Default location of the ssh client config
pub fn default_ssh_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ssh").join("config"))
}

/// Parse `Host` / `HostName` pairs out of ssh config text.
///
/// Each alias of a `Host` line is paired with the first `HostName` that
/// follows it inside the same block, matching ssh's first-value-wins rule.
pub fn parse_hosts(content: &str) -> Vec<Host> {
    let mut found: Vec<Host> = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((keyword, value)) = split_keyword(line) else {
            continue;
        };

        if keyword.eq_ignore_ascii_case("Host") {
            pending = value
                .split_whitespace()
                .filter(|alias| !alias.contains(['*', '?', '!']))
                .map(str::to_string)
                .collect();
        } else if keyword.eq_ignore_ascii_case("Match") {
            pending.clear();
        } else if keyword.eq_ignore_ascii_case("HostName") {
            if pending.is_empty() {
                tracing::debug!("Found HostName {} but no host alias", value);
                continue;
            }
            for alias in pending.drain(..) {
                if found.iter().any(|h| h.name == alias) {
                    continue;
                }
                found.push(Host::new(alias, value));
            }
        }
    }

    found
}

/// `Keyword value` or `Keyword=value`
fn split_keyword(line: &str) -> Option<(&str, &str)> {
    let idx = line.find(|c: char| c.is_whitespace() || c == '=')?;
    let keyword = &line[..idx];
    let value = line[idx..].trim_start_matches(|c: char| c.is_whitespace() || c == '=');
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((keyword, value))
}

/// Read hosts from an ssh config file; a missing file yields an empty set
pub fn load_hosts(path: &Path) -> Result<HostSet, ConfigError> {
    if !path.exists() {
        return Ok(HostSet::new());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read {:?}: {}", path, e)))?;

    let mut set = HostSet::new();
    for host in parse_hosts(&content) {
        set.insert(host)?;
    }
    Ok(set)
}

/// Discover hosts from `~/.ssh/config`
pub fn discover_hosts() -> Result<HostSet, ConfigError> {
    match default_ssh_config_path() {
        Some(path) => load_hosts(&path),
        None => Ok(HostSet::new()),
    }
}

/// Turn requested names into hosts.
///
/// A requested name that is a known alias uses that alias's address;
/// anything else is taken to be an address ssh can reach directly.
pub fn resolve_requested(requested: &[String], known: &HostSet) -> Result<HostSet, ConfigError> {
    let mut set = HostSet::new();
    for name in requested {
        if set.get(name).is_some() {
            continue;
        }
        let address = known
            .get(name)
            .map(|h| h.address.clone())
            .unwrap_or_else(|| name.clone());
        set.insert(Host::new(name.clone(), address))?;
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# personal boxes
Host devbox
    HostName devbox.internal.example.com
    User me

Host build1 build1-alt
  HostName=10.0.0.5

Host *
    ServerAliveInterval 30

Host bastion
    User jump

Match host foo
    HostName ignored.example.com
"#;

    #[test]
    fn test_parse_hosts() {
        let hosts = parse_hosts(SAMPLE);
        let pairs: Vec<(&str, &str)> = hosts
            .iter()
            .map(|h| (h.name.as_str(), h.address.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("devbox", "devbox.internal.example.com"),
                ("build1", "10.0.0.5"),
                ("build1-alt", "10.0.0.5"),
            ]
        );
    }

    #[test]
    fn test_first_hostname_wins() {
        let hosts = parse_hosts("Host a\n HostName one\n HostName two\n");
        assert_eq!(hosts, vec![Host::new("a", "one")]);
    }

    #[test]
    fn test_hostname_before_any_host_ignored() {
        let hosts = parse_hosts("HostName orphan.example.com\nHost a\n HostName 1.1.1.1\n");
        assert_eq!(hosts, vec![Host::new("a", "1.1.1.1")]);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let hosts = parse_hosts("host a\n  hostname 1.2.3.4\n");
        assert_eq!(hosts, vec![Host::new("a", "1.2.3.4")]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let set = load_hosts(&dir.path().join("config")).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, SAMPLE).unwrap();
        let set = load_hosts(&path).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.get("devbox").unwrap().address, "devbox.internal.example.com");
    }

    #[test]
    fn test_resolve_requested() {
        let known = HostSet::from_pairs([("devbox", "devbox.internal")]).unwrap();
        let requested = vec![
            "devbox".to_string(),
            "10.0.0.7".to_string(),
            "devbox".to_string(),
        ];
        let set = resolve_requested(&requested, &known).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("devbox").unwrap().address, "devbox.internal");
        assert_eq!(set.get("10.0.0.7").unwrap().address, "10.0.0.7");
    }
}
