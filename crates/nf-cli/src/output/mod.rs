//! Output formatting utilities for the CLI
//!
//! Tables for host listings, tunnel summaries, and the colored status
//! lines used for everything the user is meant to read.

use std::time::Duration;

use tabled::{settings::Style, Table, Tabled};

use nf_coordinator::TunnelStatus;
use nf_core::Host;

/// Where a host entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSource {
    /// `~/.ssh/config`
    SshConfig,
    /// `[coordinator.hosts]` in the config file
    ConfigFile,
}

impl std::fmt::Display for HostSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostSource::SshConfig => write!(f, "ssh config"),
            HostSource::ConfigFile => write!(f, "config file"),
        }
    }
}

/// Format known hosts as an ASCII table
pub fn format_hosts(hosts: &[(Host, HostSource)]) -> String {
    if hosts.is_empty() {
        return "No hosts found".to_string();
    }

    #[derive(Tabled)]
    struct HostRow {
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "ADDRESS")]
        address: String,
        #[tabled(rename = "SOURCE")]
        source: String,
    }

    let rows: Vec<HostRow> = hosts
        .iter()
        .map(|(host, source)| HostRow {
            name: host.name.clone(),
            address: host.address.clone(),
            source: source.to_string(),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format final tunnel states as an ASCII table
pub fn format_tunnels(statuses: &[(String, TunnelStatus)]) -> String {
    if statuses.is_empty() {
        return "No tunnels".to_string();
    }

    #[derive(Tabled)]
    struct TunnelRow {
        #[tabled(rename = "HOST")]
        host: String,
        #[tabled(rename = "STATE")]
        state: String,
        #[tabled(rename = "LAST OUTPUT")]
        last_line: String,
    }

    let rows: Vec<TunnelRow> = statuses
        .iter()
        .map(|(host, status)| TunnelRow {
            host: host.clone(),
            state: status.state.to_string(),
            last_line: status
                .last_line
                .as_deref()
                .map(|l| truncate(l, 48))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format a duration in human-readable form
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{:.1}s", elapsed.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Truncate a string with ellipsis if too long
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix, to stderr
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow, to stderr
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_core::TunnelState;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3 * 3600 + 120)), "3h 2m");
        assert_eq!(format_duration(Duration::from_secs(2 * 86400 + 3600)), "2d 1h");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Permission denied (publickey)", 10), "Permissi...");
    }

    #[test]
    fn test_format_hosts() {
        assert_eq!(format_hosts(&[]), "No hosts found");

        let table = format_hosts(&[
            (Host::new("build1", "10.0.0.5"), HostSource::SshConfig),
            (Host::new("gpu", "gpu.lab"), HostSource::ConfigFile),
        ]);
        assert!(table.contains("NAME"));
        assert!(table.contains("10.0.0.5"));
        assert!(table.contains("config file"));
    }

    #[test]
    fn test_format_tunnels() {
        let table = format_tunnels(&[(
            "build1".to_string(),
            TunnelStatus {
                state: TunnelState::Closed,
                last_line: None,
            },
        )]);
        assert!(table.contains("build1"));
        assert!(table.contains("closed"));
    }
}
