//! Agent command

use std::path::Path;

use anyhow::{Context, Result};

use crate::output::{format_duration, print_info, print_success, print_warning};
use nf_agent::{AgentClient, RunReport};
use nf_core::config;
use nf_core::ProcessRunner;
use nf_protocol::NotificationKind;

/// Validate the tunnel, run `command`, and report back
pub async fn run_command(
    port: Option<u16>,
    command: Vec<String>,
    config_path: Option<&Path>,
) -> Result<RunReport> {
    let file = config::load_config_file(config_path).context("Failed to load configuration")?;
    let mut agent_config = file.agent;
    if let Some(port) = port {
        agent_config.port = port;
    }

    let client = AgentClient::new(&agent_config)?;
    client.validate_connection().await?;
    print_success(&format!(
        "Server is online and reachable (as {})",
        client.identity()
    ));

    if command.is_empty() {
        print_info("No command given, notifying immediately");
    } else {
        print_info("You will be notified when your command is done");
    }

    let report = client.run_and_notify(&command, &ProcessRunner::new()).await?;

    match report.kind {
        NotificationKind::Failure => print_warning(&format!(
            "Command failed{} after {}, notified",
            report
                .exit_code
                .map(|c| format!(" with exit code {}", c))
                .unwrap_or_default(),
            format_duration(report.elapsed)
        )),
        _ if command.is_empty() => print_success("Notified"),
        _ => print_success(&format!(
            "Done! Command finished in {}",
            format_duration(report.elapsed)
        )),
    }

    Ok(report)
}
