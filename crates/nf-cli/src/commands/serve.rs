//! Coordinator command

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::output::{format_tunnels, print_info, print_success};
use nf_coordinator::Coordinator;
use nf_core::config::{self, CoordinatorConfig};
use nf_core::{ssh_config, ActionSpec, HostSet};

use super::hosts::known_host_set;

/// Flags for `notificate serve`
#[derive(Debug, Clone, Default)]
pub struct ServeArgs {
    /// Port override
    pub port: Option<u16>,
    /// Hosts named with `-a`
    pub addresses: Vec<String>,
    /// Success action tokens
    pub command: Vec<String>,
    /// Failure action tokens
    pub error_command: Vec<String>,
}

/// Apply command-line flags on top of file settings
pub fn apply_overrides(mut config: CoordinatorConfig, args: &ServeArgs) -> Result<CoordinatorConfig> {
    if let Some(port) = args.port {
        config.port = port;
    }
    if !args.command.is_empty() {
        config.success_action =
            ActionSpec::from_tokens(args.command.iter().cloned()).context("Invalid --command")?;
    }
    if !args.error_command.is_empty() {
        config.failure_action = ActionSpec::from_tokens(args.error_command.iter().cloned())
            .context("Invalid --error-command")?;
    }
    Ok(config)
}

/// Pick the hosts for this run.
///
/// Returns `None` when nothing was requested and nothing is known, in
/// which case the user has to be asked.
pub fn select_hosts(requested: &[String], known: &HostSet) -> Result<Option<HostSet>> {
    if !requested.is_empty() {
        return Ok(Some(ssh_config::resolve_requested(requested, known)?));
    }
    if !known.is_empty() {
        return Ok(Some(known.clone()));
    }
    Ok(None)
}

/// Ask for a single host to connect to
pub fn prompt_for_host<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<HostSet> {
    write!(output, "Which host would you like to connect to: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read host")?;
    let address = line.trim();
    if address.is_empty() {
        anyhow::bail!("No host given, nothing to connect to");
    }
    Ok(HostSet::from_pairs([(address, address)])?)
}

/// Settings and hosts for one coordinator run
#[derive(Debug, Clone)]
pub struct ServePlan {
    /// Coordinator settings with flags applied
    pub config: CoordinatorConfig,
    /// Hosts to tunnel to
    pub hosts: HostSet,
}

/// Load settings and pick the hosts, asking on stdin if none are known.
///
/// Must run before the shutdown signal handler is installed, so that
/// Ctrl+C at the prompt still ends the process.
pub async fn plan_serve(args: &ServeArgs, config_path: Option<&Path>) -> Result<ServePlan> {
    let file = config::load_config_file(config_path).context("Failed to load configuration")?;
    let config = apply_overrides(file.coordinator, args)?;

    let known = known_host_set(&config)?;
    let hosts = match select_hosts(&args.addresses, &known)? {
        Some(hosts) => hosts,
        None => tokio::task::spawn_blocking(|| {
            prompt_for_host(std::io::stdin().lock(), std::io::stdout())
        })
        .await
        .context("Host prompt failed")??,
    };

    Ok(ServePlan { config, hosts })
}

/// Run the coordinator until interrupted
pub async fn serve_command(plan: ServePlan, cancel: CancellationToken) -> Result<()> {
    let names: Vec<String> = plan.hosts.iter().map(ToString::to_string).collect();
    print_info(&format!("Dev servers found: {}", names.join(", ")));

    let coordinator = Coordinator::new(plan.config, plan.hosts);
    let board = coordinator.status_board();
    let result = coordinator.run(cancel).await;

    tracing::debug!("Final tunnel states:\n{}", format_tunnels(&board.snapshot()));
    result?;

    print_success("Goodnight!");
    Ok(())
}
