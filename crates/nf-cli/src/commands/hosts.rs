//! Host listing

use std::path::Path;

use anyhow::{Context, Result};

use crate::output::{format_hosts, print_info, print_warning, HostSource};
use nf_core::config::{self, CoordinatorConfig};
use nf_core::{ssh_config, Host, HostSet};

/// Every host the coordinator knows about, tagged with where it came from.
///
/// Hosts from the config file come first and shadow ssh config aliases of
/// the same name.
pub fn known_hosts(config: &CoordinatorConfig) -> Result<Vec<(Host, HostSource)>> {
    let configured = config
        .configured_hosts()
        .context("Invalid [coordinator.hosts] table")?;
    let discovered = ssh_config::discover_hosts().context("Failed to read ssh config")?;

    let mut hosts: Vec<_> = configured
        .iter()
        .cloned()
        .map(|h| (h, HostSource::ConfigFile))
        .collect();
    for host in &discovered {
        if configured.get(&host.name).is_none() {
            hosts.push((host.clone(), HostSource::SshConfig));
        }
    }
    Ok(hosts)
}

/// Known hosts as a set
pub fn known_host_set(config: &CoordinatorConfig) -> Result<HostSet> {
    let mut set = HostSet::new();
    for (host, _) in known_hosts(config)? {
        set.insert(host)?;
    }
    Ok(set)
}

/// List known hosts
pub fn hosts_command(config_path: Option<&Path>) -> Result<()> {
    let file = config::load_config_file(config_path).context("Failed to load configuration")?;
    let hosts = known_hosts(&file.coordinator)?;

    if hosts.is_empty() {
        print_warning("No hosts found in ~/.ssh/config or the config file");
        print_info("Pass hosts explicitly with 'notificate serve -a <host>'");
        return Ok(());
    }

    println!("{}", format_hosts(&hosts));
    Ok(())
}
