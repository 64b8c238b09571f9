//! Config command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::output::{print_error, print_info, print_success};
use nf_core::config::{self, ConfigFile};

fn resolve_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_path)
}

/// Print the config file location
pub fn config_path(config_path: Option<&Path>) -> Result<()> {
    println!("{}", resolve_path(config_path).display());
    Ok(())
}

/// Show the effective configuration
pub fn config_show(config_path: Option<&Path>) -> Result<()> {
    let path = resolve_path(config_path);
    let file = config::load_config_file(config_path).context("Failed to load configuration")?;

    if path.exists() {
        print_info(&format!("Configuration file: {:?}", path));
    } else {
        print_info(&format!("No configuration file at {:?}, showing defaults", path));
    }
    println!();

    let rendered = toml::to_string_pretty(&file).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}

/// Write a configuration file with every default filled in
pub fn config_init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = resolve_path(config_path);

    if path.exists() && !force {
        print_error(&format!("Config file already exists: {:?}", path));
        print_info("Use --force to overwrite");
        return Ok(());
    }

    config::save_config(&path, &ConfigFile::default())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;
    print_success(&format!("Created configuration file: {:?}", path));
    Ok(())
}
