//! CLI command implementations

mod config;
mod hosts;
mod run;
mod serve;

pub use config::{config_init, config_path, config_show};
pub use hosts::{hosts_command, known_host_set, known_hosts};
pub use run::run_command;
pub use serve::{
    apply_overrides, plan_serve, prompt_for_host, select_hosts, serve_command, ServeArgs,
    ServePlan,
};
