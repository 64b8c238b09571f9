//! notificate CLI
//!
//! Single binary for both halves of notificate:
//! - `serve` runs locally, opens reverse tunnels and waits for callbacks
//! - `run` runs on the remote host, wraps a command and calls back

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notificate::commands::{self, ServeArgs};
use notificate::output::print_error;

#[derive(Parser)]
#[command(name = "notificate")]
#[command(
    author,
    version,
    about = "Get notified when a long-running command on a remote host finishes"
)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open tunnels to remote hosts and wait for notifications (run locally)
    /// Alias: server
    #[command(alias = "server")]
    Serve {
        /// Port shared by the tunnels and the listener
        #[arg(short, long)]
        port: Option<u16>,

        /// ssh config name or address to connect to (repeatable).
        /// Defaults to every host in ~/.ssh/config
        #[arg(short = 'a', long = "address")]
        addresses: Vec<String>,

        /// Command to run on success; SILENT brings the terminal to front
        #[arg(short = 'c', long = "command", num_args = 1..)]
        command: Vec<String>,

        /// Command to run on failure
        #[arg(short = 'e', long = "error-command", num_args = 1..)]
        error_command: Vec<String>,
    },

    /// Run a command and notify the coordinator when it finishes (run remotely)
    /// Alias: client
    #[command(alias = "client")]
    Run {
        /// Tunnel port
        #[arg(short, long)]
        port: Option<u16>,

        /// Command to run; pass a single quoted string for multi-step commands.
        /// With no command, notifies immediately
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// List hosts from ~/.ssh/config and the config file
    Hosts,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show effective configuration
    Show,
    /// Show config file path
    Path,
    /// Write a config file with defaults
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Whether a remote shell launched us, going by `HOSTNAME`
fn looks_remote() -> bool {
    std::env::var("HOSTNAME").map(|h| !h.is_empty()).unwrap_or(false)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // No subcommand picks a role: agent inside a remote shell, else coordinator
    let command = cli.command.unwrap_or_else(|| {
        if looks_remote() {
            Commands::Run {
                port: None,
                command: Vec::new(),
            }
        } else {
            Commands::Serve {
                port: None,
                addresses: Vec::new(),
                command: Vec::new(),
                error_command: Vec::new(),
            }
        }
    });

    // Long-running roles narrate at info by default
    let long_running = matches!(command, Commands::Serve { .. } | Commands::Run { .. });
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) if long_running => "info",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = cli.config.as_deref();

    let result = match command {
        Commands::Serve {
            port,
            addresses,
            command,
            error_command,
        } => {
            let args = ServeArgs {
                port,
                addresses,
                command,
                error_command,
            };
            // The host prompt must finish before Ctrl+C is captured
            match commands::plan_serve(&args, config_path).await {
                Ok(plan) => commands::serve_command(plan, shutdown_token()).await,
                Err(e) => Err(e),
            }
        }

        Commands::Run { port, command } => commands::run_command(port, command, config_path)
            .await
            .map(|_| ()),

        Commands::Hosts => commands::hosts_command(config_path),

        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_show(config_path),
            ConfigAction::Path => commands::config_path(config_path),
            ConfigAction::Init { force } => commands::config_init(config_path, force),
        },
    };

    if let Err(e) = &result {
        print_error(&format!("{:#}", e));
    }
    result
}

/// Cancellation token tripped by Ctrl+C or SIGTERM
fn shutdown_token() -> CancellationToken {
    let cancel = CancellationToken::new();

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, initiating shutdown...");
            }
        }

        cancel_clone.cancel();
    });

    cancel
}
