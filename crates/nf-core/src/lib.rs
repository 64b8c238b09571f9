//! nf-core: Core abstractions and configuration for notificate
//!
//! This crate provides the shared domain types, configuration structures,
//! error types and command execution used by the coordinator, the agent
//! and the CLI.

pub mod config;
pub mod error;
pub mod runner;
pub mod ssh_config;
pub mod types;

pub use error::NotificateError;
pub use runner::{CommandRunner, ExitOutcome, ProcessRunner};
pub use types::{ActionSpec, Host, HostSet, TunnelState};
