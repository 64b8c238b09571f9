//! nf-agent: Remote side of notificate
//!
//! The agent runs on the remote host, inside the SSH session the
//! coordinator opened. It checks that the tunnel and listener answer, runs
//! the user's command, and sends back exactly one success or failure
//! notification.

pub mod client;
pub mod error;

pub use client::{AgentClient, RunReport};
pub use error::AgentError;
