//! nf-coordinator: Local side of notificate
//!
//! The coordinator runs on the developer's machine. It opens one reverse
//! SSH tunnel per remote host, and once every tunnel is up it listens on
//! the shared port for completion callbacks from agents, running the
//! configured success or failure action for each one.

pub mod action;
pub mod coordinator;
pub mod server;
pub mod state;
pub mod tunnel;

pub use coordinator::Coordinator;
pub use state::CoordinatorState;
pub use tunnel::{StatusBoard, TunnelManager, TunnelStatus};
