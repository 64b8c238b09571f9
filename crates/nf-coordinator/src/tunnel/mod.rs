//! Reverse tunnel lifecycle

mod manager;
mod process;
mod status;

pub use manager::TunnelManager;
pub use process::Tunnel;
pub use status::{StatusBoard, TunnelStatus};
