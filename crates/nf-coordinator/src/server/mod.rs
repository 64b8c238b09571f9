//! HTTP listener for agent callbacks

mod handler;
mod listener;

pub use handler::router;
pub use listener::NotificationServer;
