//! notificate CLI library
//!
//! Command implementations and terminal output shared by the `notificate`
//! binary.

pub mod commands;
pub mod output;
