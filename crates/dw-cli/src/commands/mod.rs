//! CLI command implementations

mod remove;
mod watch;

pub use remove::remove_command;
pub use watch::{shutdown_signal, watch_command};
