//! Plex.tv account command-line tool.

pub mod commands;
pub mod config;

pub use commands::{run, Cli, Command};
pub use config::CliConfig;
