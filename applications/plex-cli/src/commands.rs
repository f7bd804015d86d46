//! Command-line interface and command execution.

use clap::{Parser, Subcommand};
use plex_account::{Account, DeviceCollection, HttpClient};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plex-cli")]
#[command(about = "Manage a Plex.tv account from the command line", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Session token (overrides the configured one)
    #[arg(short, long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Sign in and print the user record, including the new token
    Login {
        /// Username or email
        #[arg(short, long)]
        username: String,
        /// Password
        #[arg(short, long, env = "PLEX_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the signed-in user
    Info,
    /// List registered devices
    Devices,
    /// List every resource on the account
    Resources,
    /// List media servers
    Servers,
    /// List playback clients
    Clients,
    /// Unregister a device
    RemoveDevice {
        /// Device id
        id: String,
    },
}

/// Run one command and return what should be printed.
pub async fn run<C: HttpClient + ?Sized>(
    command: Command,
    account: &mut Account<'_, C>,
) -> anyhow::Result<Value> {
    let output = match command {
        Command::Login { username, password } => account.authenticate(&username, &password).await?,
        Command::Info => account.info().await?,
        Command::Devices => account.devices().await?,
        Command::Resources => devices_json(&account.resources().await?)?,
        Command::Servers => devices_json(&account.servers().await?)?,
        Command::Clients => devices_json(&account.clients().await?)?,
        Command::RemoveDevice { id } => {
            account.remove_device(&id).await?;
            json!({ "removed": id })
        }
    };

    Ok(output)
}

fn devices_json(devices: &DeviceCollection) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(devices)?)
}
