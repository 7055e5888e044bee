pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_FILENAME;

#[derive(Parser)]
#[command(name = "battery-relay")]
#[command(about = "Ingest battery telemetry and fault events from MQTT and answer history queries")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default config file
    Init(InitArgs),
    /// Connect to the broker and start relaying
    Run(RunArgs),
    /// Validate the config and print the topic routing table
    Check(CheckArgs),
}

#[derive(clap::Args)]
pub struct InitArgs {
    /// Path of the config file to create
    #[arg(long, default_value = CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to the config file
    #[arg(long, env = "BATTERY_RELAY_CONFIG", default_value = CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Override broker.host
    #[arg(long, env = "BATTERY_RELAY_BROKER_HOST")]
    pub broker_host: Option<String>,

    /// Override broker.port
    #[arg(long, env = "BATTERY_RELAY_BROKER_PORT")]
    pub broker_port: Option<u16>,

    /// Override broker.username
    #[arg(long, env = "BATTERY_RELAY_USERNAME")]
    pub username: Option<String>,

    /// Override broker.password
    #[arg(long, env = "BATTERY_RELAY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Override store.url (`memory` or a sqlite URL)
    #[arg(long, env = "BATTERY_RELAY_STORE_URL")]
    pub store_url: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

#[derive(clap::Args)]
pub struct CheckArgs {
    /// Path to the config file
    #[arg(long, env = "BATTERY_RELAY_CONFIG", default_value = CONFIG_FILENAME)]
    pub config: PathBuf,
}
