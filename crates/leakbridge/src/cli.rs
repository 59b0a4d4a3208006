use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Bridge cloud leak/temperature/humidity sensors to a local accessory
/// registry.
#[derive(Debug, Parser)]
#[command(name = "leakbridge", version, about)]
pub struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, global = true, default_value = "leakbridge.toml")]
    pub config: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the bridge until interrupted (default).
    Run,
    /// Load and validate the config, then exit.
    CheckConfig,
}
