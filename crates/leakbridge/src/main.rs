mod cache;
mod cli;
mod config;
mod sink;

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use leakbridge_core::Bridge;

use crate::cache::JsonCacheHost;
use crate::cli::{Cli, Command};
use crate::sink::ConfigFileSink;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        error!("{err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let file_config = config::load(&cli.config)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::CheckConfig => {
            file_config.into_bridge_config()?;
            info!("config OK");
            Ok(())
        }
        Command::Run => {
            let cache_path = file_config
                .cache_file
                .clone()
                .unwrap_or_else(|| cli.config.with_extension("cache.json"));
            let bridge_config = file_config.into_bridge_config()?;

            let host = Arc::new(JsonCacheHost::new(cache_path));
            let sink = Arc::new(ConfigFileSink::new(cli.config.clone()));

            let cached = host.load();
            let bridge = Bridge::new(bridge_config, host, sink)?;
            bridge.restore(cached).await;

            // The "ready" signal: first discovery runs now, the timers
            // take over afterwards.
            bridge.start().await;

            tokio::signal::ctrl_c().await?;
            info!("interrupt received; shutting down");
            bridge.shutdown().await;
            Ok(())
        }
    }
}
