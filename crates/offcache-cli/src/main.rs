//! offcache - CLI entry point
//!
//! Drives the offline cache gateway against a live origin, persisting cache
//! buckets under a local directory between runs.

mod args;
mod commands;
mod config;
mod error;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Commands};
use crate::config::FileConfig;
use crate::error::CliResult;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ = debug. RUST_LOG wins when set.
    let default_filter = match cli.verbose {
        0 => "offcache=warn,offcache_core=warn",
        1 => "offcache=info,offcache_core=info",
        _ => "offcache=debug,offcache_core=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = FileConfig::discover(cli.config.as_deref())
        .await?
        .apply_overrides(&cli);

    match cli.command {
        Commands::Install => commands::install(&config).await,
        Commands::Activate => commands::activate(&config).await,
        Commands::Fetch(args) => commands::fetch(&config, args).await,
        Commands::Buckets => commands::buckets(&config).await,
        Commands::Status => commands::status(&config).await,
    }
}
