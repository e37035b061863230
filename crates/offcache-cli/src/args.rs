//! CLI argument definitions using clap derive

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use url::Url;

/// offcache - offline cache gateway for a single web origin
#[derive(Parser, Debug)]
#[command(name = "offcache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path (default: ./offcache.toml if present)
    #[arg(short, long, global = true, env = "OFFCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Origin to serve, overrides the config file
    #[arg(long, global = true, env = "OFFCACHE_ORIGIN")]
    pub origin: Option<Url>,

    /// Cache version tag, overrides the config file
    #[arg(long = "cache-version", global = true)]
    pub cache_version: Option<String>,

    /// Directory holding the cache storage
    #[arg(long, global = true, env = "OFFCACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Precache the manifest
    Install,

    /// Install, then purge buckets from other versions
    Activate,

    /// Send one request through the gateway
    Fetch(FetchArgs),

    /// List buckets and their entries
    Buckets,

    /// Print gateway status as JSON
    Status,
}

#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Path or absolute URL
    pub target: String,

    /// Treat as a top-level page load
    #[arg(long)]
    pub navigate: bool,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Write the response body to stdout
    #[arg(long)]
    pub body: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fetch_with_flags() {
        let cli = Cli::parse_from([
            "offcache",
            "-vv",
            "--cache-version",
            "v2",
            "fetch",
            "/weather",
            "--navigate",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.cache_version.as_deref(), Some("v2"));
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.target, "/weather");
                assert!(args.navigate);
                assert_eq!(args.method, "GET");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_origin() {
        let result = Cli::try_parse_from(["offcache", "--origin", "not a url", "status"]);
        assert!(result.is_err());
    }
}
