//! Error types for the offcache CLI

use std::path::PathBuf;

use offcache_core::app::BuildError;
use offcache_core::domain::{CacheError, FetchError, GatewayError};
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("invalid target {target:?}: {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("http client: {0}")]
    Http(#[from] FetchError),

    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("failed to write to stdout: {0}")]
    Stdout(#[source] std::io::Error),
}
