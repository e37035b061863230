//! Configuration file loading
//!
//! `offcache.toml` holds the gateway settings plus the storage directory.
//! Command line flags win over the file.

use std::path::{Path, PathBuf};

use offcache_core::GatewayConfig;
use serde::Deserialize;
use tokio::fs;
use tracing::debug;

use crate::args::Cli;
use crate::error::{CliError, CliResult};

pub const LOCAL_CONFIG: &str = "offcache.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    #[serde(flatten)]
    pub gateway: GatewayConfig,
    pub cache_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_toml(path: &Path, content: &str) -> CliResult<Self> {
        toml::from_str(content).map_err(|e| CliError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub async fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|source| CliError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("loaded config from {}", path.display());
        Self::from_toml(path, &content)
    }

    /// Explicit `--config`, else `./offcache.toml` if it exists, else defaults.
    pub async fn discover(explicit: Option<&Path>) -> CliResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path).await;
        }
        let local = Path::new(LOCAL_CONFIG);
        if fs::try_exists(local).await.unwrap_or(false) {
            return Self::load(local).await;
        }
        debug!("no config file, using defaults");
        Ok(Self::default())
    }

    pub fn apply_overrides(mut self, cli: &Cli) -> Self {
        if let Some(origin) = &cli.origin {
            self.gateway.origin = origin.clone();
        }
        if let Some(version) = &cli.cache_version {
            self.gateway.version = version.clone();
        }
        if let Some(dir) = &cli.cache_dir {
            self.cache_dir = Some(dir.clone());
        }
        self
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("offcache")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_full_file() {
        let toml = r#"
            prefix = "aft"
            version = "v3"
            origin = "https://boats.example.com/"
            offline_page = "/offline"
            manifest = ["/", "/offline"]
            cache_dir = "/tmp/offcache"
        "#;
        let config = FileConfig::from_toml(Path::new("offcache.toml"), toml).unwrap();
        assert_eq!(config.gateway.version, "v3");
        assert_eq!(config.gateway.origin.as_str(), "https://boats.example.com/");
        assert_eq!(config.gateway.manifest.len(), 2);
        assert_eq!(config.storage_dir(), PathBuf::from("/tmp/offcache"));
    }

    #[test]
    fn empty_file_is_defaults() {
        let config = FileConfig::from_toml(Path::new("offcache.toml"), "").unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn bad_origin_is_reported_with_path() {
        let err = FileConfig::from_toml(Path::new("x.toml"), "origin = 5").unwrap_err();
        assert!(matches!(err, CliError::ConfigInvalid { ref path, .. } if path == Path::new("x.toml")));
    }

    #[test]
    fn flags_override_file() {
        let cli = Cli::parse_from([
            "offcache",
            "--origin",
            "http://localhost:8000",
            "--cache-version",
            "v9",
            "status",
        ]);
        let config = FileConfig::default().apply_overrides(&cli);
        assert_eq!(config.gateway.origin.as_str(), "http://localhost:8000/");
        assert_eq!(config.gateway.version, "v9");
        assert_eq!(config.gateway.prefix, "aft");
    }

    #[tokio::test]
    async fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offcache.toml");
        std::fs::write(&path, "version = \"v2\"\n").unwrap();
        let config = FileConfig::discover(Some(&path)).await.unwrap();
        assert_eq!(config.gateway.version, "v2");
    }
}
