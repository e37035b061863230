//! Gateway configuration.
//!
//! Bucket names, the scope origin and the precache manifest are plain values
//! handed to `GatewayBuilder`, so several gateways (e.g. `v1` and `v2`) can
//! live side by side over one cache store.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{DEFAULT_OFFLINE_PAGE, PrecacheManifest};

pub const DEFAULT_PREFIX: &str = "aft";
pub const DEFAULT_VERSION: &str = "v1";
pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:5000/";

/// GatewayConfig はゲートウェイの設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Short identifier shared by every bucket this deployment owns.
    pub prefix: String,

    /// Bumped to invalidate every bucket written by earlier versions.
    pub version: String,

    /// Origin of the page the gateway serves.
    pub origin: Url,

    /// Served when a navigation fails at the network level. Must be precached.
    pub offline_page: String,

    pub manifest: PrecacheManifest,
}

impl GatewayConfig {
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_manifest(mut self, manifest: PrecacheManifest) -> Self {
        self.manifest = manifest;
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            version: DEFAULT_VERSION.to_string(),
            origin: Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid URL"),
            offline_page: DEFAULT_OFFLINE_PAGE.to_string(),
            manifest: PrecacheManifest::default(),
        }
    }
}
