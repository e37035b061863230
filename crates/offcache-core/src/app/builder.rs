//! GatewayBuilder - ゲートウェイの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - 設定値の不整合は `build()` 時に `BuildError` で返す
//! - install まで待たずに「オフラインページがマニフェストにない」などを検出する

use std::collections::HashSet;
use std::sync::Arc;

use url::Url;

use super::gateway::{Gateway, GatewayParts};
use crate::config::GatewayConfig;
use crate::domain::{BucketSet, Request};
use crate::impls::{InMemoryCacheStore, InMemoryClients};
use crate::ports::{CacheStore, Clients, Clock, Fetcher, SystemClock};

/// GatewayBuilder は Gateway を構築
///
/// # 使用例
/// ```ignore
/// let gateway = GatewayBuilder::new(GatewayConfig::default())
///     .cache_store(Arc::new(FsCacheStore::new(dir)))
///     .fetcher(Arc::new(HttpFetcher::new(&origin)?))
///     .build()?;
/// ```
///
/// fetcher 以外は省略可能（InMemoryCacheStore / InMemoryClients / SystemClock）。
pub struct GatewayBuilder {
    config: GatewayConfig,
    store: Option<Arc<dyn CacheStore>>,
    fetcher: Option<Arc<dyn Fetcher>>,
    clients: Option<Arc<dyn Clients>>,
    clock: Option<Arc<dyn Clock>>,
}

/// BuildError はゲートウェイ構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("bucket prefix must not be empty")]
    EmptyPrefix,

    #[error("cache version must not be empty")]
    EmptyVersion,

    #[error("origin {0} has no host to compare request origins against")]
    OpaqueOrigin(Url),

    #[error("precache manifest is empty")]
    EmptyManifest,

    #[error("manifest entry {entry:?} is not a valid URL: {source}")]
    InvalidManifestEntry {
        entry: String,
        #[source]
        source: url::ParseError,
    },

    #[error("manifest lists {0} more than once")]
    DuplicateManifestEntry(Url),

    #[error("offline page {0:?} is not in the precache manifest")]
    OfflinePageNotPrecached(String),

    #[error("a fetcher is required")]
    MissingFetcher,
}

impl GatewayBuilder {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            store: None,
            fetcher: None,
            clients: None,
            clock: None,
        }
    }

    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn clients(mut self, clients: Arc<dyn Clients>) -> Self {
        self.clients = Some(clients);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate the configuration and wire the gateway.
    pub fn build(self) -> Result<Gateway, BuildError> {
        let config = self.config;
        if config.prefix.trim().is_empty() {
            return Err(BuildError::EmptyPrefix);
        }
        if config.version.trim().is_empty() {
            return Err(BuildError::EmptyVersion);
        }
        if !config.origin.origin().is_tuple() {
            return Err(BuildError::OpaqueOrigin(config.origin));
        }

        if config.manifest.is_empty() {
            return Err(BuildError::EmptyManifest);
        }
        let manifest = config
            .manifest
            .resolve(&config.origin)
            .map_err(|(entry, source)| BuildError::InvalidManifestEntry { entry, source })?;
        let mut seen = HashSet::new();
        for url in &manifest {
            let mut normalized = url.clone();
            normalized.set_fragment(None);
            if !seen.insert(normalized.clone()) {
                return Err(BuildError::DuplicateManifestEntry(normalized));
            }
        }

        let offline_page = Request::resolve(&config.origin, &config.offline_page)
            .map_err(|source| BuildError::InvalidManifestEntry {
                entry: config.offline_page.clone(),
                source,
            })?;
        if !manifest.contains(&offline_page) {
            return Err(BuildError::OfflinePageNotPrecached(config.offline_page));
        }

        let fetcher = self.fetcher.ok_or(BuildError::MissingFetcher)?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryCacheStore::new()) as Arc<dyn CacheStore>);
        let clients = self
            .clients
            .unwrap_or_else(|| Arc::new(InMemoryClients::new()) as Arc<dyn Clients>);
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);

        Ok(Gateway::from_parts(GatewayParts {
            controller: format!("{}-{}", config.prefix, config.version),
            buckets: BucketSet::new(&config.prefix, &config.version),
            origin: config.origin,
            manifest,
            offline_page,
            store,
            fetcher,
            clients,
            clock,
        }))
    }
}
