//! Gateway - オフラインキャッシュゲートウェイ本体
//!
//! # ライフサイクル
//! - `on_install`: precache バケットを開き、マニフェストを全件取得して一括保存
//! - `on_activate`: 現バージョン以外のバケットを削除し、開いているページを claim
//! - `handle_request`: リクエストを分類し、戦略ごとに応答を組み立てる
//!
//! # 並行性
//! - `&self` だけで動くので `Arc<Gateway>` を複数タスクから同時に使える
//! - 状態ロックはネットワーク await をまたいで保持しない
//! - ランタイムバケットへの同一キー書き込みが競合した場合は後勝ち

use std::sync::Arc;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::{Origin, Url};

use super::status::{GatewayStats, StatsSnapshot};
use crate::domain::{
    BucketSet, CacheKey, CachedResponse, GatewayError, InstallFailure, Request, Response,
    Strategy, WorkerState, classify,
};
use crate::ports::{CacheStore, Clients, Clock, Fetcher};

/// ResponseSource はページに返したレスポンスの出どころ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
    OfflineFallback,
}

/// FetchOutcome はリクエストをゲートウェイに渡した結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not intercepted. The caller sends the request as if no gateway existed.
    Bypassed,
    Responded {
        response: Response,
        source: ResponseSource,
    },
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Bypassed => None,
            FetchOutcome::Responded { response, .. } => Some(response),
        }
    }

    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            FetchOutcome::Bypassed => None,
            FetchOutcome::Responded { source, .. } => Some(*source),
        }
    }
}

/// InstallReport は install の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReport {
    pub bucket: String,
    pub precached: Vec<Url>,
    /// Ready to replace the previous version without waiting for pages to close.
    pub skip_waiting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateReport {
    pub deleted: Vec<String>,
    pub claimed: usize,
}

/// Gateway はページのリクエストを横取りするオフラインキャッシュゲートウェイ
pub struct Gateway {
    controller: String,
    origin: Url,
    scope: Origin,
    buckets: BucketSet,
    manifest: Vec<Url>,
    offline_page: Url,
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn Fetcher>,
    clients: Arc<dyn Clients>,
    clock: Arc<dyn Clock>,
    state: RwLock<WorkerState>,
    stats: GatewayStats,
}

/// GatewayParts は GatewayBuilder が検証済みの構成要素
pub(crate) struct GatewayParts {
    pub controller: String,
    pub origin: Url,
    pub buckets: BucketSet,
    pub manifest: Vec<Url>,
    pub offline_page: Url,
    pub store: Arc<dyn CacheStore>,
    pub fetcher: Arc<dyn Fetcher>,
    pub clients: Arc<dyn Clients>,
    pub clock: Arc<dyn Clock>,
}

impl Gateway {
    pub(crate) fn from_parts(parts: GatewayParts) -> Self {
        Self {
            controller: parts.controller,
            scope: parts.origin.origin(),
            origin: parts.origin,
            buckets: parts.buckets,
            manifest: parts.manifest,
            offline_page: parts.offline_page,
            store: parts.store,
            fetcher: parts.fetcher,
            clients: parts.clients,
            clock: parts.clock,
            state: RwLock::new(WorkerState::Parsed),
            stats: GatewayStats::default(),
        }
    }

    pub fn buckets(&self) -> &BucketSet {
        &self.buckets
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Resolved manifest, in order.
    pub fn manifest(&self) -> &[Url] {
        &self.manifest
    }

    pub fn offline_page(&self) -> &Url {
        &self.offline_page
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    async fn transition(&self, from: WorkerState, to: WorkerState) -> Result<(), GatewayError> {
        let mut state = self.state.write().await;
        if *state != from {
            return Err(GatewayError::InvalidState {
                expected: from,
                actual: *state,
            });
        }
        *state = to;
        Ok(())
    }

    async fn set_state(&self, to: WorkerState) {
        *self.state.write().await = to;
    }

    /// Populate the precache bucket. All-or-nothing.
    pub async fn on_install(&self) -> Result<InstallReport, GatewayError> {
        self.transition(WorkerState::Parsed, WorkerState::Installing)
            .await?;
        info!(bucket = %self.buckets.precache, resources = self.manifest.len(), "installing");

        match self.populate_precache().await {
            Ok(()) => {
                self.set_state(WorkerState::Installed).await;
                info!(bucket = %self.buckets.precache, "installed");
                Ok(InstallReport {
                    bucket: self.buckets.precache.to_string(),
                    precached: self.manifest.clone(),
                    skip_waiting: true,
                })
            }
            Err(e) => {
                self.set_state(WorkerState::Redundant).await;
                warn!(error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn populate_precache(&self) -> Result<(), GatewayError> {
        let bucket = self.buckets.precache.as_str();
        self.store.open(bucket).await?;
        let fetches = self.manifest.iter().map(|url| self.fetch_for_precache(url));
        let entries = try_join_all(fetches).await?;
        self.store.put_all(bucket, entries).await?;
        Ok(())
    }

    async fn fetch_for_precache(
        &self,
        url: &Url,
    ) -> Result<(CacheKey, CachedResponse), GatewayError> {
        let request = Request::get(url.clone());
        let failed = |reason: InstallFailure| GatewayError::InstallFetch {
            url: url.clone(),
            reason,
        };
        let response = self
            .fetcher
            .fetch(&request)
            .await
            .map_err(|e| failed(e.into()))?;
        if !response.is_ok() {
            return Err(failed(InstallFailure::BadStatus(response.status())));
        }
        Ok((
            CacheKey::from_request(&request),
            CachedResponse::new(response, self.clock.now()),
        ))
    }

    /// Purge every bucket outside this version's pair, then claim open pages.
    pub async fn on_activate(&self) -> Result<ActivateReport, GatewayError> {
        self.transition(WorkerState::Installed, WorkerState::Activating)
            .await?;

        let deleted = match self.purge_stale_buckets().await {
            Ok(deleted) => deleted,
            Err(e) => {
                self.set_state(WorkerState::Installed).await;
                warn!(error = %e, "activate failed");
                return Err(e);
            }
        };
        let claimed = self.clients.claim(&self.controller).await;
        self.set_state(WorkerState::Activated).await;
        info!(controller = %self.controller, deleted = ?deleted, claimed, "activated");

        Ok(ActivateReport { deleted, claimed })
    }

    async fn purge_stale_buckets(&self) -> Result<Vec<String>, GatewayError> {
        let stale: Vec<String> = self
            .store
            .keys()
            .await?
            .into_iter()
            .filter(|name| !self.buckets.contains(name))
            .collect();
        let results = try_join_all(stale.iter().map(|name| self.store.delete(name))).await?;
        Ok(stale
            .into_iter()
            .zip(results)
            .filter_map(|(name, existed)| existed.then_some(name))
            .collect())
    }

    /// Resume a session persisted in the cache store.
    ///
    /// If every manifest resource is already in this version's precache bucket
    /// the gateway goes straight to `Activated` without touching the network.
    pub async fn restore(&self) -> Result<bool, GatewayError> {
        let stored = self.store.entries(self.buckets.precache.as_str()).await?;
        let complete = self
            .manifest
            .iter()
            .all(|url| stored.contains(&CacheKey::get(url.clone())));
        if !complete {
            return Ok(false);
        }
        self.transition(WorkerState::Parsed, WorkerState::Activated)
            .await?;
        debug!(bucket = %self.buckets.precache, "restored from cache storage");
        Ok(true)
    }

    /// Intercept one request.
    pub async fn handle_request(&self, request: &Request) -> Result<FetchOutcome, GatewayError> {
        let outcome = self.dispatch(request).await;
        self.stats.record(&outcome);
        outcome
    }

    async fn dispatch(&self, request: &Request) -> Result<FetchOutcome, GatewayError> {
        if !self.state().await.can_intercept_fetch() {
            return Ok(FetchOutcome::Bypassed);
        }
        let strategy = classify(request, &self.scope);
        debug!(method = %request.method(), url = %request.url(), ?strategy, "fetch");

        match strategy {
            Strategy::Bypass => Ok(FetchOutcome::Bypassed),
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::CacheFirst => self.cache_first(request).await,
            Strategy::NetworkOnly => self.network_only(request).await,
        }
    }

    async fn network_first(&self, request: &Request) -> Result<FetchOutcome, GatewayError> {
        match self.fetcher.fetch(request).await {
            Ok(response) => Ok(FetchOutcome::Responded {
                response,
                source: ResponseSource::Network,
            }),
            Err(e) => {
                debug!(url = %request.url(), error = %e, "navigation failed, serving offline page");
                let key = CacheKey::get(self.offline_page.clone());
                match self
                    .store
                    .match_in(self.buckets.precache.as_str(), &key)
                    .await?
                {
                    Some(cached) => Ok(FetchOutcome::Responded {
                        response: cached.into_response(),
                        source: ResponseSource::OfflineFallback,
                    }),
                    None => Err(GatewayError::OfflinePageMissing(self.offline_page.clone())),
                }
            }
        }
    }

    async fn cache_first(&self, request: &Request) -> Result<FetchOutcome, GatewayError> {
        let key = CacheKey::from_request(request);
        if let Some(cached) = self.store.match_any(&key).await? {
            return Ok(FetchOutcome::Responded {
                response: cached.into_response(),
                source: ResponseSource::Cache,
            });
        }

        let response = self
            .fetcher
            .fetch(request)
            .await
            .map_err(|source| GatewayError::Network {
                url: request.url().clone(),
                source,
            })?;

        if response.is_runtime_cacheable() {
            let copy = CachedResponse::new(response.clone(), self.clock.now());
            match self
                .store
                .put(self.buckets.runtime.as_str(), key, copy)
                .await
            {
                Ok(()) => self.stats.record_runtime_fill(),
                Err(e) => warn!(url = %request.url(), error = %e, "runtime cache write failed"),
            }
        }

        Ok(FetchOutcome::Responded {
            response,
            source: ResponseSource::Network,
        })
    }

    async fn network_only(&self, request: &Request) -> Result<FetchOutcome, GatewayError> {
        let response = self
            .fetcher
            .fetch(request)
            .await
            .map_err(|source| GatewayError::Network {
                url: request.url().clone(),
                source,
            })?;
        Ok(FetchOutcome::Responded {
            response,
            source: ResponseSource::Network,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::GatewayBuilder;
    use crate::config::GatewayConfig;
    use crate::domain::{CacheError, Method, ResponseType};
    use crate::impls::{InMemoryCacheStore, InMemoryClients, StaticFetcher};
    use async_trait::async_trait;

    const ORIGIN: &str = "http://127.0.0.1:5000/";

    fn url(path: &str) -> Url {
        Url::parse(ORIGIN).unwrap().join(path).unwrap()
    }

    fn site() -> Arc<StaticFetcher> {
        let fetcher = StaticFetcher::new();
        for path in crate::domain::DEFAULT_MANIFEST {
            fetcher.route(&url(path), Response::ok(format!("page {path}")));
        }
        Arc::new(fetcher)
    }

    fn gateway(fetcher: Arc<StaticFetcher>, store: Arc<dyn CacheStore>) -> Gateway {
        GatewayBuilder::new(GatewayConfig::default())
            .fetcher(fetcher)
            .cache_store(store)
            .build()
            .unwrap()
    }

    /// Store whose runtime writes always fail.
    struct ReadOnlyRuntime(InMemoryCacheStore);

    #[async_trait]
    impl CacheStore for ReadOnlyRuntime {
        async fn open(&self, bucket: &str) -> Result<(), CacheError> {
            self.0.open(bucket).await
        }
        async fn match_in(
            &self,
            bucket: &str,
            key: &CacheKey,
        ) -> Result<Option<CachedResponse>, CacheError> {
            self.0.match_in(bucket, key).await
        }
        async fn match_any(&self, key: &CacheKey) -> Result<Option<CachedResponse>, CacheError> {
            self.0.match_any(key).await
        }
        async fn put(
            &self,
            _bucket: &str,
            _key: CacheKey,
            _entry: CachedResponse,
        ) -> Result<(), CacheError> {
            Err(CacheError::Backend("quota exceeded".to_string()))
        }
        async fn put_all(
            &self,
            bucket: &str,
            entries: Vec<(CacheKey, CachedResponse)>,
        ) -> Result<(), CacheError> {
            self.0.put_all(bucket, entries).await
        }
        async fn delete(&self, bucket: &str) -> Result<bool, CacheError> {
            self.0.delete(bucket).await
        }
        async fn keys(&self) -> Result<Vec<String>, CacheError> {
            self.0.keys().await
        }
        async fn entries(&self, bucket: &str) -> Result<Vec<CacheKey>, CacheError> {
            self.0.entries(bucket).await
        }
    }

    #[tokio::test]
    async fn install_then_activate_walks_the_lifecycle() {
        let gw = gateway(site(), Arc::new(InMemoryCacheStore::new()));
        assert_eq!(gw.state().await, WorkerState::Parsed);

        let report = gw.on_install().await.unwrap();
        assert!(report.skip_waiting);
        assert_eq!(report.bucket, "aft-precache-v1");
        assert_eq!(report.precached.len(), 6);
        assert_eq!(gw.state().await, WorkerState::Installed);

        gw.on_activate().await.unwrap();
        assert_eq!(gw.state().await, WorkerState::Activated);
    }

    #[tokio::test]
    async fn failed_install_writes_nothing_and_is_redundant() {
        let fetcher = site();
        fetcher.fail(&url("/sea-temp-test"));
        let store = Arc::new(InMemoryCacheStore::new());
        let gw = gateway(fetcher, store.clone());

        let err = gw.on_install().await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::InstallFetch { ref url, reason: InstallFailure::Network(_) }
                if url.path() == "/sea-temp-test"
        ));
        assert_eq!(gw.state().await, WorkerState::Redundant);
        assert!(store.entries("aft-precache-v1").await.unwrap().is_empty());

        let err = gw.on_activate().await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::InvalidState { actual: WorkerState::Redundant, .. }
        ));
    }

    #[tokio::test]
    async fn non_ok_manifest_response_aborts_install() {
        let fetcher = site();
        fetcher.route(&url("/manifest.json"), Response::new(500, ResponseType::Basic, ""));
        let gw = gateway(fetcher, Arc::new(InMemoryCacheStore::new()));

        let err = gw.on_install().await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::InstallFetch { reason: InstallFailure::BadStatus(500), .. }
        ));
    }

    #[tokio::test]
    async fn activate_requires_install() {
        let gw = gateway(site(), Arc::new(InMemoryCacheStore::new()));
        let err = gw.on_activate().await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::InvalidState {
                expected: WorkerState::Installed,
                actual: WorkerState::Parsed
            }
        ));
    }

    #[tokio::test]
    async fn requests_are_not_intercepted_before_activation() {
        let fetcher = site();
        let gw = gateway(fetcher.clone(), Arc::new(InMemoryCacheStore::new()));
        gw.on_install().await.unwrap();

        let outcome = gw.handle_request(&Request::get(url("/weather"))).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Bypassed);
        assert_eq!(gw.stats().bypassed, 1);
    }

    #[tokio::test]
    async fn activate_claims_open_pages() {
        let clients = Arc::new(InMemoryClients::with_open(2));
        let gw = GatewayBuilder::new(GatewayConfig::default())
            .fetcher(site())
            .clients(clients.clone())
            .build()
            .unwrap();
        gw.on_install().await.unwrap();

        let report = gw.on_activate().await.unwrap();
        assert_eq!(report.claimed, 2);
        assert_eq!(clients.controller().as_deref(), Some("aft-v1"));
    }

    #[tokio::test]
    async fn runtime_write_failure_still_returns_the_response() {
        let fetcher = site();
        fetcher.route(&url("/static/app.js"), Response::ok("js"));
        let gw = gateway(fetcher, Arc::new(ReadOnlyRuntime(InMemoryCacheStore::new())));
        gw.on_install().await.unwrap();
        gw.on_activate().await.unwrap();

        let outcome = gw
            .handle_request(&Request::get(url("/static/app.js")))
            .await
            .unwrap();
        assert_eq!(outcome.source(), Some(ResponseSource::Network));
        assert_eq!(outcome.response().unwrap().body().as_ref(), b"js");
        assert_eq!(gw.stats().runtime_fills, 0);
    }

    #[tokio::test]
    async fn restore_resumes_a_complete_precache() {
        let store: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::new());
        let first = gateway(site(), store.clone());
        first.on_install().await.unwrap();
        first.on_activate().await.unwrap();

        let fetcher = site();
        let second = gateway(fetcher.clone(), store);
        assert!(second.restore().await.unwrap());
        assert_eq!(second.state().await, WorkerState::Activated);
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn restore_refuses_an_incomplete_precache() {
        let store: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::new());
        store.open("aft-precache-v1").await.unwrap();
        let gw = gateway(site(), store);
        assert!(!gw.restore().await.unwrap());
        assert_eq!(gw.state().await, WorkerState::Parsed);
    }

    #[tokio::test]
    async fn head_requests_are_bypassed() {
        let gw = gateway(site(), Arc::new(InMemoryCacheStore::new()));
        gw.on_install().await.unwrap();
        gw.on_activate().await.unwrap();

        let request = Request::new(Method::Head, url("/status"));
        assert_eq!(gw.handle_request(&request).await.unwrap(), FetchOutcome::Bypassed);
    }
}
