//! Subcommand implementations
//!
//! Every command builds a fresh gateway over the on-disk cache store, the same
//! way a browser starts a new worker instance for each page session.

use std::io::Write;
use std::sync::Arc;

use offcache_core::app::{DispatchSource, Dispatched, StatsSnapshot};
use offcache_core::domain::{Method, Request, RequestMode};
use offcache_core::impls::{FsCacheStore, HttpFetcher};
use offcache_core::ports::{CacheStore, Fetcher};
use offcache_core::{Gateway, GatewayBuilder, PageHost};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::args::FetchArgs;
use crate::config::FileConfig;
use crate::error::{CliError, CliResult};

struct Session {
    gateway: Arc<Gateway>,
    store: Arc<FsCacheStore>,
    network: Arc<HttpFetcher>,
}

fn open_session(config: &FileConfig) -> CliResult<Session> {
    let dir = config.storage_dir();
    debug!("cache storage at {}", dir.display());
    let store = Arc::new(FsCacheStore::new(dir));
    let network = Arc::new(HttpFetcher::new(&config.gateway.origin)?);
    let gateway = GatewayBuilder::new(config.gateway.clone())
        .cache_store(store.clone())
        .fetcher(network.clone())
        .build()?;
    Ok(Session {
        gateway: Arc::new(gateway),
        store,
        network,
    })
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn install(config: &FileConfig) -> CliResult<()> {
    let session = open_session(config)?;
    let report = session.gateway.on_install().await?;
    info!(bucket = %report.bucket, count = report.precached.len(), "installed");
    print_json(&report)
}

pub async fn activate(config: &FileConfig) -> CliResult<()> {
    let session = open_session(config)?;
    session.gateway.on_install().await?;
    let report = session.gateway.on_activate().await?;
    info!(deleted = report.deleted.len(), "activated");
    print_json(&report)
}

/// Resolve `target` against the origin; absolute URLs pass through.
fn resolve_target(origin: &Url, target: &str) -> CliResult<Url> {
    Url::parse(target)
        .or_else(|_| Request::resolve(origin, target))
        .map_err(|source| CliError::InvalidTarget {
            target: target.to_string(),
            source,
        })
}

fn build_request(origin: &Url, args: &FetchArgs) -> CliResult<Request> {
    let url = resolve_target(origin, &args.target)?;
    let mode = if args.navigate {
        RequestMode::Navigate
    } else if url.origin() == origin.origin() {
        RequestMode::SameOrigin
    } else {
        RequestMode::NoCors
    };
    Ok(Request::new(Method::from(args.method.as_str()), url).with_mode(mode))
}

#[derive(Serialize)]
struct FetchSummary<'a> {
    url: &'a str,
    status: u16,
    #[serde(rename = "type")]
    response_type: offcache_core::domain::ResponseType,
    source: DispatchSource,
    bytes: usize,
    stats: StatsSnapshot,
}

impl<'a> FetchSummary<'a> {
    fn new(request: &'a Request, dispatched: &Dispatched, stats: StatsSnapshot) -> Self {
        Self {
            url: request.url().as_str(),
            status: dispatched.response.status(),
            response_type: dispatched.response.response_type(),
            source: dispatched.source,
            bytes: dispatched.response.body().len(),
            stats,
        }
    }
}

pub async fn fetch(config: &FileConfig, args: FetchArgs) -> CliResult<()> {
    let session = open_session(config)?;
    if !session.gateway.restore().await? {
        debug!("precache incomplete, installing");
        session.gateway.on_install().await?;
        session.gateway.on_activate().await?;
    }

    let request = build_request(&config.gateway.origin, &args)?;
    let network: Arc<dyn Fetcher> = session.network.clone();
    let host = PageHost::new(session.gateway.clone(), network);
    let dispatched = host.dispatch(&request).await?;

    if args.body {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(dispatched.response.body())
            .and_then(|()| stdout.flush())
            .map_err(CliError::Stdout)?;
        return Ok(());
    }
    print_json(&FetchSummary::new(
        &request,
        &dispatched,
        session.gateway.stats(),
    ))
}

#[derive(Serialize)]
struct BucketListing {
    name: String,
    entries: Vec<String>,
}

pub async fn buckets(config: &FileConfig) -> CliResult<()> {
    let store = FsCacheStore::new(config.storage_dir());
    let mut listing = Vec::new();
    for name in store.keys().await? {
        let entries = store
            .entries(&name)
            .await?
            .into_iter()
            .map(|key| key.to_string())
            .collect();
        listing.push(BucketListing { name, entries });
    }
    print_json(&listing)
}

#[derive(Serialize)]
struct Status {
    controller: String,
    origin: String,
    precache: String,
    runtime: String,
    restored: bool,
    state: String,
    buckets: Vec<BucketCount>,
}

#[derive(Serialize)]
struct BucketCount {
    name: String,
    entries: usize,
    current: bool,
}

pub async fn status(config: &FileConfig) -> CliResult<()> {
    let session = open_session(config)?;
    let restored = session.gateway.restore().await?;
    let buckets = session.gateway.buckets();

    let mut counts = Vec::new();
    for name in session.store.keys().await? {
        let entries = session.store.entries(&name).await?.len();
        counts.push(BucketCount {
            current: buckets.contains(&name),
            name,
            entries,
        });
    }

    print_json(&Status {
        controller: format!("{}-{}", config.gateway.prefix, config.gateway.version),
        origin: session.gateway.origin().to_string(),
        precache: buckets.precache.to_string(),
        runtime: buckets.runtime.to_string(),
        restored,
        state: session.gateway.state().await.to_string(),
        buckets: counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(target: &str, navigate: bool) -> FetchArgs {
        FetchArgs {
            target: target.to_string(),
            navigate,
            method: "get".to_string(),
            body: false,
        }
    }

    fn origin() -> Url {
        Url::parse("http://127.0.0.1:5000/").unwrap()
    }

    #[test]
    fn relative_target_is_same_origin() {
        let request = build_request(&origin(), &args("/weather?city=busan", false)).unwrap();
        assert_eq!(request.url().as_str(), "http://127.0.0.1:5000/weather?city=busan");
        assert_eq!(request.mode(), RequestMode::SameOrigin);
        assert_eq!(request.method(), &Method::Get);
    }

    #[test]
    fn navigate_flag_wins() {
        let request = build_request(&origin(), &args("/boats", true)).unwrap();
        assert!(request.is_navigation());
    }

    #[test]
    fn absolute_foreign_target_is_no_cors() {
        let request =
            build_request(&origin(), &args("https://www.badatime.com/embed", false)).unwrap();
        assert_eq!(request.mode(), RequestMode::NoCors);
    }

    #[test]
    fn fetch_summary_carries_gateway_stats() {
        let request = Request::get(origin().join("/weather").unwrap());
        let dispatched = Dispatched {
            response: offcache_core::domain::Response::ok("{}"),
            source: DispatchSource::Gateway(offcache_core::ResponseSource::Cache),
        };
        let stats = StatsSnapshot {
            cache_hits: 1,
            ..StatsSnapshot::default()
        };

        let json = serde_json::to_value(FetchSummary::new(&request, &dispatched, stats)).unwrap();
        assert_eq!(json["status"], 200);
        assert_eq!(json["type"], "basic");
        assert_eq!(json["source"]["gateway"], "cache");
        assert_eq!(json["stats"]["cache_hits"], 1);
        assert_eq!(json["bytes"], 2);
    }

    #[tokio::test]
    async fn buckets_on_empty_storage_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig {
            cache_dir: Some(dir.path().to_path_buf()),
            ..FileConfig::default()
        };
        buckets(&config).await.unwrap();
        let store = FsCacheStore::new(dir.path());
        assert!(store.keys().await.unwrap().is_empty());
    }
}
