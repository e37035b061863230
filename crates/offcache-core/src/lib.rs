//! offcache-core
//!
//! Offline cache gateway: ページのリソース要求を横取りし、リクエストごとに
//! キャッシュ・ネットワーク・オフラインページのどれで応答するかを決める。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（request, response, cache_key, bucket, manifest, strategy, state, errors）
//! - **ports**: 抽象化レイヤー（CacheStore, Fetcher, Clients, Clock）
//! - **impls**: ports の実装（InMemoryCacheStore, FsCacheStore, StaticFetcher, HttpFetcher, InMemoryClients）
//! - **app**: アプリケーションロジック（GatewayBuilder, Gateway, PageHost, GatewayStats）
//! - **config**: GatewayConfig

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{FetchOutcome, Gateway, GatewayBuilder, PageHost, ResponseSource};
pub use config::GatewayConfig;
