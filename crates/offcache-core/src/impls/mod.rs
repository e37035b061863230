//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryCacheStore**: 開発用・テスト用のキャッシュストア
//! - **FsCacheStore**: JSON ファイルに永続化するキャッシュストア
//! - **StaticFetcher**: ルート表から応答するテスト用ネットワーク
//! - **HttpFetcher**: reqwest による実ネットワーク
//! - **InMemoryClients**: 開いているページの集合

mod buckets;
pub mod fs_cache;
pub mod http_fetcher;
pub mod inmem_cache;
pub mod inmem_clients;
pub mod static_fetcher;

// 主要な型を再エクスポート
pub use self::fs_cache::FsCacheStore;
pub use self::http_fetcher::HttpFetcher;
pub use self::inmem_cache::InMemoryCacheStore;
pub use self::inmem_clients::InMemoryClients;
pub use self::static_fetcher::StaticFetcher;
