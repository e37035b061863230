//! Ports - 抽象化レイヤー
//!
//! ゲートウェイが外部（キャッシュストレージ、ネットワーク、ページ、時計）に
//! 触れるためのインターフェース。ゲートウェイはこれらの trait にだけ依存し、
//! テストではインメモリ実装に差し替える。

pub mod cache_store;
pub mod clients;
pub mod clock;
pub mod fetcher;

// 主要な trait を再エクスポート
pub use self::cache_store::CacheStore;
pub use self::clients::Clients;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::fetcher::Fetcher;
pub use crate::domain::{CacheError, FetchError};
