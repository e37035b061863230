//! Errors - エラー型と分類
//!
//! # 分類
//! - `FetchError`: ネットワーク層の失敗（到達不能・中断）。non-2xx はエラーではない
//! - `CacheError`: キャッシュストアの失敗
//! - `GatewayError`: ゲートウェイ操作の失敗（install / activate / fetch）
//!
//! リトライは一切しない。ナビゲーション失敗だけがオフラインページで一度だけ置き換えられ、
//! それ以外はそのまま呼び出し元に返る。

use thiserror::Error;
use url::Url;

use super::request::Method;
use super::state::WorkerState;

/// FetchError は Fetcher が報告するネットワーク層の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    Unreachable(String),

    #[error("request timed out: {0}")]
    TimedOut(String),

    #[error("request aborted: {0}")]
    Aborted(String),

    #[error("{0}")]
    Other(String),
}

/// CacheError は CacheStore の操作エラー
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("only GET requests can be cached, got {0}")]
    UnsupportedMethod(Method),

    #[error("cache storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache storage is corrupt: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Backend(String),
}

/// InstallFailure はマニフェストの 1 件を precache できなかった理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallFailure {
    #[error(transparent)]
    Network(#[from] FetchError),

    #[error("bad response status {0}")]
    BadStatus(u16),
}

/// GatewayError はゲートウェイ操作（install / activate / fetch）のエラー
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A manifest resource failed; install is aborted and nothing is stored.
    #[error("install aborted, could not precache {url}: {reason}")]
    InstallFetch { url: Url, reason: InstallFailure },

    /// Cache miss followed by a network failure (not recovered).
    #[error("network request for {url} failed")]
    Network {
        url: Url,
        #[source]
        source: FetchError,
    },

    /// The offline fallback was needed but is absent from the precache bucket.
    #[error("offline page {0} is not in the precache bucket")]
    OfflinePageMissing(Url),

    #[error("invalid lifecycle state: expected {expected}, got {actual}")]
    InvalidState {
        expected: WorkerState,
        actual: WorkerState,
    },

    #[error(transparent)]
    Cache(#[from] CacheError),
}
