//! CacheStore port - 名前付きバケットの永続ストア
//!
//! ブラウザの `CacheStorage` + `Cache` に相当する。
//!
//! # 実装
//! - **InMemoryCacheStore**: テスト・開発用
//! - **FsCacheStore**: JSON ファイルに永続化（CLI 用）

use async_trait::async_trait;

use crate::domain::{CacheError, CacheKey, CachedResponse};

/// CacheStore は名前付きバケットの集合を管理
///
/// # 設計原則
/// - バケットは `open` / `put` で遅延作成され、`delete` されるまで残る
/// - `keys` はバケット名を作成順で返す（`match_any` の探索順と同じ）
/// - 1 回の操作ごとにアトミック。複数操作にまたがるトランザクションはない
/// - 同じキーへの並行 `put` は後勝ち
/// - GET 以外のキーは `put` できず、照会しても常にミス
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Create `bucket` if it does not exist yet.
    async fn open(&self, bucket: &str) -> Result<(), CacheError>;

    /// Look up `key` in one bucket. A missing bucket is a miss.
    async fn match_in(
        &self,
        bucket: &str,
        key: &CacheKey,
    ) -> Result<Option<CachedResponse>, CacheError>;

    /// Look up `key` across all buckets in creation order; first hit wins.
    async fn match_any(&self, key: &CacheKey) -> Result<Option<CachedResponse>, CacheError>;

    async fn put(
        &self,
        bucket: &str,
        key: CacheKey,
        entry: CachedResponse,
    ) -> Result<(), CacheError>;

    /// Store a batch; either every entry lands or none does.
    async fn put_all(
        &self,
        bucket: &str,
        entries: Vec<(CacheKey, CachedResponse)>,
    ) -> Result<(), CacheError>;

    /// Drop a whole bucket. Returns whether it existed.
    async fn delete(&self, bucket: &str) -> Result<bool, CacheError>;

    /// Bucket names in creation order.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Keys stored in `bucket` (empty if the bucket does not exist).
    async fn entries(&self, bucket: &str) -> Result<Vec<CacheKey>, CacheError>;
}
