//! InMemoryCacheStore - 開発用・テスト用のキャッシュストア
//!
//! # 実装詳細
//! - バケットは作成順の Vec で保持（`match_any` の探索順を保証するため）
//! - tokio の RwLock で排他制御。ロックは 1 操作の間だけ保持し、await をまたがない

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::buckets::Buckets;
use crate::domain::{CacheError, CacheKey, CachedResponse};
use crate::ports::CacheStore;

/// InMemoryCacheStore は開発用・テスト用のキャッシュストア
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    buckets: RwLock<Buckets>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn open(&self, bucket: &str) -> Result<(), CacheError> {
        self.buckets.write().await.open(bucket);
        Ok(())
    }

    async fn match_in(
        &self,
        bucket: &str,
        key: &CacheKey,
    ) -> Result<Option<CachedResponse>, CacheError> {
        Ok(self.buckets.read().await.match_in(bucket, key))
    }

    async fn match_any(&self, key: &CacheKey) -> Result<Option<CachedResponse>, CacheError> {
        Ok(self.buckets.read().await.match_any(key))
    }

    async fn put(
        &self,
        bucket: &str,
        key: CacheKey,
        entry: CachedResponse,
    ) -> Result<(), CacheError> {
        self.buckets.write().await.put(bucket, key, entry)
    }

    async fn put_all(
        &self,
        bucket: &str,
        entries: Vec<(CacheKey, CachedResponse)>,
    ) -> Result<(), CacheError> {
        self.buckets.write().await.put_all(bucket, entries)
    }

    async fn delete(&self, bucket: &str) -> Result<bool, CacheError> {
        Ok(self.buckets.write().await.delete(bucket))
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.buckets.read().await.names())
    }

    async fn entries(&self, bucket: &str) -> Result<Vec<CacheKey>, CacheError> {
        Ok(self.buckets.read().await.entries(bucket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Method, Response};
    use chrono::Utc;
    use std::sync::Arc;
    use url::Url;

    fn key(path: &str) -> CacheKey {
        CacheKey::get(Url::parse("http://localhost").unwrap().join(path).unwrap())
    }

    fn entry(body: &'static str) -> CachedResponse {
        CachedResponse::new(Response::ok(body), Utc::now())
    }

    #[tokio::test]
    async fn open_is_idempotent_and_ordered() {
        let store = InMemoryCacheStore::new();
        store.open("a").await.unwrap();
        store.open("b").await.unwrap();
        store.open("a").await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn put_creates_bucket_lazily() {
        let store = InMemoryCacheStore::new();
        store.put("runtime", key("/x"), entry("x")).await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec!["runtime"]);
        let hit = store.match_in("runtime", &key("/x")).await.unwrap().unwrap();
        assert_eq!(hit.response.body().as_ref(), b"x");
    }

    #[tokio::test]
    async fn match_any_searches_in_creation_order() {
        let store = InMemoryCacheStore::new();
        store.put("first", key("/x"), entry("first")).await.unwrap();
        store.put("second", key("/x"), entry("second")).await.unwrap();
        let hit = store.match_any(&key("/x")).await.unwrap().unwrap();
        assert_eq!(hit.response.body().as_ref(), b"first");
    }

    #[tokio::test]
    async fn missing_bucket_is_a_miss() {
        let store = InMemoryCacheStore::new();
        assert!(store.match_in("nope", &key("/x")).await.unwrap().is_none());
        assert!(store.entries("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_get_keys_are_rejected_and_never_match() {
        let store = InMemoryCacheStore::new();
        let url = Url::parse("http://localhost/boats").unwrap();
        let post = CacheKey::new(Method::Post, url);
        let err = store.put("b", post.clone(), entry("x")).await.unwrap_err();
        assert!(matches!(err, CacheError::UnsupportedMethod(Method::Post)));
        assert!(store.match_any(&post).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_all_is_all_or_nothing() {
        let store = InMemoryCacheStore::new();
        let url = Url::parse("http://localhost/boats").unwrap();
        let batch = vec![
            (key("/a"), entry("a")),
            (CacheKey::new(Method::Put, url), entry("b")),
        ];
        assert!(store.put_all("p", batch).await.is_err());
        assert!(store.entries("p").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let store = InMemoryCacheStore::new();
        store.open("old").await.unwrap();
        assert!(store.delete("old").await.unwrap());
        assert!(!store.delete("old").await.unwrap());
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_puts_last_write_wins() {
        let store = Arc::new(InMemoryCacheStore::new());
        let mut joins = Vec::new();
        for i in 0..8u8 {
            let store = store.clone();
            joins.push(tokio::spawn(async move {
                let body = vec![i];
                let value = CachedResponse::new(Response::ok(body), Utc::now());
                store.put("runtime", key("/race"), value).await.unwrap();
            }));
        }
        for j in joins {
            j.await.unwrap();
        }
        assert_eq!(store.entries("runtime").await.unwrap().len(), 1);
    }
}
