//! StaticFetcher - ルート表から応答するテスト用ネットワーク
//!
//! # 機能
//! - URL ごとの固定レスポンス（未登録は 404）
//! - `set_offline(true)` で全リクエストをネットワークエラーにする
//! - URL 単位の障害注入
//! - 呼び出し履歴（「ネットワークに触れていない」ことの検証用）

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use url::Url;

use crate::domain::{FetchError, Method, Request, Response, ResponseType};
use crate::ports::Fetcher;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn route_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

/// StaticFetcher はルート表から応答するテスト用 Fetcher
#[derive(Default)]
pub struct StaticFetcher {
    routes: Mutex<HashMap<String, Response>>,
    failing: Mutex<HashSet<String>>,
    offline: AtomicBool,
    calls: Mutex<Vec<(Method, Url)>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `route`.
    pub fn with_route(self, url: &Url, response: Response) -> Self {
        self.route(url, response);
        self
    }

    pub fn route(&self, url: &Url, response: Response) {
        lock(&self.routes).insert(route_key(url), response);
    }

    /// Every request to `url` fails at the network level.
    pub fn fail(&self, url: &Url) {
        lock(&self.failing).insert(route_key(url));
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<(Method, Url)> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, url: &Url) -> usize {
        let key = route_key(url);
        lock(&self.calls)
            .iter()
            .filter(|(_, called)| route_key(called) == key)
            .count()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        lock(&self.calls).push((request.method().clone(), request.url().clone()));

        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Unreachable("offline".to_string()));
        }
        let key = route_key(request.url());
        if lock(&self.failing).contains(&key) {
            return Err(FetchError::Unreachable(format!("connection refused: {key}")));
        }
        let response = lock(&self.routes)
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Response::new(404, ResponseType::Basic, "not found"));
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_routes_and_records_calls() {
        let url = Url::parse("http://localhost/weather").unwrap();
        let fetcher = StaticFetcher::new().with_route(&url, Response::ok("sunny"));

        let response = fetcher.fetch(&Request::get(url.clone())).await.unwrap();
        assert_eq!(response.body().as_ref(), b"sunny");
        assert_eq!(fetcher.call_count(&url), 1);
    }

    #[tokio::test]
    async fn unknown_route_is_404_not_an_error() {
        let fetcher = StaticFetcher::new();
        let url = Url::parse("http://localhost/missing").unwrap();
        let response = fetcher.fetch(&Request::get(url)).await.unwrap();
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn offline_fails_every_request() {
        let url = Url::parse("http://localhost/weather").unwrap();
        let fetcher = StaticFetcher::new().with_route(&url, Response::ok("sunny"));
        fetcher.set_offline(true);
        let err = fetcher.fetch(&Request::get(url.clone())).await.unwrap_err();
        assert!(matches!(err, FetchError::Unreachable(_)));
        assert_eq!(fetcher.call_count(&url), 1);
    }
}
