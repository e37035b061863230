//! Fetcher port - ネットワークの抽象化

use async_trait::async_trait;

use crate::domain::{FetchError, Request, Response};

/// Fetcher はリクエストを 1 回だけネットワークに送る
///
/// # 契約
/// - `Err` はネットワーク層の失敗のみ（到達不能・タイムアウト・中断）
/// - 404 や 500 などの non-2xx は `Ok(Response)` として返す
/// - リトライしない
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}
