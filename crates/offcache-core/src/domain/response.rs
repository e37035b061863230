//! Response model and the snapshot stored in a cache bucket.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request::Headers;

/// ResponseType はレスポンス種別（Fetch 標準の `Response.type`）
///
/// `Basic` は同一オリジンでリダイレクトを隠していないレスポンス。
/// ランタイムキャッシュに書き込めるのは `Basic` だけ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Basic,
    Cors,
    Opaque,
    #[serde(rename = "opaqueredirect")]
    OpaqueRedirect,
    Error,
}

/// Response はページに返すレスポンス
///
/// body は共有 `Bytes` なので、`clone()` した片方を消費してももう片方は読める。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    status: u16,
    #[serde(rename = "type")]
    response_type: ResponseType,
    #[serde(default)]
    headers: Headers,
    #[serde(default)]
    body: Bytes,
}

impl Response {
    pub fn new(status: u16, response_type: ResponseType, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            response_type,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// 200 basic response, the common same-origin case.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200, ResponseType::Basic, body)
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn response_type(&self) -> ResponseType {
        self.response_type
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response, yielding its body.
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// `Response.ok`: status in 200..=299.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Eligible for the runtime bucket: exactly 200 and `Basic`.
    pub fn is_runtime_cacheable(&self) -> bool {
        self.status == 200 && self.response_type == ResponseType::Basic
    }
}

/// CachedResponse はバケットに保存されたレスポンスのスナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub response: Response,
    pub stored_at: DateTime<Utc>,
}

impl CachedResponse {
    pub fn new(response: Response, stored_at: DateTime<Utc>) -> Self {
        Self {
            response,
            stored_at,
        }
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}
