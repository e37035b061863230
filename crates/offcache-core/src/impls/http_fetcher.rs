//! HttpFetcher - reqwest による実ネットワーク

use std::time::Duration;

use async_trait::async_trait;
use url::{Origin, Url};

use crate::domain::{FetchError, Headers, Request, Response, ResponseType};
use crate::ports::Fetcher;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// HttpFetcher は reqwest でリクエストを送る Fetcher
///
/// リダイレクト後の最終 URL がスコープと同一オリジンなら `Basic`、
/// それ以外は `Cors` として返す（ランタイムバケットには入らない）。
pub struct HttpFetcher {
    client: reqwest::Client,
    scope: Origin,
}

impl HttpFetcher {
    pub fn new(scope: &Url) -> Result<Self, FetchError> {
        Self::with_timeout(scope, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(scope: &Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Other(format!("http client init: {e}")))?;
        Ok(Self {
            client,
            scope: scope.origin(),
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::TimedOut(e.to_string())
    } else if e.is_connect() {
        FetchError::Unreachable(e.to_string())
    } else {
        FetchError::Other(e.to_string())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let method = reqwest::Method::from_bytes(request.method().as_str().as_bytes())
            .map_err(|e| FetchError::Other(format!("invalid method: {e}")))?;

        let mut builder = self.client.request(method, request.url().clone());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }

        let resp = builder.send().await.map_err(map_reqwest_error)?;

        let status = resp.status().as_u16();
        let response_type = if resp.url().origin() == self.scope {
            ResponseType::Basic
        } else {
            ResponseType::Cors
        };
        let headers: Headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = resp.bytes().await.map_err(map_reqwest_error)?;

        Ok(Response::new(status, response_type, body).with_headers(headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Method;

    #[tokio::test]
    async fn refused_connection_is_a_network_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let scope = Url::parse("http://127.0.0.1:9").unwrap();
        let fetcher = HttpFetcher::with_timeout(&scope, Duration::from_secs(2)).unwrap();
        let request = Request::new(Method::Get, scope.join("/status").unwrap());
        assert!(fetcher.fetch(&request).await.is_err());
    }
}
