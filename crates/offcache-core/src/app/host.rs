//! PageHost - ページ側から見たリクエスト送出
//!
//! ゲートウェイが `Bypassed` を返したリクエストは、ゲートウェイが存在しない場合と
//! 同じようにネットワークへ直接 1 回だけ送る。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::gateway::{FetchOutcome, Gateway, ResponseSource};
use crate::domain::{GatewayError, Request, Response};
use crate::ports::Fetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchSource {
    /// Sent by the page itself; the gateway did not intercept.
    Direct,
    Gateway(ResponseSource),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub response: Response,
    pub source: DispatchSource,
}

/// PageHost はページ側の送信口。横取りされなかったリクエストを直接送る
pub struct PageHost {
    gateway: Arc<Gateway>,
    network: Arc<dyn Fetcher>,
}

impl PageHost {
    pub fn new(gateway: Arc<Gateway>, network: Arc<dyn Fetcher>) -> Self {
        Self { gateway, network }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub async fn dispatch(&self, request: &Request) -> Result<Dispatched, GatewayError> {
        match self.gateway.handle_request(request).await? {
            FetchOutcome::Responded { response, source } => Ok(Dispatched {
                response,
                source: DispatchSource::Gateway(source),
            }),
            FetchOutcome::Bypassed => {
                let response = self.network.fetch(request).await.map_err(|source| {
                    GatewayError::Network {
                        url: request.url().clone(),
                        source,
                    }
                })?;
                Ok(Dispatched {
                    response,
                    source: DispatchSource::Direct,
                })
            }
        }
    }
}
