//! Status - ゲートウェイの集計値
//!
//! fetch 横取りの結果をアトミックカウンタで数える。`snapshot()` は
//! シリアライズ可能なビューを返す（CLI の `fetch` 出力に含める）。

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::gateway::{FetchOutcome, ResponseSource};
use crate::domain::GatewayError;

/// GatewayStats は横取り結果をカウントする
#[derive(Debug, Default)]
pub struct GatewayStats {
    bypassed: AtomicU64,
    cache_hits: AtomicU64,
    network: AtomicU64,
    runtime_fills: AtomicU64,
    offline_fallbacks: AtomicU64,
    errors: AtomicU64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub bypassed: u64,
    pub cache_hits: u64,
    pub network: u64,
    pub runtime_fills: u64,
    pub offline_fallbacks: u64,
    pub errors: u64,
}

impl GatewayStats {
    pub(crate) fn record(&self, outcome: &Result<FetchOutcome, GatewayError>) {
        let counter = match outcome {
            Ok(FetchOutcome::Bypassed) => &self.bypassed,
            Ok(FetchOutcome::Responded { source, .. }) => match source {
                ResponseSource::Cache => &self.cache_hits,
                ResponseSource::Network => &self.network,
                ResponseSource::OfflineFallback => &self.offline_fallbacks,
            },
            Err(_) => &self.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_runtime_fill(&self) {
        self.runtime_fills.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            bypassed: self.bypassed.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            network: self.network.load(Ordering::Relaxed),
            runtime_fills: self.runtime_fills.load(Ordering::Relaxed),
            offline_fallbacks: self.offline_fallbacks.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}
