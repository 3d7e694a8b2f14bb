//! 캐시 기반 시장 데이터 서비스.
//!
//! TTL 캐시와 시장 데이터 클라이언트를 조합하여 UI에 노출되는
//! fetch-or-refresh 파사드를 제공합니다. TTL 안에서 반복 호출하면
//! 추가 네트워크 트래픽 없이 동일한 캐시 결과가 반환됩니다.

use crate::cache::key::CacheKey;
use crate::cache::ttl::TtlCache;
use crate::error::Result;
use crate::provider::MarketDataClient;
use crate::storage::KvStore;
use chrono::Utc;
use std::sync::Arc;
use stockview_core::{CacheConfig, GainersLosersSnapshot, Resolution, TimeSeries};
use tracing::instrument;

/// 캐시 기반 시장 데이터 서비스.
pub struct CachedMarketService {
    cache: TtlCache,
    client: MarketDataClient,
}

impl CachedMarketService {
    /// 새 서비스를 생성합니다.
    pub fn new(store: Arc<dyn KvStore>, client: MarketDataClient, config: &CacheConfig) -> Self {
        Self {
            cache: TtlCache::new(store, config.ttl_millis()),
            client,
        }
    }

    /// 상승/하락 상위 종목 스냅샷을 가져옵니다 (캐시 우선).
    #[instrument(skip(self))]
    pub async fn top_gainers_losers(&self) -> Result<GainersLosersSnapshot> {
        self.top_gainers_losers_at(Utc::now().timestamp_millis())
            .await
    }

    /// 상승/하락 상위 종목 스냅샷을 가져옵니다 (명시적 시각 기준).
    pub async fn top_gainers_losers_at(&self, now_millis: i64) -> Result<GainersLosersSnapshot> {
        self.cache
            .get_or_fetch_at(&CacheKey::GainersLosers, now_millis, || {
                self.client.fetch_top_gainers_losers()
            })
            .await
    }

    /// 종목 시계열을 가져옵니다 (캐시 우선).
    #[instrument(skip(self))]
    pub async fn time_series(&self, symbol: &str, resolution: Resolution) -> Result<TimeSeries> {
        self.time_series_at(symbol, resolution, Utc::now().timestamp_millis())
            .await
    }

    /// 종목 시계열을 가져옵니다 (명시적 시각 기준).
    pub async fn time_series_at(
        &self,
        symbol: &str,
        resolution: Resolution,
        now_millis: i64,
    ) -> Result<TimeSeries> {
        let key = CacheKey::time_series(symbol, resolution);
        self.cache
            .get_or_fetch_at(&key, now_millis, || {
                self.client.fetch_time_series(symbol, resolution)
            })
            .await
    }

    /// 내부 클라이언트를 가져옵니다.
    ///
    /// 검색과 기업 개요는 캐시를 거치지 않고 클라이언트를 직접 사용합니다.
    pub fn client(&self) -> &MarketDataClient {
        &self.client
    }

    /// 내부 TTL 캐시를 가져옵니다.
    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }
}
