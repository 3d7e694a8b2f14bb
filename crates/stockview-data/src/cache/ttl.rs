//! TTL 캐시.
//!
//! 키-값 저장소 위에서 항목별 수집 시각을 기록하고 만료 정책을 적용합니다.
//!
//! # 동작 방식
//!
//! 1. 데이터 요청 시 캐시 항목 확인
//! 2. 항목이 신선하면 fetcher 호출 없이 즉시 반환
//! 3. 없거나 오래된 경우 fetcher 호출 후 결과를 저장
//! 4. fetcher 실패 시 오래된 항목이라도 있으면 그것을 반환 (stale 제공)
//!
//! stale 제공 정책이 이 캐시의 핵심 설계 결정입니다. 업스트림에 접근할 수
//! 없을 때 신선도보다 가용성을 우선합니다.

use crate::cache::key::CacheKey;
use crate::error::Result;
use crate::storage::{get_json, set_json, KvStore};
use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// 수집 시각이 붙은 캐시 항목.
///
/// 영속화되는 JSON 필드명은 로컬 저장소의 기존 형식을 따릅니다.
/// `fetched_at_epoch_millis`는 값을 업스트림에서 받아온 실제 시각이며,
/// 항목은 갱신 시 통째로 교체될 뿐 부분 수정되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// 캐시된 값
    pub value: T,
    /// 수집 시각 (epoch 밀리초)
    pub fetched_at_epoch_millis: i64,
}

impl<T> CacheEntry<T> {
    /// 항목이 아직 신선한지 확인합니다.
    ///
    /// 경계값은 만료로 처리합니다 (`now - fetched_at == ttl`이면 stale).
    pub fn is_fresh(&self, now_millis: i64, ttl_millis: i64) -> bool {
        now_millis - self.fetched_at_epoch_millis < ttl_millis
    }
}

/// 키-값 저장소 위의 TTL 캐시.
pub struct TtlCache {
    store: Arc<dyn KvStore>,
    ttl_millis: i64,
}

impl TtlCache {
    /// 새 TTL 캐시를 생성합니다.
    pub fn new(store: Arc<dyn KvStore>, ttl_millis: i64) -> Self {
        Self { store, ttl_millis }
    }

    /// 설정된 TTL (밀리초).
    pub fn ttl_millis(&self) -> i64 {
        self.ttl_millis
    }

    /// 캐시 항목을 읽습니다.
    ///
    /// 항목이 없거나 형태가 손상된 경우, 그리고 저장소 읽기가 실패한
    /// 경우 모두 미스(`None`)로 처리합니다.
    pub async fn read<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<CacheEntry<T>> {
        let storage_key = key.storage_key();
        match get_json::<CacheEntry<T>>(self.store.as_ref(), &storage_key).await {
            Ok(entry) => entry,
            Err(err) => {
                // 저장소 읽기 실패는 미스로 강등하고 새로 가져오게 함
                warn!(key = %storage_key, error = %err, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// 지정된 시각으로 캐시 항목을 기록합니다.
    pub async fn write_at<T: Serialize>(
        &self,
        key: &CacheKey,
        value: &T,
        now_millis: i64,
    ) -> Result<()> {
        let entry = CacheEntry {
            value,
            fetched_at_epoch_millis: now_millis,
        };
        set_json(self.store.as_ref(), &key.storage_key(), &entry).await
    }

    /// 현재 시각으로 캐시 항목을 기록합니다.
    pub async fn write<T: Serialize>(&self, key: &CacheKey, value: &T) -> Result<()> {
        self.write_at(key, value, Utc::now().timestamp_millis()).await
    }

    /// 캐시 항목을 삭제합니다.
    pub async fn invalidate(&self, key: &CacheKey) -> Result<()> {
        self.store.remove(&key.storage_key()).await
    }

    /// 캐시 우선으로 값을 가져옵니다 (현재 시각 기준).
    ///
    /// 신선한 항목이 있으면 fetcher를 호출하지 않습니다. 없거나 오래된
    /// 경우 fetcher를 호출하여 성공하면 저장 후 반환하고, 실패하면 오래된
    /// 항목이라도 있으면 그것을 반환합니다. 항목이 전혀 없으면 fetcher의
    /// 오류를 그대로 전파합니다.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &CacheKey, fetcher: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.get_or_fetch_at(key, Utc::now().timestamp_millis(), fetcher)
            .await
    }

    /// 캐시 우선으로 값을 가져옵니다 (명시적 시각 기준).
    pub async fn get_or_fetch_at<T, F, Fut>(
        &self,
        key: &CacheKey,
        now_millis: i64,
        fetcher: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.read::<T>(key).await {
            Some(entry) if entry.is_fresh(now_millis, self.ttl_millis) => {
                debug!(key = %key, "Cache hit");
                Ok(entry.value)
            }
            cached => match fetcher().await {
                Ok(fresh) => {
                    // 저장 실패가 새로 가져온 값을 버릴 이유는 아님
                    if let Err(err) = self.write_at(key, &fresh, now_millis).await {
                        warn!(key = %key, error = %err, "Cache write failed, returning fetched value");
                    }
                    debug!(key = %key, "Cache refreshed");
                    Ok(fresh)
                }
                Err(err) => match cached {
                    Some(stale) => {
                        warn!(key = %key, error = %err, "Fetch failed, serving stale entry");
                        Ok(stale.value)
                    }
                    None => Err(err),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use crate::storage::MemoryKvStore;
    use std::sync::atomic::{AtomicU32, Ordering};

    const HOUR_MILLIS: i64 = 60 * 60 * 1000;
    const TTL_24H: i64 = 24 * HOUR_MILLIS;

    fn cache() -> TtlCache {
        TtlCache::new(Arc::new(MemoryKvStore::new()), TTL_24H)
    }

    fn series_key() -> CacheKey {
        CacheKey::time_series("AAPL", stockview_core::Resolution::Daily)
    }

    #[test]
    fn test_freshness_strict_boundary() {
        let entry = CacheEntry {
            value: 1u32,
            fetched_at_epoch_millis: 1_000,
        };

        assert!(entry.is_fresh(1_000 + TTL_24H - 1, TTL_24H));
        // 경계값은 만료
        assert!(!entry.is_fresh(1_000 + TTL_24H, TTL_24H));
        assert!(!entry.is_fresh(1_000 + TTL_24H + 1, TTL_24H));
    }

    #[tokio::test]
    async fn test_write_read_roundtrip() {
        let cache = cache();
        let key = series_key();

        cache.write_at(&key, &vec![1u32, 2, 3], 42).await.unwrap();
        let entry: CacheEntry<Vec<u32>> = cache.read(&key).await.unwrap();

        assert_eq!(entry.value, vec![1, 2, 3]);
        assert_eq!(entry.fetched_at_epoch_millis, 42);
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_fetcher() {
        let cache = cache();
        let key = series_key();
        let calls = AtomicU32::new(0);

        cache.write_at(&key, &"cached".to_string(), 0).await.unwrap();

        let value: String = cache
            .get_or_fetch_at(&key, 23 * HOUR_MILLIS, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok("fresh".to_string()) }
            })
            .await
            .unwrap();

        assert_eq!(value, "cached");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_entry_refreshes_once() {
        let cache = cache();
        let key = series_key();
        let calls = AtomicU32::new(0);

        cache.write_at(&key, &"old".to_string(), 0).await.unwrap();

        let value: String = cache
            .get_or_fetch_at(&key, 25 * HOUR_MILLIS, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok("new".to_string()) }
            })
            .await
            .unwrap();

        assert_eq!(value, "new");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // 갱신된 항목은 새 수집 시각을 가짐
        let entry: CacheEntry<String> = cache.read(&key).await.unwrap();
        assert_eq!(entry.fetched_at_epoch_millis, 25 * HOUR_MILLIS);
    }

    #[tokio::test]
    async fn test_serve_stale_on_fetch_failure() {
        let cache = cache();
        let key = series_key();

        cache.write_at(&key, &"stale".to_string(), 0).await.unwrap();

        let value: String = cache
            .get_or_fetch_at(&key, 25 * HOUR_MILLIS, || async {
                Err(DataError::FetchFailed("upstream down".to_string()))
            })
            .await
            .unwrap();

        assert_eq!(value, "stale");
    }

    #[tokio::test]
    async fn test_propagate_failure_without_prior_entry() {
        let cache = cache();
        let key = CacheKey::GainersLosers;

        let result: Result<String> = cache
            .get_or_fetch_at(&key, 0, || async {
                Err(DataError::FetchFailed("upstream down".to_string()))
            })
            .await;

        assert!(matches!(result, Err(DataError::FetchFailed(_))));
    }

    #[tokio::test]
    async fn test_malformed_entry_is_miss() {
        let store = Arc::new(MemoryKvStore::new());
        let cache = TtlCache::new(store.clone(), TTL_24H);
        let key = series_key();

        store
            .set_raw(&key.storage_key(), "{\"value\": 1}".to_string())
            .await
            .unwrap();

        // fetchedAtEpochMillis가 없는 항목은 미스로 처리되어 fetcher가 호출됨
        let value: u32 = cache
            .get_or_fetch_at(&key, 0, || async { Ok(7u32) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
