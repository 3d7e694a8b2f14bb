//! 타입이 있는 캐시 키.
//!
//! 자유 형식 문자열 결합 대신 판별 가능한 키 타입을 사용하여
//! 키 충돌 가능성을 제거합니다. 생성되는 저장소 키는 로컬 저장소의
//! 기존 키 이름과 정확히 일치합니다.

use std::fmt;
use stockview_core::{normalize_symbol, Resolution};

/// 캐시 키.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// 상승/하락 상위 종목 스냅샷
    GainersLosers,
    /// 종목별 시계열
    TimeSeries {
        /// 대문자 정규화된 심볼
        symbol: String,
        /// 시계열 해상도
        resolution: Resolution,
    },
}

impl CacheKey {
    /// 시계열 캐시 키를 생성합니다.
    ///
    /// 심볼은 대문자로 정규화됩니다.
    pub fn time_series(symbol: &str, resolution: Resolution) -> Self {
        CacheKey::TimeSeries {
            symbol: normalize_symbol(symbol),
            resolution,
        }
    }

    /// 저장소 키 문자열을 반환합니다.
    pub fn storage_key(&self) -> String {
        match self {
            CacheKey::GainersLosers => "gainersLosersCache".to_string(),
            CacheKey::TimeSeries { symbol, resolution } => {
                format!("av_timeseries_{}_{}", symbol, resolution.cache_segment())
            }
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}
