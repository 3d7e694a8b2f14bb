//! 시계열 차트를 위한 해상도 정의.
//!
//! 이 모듈은 차트 화면에서 선택 가능한 샘플링 간격을 나타내는
//! 해상도 타입을 정의합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 시계열 해상도.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// 5분봉 (당일)
    #[serde(rename = "intraday-5min")]
    Intraday5Min,
    /// 일봉
    #[serde(rename = "daily")]
    Daily,
    /// 주봉
    #[serde(rename = "weekly")]
    Weekly,
    /// 월봉
    #[serde(rename = "monthly")]
    Monthly,
}

impl Resolution {
    /// 지원하는 모든 해상도.
    pub const ALL: [Resolution; 4] = [
        Resolution::Intraday5Min,
        Resolution::Daily,
        Resolution::Weekly,
        Resolution::Monthly,
    ];

    /// 업스트림 API의 function 파라미터 값을 반환합니다.
    pub fn upstream_function(&self) -> &'static str {
        match self {
            Resolution::Intraday5Min => "TIME_SERIES_INTRADAY",
            Resolution::Daily => "TIME_SERIES_DAILY",
            Resolution::Weekly => "TIME_SERIES_WEEKLY",
            Resolution::Monthly => "TIME_SERIES_MONTHLY",
        }
    }

    /// 응답 본문에서 시계열 맵이 들어있는 최상위 키를 반환합니다.
    pub fn series_key(&self) -> &'static str {
        match self {
            Resolution::Intraday5Min => "Time Series (5min)",
            Resolution::Daily => "Time Series (Daily)",
            Resolution::Weekly => "Weekly Time Series",
            Resolution::Monthly => "Monthly Time Series",
        }
    }

    /// 인트라데이 요청에 필요한 interval 파라미터 값.
    ///
    /// 인트라데이가 아닌 해상도는 interval 파라미터를 사용하지 않습니다.
    pub fn interval_param(&self) -> Option<&'static str> {
        match self {
            Resolution::Intraday5Min => Some("5min"),
            _ => None,
        }
    }

    /// 캐시 키에 들어가는 해상도 세그먼트를 반환합니다.
    pub fn cache_segment(&self) -> &'static str {
        match self {
            Resolution::Intraday5Min => "intraday-5min",
            Resolution::Daily => "daily",
            Resolution::Weekly => "weekly",
            Resolution::Monthly => "monthly",
        }
    }

    /// 응답 타임스탬프의 파싱 형식을 반환합니다.
    ///
    /// 인트라데이는 시각까지, 나머지는 날짜만 포함합니다.
    pub fn timestamp_format(&self) -> &'static str {
        match self {
            Resolution::Intraday5Min => "%Y-%m-%d %H:%M:%S",
            _ => "%Y-%m-%d",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cache_segment())
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "intraday-5min" => Ok(Resolution::Intraday5Min),
            "daily" => Ok(Resolution::Daily),
            "weekly" => Ok(Resolution::Weekly),
            "monthly" => Ok(Resolution::Monthly),
            _ => Err(format!("Invalid resolution: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_function() {
        assert_eq!(
            Resolution::Intraday5Min.upstream_function(),
            "TIME_SERIES_INTRADAY"
        );
        assert_eq!(Resolution::Daily.upstream_function(), "TIME_SERIES_DAILY");
        assert_eq!(Resolution::Monthly.upstream_function(), "TIME_SERIES_MONTHLY");
    }

    #[test]
    fn test_interval_param() {
        assert_eq!(Resolution::Intraday5Min.interval_param(), Some("5min"));
        assert_eq!(Resolution::Weekly.interval_param(), None);
    }

    #[test]
    fn test_cache_segment_roundtrip() {
        for resolution in Resolution::ALL {
            let parsed: Resolution = resolution.cache_segment().parse().unwrap();
            assert_eq!(parsed, resolution);
        }
        assert!("hourly".parse::<Resolution>().is_err());
    }
}
