//! 시계열 데이터 구조체.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 시계열의 한 지점 (종가 기준).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// 캔들 타임스탬프
    pub timestamp: DateTime<Utc>,
    /// 종가
    pub close: Decimal,
}

/// 타임스탬프 오름차순으로 정렬된 시계열.
pub type TimeSeries = Vec<TimeSeriesPoint>;

/// 시계열을 타임스탬프 오름차순으로 정렬합니다.
pub fn sort_ascending(series: &mut TimeSeries) {
    series.sort_by_key(|point| point.timestamp);
}

/// 시계열이 타임스탬프 오름차순인지 확인합니다.
pub fn is_ascending(series: &TimeSeries) -> bool {
    series
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn point(secs: i64, close: Decimal) -> TimeSeriesPoint {
        TimeSeriesPoint {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            close,
        }
    }

    #[test]
    fn test_sort_ascending() {
        let mut series = vec![
            point(300, dec!(3.0)),
            point(100, dec!(1.0)),
            point(200, dec!(2.0)),
        ];
        sort_ascending(&mut series);

        assert!(is_ascending(&series));
        assert_eq!(series[0].close, dec!(1.0));
        assert_eq!(series[2].close, dec!(3.0));
    }

    #[test]
    fn test_is_ascending_empty_and_single() {
        assert!(is_ascending(&Vec::new()));
        assert!(is_ascending(&vec![point(1, dec!(1.0))]));
    }
}
