//! 시장 데이터 제공자 클라이언트.
//!
//! 업스트림의 4개 작업(상승/하락 상위, 종목 검색, 기업 개요, 시계열)을
//! 수행하고 응답을 방어적으로 정규화합니다.
//!
//! # 오류 정책
//!
//! 전송 계층 실패(네트워크 오류, 비정상 상태 코드, 요청 한도 응답)는
//! 모두 단일한 `DataError::FetchFailed`로 올라갑니다. 이 클라이언트는
//! 재시도하지 않습니다. 재시도/폴백은 TTL 캐시의 stale 제공 정책이
//! 담당합니다.
//!
//! 반면 스키마 드리프트(누락/변형된 필드)는 안전한 기본값으로 흡수되어
//! 사용자에게 노출되지 않습니다.

use crate::error::{DataError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use stockview_core::{
    GainersLosersSnapshot, MarketDataConfig, Resolution, SymbolMatch, Ticker, TimeSeries,
    TimeSeriesPoint,
};
use tracing::{debug, info, warn};

/// 시장 데이터 제공자 클라이언트.
#[derive(Clone)]
pub struct MarketDataClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MarketDataClient {
    /// 새 클라이언트를 생성합니다.
    pub fn new(config: &MarketDataConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// API 요청 실행.
    ///
    /// 요청 한도 초과 시 업스트림은 HTTP 200과 함께 본문에 Note/Information
    /// 필드만 담아 응답하므로 이를 전송 실패로 취급합니다.
    async fn request(&self, params: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}/query", self.base_url);

        debug!(url = %url, function = params.first().map(|(_, v)| *v).unwrap_or(""), "Upstream request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| DataError::FetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(DataError::FetchFailed(format!("HTTP {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DataError::FetchFailed(format!("응답 본문 파싱 실패: {}", e)))?;

        // 인밴드 요청 한도 응답 감지
        if let Some(object) = body.as_object() {
            if object.len() == 1 && (object.contains_key("Note") || object.contains_key("Information"))
            {
                warn!("Upstream rate limit response");
                return Err(DataError::FetchFailed("rate limited".to_string()));
            }
        }

        Ok(body)
    }

    /// 상승/하락 상위 종목 스냅샷을 가져옵니다.
    ///
    /// 누락되거나 변형된 목록은 오류가 아니라 빈 시퀀스로 정규화됩니다.
    /// 업스트림의 순위 순서는 그대로 유지합니다.
    pub async fn fetch_top_gainers_losers(&self) -> Result<GainersLosersSnapshot> {
        let body = self
            .request(&[("function", "TOP_GAINERS_LOSERS")])
            .await?;

        let snapshot = GainersLosersSnapshot {
            top_gainers: normalize_ticker_list(body.get("top_gainers")),
            top_losers: normalize_ticker_list(body.get("top_losers")),
        };

        info!(
            gainers = snapshot.top_gainers.len(),
            losers = snapshot.top_losers.len(),
            "Top movers fetched"
        );

        Ok(snapshot)
    }

    /// 종목을 검색합니다.
    ///
    /// 공백뿐인 질의는 네트워크 호출 없이 빈 결과를 반환합니다.
    pub async fn search_symbol(&self, query: &str) -> Result<Vec<SymbolMatch>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let body = self
            .request(&[("function", "SYMBOL_SEARCH"), ("keywords", query)])
            .await?;

        let matches = normalize_match_list(body.get("bestMatches"));

        debug!(query = query, matches = matches.len(), "Symbol search done");
        Ok(matches)
    }

    /// 기업 개요 필드를 가져옵니다.
    ///
    /// 업스트림 필드를 그대로 전달하며, 없는 필드는 맵에 존재하지 않습니다.
    pub async fn fetch_overview(&self, symbol: &str) -> Result<HashMap<String, String>> {
        let body = self
            .request(&[("function", "OVERVIEW"), ("symbol", symbol)])
            .await?;

        let fields = match body.as_object() {
            Some(object) => object
                .iter()
                .filter_map(|(key, value)| {
                    value
                        .as_str()
                        .map(|text| (key.clone(), text.to_string()))
                })
                .collect(),
            None => HashMap::new(),
        };

        Ok(fields)
    }

    /// 종목 시계열을 가져옵니다.
    ///
    /// 업스트림은 타임스탬프 문자열 → 캔들 객체 맵을 반환하므로 이를
    /// 타임스탬프 오름차순 시퀀스로 변환합니다. 파싱할 수 없는 타임스탬프나
    /// 종가 항목은 건너뛰며, 치명적이지 않습니다.
    pub async fn fetch_time_series(
        &self,
        symbol: &str,
        resolution: Resolution,
    ) -> Result<TimeSeries> {
        let mut params = vec![
            ("function", resolution.upstream_function()),
            ("symbol", symbol),
        ];
        if let Some(interval) = resolution.interval_param() {
            params.push(("interval", interval));
        }

        let body = self.request(&params).await?;

        let mut series = match body.get(resolution.series_key()).and_then(Value::as_object) {
            Some(entries) => entries
                .iter()
                .filter_map(|(timestamp, candle)| parse_series_point(timestamp, candle, resolution))
                .collect(),
            None => {
                warn!(symbol = symbol, resolution = %resolution, "Time series key missing, returning empty");
                Vec::new()
            }
        };

        stockview_core::sort_ascending(&mut series);

        info!(
            symbol = symbol,
            resolution = %resolution,
            points = series.len(),
            "Time series fetched"
        );

        Ok(series)
    }
}

// =============================================================================
// 응답 정규화
// =============================================================================

/// 레코드에서 후보 키 순서대로 문자열 필드를 추출합니다.
///
/// 문자열이 아닌 숫자 값도 표시용 문자열로 받아들이며, 모든 후보가
/// 없으면 빈 문자열로 강등합니다. 이 함수는 전역적(total)입니다.
fn string_field(record: &Value, candidates: &[&str]) -> String {
    for key in candidates {
        match record.get(*key) {
            Some(Value::String(text)) => return text.clone(),
            Some(Value::Number(number)) => return number.to_string(),
            _ => {}
        }
    }
    String::new()
}

/// 업스트림 원시 레코드를 정규화된 Ticker로 변환합니다.
///
/// 필드 이름 모호성(`ticker`|`symbol`, `price`|`close`,
/// `change_percentage`|`change`)을 여기서 한 번에 해소합니다.
fn normalize_ticker(record: &Value) -> Ticker {
    Ticker {
        symbol: string_field(record, &["ticker", "symbol"]),
        name: string_field(record, &["name"]),
        price: string_field(record, &["price", "close"]),
        change_percent: string_field(record, &["change_percentage", "change"]),
    }
}

/// 원시 레코드 목록을 Ticker 시퀀스로 정규화합니다.
///
/// 목록 자체가 없거나 배열이 아니면 빈 시퀀스입니다.
fn normalize_ticker_list(list: Option<&Value>) -> Vec<Ticker> {
    match list.and_then(Value::as_array) {
        Some(records) => records.iter().map(normalize_ticker).collect(),
        None => Vec::new(),
    }
}

/// 검색 결과 목록을 정규화합니다.
///
/// 심볼이 비어 있는 항목은 표시할 수 없으므로 건너뜁니다.
fn normalize_match_list(list: Option<&Value>) -> Vec<SymbolMatch> {
    match list.and_then(Value::as_array) {
        Some(records) => records
            .iter()
            .filter_map(|record| {
                let symbol = string_field(record, &["1. symbol", "symbol"]);
                if symbol.is_empty() {
                    return None;
                }
                Some(SymbolMatch {
                    symbol,
                    name: string_field(record, &["2. name", "name"]),
                })
            })
            .collect(),
        None => Vec::new(),
    }
}

/// 시계열 맵의 한 항목을 파싱합니다.
///
/// 타임스탬프나 종가를 파싱할 수 없으면 `None`을 반환하여 건너뜁니다.
fn parse_series_point(
    timestamp: &str,
    candle: &Value,
    resolution: Resolution,
) -> Option<TimeSeriesPoint> {
    let timestamp = match resolution {
        Resolution::Intraday5Min => {
            NaiveDateTime::parse_from_str(timestamp, resolution.timestamp_format())
                .ok()?
                .and_utc()
        }
        _ => NaiveDate::parse_from_str(timestamp, resolution.timestamp_format())
            .ok()?
            .and_hms_opt(0, 0, 0)?
            .and_utc(),
    };

    let close = string_field(candle, &["4. close", "close"]);
    let close = Decimal::from_str(&close).ok()?;

    Some(TimeSeriesPoint { timestamp, close })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_ticker_prefers_ticker_key() {
        let record = json!({
            "ticker": "NVDA",
            "symbol": "IGNORED",
            "price": "120.5",
            "change_percentage": "3.1%"
        });

        let ticker = normalize_ticker(&record);
        assert_eq!(ticker.symbol, "NVDA");
        assert_eq!(ticker.price, "120.5");
        assert_eq!(ticker.change_percent, "3.1%");
    }

    #[test]
    fn test_normalize_ticker_falls_back_to_close_and_change() {
        let record = json!({
            "symbol": "IBM",
            "name": "International Business Machines",
            "close": 173.2,
            "change": "-0.4%"
        });

        let ticker = normalize_ticker(&record);
        assert_eq!(ticker.symbol, "IBM");
        assert_eq!(ticker.name, "International Business Machines");
        assert_eq!(ticker.price, "173.2");
        assert_eq!(ticker.change_percent, "-0.4%");
    }

    #[test]
    fn test_normalize_ticker_is_total() {
        // 모든 필드가 없어도 실패하지 않고 빈 문자열로 강등
        let ticker = normalize_ticker(&json!({}));
        assert_eq!(ticker.symbol, "");
        assert_eq!(ticker.name, "");
        assert_eq!(ticker.price, "");
        assert_eq!(ticker.change_percent, "");

        let ticker = normalize_ticker(&json!({"volume": "123"}));
        assert_eq!(ticker.symbol, "");
    }

    #[test]
    fn test_normalize_ticker_list_preserves_order() {
        let list = json!([
            {"ticker": "A"},
            {"ticker": "B"},
            {"ticker": "C"}
        ]);

        let tickers = normalize_ticker_list(Some(&list));
        let symbols: Vec<&str> = tickers.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_normalize_ticker_list_malformed_is_empty() {
        assert!(normalize_ticker_list(None).is_empty());
        assert!(normalize_ticker_list(Some(&json!("not a list"))).is_empty());
        assert!(normalize_ticker_list(Some(&json!({"nested": []}))).is_empty());
    }

    #[test]
    fn test_normalize_match_list_skips_empty_symbols() {
        let list = json!([
            {"1. symbol": "AAPL", "2. name": "Apple Inc"},
            {"2. name": "no symbol"},
            {"1. symbol": "MSFT", "2. name": "Microsoft"}
        ]);

        let matches = normalize_match_list(Some(&list));
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].symbol, "AAPL");
        assert_eq!(matches[1].name, "Microsoft");
    }

    #[test]
    fn test_parse_series_point_daily() {
        let point = parse_series_point(
            "2024-05-03",
            &json!({"1. open": "181.0", "4. close": "183.38"}),
            Resolution::Daily,
        )
        .unwrap();

        assert_eq!(point.close.to_string(), "183.38");
        assert_eq!(point.timestamp.to_rfc3339(), "2024-05-03T00:00:00+00:00");
    }

    #[test]
    fn test_parse_series_point_intraday() {
        let point = parse_series_point(
            "2024-05-03 19:55:00",
            &json!({"4. close": "183.10"}),
            Resolution::Intraday5Min,
        )
        .unwrap();

        assert_eq!(point.close.to_string(), "183.10");
    }

    #[test]
    fn test_parse_series_point_skips_malformed() {
        // 잘못된 타임스탬프
        assert!(parse_series_point("not-a-date", &json!({"4. close": "1.0"}), Resolution::Daily)
            .is_none());
        // 잘못된 종가
        assert!(parse_series_point("2024-05-03", &json!({"4. close": "n/a"}), Resolution::Daily)
            .is_none());
        // 종가 누락
        assert!(parse_series_point("2024-05-03", &json!({}), Resolution::Daily).is_none());
    }
}
