//! 시세 및 종목 타입.
//!
//! 이 모듈은 화면에 표시되는 정규화된 시세 타입을 정의합니다:
//! - `Ticker` - 정규화된 종목 시세 레코드
//! - `GainersLosersSnapshot` - 상승/하락 상위 종목 스냅샷
//! - `SymbolMatch` - 종목 검색 결과 항목
//!
//! 영속화되는 JSON 필드명은 로컬 저장소의 기존 형식(camelCase)을 따릅니다.

use serde::{Deserialize, Serialize};

/// 정규화된 종목 시세 레코드.
///
/// 업스트림의 이질적인 필드(`ticker`|`symbol`|`name`, `price`|`close`,
/// `change`)를 정규화한 결과입니다. 누락된 필드는 빈 문자열로 저장되며,
/// 정규화 과정에서 에러가 발생하지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    /// 종목 심볼 (조회용으로는 대문자 정규화)
    pub symbol: String,
    /// 종목명
    pub name: String,
    /// 표시용 가격 문자열 (비어 있을 수 있음)
    pub price: String,
    /// 표시용 등락률 문자열 (비어 있을 수 있음)
    pub change_percent: String,
}

impl Ticker {
    /// 조회용 대문자 심볼을 반환합니다.
    pub fn lookup_symbol(&self) -> String {
        normalize_symbol(&self.symbol)
    }
}

/// 심볼을 조회용 대문자 형식으로 정규화합니다.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// 상승/하락 상위 종목 스냅샷.
///
/// 두 시퀀스 모두 업스트림의 순위 순서를 그대로 유지합니다.
/// 표시 개수 제한은 UI 경계에서 수행하며 캐시에는 전체가 저장됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GainersLosersSnapshot {
    /// 상승 상위 종목 (순위 순)
    pub top_gainers: Vec<Ticker>,
    /// 하락 상위 종목 (순위 순)
    pub top_losers: Vec<Ticker>,
}

impl GainersLosersSnapshot {
    /// 스냅샷이 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.top_gainers.is_empty() && self.top_losers.is_empty()
    }
}

/// 종목 검색 결과 항목.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolMatch {
    /// 종목 심볼
    pub symbol: String,
    /// 종목명
    pub name: String,
}

/// 빠른 시세 조회 결과 (보조 제공자).
///
/// 워치리스트 표시에서 최후 수단으로 사용하는 가격 폴백입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickQuote {
    /// 종목 심볼
    pub symbol: String,
    /// 표시용 가격 문자열 (비어 있을 수 있음)
    pub price: String,
    /// 표시용 등락률 문자열 (비어 있을 수 있음)
    pub change_percent: String,
}
