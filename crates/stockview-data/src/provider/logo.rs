//! 로고 해석 및 빠른 시세 폴백.
//!
//! 티커 심볼에서 표시 가능한 이미지를 얻습니다. 심볼 표기 변형마다
//! 후보 URL을 만들어 순서대로 존재를 확인하고, 처음으로 로드되는
//! 후보를 사용합니다. 모두 실패하면 플레이스홀더 센티널을 반환하며
//! 호출자(UI)가 내장 플레이스홀더 에셋으로 대체합니다.

use crate::batch::join_bounded;
use crate::error::{DataError, Result};
use serde_json::Value;
use std::time::Duration;
use stockview_core::{normalize_symbol, LogoConfig, QuickQuote};
use tracing::{debug, warn};

/// 로고 해석 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource {
    /// 로드 확인된 원격 이미지 URL
    Remote(String),
    /// 로컬 플레이스홀더 에셋 사용
    Placeholder,
}

impl LogoSource {
    /// 플레이스홀더인지 확인합니다.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, LogoSource::Placeholder)
    }
}

/// 로고 해석기.
#[derive(Clone)]
pub struct LogoResolver {
    client: reqwest::Client,
    image_base_url: String,
    quote_base_url: String,
    max_concurrency: usize,
}

impl LogoResolver {
    /// 새 로고 해석기를 생성합니다.
    pub fn new(config: &LogoConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(config.probe_timeout_ms))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
            quote_base_url: config.quote_base_url.trim_end_matches('/').to_string(),
            max_concurrency: config.max_concurrency,
        }
    }

    /// 심볼의 후보 이미지 URL 목록을 생성합니다.
    ///
    /// 더 구체적인 변형이 앞에, 기본 티커가 마지막에 옵니다.
    /// 같은 입력에 대해 순서는 항상 동일합니다.
    pub fn candidate_uris(&self, symbol: &str) -> Vec<String> {
        symbol_variants(symbol)
            .into_iter()
            .map(|variant| format!("{}/{}.png", self.image_base_url, variant))
            .collect()
    }

    /// 후보 목록을 순서대로 확인하여 첫 번째로 로드되는 URL을 반환합니다.
    ///
    /// 후보 하나의 실패가 나머지 확인을 중단시키지 않습니다.
    /// 모두 실패하거나 목록이 비어 있으면 플레이스홀더입니다.
    pub async fn resolve_candidates(&self, candidates: &[String]) -> LogoSource {
        for url in candidates {
            match self.probe(url).await {
                Ok(true) => {
                    debug!(url = %url, "Logo candidate resolved");
                    return LogoSource::Remote(url.clone());
                }
                Ok(false) => {}
                Err(err) => {
                    debug!(url = %url, error = %err, "Logo candidate probe failed");
                }
            }
        }
        LogoSource::Placeholder
    }

    /// 심볼의 로고를 해석합니다.
    pub async fn resolve(&self, symbol: &str) -> LogoSource {
        let candidates = self.candidate_uris(symbol);
        self.resolve_candidates(&candidates).await
    }

    /// 여러 심볼의 로고를 동시 실행 상한 아래에서 일괄 해석합니다.
    ///
    /// 심볼 하나의 실패는 해당 항목만 플레이스홀더로 강등됩니다.
    pub async fn resolve_many(&self, symbols: &[String]) -> Vec<(String, LogoSource)> {
        let outcomes = join_bounded(symbols.iter(), self.max_concurrency, |symbol| async move {
            Ok((symbol.clone(), self.resolve(symbol).await))
        })
        .await;

        outcomes
            .into_iter()
            .zip(symbols)
            .map(|(outcome, symbol)| {
                outcome.unwrap_or_else(|_| (symbol.clone(), LogoSource::Placeholder))
            })
            .collect()
    }

    /// 후보 URL의 존재를 확인합니다.
    async fn probe(&self, url: &str) -> Result<bool> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| DataError::FetchFailed(e.to_string()))?;
        Ok(response.status().is_success())
    }

    /// 빠른 시세를 가져옵니다 (보조 제공자, 자격증명 불필요).
    ///
    /// 워치리스트 표시에서 최후 수단으로 사용하는 가격 폴백입니다.
    pub async fn quick_quote(&self, symbol: &str) -> Result<QuickQuote> {
        let symbol = normalize_symbol(symbol);
        let url = format!("{}/{}", self.quote_base_url, symbol);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DataError::FetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DataError::FetchFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DataError::FetchFailed(format!("응답 본문 파싱 실패: {}", e)))?;

        let quote = QuickQuote {
            symbol,
            price: display_field(&body, &["price", "close", "last"]),
            change_percent: display_field(&body, &["change", "change_percent"]),
        };

        if quote.price.is_empty() {
            warn!(symbol = %quote.symbol, "Quick quote without price field");
        }

        Ok(quote)
    }
}

/// 심볼 표기 변형을 생성합니다.
///
/// 심볼 자체, `.`→`-` 치환, `-`→`.` 치환, 첫 구분자 앞 접두어 순이며
/// 중복은 첫 등장만 유지합니다.
fn symbol_variants(symbol: &str) -> Vec<String> {
    let symbol = normalize_symbol(symbol);
    if symbol.is_empty() {
        return Vec::new();
    }

    let prefix: String = symbol
        .split(['.', '-'])
        .next()
        .unwrap_or(&symbol)
        .to_string();

    let mut variants = Vec::new();
    for variant in [
        symbol.clone(),
        symbol.replace('.', "-"),
        symbol.replace('-', "."),
        prefix,
    ] {
        if !variant.is_empty() && !variants.contains(&variant) {
            variants.push(variant);
        }
    }

    variants
}

/// 레코드에서 후보 키 순서대로 표시용 문자열을 추출합니다.
fn display_field(record: &Value, candidates: &[&str]) -> String {
    for key in candidates {
        match record.get(*key) {
            Some(Value::String(text)) => return text.clone(),
            Some(Value::Number(number)) => return number.to_string(),
            _ => {}
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variants_dotted_symbol() {
        // "."과 "-" 변형이 모두 생성되고 접두어가 마지막
        assert_eq!(symbol_variants("BRK.B"), vec!["BRK.B", "BRK-B", "BRK"]);
    }

    #[test]
    fn test_variants_dashed_symbol() {
        assert_eq!(symbol_variants("BF-B"), vec!["BF-B", "BF.B", "BF"]);
    }

    #[test]
    fn test_variants_plain_symbol_deduped() {
        // 구분자가 없으면 변형이 모두 같으므로 하나만 남음
        assert_eq!(symbol_variants("AAPL"), vec!["AAPL"]);
        assert!(symbol_variants("").is_empty());
    }

    #[test]
    fn test_variants_deterministic() {
        assert_eq!(symbol_variants("brk.b"), symbol_variants("BRK.B"));
    }

    #[test]
    fn test_candidate_uris_formatting() {
        let resolver = LogoResolver::new(&LogoConfig {
            image_base_url: "https://img.example.com/logos/".to_string(),
            ..LogoConfig::default()
        });

        let uris = resolver.candidate_uris("BRK.B");
        assert_eq!(
            uris,
            vec![
                "https://img.example.com/logos/BRK.B.png",
                "https://img.example.com/logos/BRK-B.png",
                "https://img.example.com/logos/BRK.png",
            ]
        );
    }
}
