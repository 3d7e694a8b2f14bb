//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 기본값 → TOML 파일 → 환경 변수(`STOCKVIEW__` 접두사) 순으로 적용됩니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 시장 데이터 제공자 설정
    #[serde(default)]
    pub market: MarketDataConfig,
    /// 로고/빠른 시세 제공자 설정
    #[serde(default)]
    pub logo: LogoConfig,
    /// 캐시 설정
    #[serde(default)]
    pub cache: CacheConfig,
    /// 검색 설정
    #[serde(default)]
    pub search: SearchConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 시장 데이터 제공자 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketDataConfig {
    /// API Base URL
    pub base_url: String,
    /// API 키
    pub api_key: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.alphavantage.co".to_string(),
            api_key: "demo".to_string(),
            timeout_secs: 30,
        }
    }
}

/// 로고/빠른 시세 제공자 설정.
///
/// 보조 제공자는 자격증명 없이 접근 가능한 이미지 URL 패턴과
/// 종목별 빠른 시세 엔드포인트를 제공합니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogoConfig {
    /// 로고 이미지 Base URL (`{base}/{SYMBOL}.png` 형식)
    pub image_base_url: String,
    /// 빠른 시세 Base URL (`{base}/{SYMBOL}` 형식)
    pub quote_base_url: String,
    /// 후보 이미지 존재 확인 타임아웃 (밀리초)
    pub probe_timeout_ms: u64,
    /// 배치 해석 시 동시 요청 상한
    pub max_concurrency: usize,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            image_base_url: "https://financialmodelingprep.com/image-stock".to_string(),
            quote_base_url: "https://quickquote.stockview.app/v1/quote".to_string(),
            probe_timeout_ms: 2_500,
            max_concurrency: 4,
        }
    }
}

/// 캐시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// 캐시 항목의 TTL (시간 단위)
    pub ttl_hours: u64,
    /// 로컬 키-값 저장소 파일 경로
    pub storage_path: String,
}

impl CacheConfig {
    /// TTL을 밀리초 단위로 반환합니다.
    pub fn ttl_millis(&self) -> i64 {
        (self.ttl_hours as i64) * 60 * 60 * 1000
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            storage_path: "data/stockview-store.json".to_string(),
        }
    }
}

/// 검색 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// 디바운스 대기 시간 (밀리초)
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 400 }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("market.base_url", "https://www.alphavantage.co")?
            .set_default("cache.ttl_hours", 24)?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("STOCKVIEW")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
