//! 검색 세션.
//!
//! 빠르게 이어지는 입력을 디바운스 대기 시간으로 묶고, 요청마다
//! 단조 증가 시퀀스 번호를 부여합니다. 더 새로운 요청이 발급된 뒤에
//! 도착한 응답은 폐기되므로 결과가 오래된 내용으로 되돌아가는 일이
//! 없습니다.
//!
//! 진행 중인 요청을 강제로 취소하지는 않습니다. 중복 요청은 디바운스로,
//! 순서 역전은 시퀀스 번호로 각각 막습니다.

use crate::error::Result;
use crate::provider::MarketDataClient;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stockview_core::SymbolMatch;
use tracing::debug;

/// 디바운스와 응답 순서 보장이 있는 검색 세션.
pub struct SearchSession {
    client: Arc<MarketDataClient>,
    debounce: Duration,
    latest_seq: AtomicU64,
}

impl SearchSession {
    /// 새 검색 세션을 생성합니다.
    pub fn new(client: Arc<MarketDataClient>, debounce_ms: u64) -> Self {
        Self {
            client,
            debounce: Duration::from_millis(debounce_ms),
            latest_seq: AtomicU64::new(0),
        }
    }

    /// 질의를 검색합니다.
    ///
    /// 디바운스 대기 중이거나 응답 대기 중에 더 새로운 검색이 시작되면
    /// 이 요청의 결과는 `Ok(None)`으로 폐기됩니다. 폐기된 요청의 오류도
    /// 함께 폐기됩니다.
    pub async fn search(&self, query: &str) -> Result<Option<Vec<SymbolMatch>>> {
        let ticket = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.debounce).await;

        if self.is_superseded(ticket) {
            debug!(query = query, "Search superseded during debounce");
            return Ok(None);
        }

        let outcome = self.client.search_symbol(query).await;

        if self.is_superseded(ticket) {
            debug!(query = query, "Search response discarded, newer request issued");
            return Ok(None);
        }

        outcome.map(Some)
    }

    fn is_superseded(&self, ticket: u64) -> bool {
        self.latest_seq.load(Ordering::SeqCst) != ticket
    }
}
