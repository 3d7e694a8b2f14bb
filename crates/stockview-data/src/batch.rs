//! 동시 실행 상한이 있는 배치 결합자.
//!
//! 독립적인 비동기 작업 여러 개를 동시에 실행하되, 항목별 실패를
//! 격리하여 각 항목이 자신의 결과 슬롯으로만 실패하게 합니다.
//! 한 항목의 실패가 배치의 나머지를 취소하거나 실패시키지 않습니다.

use crate::error::Result;
use futures::stream::{self, StreamExt};
use std::future::Future;

/// 항목들을 동시 실행 상한 아래에서 처리하고 항목별 결과를 반환합니다.
///
/// 입력 순서가 출력 순서로 유지됩니다. `limit`이 0이면 1로 처리합니다.
pub async fn join_bounded<I, T, U, F, Fut>(items: I, limit: usize, op: F) -> Vec<Result<U>>
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<U>>,
{
    stream::iter(items.into_iter().map(op))
        .buffered(limit.max(1))
        .collect()
        .await
}
