//! 워치리스트 저장소.
//!
//! 그룹 이름 → 종목 목록 매핑을 로컬 저장소의 단일 키 아래에 보관합니다.
//! 모든 변경 작업은 반환 전에 영속화를 완료하므로, 성공 반환을 관찰한
//! 호출자는 새 상태가 디스크에 반영되었음을 보장받습니다.
//!
//! 매핑 전체가 한 단위로 교체되므로 키 간 일관성 문제는 없습니다.

use crate::batch::join_bounded;
use crate::error::{DataError, Result};
use crate::provider::LogoResolver;
use crate::storage::{get_json, set_json, KvStore};
use std::collections::HashMap;
use std::sync::Arc;
use stockview_core::{normalize_symbol, QuickQuote};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// 워치리스트 영속화 키.
const WATCHLIST_KEY: &str = "WATCHLIST_GROUPS";

/// 그룹 이름 → 종목 목록 (삽입 순서 유지).
pub type WatchlistGroups = HashMap<String, Vec<String>>;

/// 워치리스트 저장소.
pub struct WatchlistStore {
    store: Arc<dyn KvStore>,
    groups: RwLock<WatchlistGroups>,
}

impl WatchlistStore {
    /// 영속 상태를 읽어 저장소를 엽니다.
    ///
    /// 영속 데이터가 없거나 손상된 경우 빈 매핑으로 시작합니다.
    pub async fn open(store: Arc<dyn KvStore>) -> Self {
        let groups = match get_json::<WatchlistGroups>(store.as_ref(), WATCHLIST_KEY).await {
            Ok(Some(groups)) => groups,
            Ok(None) => WatchlistGroups::new(),
            Err(err) => {
                warn!(error = %err, "Watchlist load failed, starting empty");
                WatchlistGroups::new()
            }
        };

        debug!(groups = groups.len(), "Watchlist opened");

        Self {
            store,
            groups: RwLock::new(groups),
        }
    }

    /// 전체 매핑의 스냅샷을 반환합니다.
    pub async fn load_all(&self) -> WatchlistGroups {
        self.groups.read().await.clone()
    }

    /// 그룹의 종목 목록을 반환합니다.
    pub async fn group_symbols(&self, group: &str) -> Option<Vec<String>> {
        self.groups.read().await.get(group).cloned()
    }

    /// 새 그룹을 생성합니다.
    ///
    /// 같은 이름(대소문자 구분)의 그룹이 이미 있으면 `DuplicateGroup`입니다.
    pub async fn create_group(&self, name: &str) -> Result<()> {
        let mut groups = self.groups.write().await;

        if groups.contains_key(name) {
            return Err(DataError::DuplicateGroup(name.to_string()));
        }

        let mut updated = groups.clone();
        updated.insert(name.to_string(), Vec::new());
        self.persist(&updated).await?;
        *groups = updated;

        info!(group = name, "Watchlist group created");
        Ok(())
    }

    /// 그룹과 소속 종목을 함께 삭제합니다.
    ///
    /// 그룹이 없으면 오류가 아니라 no-op입니다.
    pub async fn delete_group(&self, name: &str) -> Result<()> {
        let mut groups = self.groups.write().await;

        if !groups.contains_key(name) {
            return Ok(());
        }

        let mut updated = groups.clone();
        updated.remove(name);
        self.persist(&updated).await?;
        *groups = updated;

        info!(group = name, "Watchlist group deleted");
        Ok(())
    }

    /// 그룹 안에서 종목을 토글합니다.
    ///
    /// 심볼은 비교 전에 대문자로 정규화됩니다. 없으면 추가하고 있으면
    /// 제거하는 대칭 토글이며, 추가되었으면 `true`를 반환합니다.
    pub async fn toggle_symbol(&self, group: &str, symbol: &str) -> Result<bool> {
        let symbol = normalize_symbol(symbol);
        let mut groups = self.groups.write().await;

        let members = groups
            .get(group)
            .ok_or_else(|| DataError::UnknownGroup(group.to_string()))?;

        let mut updated_members = members.clone();
        let added = match updated_members.iter().position(|member| *member == symbol) {
            Some(index) => {
                updated_members.remove(index);
                false
            }
            None => {
                updated_members.push(symbol.clone());
                true
            }
        };

        let mut updated = groups.clone();
        updated.insert(group.to_string(), updated_members);
        self.persist(&updated).await?;
        *groups = updated;

        debug!(group = group, symbol = %symbol, added = added, "Watchlist symbol toggled");
        Ok(added)
    }

    /// 그룹의 모든 종목에 대한 빠른 시세를 일괄 조회합니다.
    ///
    /// 종목 하나의 실패는 해당 항목만 빈 가격의 폴백 값으로 강등되며
    /// 배치의 나머지를 실패시키지 않습니다.
    pub async fn group_quotes(
        &self,
        group: &str,
        resolver: &LogoResolver,
        max_concurrency: usize,
    ) -> Result<Vec<QuickQuote>> {
        let symbols = self
            .group_symbols(group)
            .await
            .ok_or_else(|| DataError::UnknownGroup(group.to_string()))?;

        let outcomes = join_bounded(symbols.iter(), max_concurrency, |symbol| async move {
            resolver.quick_quote(symbol).await
        })
        .await;

        let quotes = outcomes
            .into_iter()
            .zip(&symbols)
            .map(|(outcome, symbol)| match outcome {
                Ok(quote) => quote,
                Err(err) => {
                    warn!(symbol = %symbol, error = %err, "Quick quote failed, using fallback");
                    QuickQuote {
                        symbol: symbol.clone(),
                        ..QuickQuote::default()
                    }
                }
            })
            .collect();

        Ok(quotes)
    }

    /// 매핑 전체를 한 단위로 영속화합니다.
    async fn persist(&self, groups: &WatchlistGroups) -> Result<()> {
        set_json(self.store.as_ref(), WATCHLIST_KEY, groups).await
    }
}
