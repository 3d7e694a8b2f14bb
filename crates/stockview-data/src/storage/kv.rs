//! 키-값 캐시 저장소.
//!
//! 문자열 키로 JSON 직렬화 값을 보관하는 범용 저장소 레이어입니다.
//! TTL이나 스키마에 대한 지식은 없으며 순수한 문자열 영속화만 담당합니다.
//!
//! 읽기 시 파싱에 실패한 값은 캐시 미스로 처리하고 호출자에게 오류를
//! 전파하지 않습니다.

use crate::error::{DataError, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// 문자열 키-값 저장소 계약.
///
/// 값은 쓰기 시 JSON 텍스트로 직렬화되고 읽기 시 파싱됩니다.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// 키의 원본 문자열 값을 가져옵니다.
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// 키에 원본 문자열 값을 저장합니다.
    async fn set_raw(&self, key: &str, value: String) -> Result<()>;

    /// 키를 삭제합니다.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// 저장소에서 값을 가져와 역직렬화합니다.
///
/// 파싱 실패는 캐시 미스(`None`)로 처리합니다.
pub async fn get_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>> {
    let raw = match store.get_raw(key).await? {
        Some(raw) => raw,
        None => return Ok(None),
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            // 손상된 항목은 미스로 강등
            debug!(key = key, error = %err, "Malformed stored value, treating as miss");
            Ok(None)
        }
    }
}

/// 값을 직렬화하여 저장소에 기록합니다.
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let json = serde_json::to_string(value).map_err(|e| DataError::Serialization(e.to_string()))?;
    store.set_raw(key, json).await
}

// =============================================================================
// 메모리 저장소
// =============================================================================

/// 메모리 기반 키-값 저장소.
///
/// 테스트와 임시(비영속) 세션에서 사용합니다.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    /// 빈 메모리 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// 파일 저장소
// =============================================================================

/// 파일 기반 키-값 저장소.
///
/// 전체 맵을 하나의 JSON 문서로 보관하며, 쓰기마다 임시 파일에 기록 후
/// 원자적 rename으로 교체합니다. 키 간 트랜잭션 격리는 제공하지 않습니다.
pub struct FileKvStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileKvStore {
    /// 파일 저장소를 엽니다.
    ///
    /// 파일이 없거나 손상된 경우 빈 저장소로 시작합니다.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DataError::Persistence(format!("디렉터리 생성 실패: {}", e)))?;
        }

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Malformed store file, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        debug!(path = %path.display(), keys = entries.len(), "File store opened");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// 현재 맵 전체를 디스크에 기록합니다.
    ///
    /// 호출자는 쓰기 잠금을 보유한 상태여야 합니다.
    async fn flush(&self, entries: &HashMap<String, String>) -> Result<()> {
        let json = serde_json::to_string(entries)
            .map_err(|e| DataError::Serialization(e.to_string()))?;

        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| DataError::Persistence(format!("저장소 기록 실패: {}", e)))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| DataError::Persistence(format!("저장소 교체 실패: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        self.flush(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            self.flush(&entries).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        label: String,
        count: u32,
    }

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let store = MemoryKvStore::new();
        let sample = Sample {
            label: "hello".to_string(),
            count: 3,
        };

        set_json(&store, "sample", &sample).await.unwrap();
        let loaded: Option<Sample> = get_json(&store, "sample").await.unwrap();
        assert_eq!(loaded, Some(sample));

        store.remove("sample").await.unwrap();
        let gone: Option<Sample> = get_json(&store, "sample").await.unwrap();
        assert_eq!(gone, None);
    }

    #[tokio::test]
    async fn test_parse_failure_is_miss() {
        let store = MemoryKvStore::new();
        store
            .set_raw("broken", "{not json".to_string())
            .await
            .unwrap();

        // 손상된 값은 오류가 아니라 미스
        let loaded: Option<Sample> = get_json(&store, "broken").await.unwrap();
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn test_absent_key_is_miss() {
        let store = MemoryKvStore::new();
        let loaded: Option<Sample> = get_json(&store, "nothing").await.unwrap();
        assert_eq!(loaded, None);
    }
}
