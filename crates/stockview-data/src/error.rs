//! 데이터 레이어 오류 타입.

use thiserror::Error;

/// 데이터 레이어 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 업스트림 전송 계층 실패 (네트워크, 비정상 상태 코드, 요청 한도)
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// 로컬 저장소 읽기/쓰기 실패
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 이미 존재하는 워치리스트 그룹
    #[error("Duplicate group: {0}")]
    DuplicateGroup(String),

    /// 존재하지 않는 워치리스트 그룹
    #[error("Unknown group: {0}")]
    UnknownGroup(String),
}

impl DataError {
    /// 사용자에게 그대로 전달 가능한 오류인지 확인합니다.
    ///
    /// 워치리스트 조작 오류는 사용자 행동으로 해결 가능한 메시지입니다.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            DataError::DuplicateGroup(_) | DataError::UnknownGroup(_)
        )
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        DataError::FetchFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_user_error() {
        assert!(DataError::DuplicateGroup("Tech".to_string()).is_user_error());
        assert!(DataError::UnknownGroup("Tech".to_string()).is_user_error());
        assert!(!DataError::FetchFailed("timeout".to_string()).is_user_error());
    }
}
