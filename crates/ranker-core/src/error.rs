//! 랭킹 시스템의 에러 타입.
//!
//! 이 모듈은 시스템 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 랭킹 에러.
#[derive(Debug, Error)]
pub enum RankerError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터 제공자 에러 (개별 호출)
    #[error("제공자 에러: {0}")]
    Provider(String),

    /// 종목 유니버스 조회 에러 (사이클 중단)
    #[error("유니버스 조회 에러: {0}")]
    Universe(String),

    /// 캐시/저장소 에러
    #[error("저장소 에러: {0}")]
    Store(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 랭킹 작업을 위한 Result 타입.
pub type RankerResult<T> = Result<T, RankerError>;

impl RankerError {
    /// 사이클 전체를 중단시키는 치명적 에러인지 확인합니다.
    ///
    /// 유니버스/저장소 에러는 부분 스냅샷 저장을 막기 위해 사이클을 중단합니다.
    /// 개별 제공자 호출 실패는 해당 종목/섹터만 제외하고 계속 진행합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RankerError::Universe(_) | RankerError::Store(_) | RankerError::Config(_)
        )
    }

    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RankerError::Network(_) | RankerError::Provider(_))
    }
}

impl From<serde_json::Error> for RankerError {
    fn from(err: serde_json::Error) -> Self {
        RankerError::Serialization(err.to_string())
    }
}
