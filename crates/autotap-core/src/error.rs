//! autotap 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 자체 에러 타입에서 `#[from] CoreError`로 래핑한다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 직렬화, 설정, 유효성 검증, 외부 포트 실패 등 도메인 공통 에러를 정의한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패: {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "Event", "Counter")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// 네이티브 이미지 검출기를 사용할 수 없음 (재시도 불가)
    #[error("이미지 검출기 사용 불가: {0}")]
    DetectorUnavailable(String),

    /// 이미지 검출 실패
    #[error("이미지 검출 에러: {0}")]
    Detection(String),

    /// 액션 실행 실패 (제스처, 인텐트, 알림)
    #[error("액션 실행 실패: {0}")]
    ActionExecution(String),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}
