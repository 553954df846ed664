//! 엔진 에러 타입.

use autotap_core::error::CoreError;
use thiserror::Error;

use crate::engine::DetectorState;

/// 엔진 레이어 에러
#[derive(Debug, Error)]
pub enum EngineError {
    /// 현재 상태에서 허용되지 않는 요청
    #[error("{operation} 요청 거부: 현재 상태 {state:?}")]
    InvalidState {
        operation: &'static str,
        state: DetectorState,
    },

    /// 화면 크기가 유효하지 않음
    #[error("잘못된 화면 크기: {width}x{height}")]
    InvalidDisplaySize { width: i32, height: i32 },

    /// 네이티브 검출기를 사용할 수 없음 (재시작 필요)
    #[error("이미지 검출기를 사용할 수 없음")]
    DetectorUnavailable,

    /// 엔진 태스크가 종료됨
    #[error("엔진 채널 닫힘")]
    ChannelClosed,

    #[error(transparent)]
    Core(#[from] CoreError),
}
