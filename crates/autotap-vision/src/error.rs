//! 비전 레이어 에러.

use autotap_core::error::CoreError;
use thiserror::Error;

/// 비전 에러 타입
#[derive(Debug, Error)]
pub enum VisionError {
    /// 이미지 디코딩 실패
    #[error("이미지 디코딩 실패: {0}")]
    Image(#[from] image::ImageError),

    /// 요청 크기가 유효하지 않음
    #[error("잘못된 비트맵 크기: {width}x{height}")]
    InvalidSize { width: i32, height: i32 },

    /// 비동기 작업 실패
    #[error("비동기 작업 실패: {0}")]
    Async(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}
