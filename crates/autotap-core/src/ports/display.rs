//! 디스플레이/화면 녹화 포트.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::bitmap::Bitmap;
use crate::models::geometry::Size;

/// 현재 화면 크기 제공자 (회전 시 값이 바뀔 수 있음)
pub trait DisplayMetrics: Send + Sync {
    fn screen_size(&self) -> Size;
}

/// 프레임 공급자: 검출 루프가 프레임을 당겨온다 (pull 모델)
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// 가장 최근 프레임. 새 프레임이 없으면 `None`.
    async fn acquire_latest_frame(&self) -> Option<Bitmap>;
}

/// 화면 녹화기: 검출 해상도로 축소된 프레임을 공급한다.
#[async_trait]
pub trait DisplayRecorder: FrameSource {
    /// 녹화 시작
    async fn start_projection(&self, size: Size) -> Result<(), CoreError>;

    /// 녹화 해상도 변경 (검출 품질/회전 반영)
    async fn resize_display(&self, size: Size);

    /// 녹화 종료
    async fn stop_projection(&self);
}
