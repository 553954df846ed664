//! 화면 이미지 검출기 포트.
//!
//! 픽셀 매칭 알고리즘은 외부(네이티브) 구현에 위임한다.
//! 한 인스턴스는 한 검출 세션 동안만 사용되며 세션 종료 시 `close`된다.

use async_trait::async_trait;

use crate::models::bitmap::Bitmap;
use crate::models::geometry::Rect;
use crate::models::result::DetectionResult;

/// 화면 이미지 검출기
#[async_trait]
pub trait ScreenDetector: Send {
    /// 현재 프레임 설정 (검출 공간 해상도)
    async fn set_screen_frame(&mut self, frame: &Bitmap);

    /// 조건 비트맵 검출.
    ///
    /// - `area`: `Some`이면 해당 영역 내에서만, `None`이면 프레임 전체에서 검출
    /// - `threshold`: 매칭 허용 오차
    async fn detect_condition(
        &mut self,
        condition: &Bitmap,
        area: Option<&Rect>,
        threshold: u32,
    ) -> DetectionResult;

    /// 현재 프레임 해제
    async fn release_screen_frame(&mut self);

    /// 검출기 리소스 해제
    async fn close(&mut self);
}

/// 검출기 생성기.
///
/// 네이티브 매처를 사용할 수 없으면 `None`을 반환한다 (재시도 불가 설정 에러).
pub trait ScreenDetectorFactory: Send + Sync {
    fn create(&self) -> Option<Box<dyn ScreenDetector>>;
}
