//! 기본 검출기 어댑터.
//!
//! 네이티브 매처가 연결되지 않은 환경(드라이런, 테스트)에서 사용한다.

use async_trait::async_trait;
use autotap_core::models::bitmap::Bitmap;
use autotap_core::models::geometry::Rect;
use autotap_core::models::result::DetectionResult;
use autotap_core::ports::screen_detector::{ScreenDetector, ScreenDetectorFactory};
use tracing::trace;

/// 아무것도 검출하지 않는 검출기
#[derive(Debug, Default)]
pub struct NoOpScreenDetector {
    frame_set: bool,
}

#[async_trait]
impl ScreenDetector for NoOpScreenDetector {
    async fn set_screen_frame(&mut self, frame: &Bitmap) {
        trace!(width = frame.width(), height = frame.height(), "프레임 설정 (no-op)");
        self.frame_set = true;
    }

    async fn detect_condition(
        &mut self,
        _condition: &Bitmap,
        _area: Option<&Rect>,
        _threshold: u32,
    ) -> DetectionResult {
        DetectionResult::not_detected()
    }

    async fn release_screen_frame(&mut self) {
        self.frame_set = false;
    }

    async fn close(&mut self) {}
}

/// `NoOpScreenDetector` 생성기
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpScreenDetectorFactory;

impl ScreenDetectorFactory for NoOpScreenDetectorFactory {
    fn create(&self) -> Option<Box<dyn ScreenDetector>> {
        Some(Box::new(NoOpScreenDetector::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn never_detects() {
        let mut detector = NoOpScreenDetectorFactory.create().unwrap();
        let frame = Bitmap::filled(4, 4, [0, 0, 0, 255]);
        detector.set_screen_frame(&frame).await;
        let result = detector
            .detect_condition(&Bitmap::filled(2, 2, [0, 0, 0, 255]), None, 4)
            .await;
        assert!(!result.is_detected);
        detector.release_screen_frame().await;
        detector.close().await;
    }
}
