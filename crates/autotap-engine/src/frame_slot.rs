//! 최신 프레임 슬롯 (push → pull 어댑터).
//!
//! 캡처 측이 `push`한 프레임 중 가장 최근 것 하나만 보관한다.
//! 처리 중 들어온 프레임은 새 프레임이 오면 버려진다.

use async_trait::async_trait;
use autotap_core::models::bitmap::Bitmap;
use autotap_core::ports::display::FrameSource;
use parking_lot::Mutex;
use tracing::trace;

#[derive(Debug, Default)]
pub struct LatestFrameSlot {
    pending: Mutex<Option<Bitmap>>,
}

impl LatestFrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 프레임 보관. 대기 중인 이전 프레임이 있으면 `true` (버려짐).
    pub fn push(&self, frame: Bitmap) -> bool {
        let dropped = self.pending.lock().replace(frame).is_some();
        if dropped {
            trace!("대기 프레임 교체");
        }
        dropped
    }

    pub fn has_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    pub fn clear(&self) {
        self.pending.lock().take();
    }
}

#[async_trait]
impl FrameSource for LatestFrameSlot {
    async fn acquire_latest_frame(&self) -> Option<Bitmap> {
        self.pending.lock().take()
    }
}
