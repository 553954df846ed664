//! 액션 실행기 어댑터.
//!
//! `NoOpActionExecutor` (드라이런/테스트)와 `EnigoActionExecutor` (실제 입력, `enigo` feature)를 제공한다.

use std::sync::Arc;

use async_trait::async_trait;
use autotap_core::config::InputBackend;
use autotap_core::error::CoreError;
use autotap_core::ports::action_executor::{
    ActionExecutor, Gesture, IntentRequest, NotificationRequest,
};
use tracing::{debug, info};

// ============================================================
// NoOpActionExecutor: 드라이런/테스트용
// ============================================================

/// No-Op 액션 실행기: 모든 액션을 로깅만 하고 실행하지 않음
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpActionExecutor;

#[async_trait]
impl ActionExecutor for NoOpActionExecutor {
    async fn execute_gesture(&self, gesture: &Gesture) -> Result<(), CoreError> {
        debug!(path = ?gesture.path, duration_ms = gesture.duration_ms, "[NoOp] 제스처");
        Ok(())
    }

    async fn execute_intent(&self, intent: &IntentRequest) -> Result<(), CoreError> {
        debug!(
            action = %intent.action,
            component = ?intent.component_name,
            broadcast = intent.is_broadcast,
            "[NoOp] 인텐트"
        );
        Ok(())
    }

    async fn execute_notification(
        &self,
        notification: &NotificationRequest,
    ) -> Result<(), CoreError> {
        info!(
            title = %notification.title,
            message = %notification.message,
            "[NoOp] 알림"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

// ============================================================
// EnigoActionExecutor: 실제 마우스 입력
// ============================================================

/// 스와이프 보간 단계 간격
#[cfg(feature = "enigo")]
const SWIPE_STEP_MS: u64 = 10;

/// 실제 마우스 입력 실행기 (enigo 기반)
///
/// macOS: Accessibility 권한 필요
/// Linux: X11 또는 Wayland + uinput 권한 필요
#[cfg(feature = "enigo")]
pub struct EnigoActionExecutor {
    /// enigo 인스턴스 (Send지만 !Sync → tokio::sync::Mutex 사용)
    enigo: tokio::sync::Mutex<enigo::Enigo>,
}

#[cfg(feature = "enigo")]
impl EnigoActionExecutor {
    pub fn new() -> Result<Self, CoreError> {
        let settings = enigo::Settings::default();
        let enigo = enigo::Enigo::new(&settings)
            .map_err(|e| CoreError::Internal(format!("입력 실행기 초기화 실패: {e}")))?;
        Ok(Self {
            enigo: tokio::sync::Mutex::new(enigo),
        })
    }
}

#[cfg(feature = "enigo")]
fn input_error(context: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::ActionExecution(format!("{context}: {e}"))
}

#[cfg(feature = "enigo")]
#[async_trait]
impl ActionExecutor for EnigoActionExecutor {
    async fn execute_gesture(&self, gesture: &Gesture) -> Result<(), CoreError> {
        use enigo::{Button, Coordinate, Direction, Mouse};
        use std::time::Duration;

        let Some(start) = gesture.path.first().copied() else {
            return Ok(());
        };
        debug!(path = ?gesture.path, duration_ms = gesture.duration_ms, "[Enigo] 제스처");

        let mut enigo = self.enigo.lock().await;
        enigo
            .move_mouse(start.x, start.y, Coordinate::Abs)
            .map_err(|e| input_error("마우스 이동 실패", e))?;
        enigo
            .button(Button::Left, Direction::Press)
            .map_err(|e| input_error("마우스 누름 실패", e))?;

        match gesture.path.get(1).copied() {
            None => {
                tokio::time::sleep(Duration::from_millis(gesture.duration_ms)).await;
            }
            Some(end) => {
                let steps = (gesture.duration_ms / SWIPE_STEP_MS).max(1);
                for step in 1..=steps {
                    let t = step as f64 / steps as f64;
                    let x = start.x + ((end.x - start.x) as f64 * t).round() as i32;
                    let y = start.y + ((end.y - start.y) as f64 * t).round() as i32;
                    tokio::time::sleep(Duration::from_millis(SWIPE_STEP_MS)).await;
                    enigo
                        .move_mouse(x, y, Coordinate::Abs)
                        .map_err(|e| input_error("마우스 이동 실패", e))?;
                }
            }
        }

        enigo
            .button(Button::Left, Direction::Release)
            .map_err(|e| input_error("마우스 놓음 실패", e))?;
        Ok(())
    }

    async fn execute_intent(&self, intent: &IntentRequest) -> Result<(), CoreError> {
        Err(CoreError::ActionExecution(format!(
            "인텐트 미지원 환경: {}",
            intent.action
        )))
    }

    async fn execute_notification(
        &self,
        notification: &NotificationRequest,
    ) -> Result<(), CoreError> {
        info!(title = %notification.title, message = %notification.message, "알림");
        Ok(())
    }

    fn name(&self) -> &str {
        "enigo"
    }
}

/// 설정된 입력 백엔드로 실행기 생성
pub fn create_action_executor(backend: InputBackend) -> Result<Arc<dyn ActionExecutor>, CoreError> {
    match backend {
        InputBackend::Noop => Ok(Arc::new(NoOpActionExecutor)),
        #[cfg(feature = "enigo")]
        InputBackend::Enigo => Ok(Arc::new(EnigoActionExecutor::new()?)),
        #[cfg(not(feature = "enigo"))]
        InputBackend::Enigo => Err(CoreError::Config(
            "enigo 입력 백엔드는 `enigo` feature로 빌드해야 사용 가능".to_string(),
        )),
    }
}
