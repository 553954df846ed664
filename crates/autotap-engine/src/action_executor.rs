//! 이벤트 액션 실행기.
//!
//! 충족된 이벤트의 액션을 우선순위 순서로 하나씩 끝까지 실행한다.
//! 토글/카운터 변경은 처리 상태에 즉시 반영되어 같은 패스의 이후 액션과 이벤트에 보인다.
//! 실행기 포트 실패는 로그만 남기고 다음 액션으로 진행한다.

use std::sync::Arc;
use std::time::Duration;

use autotap_core::models::action::{
    Action, ActionKind, ChangeCounter, Click, ClickPosition, IntentAction, Notification,
    NotificationMessage, Swipe, ToggleEvent,
};
use autotap_core::models::event::{ConditionOperator, Event};
use autotap_core::models::geometry::Point;
use autotap_core::models::identifier::Identifier;
use autotap_core::models::result::ConditionsResults;
use autotap_core::ports::action_executor::{
    ActionExecutor, Gesture, IntentRequest, NotificationRequest,
};
use autotap_core::ports::processing_listener::ScenarioProcessingListener;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::cancel::CancelSignal;
use crate::state::ProcessingState;

/// 액티비티 시작 후 대기
const INTENT_ACTIVITY_DELAY: Duration = Duration::from_millis(1_000);
/// 브로드캐스트 후 대기
const INTENT_BROADCAST_DELAY: Duration = Duration::from_millis(100);

/// 액션 목록 실행 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionsOutcome {
    Completed,
    Cancelled,
}

// ============================================================
// Randomizer
// ============================================================

/// 위치/시간 무작위화 (시나리오 `randomize` 플래그)
#[derive(Debug)]
pub struct Randomizer {
    rng: StdRng,
    offset_px: i32,
    duration_ms: u64,
}

impl Randomizer {
    pub fn new(offset_px: i32, duration_ms: u64) -> Self {
        Self::with_rng(StdRng::from_entropy(), offset_px, duration_ms)
    }

    /// 재현 가능한 무작위화 (테스트)
    pub fn seeded(seed: u64, offset_px: i32, duration_ms: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), offset_px, duration_ms)
    }

    fn with_rng(rng: StdRng, offset_px: i32, duration_ms: u64) -> Self {
        Self {
            rng,
            offset_px: offset_px.max(0),
            duration_ms,
        }
    }

    pub fn point(&mut self, point: Point) -> Point {
        if self.offset_px == 0 {
            return point;
        }
        let range = -self.offset_px..=self.offset_px;
        Point::new(
            point.x.saturating_add(self.rng.gen_range(range.clone())),
            point.y.saturating_add(self.rng.gen_range(range)),
        )
    }

    /// 무작위 시간 (최소 1ms)
    pub fn duration(&mut self, duration_ms: u64) -> u64 {
        if self.duration_ms == 0 {
            return duration_ms.max(1);
        }
        let delta = self.rng.gen_range(0..=self.duration_ms.saturating_mul(2));
        duration_ms
            .saturating_add(delta)
            .saturating_sub(self.duration_ms)
            .max(1)
    }
}

// ============================================================
// EventActionExecutor
// ============================================================

/// 이벤트 액션 실행기
pub struct EventActionExecutor {
    executor: Arc<dyn ActionExecutor>,
    randomizer: Option<Randomizer>,
}

impl EventActionExecutor {
    pub fn new(executor: Arc<dyn ActionExecutor>, randomizer: Option<Randomizer>) -> Self {
        Self {
            executor,
            randomizer,
        }
    }

    /// 이벤트 액션 전체 실행.
    ///
    /// `image_results`는 이미지 이벤트의 조건 결과 (검출 위치 클릭용).
    pub async fn execute_actions<E: Event>(
        &mut self,
        event: &E,
        image_results: Option<&ConditionsResults>,
        state: &mut ProcessingState,
        listener: &dyn ScenarioProcessingListener,
        cancel: &CancelSignal,
    ) -> ActionsOutcome {
        for action in event.actions() {
            if cancel.is_cancelled() {
                return ActionsOutcome::Cancelled;
            }

            debug!(
                event = %event.id(),
                action = %action.id,
                kind = action.kind.type_name(),
                "액션 실행"
            );

            let outcome = match &action.kind {
                ActionKind::Click(click) => {
                    self.click(event, action, click, image_results).await;
                    ActionsOutcome::Completed
                }
                ActionKind::Swipe(swipe) => {
                    self.swipe(swipe).await;
                    ActionsOutcome::Completed
                }
                ActionKind::Pause(pause) => wait(pause.duration_ms, cancel).await,
                ActionKind::Intent(intent) => self.intent(intent, cancel).await,
                ActionKind::ToggleEvent(toggle) => {
                    apply_toggle(event, toggle, state);
                    ActionsOutcome::Completed
                }
                ActionKind::ChangeCounter(change) => {
                    change_counter(change, state, listener);
                    ActionsOutcome::Completed
                }
                ActionKind::Notification(notification) => {
                    self.notify(action, notification, state).await;
                    ActionsOutcome::Completed
                }
            };

            if outcome == ActionsOutcome::Cancelled {
                return outcome;
            }
        }

        ActionsOutcome::Completed
    }

    async fn click<E: Event>(
        &mut self,
        event: &E,
        action: &Action,
        click: &Click,
        image_results: Option<&ConditionsResults>,
    ) {
        let position = match &click.position {
            ClickPosition::UserSelected(point) => Some(*point),
            ClickPosition::OnDetectedCondition {
                condition_id,
                offset,
            } => detected_position(event.operator(), *condition_id, image_results)
                .map(|point| point.offset(*offset)),
        };
        let Some(position) = position else {
            warn!(action = %action.id, "클릭 위치를 결정할 수 없음, 건너뜀");
            return;
        };

        let (position, duration) = match self.randomizer.as_mut() {
            Some(randomizer) => (
                randomizer.point(position),
                randomizer.duration(click.press_duration_ms),
            ),
            None => (position, click.press_duration_ms),
        };

        let gesture = Gesture::tap(position, duration);
        if let Err(e) = self.executor.execute_gesture(&gesture).await {
            warn!(action = %action.id, executor = self.executor.name(), "클릭 실패: {e}");
        }
    }

    async fn swipe(&mut self, swipe: &Swipe) {
        let gesture = match self.randomizer.as_mut() {
            Some(randomizer) => Gesture::line(
                randomizer.point(swipe.from),
                randomizer.point(swipe.to),
                randomizer.duration(swipe.duration_ms),
            ),
            None => Gesture::line(swipe.from, swipe.to, swipe.duration_ms),
        };
        if let Err(e) = self.executor.execute_gesture(&gesture).await {
            warn!(executor = self.executor.name(), "스와이프 실패: {e}");
        }
    }

    async fn intent(&self, intent: &IntentAction, cancel: &CancelSignal) -> ActionsOutcome {
        let request = IntentRequest {
            action: intent.action.clone(),
            component_name: intent.component_name.clone(),
            flags: intent.flags,
            extras: intent.extras.clone(),
            is_broadcast: intent.is_broadcast,
        };
        if let Err(e) = self.executor.execute_intent(&request).await {
            warn!(intent = %intent.action, "인텐트 실행 실패: {e}");
        }

        let delay = if intent.is_broadcast {
            INTENT_BROADCAST_DELAY
        } else {
            INTENT_ACTIVITY_DELAY
        };
        wait(delay.as_millis() as u64, cancel).await
    }

    async fn notify(&self, action: &Action, notification: &Notification, state: &ProcessingState) {
        let message = match &notification.message {
            NotificationMessage::Text(text) => text.clone(),
            NotificationMessage::CounterValue(name) => {
                format!("{name} = {}", state.counters().get(name))
            }
        };
        let request = NotificationRequest {
            action_id: action.id,
            event_id: action.event_id,
            title: notification.title.clone(),
            message,
        };
        if let Err(e) = self.executor.execute_notification(&request).await {
            warn!(action = %action.id, "알림 실패: {e}");
        }
    }
}

/// 검출 위치 결정: OR는 처음 검출된 조건, 그 외에는 지정 조건
fn detected_position(
    operator: ConditionOperator,
    condition_id: Option<Identifier>,
    image_results: Option<&ConditionsResults>,
) -> Option<Point> {
    let results = image_results?;
    let result = match (operator, condition_id) {
        (ConditionOperator::Or, _) | (_, None) => results.first_detected()?,
        (ConditionOperator::And, Some(id)) => results.get(id)?,
    };
    result.detection.and_then(|detection| detection.position)
}

fn apply_toggle<E: Event>(event: &E, toggle: &ToggleEvent, state: &mut ProcessingState) {
    if toggle.toggle_all {
        match toggle.toggle_all_type {
            Some(toggle_type) => state.apply_toggle_all(event.id(), toggle_type),
            None => warn!(event = %event.id(), "전체 토글 타입 없음"),
        }
        return;
    }

    for entry in &toggle.event_toggles {
        match state.apply_toggle(entry.target_event_id, entry.toggle_type) {
            Some(enabled) => debug!(target_event = %entry.target_event_id, enabled, "이벤트 토글"),
            None => debug!(target_event = %entry.target_event_id, "토글 대상 없음"),
        }
    }
}

fn change_counter(
    change: &ChangeCounter,
    state: &mut ProcessingState,
    listener: &dyn ScenarioProcessingListener,
) {
    let (previous, value) =
        state
            .counters_mut()
            .apply(&change.counter_name, change.operation, &change.value);
    debug!(counter = %change.counter_name, previous, value, "카운터 변경");
    listener.on_counter_value_changed(&change.counter_name, previous, value);
}

/// 취소 가능한 대기
async fn wait(duration_ms: u64, cancel: &CancelSignal) -> ActionsOutcome {
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_millis(duration_ms)) => ActionsOutcome::Completed,
        _ = cancel.cancelled() => ActionsOutcome::Cancelled,
    }
}
