//! 시나리오 처리 진행 리스너 포트.
//!
//! 모든 메서드는 기본 no-op. 필요한 훅만 구현하면 된다.
//!
//! 프레임당 호출 순서:
//! trigger events started → 트리거 이벤트별 started → completed (우선순위 순)
//! → trigger events completed → image events started
//! → 이미지 이벤트별 (started → 조건별 started/completed → completed)
//! → image events completed. 세션 시작/종료는 세션당 한 번.

use crate::models::condition::ImageCondition;
use crate::models::event::{ImageEvent, TriggerEvent};
use crate::models::result::{ConditionResult, EventProcessingOutcome};
use crate::models::scenario::Scenario;

#[allow(unused_variables)]
pub trait ScenarioProcessingListener: Send + Sync {
    fn on_session_started(
        &self,
        scenario: &Scenario,
        image_events: &[ImageEvent],
        trigger_events: &[TriggerEvent],
    ) {
    }

    fn on_trigger_events_processing_started(&self) {}

    fn on_trigger_event_processing_started(&self, event: &TriggerEvent) {}

    fn on_trigger_event_processing_completed(
        &self,
        event: &TriggerEvent,
        outcome: &EventProcessingOutcome,
    ) {
    }

    fn on_trigger_events_processing_completed(&self) {}

    fn on_image_events_processing_started(&self) {}

    fn on_image_event_processing_started(&self, event: &ImageEvent) {}

    fn on_image_condition_processing_started(&self, condition: &ImageCondition) {}

    fn on_image_condition_processing_completed(&self, result: &ConditionResult) {}

    fn on_image_event_processing_completed(
        &self,
        event: &ImageEvent,
        outcome: &EventProcessingOutcome,
    ) {
    }

    /// 처리 중 취소 (정지, 화면 회전)
    fn on_image_event_processing_cancelled(&self) {}

    fn on_image_events_processing_completed(&self) {}

    fn on_counter_value_changed(&self, counter_name: &str, previous: i32, value: i32) {}

    fn on_session_ended(&self) {}
}
