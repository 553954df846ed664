//! 처리 리스너: tracing 로그 출력 + 세션 통계.

use std::sync::atomic::{AtomicU64, Ordering};

use autotap_core::models::condition::ImageCondition;
use autotap_core::models::event::{ImageEvent, TriggerEvent};
use autotap_core::models::result::{ConditionResult, EventProcessingOutcome};
use autotap_core::models::scenario::Scenario;
use autotap_core::ports::processing_listener::ScenarioProcessingListener;
use tracing::{debug, info, trace};

/// 세션 통계 스냅샷
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// 처리한 이미지 패스 수 (취소 포함)
    pub image_passes: u64,
    pub image_events_fulfilled: u64,
    pub trigger_events_fulfilled: u64,
    pub cancelled_passes: u64,
}

/// 로그 출력 리스너
#[derive(Debug, Default)]
pub struct LoggingListener {
    image_passes: AtomicU64,
    image_events_fulfilled: AtomicU64,
    trigger_events_fulfilled: AtomicU64,
    cancelled_passes: AtomicU64,
}

impl LoggingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            image_passes: self.image_passes.load(Ordering::Relaxed),
            image_events_fulfilled: self.image_events_fulfilled.load(Ordering::Relaxed),
            trigger_events_fulfilled: self.trigger_events_fulfilled.load(Ordering::Relaxed),
            cancelled_passes: self.cancelled_passes.load(Ordering::Relaxed),
        }
    }
}

fn outcome_label(outcome: &EventProcessingOutcome) -> &'static str {
    match outcome {
        EventProcessingOutcome::NotProcessed => "not_processed",
        EventProcessingOutcome::Processed(r) if r.fulfilled => "fulfilled",
        EventProcessingOutcome::Processed(_) => "not_fulfilled",
    }
}

impl ScenarioProcessingListener for LoggingListener {
    fn on_session_started(
        &self,
        scenario: &Scenario,
        image_events: &[ImageEvent],
        trigger_events: &[TriggerEvent],
    ) {
        info!(
            scenario = %scenario.name,
            id = %scenario.id,
            image_events = image_events.len(),
            trigger_events = trigger_events.len(),
            "시나리오 세션 시작"
        );
    }

    fn on_trigger_event_processing_completed(
        &self,
        event: &TriggerEvent,
        outcome: &EventProcessingOutcome,
    ) {
        if outcome.is_fulfilled() {
            self.trigger_events_fulfilled.fetch_add(1, Ordering::Relaxed);
            info!(event = %event.name, "트리거 이벤트 충족");
        } else {
            trace!(event = %event.name, outcome = outcome_label(outcome), "트리거 이벤트 처리");
        }
    }

    fn on_image_events_processing_started(&self) {
        self.image_passes.fetch_add(1, Ordering::Relaxed);
    }

    fn on_image_condition_processing_started(&self, condition: &ImageCondition) {
        trace!(condition = %condition.name, "이미지 조건 평가");
    }

    fn on_image_condition_processing_completed(&self, result: &ConditionResult) {
        trace!(
            condition = %result.condition_id,
            state = ?result.state,
            confidence = result.detection.map(|d| d.confidence_rate),
            "이미지 조건 결과"
        );
    }

    fn on_image_event_processing_completed(
        &self,
        event: &ImageEvent,
        outcome: &EventProcessingOutcome,
    ) {
        if outcome.is_fulfilled() {
            self.image_events_fulfilled.fetch_add(1, Ordering::Relaxed);
            info!(event = %event.name, "이미지 이벤트 충족");
        } else {
            trace!(event = %event.name, outcome = outcome_label(outcome), "이미지 이벤트 처리");
        }
    }

    fn on_image_event_processing_cancelled(&self) {
        self.cancelled_passes.fetch_add(1, Ordering::Relaxed);
        debug!("이미지 패스 취소");
    }

    fn on_counter_value_changed(&self, counter_name: &str, previous: i32, value: i32) {
        info!(counter = counter_name, previous, value, "카운터 변경");
    }

    fn on_session_ended(&self) {
        let stats = self.stats();
        info!(
            image_passes = stats.image_passes,
            image_events = stats.image_events_fulfilled,
            trigger_events = stats.trigger_events_fulfilled,
            cancelled = stats.cancelled_passes,
            "시나리오 세션 종료"
        );
    }
}
