//! 조건 검증기.
//!
//! 이미지 조건은 화면 검출기로, 트리거 조건은 처리 상태(카운터/타이머)로 평가하고
//! 이벤트 연산자(AND/OR)로 결합한다.
//!
//! AND는 첫 미충족에서, OR는 첫 충족에서 단락된다. 나머지 조건은 `Skipped`로
//! 결과에 포함되며 이미지 조건은 리스너에도 보고된다 (검출기는 호출하지 않음).

use autotap_core::models::condition::{DetectionType, ImageCondition, TriggerCondition};
use autotap_core::models::event::ConditionOperator;
use autotap_core::models::result::{
    ConditionResult, ConditionState, ConditionsResults, ImageDetection,
};
use autotap_core::ports::bitmap_supplier::BitmapSupplier;
use autotap_core::ports::processing_listener::ScenarioProcessingListener;
use autotap_core::ports::screen_detector::ScreenDetector;
use autotap_vision::scaling_manager::ScalingManager;
use tokio::time::Instant;
use tracing::{trace, warn};

use crate::cancel::CancelSignal;
use crate::state::ProcessingState;

/// 조건 평가 도중 취소됨
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// 단락 평가 누적기
struct Combiner {
    operator: ConditionOperator,
    decided: Option<bool>,
}

impl Combiner {
    fn new(operator: ConditionOperator) -> Self {
        Self {
            operator,
            decided: None,
        }
    }

    fn is_decided(&self) -> bool {
        self.decided.is_some()
    }

    fn push(&mut self, fulfilled: bool) {
        match self.operator {
            ConditionOperator::And if !fulfilled => self.decided = Some(false),
            ConditionOperator::Or if fulfilled => self.decided = Some(true),
            _ => {}
        }
    }

    /// 모두 평가된 경우 AND = 전부 충족, OR = 충족 없음
    fn finish(self) -> bool {
        self.decided
            .unwrap_or(self.operator == ConditionOperator::And)
    }
}

/// 이미지 조건 검증기 (프레임 패스 동안만 빌림)
pub struct ConditionsVerifier<'a> {
    detector: &'a mut dyn ScreenDetector,
    scaling: &'a ScalingManager,
    bitmaps: &'a dyn BitmapSupplier,
    listener: &'a dyn ScenarioProcessingListener,
    cancel: &'a CancelSignal,
}

impl<'a> ConditionsVerifier<'a> {
    pub fn new(
        detector: &'a mut dyn ScreenDetector,
        scaling: &'a ScalingManager,
        bitmaps: &'a dyn BitmapSupplier,
        listener: &'a dyn ScenarioProcessingListener,
        cancel: &'a CancelSignal,
    ) -> Self {
        Self {
            detector,
            scaling,
            bitmaps,
            listener,
            cancel,
        }
    }

    /// 이미지 조건 목록 평가
    pub async fn verify_image_conditions(
        &mut self,
        operator: ConditionOperator,
        conditions: &[ImageCondition],
    ) -> Result<ConditionsResults, Cancelled> {
        if conditions.is_empty() {
            return Ok(ConditionsResults::default());
        }

        let mut combiner = Combiner::new(operator);
        let mut results = Vec::with_capacity(conditions.len());

        for condition in conditions {
            self.listener.on_image_condition_processing_started(condition);

            let result = if combiner.is_decided() {
                skipped(condition)
            } else {
                if self.cancel.is_cancelled() {
                    return Err(Cancelled);
                }
                let result = self.verify_image_condition(condition).await;
                combiner.push(result.is_fulfilled());
                result
            };

            self.listener.on_image_condition_processing_completed(&result);
            results.push(result);
        }

        Ok(ConditionsResults {
            fulfilled: combiner.finish(),
            results,
        })
    }

    async fn verify_image_condition(&mut self, condition: &ImageCondition) -> ConditionResult {
        let Some(info) = self.scaling.get_image_condition_scaling_info(condition) else {
            warn!(condition = %condition.id, "스케일링 정보 없음, 미검출 처리");
            return invalid(condition);
        };

        let image_size = info.image_area.size();
        let Some(bitmap) = self
            .bitmaps
            .get_condition_bitmap(&condition.path, image_size.width, image_size.height)
            .await
        else {
            warn!(condition = %condition.id, path = %condition.path, "조건 비트맵 없음, 미검출 처리");
            return invalid(condition);
        };

        let area = match condition.detection_type {
            DetectionType::WholeScreen => None,
            _ => Some(&info.detection_area),
        };
        let detection = self
            .detector
            .detect_condition(&bitmap, area, condition.threshold)
            .await;

        let fulfilled = detection.is_detected == condition.should_be_detected;
        trace!(
            condition = %condition.id,
            detected = detection.is_detected,
            confidence = detection.confidence_rate,
            fulfilled,
            "이미지 조건 평가"
        );

        ConditionResult {
            condition_id: condition.id,
            state: fulfilled_state(fulfilled),
            detection: Some(ImageDetection {
                detected: detection.is_detected,
                position: detection
                    .is_detected
                    .then(|| self.scaling.scale_up_detection_result(detection.position)),
                confidence_rate: detection.confidence_rate,
            }),
        }
    }
}

/// 트리거 조건 목록 평가 (타이머 도달 시 재시작/비활성화 부수효과 있음)
pub fn verify_trigger_conditions(
    operator: ConditionOperator,
    conditions: &[TriggerCondition],
    state: &mut ProcessingState,
    now: Instant,
) -> ConditionsResults {
    if conditions.is_empty() {
        return ConditionsResults::default();
    }

    let mut combiner = Combiner::new(operator);
    let results = conditions
        .iter()
        .map(|condition| {
            let state_value = if combiner.is_decided() {
                ConditionState::Skipped
            } else {
                let fulfilled = verify_trigger_condition(condition, state, now);
                combiner.push(fulfilled);
                fulfilled_state(fulfilled)
            };
            ConditionResult {
                condition_id: condition.id(),
                state: state_value,
                detection: None,
            }
        })
        .collect();

    ConditionsResults {
        fulfilled: combiner.finish(),
        results,
    }
}

fn verify_trigger_condition(
    condition: &TriggerCondition,
    state: &mut ProcessingState,
    now: Instant,
) -> bool {
    match condition {
        TriggerCondition::CounterReached {
            counter_name,
            comparison,
            value,
            ..
        } => state.counters().compare(counter_name, *comparison, value),
        TriggerCondition::TimerReached {
            id,
            duration_ms,
            restart_when_reached,
            ..
        } => state
            .timers_mut()
            .check(*id, *duration_ms, *restart_when_reached, now),
    }
}

fn fulfilled_state(fulfilled: bool) -> ConditionState {
    if fulfilled {
        ConditionState::Fulfilled
    } else {
        ConditionState::NotFulfilled
    }
}

fn invalid(condition: &ImageCondition) -> ConditionResult {
    ConditionResult {
        condition_id: condition.id,
        state: ConditionState::NotFulfilled,
        detection: Some(ImageDetection {
            detected: false,
            position: None,
            confidence_rate: 0.0,
        }),
    }
}

fn skipped(condition: &ImageCondition) -> ConditionResult {
    ConditionResult {
        condition_id: condition.id,
        state: ConditionState::Skipped,
        detection: None,
    }
}
