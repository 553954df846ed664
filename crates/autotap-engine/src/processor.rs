//! 시나리오 프로세서: 프레임 한 장에 대한 전체 처리 패스.
//!
//! 1. 모든 이벤트가 비활성이면 정지 요청
//! 2. 트리거 패스: 우선순위 순, 실시간 활성 플래그 확인 → 조건 평가 → 충족 시 액션 실행
//! 3. 이미지 패스: 검출기에 프레임 설정 → 이미지 이벤트 순회 → 충족 + `keep_detecting == false`면 중단
//!
//! 액션의 토글/카운터 변경은 스냅샷 없이 같은 패스의 이후 이벤트에 즉시 반영된다.

use std::sync::Arc;

use autotap_core::models::bitmap::Bitmap;
use autotap_core::models::event::{ImageEvent, TriggerEvent};
use autotap_core::models::result::{ConditionsResults, EventProcessingOutcome};
use autotap_core::models::scenario::{Scenario, ScenarioBundle};
use autotap_core::ports::action_executor::ActionExecutor;
use autotap_core::ports::bitmap_supplier::BitmapSupplier;
use autotap_core::ports::processing_listener::ScenarioProcessingListener;
use autotap_core::ports::screen_detector::ScreenDetector;
use autotap_vision::scaling_manager::ScalingManager;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::action_executor::{ActionsOutcome, EventActionExecutor, Randomizer};
use crate::cancel::CancelSignal;
use crate::state::ProcessingState;
use crate::verifier::{verify_trigger_conditions, ConditionsVerifier};

/// 프레임 패스 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Completed,
    /// 취소됨 (부분 결과는 완료로 보고되지 않음)
    Cancelled,
    /// 모든 이벤트 비활성: 검출 정지 필요
    StopRequested,
}

/// 시나리오 프로세서 (프레임 레인이 소유)
pub struct ScenarioProcessor {
    scenario: Scenario,
    image_events: Vec<ImageEvent>,
    trigger_events: Vec<TriggerEvent>,
    state: ProcessingState,
    detector: Box<dyn ScreenDetector>,
    bitmaps: Arc<dyn BitmapSupplier>,
    listener: Arc<dyn ScenarioProcessingListener>,
    actions: EventActionExecutor,
}

impl ScenarioProcessor {
    /// 새 프로세서. 이벤트 우선순위는 여기서 정규화된다.
    pub fn new(
        bundle: ScenarioBundle,
        detector: Box<dyn ScreenDetector>,
        bitmaps: Arc<dyn BitmapSupplier>,
        executor: Arc<dyn ActionExecutor>,
        listener: Arc<dyn ScenarioProcessingListener>,
        randomizer: Option<Randomizer>,
    ) -> Self {
        let ScenarioBundle {
            scenario,
            image_events,
            trigger_events,
        } = bundle.normalized();
        let state = ProcessingState::new(&image_events, &trigger_events);
        let randomizer = if scenario.randomize { randomizer } else { None };

        Self {
            scenario,
            image_events,
            trigger_events,
            state,
            detector,
            bitmaps,
            listener,
            actions: EventActionExecutor::new(executor, randomizer),
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn image_events(&self) -> &[ImageEvent] {
        &self.image_events
    }

    pub fn state(&self) -> &ProcessingState {
        &self.state
    }

    /// 세션 시작: 처리 상태 초기화 + `on_session_started`
    pub fn on_scenario_start(&mut self) {
        self.state
            .on_processing_started(&self.trigger_events, Instant::now());
        self.listener.on_session_started(
            &self.scenario,
            &self.image_events,
            &self.trigger_events,
        );
        info!(
            scenario = %self.scenario.id,
            image_events = self.image_events.len(),
            trigger_events = self.trigger_events.len(),
            "시나리오 처리 시작"
        );
    }

    /// 세션 종료: 처리 상태 비우기 + `on_session_ended`
    pub fn on_scenario_end(&mut self) {
        self.state.on_processing_stopped();
        self.listener.on_session_ended();
        info!(scenario = %self.scenario.id, "시나리오 처리 종료");
    }

    /// 검출기 해제 (세션 종료 시 한 번)
    pub async fn close_detector(&mut self) {
        self.detector.close().await;
    }

    /// 프레임 한 장 처리
    pub async fn process(
        &mut self,
        frame: &Bitmap,
        scaling: &ScalingManager,
        cancel: &CancelSignal,
    ) -> PassOutcome {
        let Self {
            image_events,
            trigger_events,
            state,
            detector,
            bitmaps,
            listener,
            actions,
            ..
        } = self;
        let listener: &dyn ScenarioProcessingListener = &**listener;

        if state.are_all_events_disabled() {
            info!("모든 이벤트 비활성, 정지 요청");
            return PassOutcome::StopRequested;
        }

        // ============================================================
        // 트리거 패스
        // ============================================================

        listener.on_trigger_events_processing_started();
        let now = Instant::now();
        for event in trigger_events.iter() {
            if cancel.is_cancelled() {
                return PassOutcome::Cancelled;
            }
            listener.on_trigger_event_processing_started(event);

            let outcome = if state.is_event_enabled(event.id) {
                EventProcessingOutcome::Processed(verify_trigger_conditions(
                    event.operator,
                    &event.conditions,
                    state,
                    now,
                ))
            } else {
                EventProcessingOutcome::NotProcessed
            };

            if outcome.is_fulfilled() {
                debug!(event = %event.id, "트리거 이벤트 충족");
                if actions
                    .execute_actions(event, None, state, listener, cancel)
                    .await
                    == ActionsOutcome::Cancelled
                {
                    return PassOutcome::Cancelled;
                }
            }
            listener.on_trigger_event_processing_completed(event, &outcome);
        }
        listener.on_trigger_events_processing_completed();

        // ============================================================
        // 이미지 패스
        // ============================================================

        listener.on_image_events_processing_started();
        let outcome = if state.are_all_image_events_disabled() {
            for event in image_events.iter() {
                listener.on_image_event_processing_started(event);
                listener.on_image_event_processing_completed(
                    event,
                    &EventProcessingOutcome::NotProcessed,
                );
            }
            PassOutcome::Completed
        } else {
            detector.set_screen_frame(frame).await;
            let mut pass = ImagePass {
                detector: detector.as_mut(),
                scaling,
                bitmaps: &**bitmaps,
                listener,
                actions,
                cancel,
            };
            let outcome = pass.run(image_events, state).await;
            detector.release_screen_frame().await;
            outcome
        };

        if outcome == PassOutcome::Cancelled {
            listener.on_image_event_processing_cancelled();
            return outcome;
        }
        listener.on_image_events_processing_completed();
        PassOutcome::Completed
    }
}

/// 이미지 패스 동안 빌린 협력자 묶음
struct ImagePass<'a> {
    detector: &'a mut dyn ScreenDetector,
    scaling: &'a ScalingManager,
    bitmaps: &'a dyn BitmapSupplier,
    listener: &'a dyn ScenarioProcessingListener,
    actions: &'a mut EventActionExecutor,
    cancel: &'a CancelSignal,
}

impl ImagePass<'_> {
    async fn run(
        &mut self,
        image_events: &[ImageEvent],
        state: &mut ProcessingState,
    ) -> PassOutcome {
        for event in image_events {
            if self.cancel.is_cancelled() {
                return PassOutcome::Cancelled;
            }
            self.listener.on_image_event_processing_started(event);

            if !state.is_event_enabled(event.id) {
                self.listener.on_image_event_processing_completed(
                    event,
                    &EventProcessingOutcome::NotProcessed,
                );
                continue;
            }

            let results = if event.conditions.is_empty() {
                ConditionsResults::default()
            } else {
                let mut verifier = ConditionsVerifier::new(
                    &mut *self.detector,
                    self.scaling,
                    self.bitmaps,
                    self.listener,
                    self.cancel,
                );
                match verifier
                    .verify_image_conditions(event.operator, &event.conditions)
                    .await
                {
                    Ok(results) => results,
                    Err(_) => return PassOutcome::Cancelled,
                }
            };

            let fulfilled = results.fulfilled;
            if fulfilled {
                debug!(event = %event.id, "이미지 이벤트 충족");
                if self
                    .actions
                    .execute_actions(event, Some(&results), state, self.listener, self.cancel)
                    .await
                    == ActionsOutcome::Cancelled
                {
                    return PassOutcome::Cancelled;
                }
            }
            self.listener.on_image_event_processing_completed(
                event,
                &EventProcessingOutcome::Processed(results),
            );

            if fulfilled && !event.keep_detecting {
                break;
            }
        }
        PassOutcome::Completed
    }
}
