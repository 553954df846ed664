//! 통합 테스트 공용 mock 어댑터와 시나리오 빌더.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use autotap_core::error::CoreError;
use autotap_core::models::action::{Action, ActionKind};
use autotap_core::models::bitmap::Bitmap;
use autotap_core::models::condition::{DetectionType, ImageCondition, TriggerCondition};
use autotap_core::models::event::{ConditionOperator, ImageEvent, TriggerEvent};
use autotap_core::models::geometry::{Point, Rect, Size};
use autotap_core::models::identifier::Identifier;
use autotap_core::models::result::{
    ConditionResult, ConditionState, DetectionResult, EventProcessingOutcome,
};
use autotap_core::models::scenario::{Scenario, ScenarioBundle};
use autotap_core::ports::action_executor::{
    ActionExecutor, Gesture, IntentRequest, NotificationRequest,
};
use autotap_core::ports::bitmap_supplier::BitmapSupplier;
use autotap_core::ports::display::{DisplayMetrics, DisplayRecorder, FrameSource};
use autotap_core::ports::processing_listener::ScenarioProcessingListener;
use autotap_core::ports::screen_detector::{ScreenDetector, ScreenDetectorFactory};
use autotap_engine::frame_slot::LatestFrameSlot;
use parking_lot::Mutex;

pub const SCREEN: Size = Size::new(1000, 500);
/// 검출 위치 (검출 공간 = 실제 좌표, 비율 1.0)
pub const DETECTED_AT: Point = Point::new(40, 30);

// ============================================================
// 디스플레이 / 녹화기
// ============================================================

pub struct MockDisplay {
    pub size: Mutex<Size>,
}

impl MockDisplay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            size: Mutex::new(SCREEN),
        })
    }
}

impl DisplayMetrics for MockDisplay {
    fn screen_size(&self) -> Size {
        *self.size.lock()
    }
}

#[derive(Default)]
pub struct MockRecorder {
    pub frames: LatestFrameSlot,
    pub started: Mutex<Option<Size>>,
    pub resizes: Mutex<Vec<Size>>,
    pub stopped: AtomicBool,
}

#[async_trait]
impl FrameSource for MockRecorder {
    async fn acquire_latest_frame(&self) -> Option<Bitmap> {
        self.frames.acquire_latest_frame().await
    }
}

#[async_trait]
impl DisplayRecorder for MockRecorder {
    async fn start_projection(&self, size: Size) -> Result<(), CoreError> {
        *self.started.lock() = Some(size);
        Ok(())
    }

    async fn resize_display(&self, size: Size) {
        self.resizes.lock().push(size);
    }

    async fn stop_projection(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

// ============================================================
// 검출기 / 비트맵
// ============================================================

/// 조건 비트맵 첫 픽셀 값이 `visible`에 있으면 검출
pub struct MockDetector {
    pub visible: Arc<Mutex<HashSet<u8>>>,
    pub closed: Arc<AtomicBool>,
    pub detections: Arc<AtomicUsize>,
}

#[async_trait]
impl ScreenDetector for MockDetector {
    async fn set_screen_frame(&mut self, _frame: &Bitmap) {}

    async fn detect_condition(
        &mut self,
        condition: &Bitmap,
        _area: Option<&Rect>,
        _threshold: u32,
    ) -> DetectionResult {
        self.detections.fetch_add(1, Ordering::SeqCst);
        let tag = condition.pixels()[0];
        if self.visible.lock().contains(&tag) {
            DetectionResult {
                is_detected: true,
                position: DETECTED_AT,
                confidence_rate: 0.95,
            }
        } else {
            DetectionResult::not_detected()
        }
    }

    async fn release_screen_frame(&mut self) {}

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[derive(Default, Clone)]
pub struct MockDetectorFactory {
    pub visible: Arc<Mutex<HashSet<u8>>>,
    pub closed: Arc<AtomicBool>,
    pub detections: Arc<AtomicUsize>,
    pub unavailable: bool,
}

impl MockDetectorFactory {
    pub fn show(&self, tag: u8) {
        self.visible.lock().insert(tag);
    }

    pub fn detector(&self) -> MockDetector {
        MockDetector {
            visible: self.visible.clone(),
            closed: self.closed.clone(),
            detections: self.detections.clone(),
        }
    }
}

impl ScreenDetectorFactory for MockDetectorFactory {
    fn create(&self) -> Option<Box<dyn ScreenDetector>> {
        if self.unavailable {
            return None;
        }
        Some(Box::new(self.detector()))
    }
}

/// 경로 문자열(숫자)을 첫 픽셀 값으로 가진 비트맵 공급
pub struct MockBitmaps;

#[async_trait]
impl BitmapSupplier for MockBitmaps {
    async fn get_condition_bitmap(&self, path: &str, width: i32, height: i32) -> Option<Bitmap> {
        let tag = path.parse::<u8>().ok()?;
        Some(Bitmap::filled(
            width.max(1) as u32,
            height.max(1) as u32,
            [tag, 0, 0, 255],
        ))
    }
}

// ============================================================
// 실행기 / 리스너
// ============================================================

#[derive(Default)]
pub struct RecordingExecutor {
    pub gestures: Mutex<Vec<Gesture>>,
    pub intents: Mutex<Vec<IntentRequest>>,
}

#[async_trait]
impl ActionExecutor for RecordingExecutor {
    async fn execute_gesture(&self, gesture: &Gesture) -> Result<(), CoreError> {
        self.gestures.lock().push(gesture.clone());
        Ok(())
    }

    async fn execute_intent(&self, intent: &IntentRequest) -> Result<(), CoreError> {
        self.intents.lock().push(intent.clone());
        Ok(())
    }

    async fn execute_notification(&self, _n: &NotificationRequest) -> Result<(), CoreError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// 리스너 호출을 문자열로 기록
#[derive(Default)]
pub struct RecordingListener {
    pub calls: Mutex<Vec<String>>,
}

impl RecordingListener {
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock())
    }

    fn push(&self, call: String) {
        self.calls.lock().push(call);
    }
}

fn outcome_tag(outcome: &EventProcessingOutcome) -> &'static str {
    match outcome {
        EventProcessingOutcome::NotProcessed => "not_processed",
        EventProcessingOutcome::Processed(results) if results.fulfilled => "fulfilled",
        EventProcessingOutcome::Processed(_) => "not_fulfilled",
    }
}

fn state_tag(result: &ConditionResult) -> &'static str {
    match result.state {
        ConditionState::Fulfilled => "fulfilled",
        ConditionState::NotFulfilled => "not_fulfilled",
        ConditionState::Skipped => "skipped",
    }
}

impl ScenarioProcessingListener for RecordingListener {
    fn on_session_started(&self, _s: &Scenario, _i: &[ImageEvent], _t: &[TriggerEvent]) {
        self.push("session_started".into());
    }

    fn on_trigger_events_processing_started(&self) {
        self.push("triggers_started".into());
    }

    fn on_trigger_event_processing_started(&self, event: &TriggerEvent) {
        self.push(format!("trigger_started {}", event.name));
    }

    fn on_trigger_event_processing_completed(
        &self,
        event: &TriggerEvent,
        outcome: &EventProcessingOutcome,
    ) {
        self.push(format!("trigger_completed {} {}", event.name, outcome_tag(outcome)));
    }

    fn on_trigger_events_processing_completed(&self) {
        self.push("triggers_completed".into());
    }

    fn on_image_events_processing_started(&self) {
        self.push("images_started".into());
    }

    fn on_image_event_processing_started(&self, event: &ImageEvent) {
        self.push(format!("image_started {}", event.name));
    }

    fn on_image_condition_processing_started(&self, condition: &ImageCondition) {
        self.push(format!("condition_started {}", condition.name));
    }

    fn on_image_condition_processing_completed(&self, result: &ConditionResult) {
        self.push(format!("condition_completed {}", state_tag(result)));
    }

    fn on_image_event_processing_completed(
        &self,
        event: &ImageEvent,
        outcome: &EventProcessingOutcome,
    ) {
        self.push(format!("image_completed {} {}", event.name, outcome_tag(outcome)));
    }

    fn on_image_event_processing_cancelled(&self) {
        self.push("image_cancelled".into());
    }

    fn on_image_events_processing_completed(&self) {
        self.push("images_completed".into());
    }

    fn on_counter_value_changed(&self, counter_name: &str, previous: i32, value: i32) {
        self.push(format!("counter {counter_name} {previous}->{value}"));
    }

    fn on_session_ended(&self) {
        self.push("session_ended".into());
    }
}

// ============================================================
// 시나리오 빌더
// ============================================================

pub fn scenario() -> Scenario {
    Scenario {
        id: Identifier::Database(1),
        name: "test".to_string(),
        detection_quality: 10_000,
        randomize: false,
    }
}

pub fn bundle(image_events: Vec<ImageEvent>, trigger_events: Vec<TriggerEvent>) -> ScenarioBundle {
    ScenarioBundle {
        scenario: scenario(),
        image_events,
        trigger_events,
    }
}

/// 비트맵 태그 `tag`를 가진 이미지 조건
pub fn image_condition(id: i64, tag: u8, should_be_detected: bool) -> ImageCondition {
    ImageCondition {
        id: Identifier::Database(id),
        event_id: Identifier::Database(0),
        name: format!("c{id}"),
        path: tag.to_string(),
        detection_type: DetectionType::Exact,
        area: Rect::new(10, 10, 30, 30),
        detection_area: None,
        threshold: 5,
        should_be_detected,
    }
}

pub fn image_event(
    id: i64,
    priority: u32,
    conditions: Vec<ImageCondition>,
    actions: Vec<Action>,
    keep_detecting: bool,
) -> ImageEvent {
    ImageEvent {
        id: Identifier::Database(id),
        scenario_id: Identifier::Database(1),
        name: format!("e{id}"),
        enabled_on_start: true,
        operator: ConditionOperator::And,
        conditions,
        actions,
        priority,
        keep_detecting,
    }
}

pub fn trigger_event(
    id: i64,
    priority: u32,
    conditions: Vec<TriggerCondition>,
    actions: Vec<Action>,
) -> TriggerEvent {
    TriggerEvent {
        id: Identifier::Database(id),
        scenario_id: Identifier::Database(1),
        name: format!("t{id}"),
        enabled_on_start: true,
        operator: ConditionOperator::And,
        conditions,
        actions,
        priority,
    }
}

pub fn action(id: i64, priority: u32, kind: ActionKind) -> Action {
    Action {
        id: Identifier::Database(id),
        event_id: Identifier::Database(0),
        name: format!("a{id}"),
        priority,
        kind,
    }
}

pub fn frame() -> Bitmap {
    Bitmap::filled(SCREEN.width as u32, SCREEN.height as u32, [0, 0, 0, 255])
}
