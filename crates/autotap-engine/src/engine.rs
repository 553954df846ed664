//! 검출 엔진: 녹화/검출 세션 라이프사이클.
//!
//! 두 개의 태스크 레인으로 동작한다.
//! - 라이프사이클 레인: 상태 머신을 소유하고 `EngineCommand`를 mpsc로 받아 순서대로 처리
//! - 프레임 레인: `ScenarioProcessor`와 `ScalingManager`를 값으로 소유하고 프레임을 당겨와 처리.
//!   취소 후 join하면 둘을 돌려준다.
//!
//! 상태는 `watch` 채널로 공개된다.
//!
//! ```text
//! Created ──start_screen_record──▶ Recording ──start_detection──▶ Detecting
//!    ▲                                 │  ▲                          │
//!    └────────stop_screen_record───────┘  └──────stop_detection──────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use autotap_core::config::{DetectionConfig, ProcessingConfig};
use autotap_core::error::CoreError;
use autotap_core::models::bitmap::Bitmap;
use autotap_core::models::scenario::ScenarioBundle;
use autotap_core::ports::action_executor::ActionExecutor;
use autotap_core::ports::bitmap_supplier::BitmapSupplier;
use autotap_core::ports::display::{DisplayMetrics, DisplayRecorder};
use autotap_core::ports::processing_listener::ScenarioProcessingListener;
use autotap_core::ports::screen_detector::ScreenDetectorFactory;
use autotap_vision::scaling_manager::ScalingManager;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::action_executor::Randomizer;
use crate::cancel::{CancelHandle, CancelSignal};
use crate::error::EngineError;
use crate::processor::{PassOutcome, ScenarioProcessor};
use crate::try_element::ScenarioTry;

/// 명령 채널 용량
const COMMAND_CHANNEL_CAPACITY: usize = 16;

/// 검출 엔진 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Created,
    /// 상태 전환 중 (요청 처리 중)
    Transitioning,
    Recording,
    Detecting,
    Destroyed,
    /// 네이티브 검출기 없음. 재시작 전까지 검출 불가.
    ErrorNativeDetectorNotFound,
}

/// 검출 시작 요청
#[derive(Debug, Clone)]
pub struct DetectionRequest {
    pub bundle: ScenarioBundle,
    /// 자동 정지 시간 (`None`이면 설정값 사용)
    pub auto_stop: Option<Duration>,
    /// 요소 시험 실행 여부 (자동 정지 미적용)
    pub is_try: bool,
}

type Reply = oneshot::Sender<Result<(), EngineError>>;

/// 라이프사이클 레인 명령
enum EngineCommand {
    StartScreenRecord(Reply),
    StartDetection {
        request: Box<DetectionRequest>,
        reply: Reply,
    },
    ScreenSizeChanged(Reply),
    /// 응답 없는 정지는 프레임 레인/자동 정지 타이머가 보낸다
    StopDetection(Option<Reply>),
    StopScreenRecord(Reply),
    Shutdown(Reply),
}

/// 엔진 의존성 (포트 어댑터 + 설정)
#[derive(Clone)]
pub struct EngineDeps {
    pub display: Arc<dyn DisplayMetrics>,
    pub recorder: Arc<dyn DisplayRecorder>,
    pub detectors: Arc<dyn ScreenDetectorFactory>,
    pub bitmaps: Arc<dyn BitmapSupplier>,
    pub executor: Arc<dyn ActionExecutor>,
    pub listener: Arc<dyn ScenarioProcessingListener>,
    pub detection: DetectionConfig,
    pub processing: ProcessingConfig,
}

// ============================================================
// DetectorEngineHandle
// ============================================================

/// 엔진 핸들 (복제 가능). 마지막 핸들이 사라지면 엔진이 정리 후 종료된다.
#[derive(Clone)]
pub struct DetectorEngineHandle {
    commands: mpsc::Sender<EngineCommand>,
    state: watch::Receiver<DetectorState>,
}

impl DetectorEngineHandle {
    pub fn state(&self) -> DetectorState {
        *self.state.borrow()
    }

    /// 상태 변경 구독
    pub fn subscribe_state(&self) -> watch::Receiver<DetectorState> {
        self.state.clone()
    }

    /// 특정 상태가 될 때까지 대기
    pub async fn wait_for_state(&self, target: DetectorState) -> Result<(), EngineError> {
        let mut rx = self.state.clone();
        rx.wait_for(|state| *state == target)
            .await
            .map(|_| ())
            .map_err(|_| EngineError::ChannelClosed)
    }

    pub async fn start_screen_record(&self) -> Result<(), EngineError> {
        self.request(EngineCommand::StartScreenRecord).await
    }

    pub async fn start_detection(
        &self,
        bundle: ScenarioBundle,
        auto_stop: Option<Duration>,
    ) -> Result<(), EngineError> {
        let request = DetectionRequest {
            bundle,
            auto_stop,
            is_try: false,
        };
        self.request(|reply| EngineCommand::StartDetection {
            request: Box::new(request),
            reply,
        })
        .await
    }

    /// 요소 하나를 격리된 시나리오로 시험 실행
    pub async fn try_element(&self, element: impl ScenarioTry) -> Result<(), EngineError> {
        let request = DetectionRequest {
            bundle: element.into_bundle(),
            auto_stop: None,
            is_try: true,
        };
        self.request(|reply| EngineCommand::StartDetection {
            request: Box::new(request),
            reply,
        })
        .await
    }

    /// 화면 크기 변경 (회전) 통지
    pub async fn on_screen_size_changed(&self) -> Result<(), EngineError> {
        self.request(EngineCommand::ScreenSizeChanged).await
    }

    pub async fn stop_detection(&self) -> Result<(), EngineError> {
        self.request(|reply| EngineCommand::StopDetection(Some(reply)))
            .await
    }

    pub async fn stop_screen_record(&self) -> Result<(), EngineError> {
        self.request(EngineCommand::StopScreenRecord).await
    }

    pub async fn shutdown(&self) -> Result<(), EngineError> {
        self.request(EngineCommand::Shutdown).await
    }

    async fn request(
        &self,
        command: impl FnOnce(Reply) -> EngineCommand,
    ) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)?
    }
}

// ============================================================
// DetectorEngine
// ============================================================

/// 프레임 레인 (실행 중)
struct FrameLane {
    cancel: CancelHandle,
    handle: JoinHandle<(ScenarioProcessor, ScalingManager)>,
}

/// 검출 세션 (Detecting 상태 동안 존재)
struct DetectionSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    is_try: bool,
    lane: FrameLane,
    auto_stop: Option<JoinHandle<()>>,
}

/// 검출 엔진 (라이프사이클 레인)
pub struct DetectorEngine {
    deps: EngineDeps,
    state_tx: watch::Sender<DetectorState>,
    commands: mpsc::WeakSender<EngineCommand>,
    session: Option<DetectionSession>,
}

impl DetectorEngine {
    /// 엔진 태스크 시작
    pub fn spawn(deps: EngineDeps) -> (DetectorEngineHandle, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(DetectorState::Created);

        let engine = Self {
            deps,
            state_tx,
            commands: commands_tx.downgrade(),
            session: None,
        };
        let task = tokio::spawn(engine.run(commands_rx));

        (
            DetectorEngineHandle {
                commands: commands_tx,
                state: state_rx,
            },
            task,
        )
    }

    async fn run(mut self, mut commands: mpsc::Receiver<EngineCommand>) {
        info!("검출 엔진 시작");

        while let Some(command) = commands.recv().await {
            match command {
                EngineCommand::StartScreenRecord(reply) => {
                    let _ = reply.send(self.start_screen_record().await);
                }
                EngineCommand::StartDetection { request, reply } => {
                    let _ = reply.send(self.start_detection(*request).await);
                }
                EngineCommand::ScreenSizeChanged(reply) => {
                    let _ = reply.send(self.on_screen_size_changed().await);
                }
                EngineCommand::StopDetection(reply) => {
                    let result = self.stop_detection().await;
                    if let Some(reply) = reply {
                        let _ = reply.send(result);
                    }
                }
                EngineCommand::StopScreenRecord(reply) => {
                    let _ = reply.send(self.stop_screen_record().await);
                }
                EngineCommand::Shutdown(reply) => {
                    let result = self.stop_screen_record().await;
                    self.set_state(DetectorState::Destroyed);
                    let _ = reply.send(result);
                    break;
                }
            }
        }

        if self.state() != DetectorState::Destroyed {
            if let Err(e) = self.stop_screen_record().await {
                warn!("엔진 종료 정리 실패: {e}");
            }
            self.set_state(DetectorState::Destroyed);
        }
        info!("검출 엔진 종료");
    }

    fn state(&self) -> DetectorState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, state: DetectorState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            debug!(?previous, ?state, "엔진 상태 변경");
        }
    }

    fn ensure_state(
        &self,
        operation: &'static str,
        expected: DetectorState,
    ) -> Result<(), EngineError> {
        let state = self.state();
        if state == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidState { operation, state })
        }
    }

    // ============================================================
    // 녹화
    // ============================================================

    async fn start_screen_record(&mut self) -> Result<(), EngineError> {
        self.ensure_state("start_screen_record", DetectorState::Created)?;

        let size = self.deps.display.screen_size();
        if !size.is_valid() {
            return Err(EngineError::InvalidDisplaySize {
                width: size.width,
                height: size.height,
            });
        }

        self.set_state(DetectorState::Transitioning);
        if let Err(e) = self.deps.recorder.start_projection(size).await {
            error!("화면 녹화 시작 실패: {e}");
            self.set_state(DetectorState::Created);
            return Err(e.into());
        }

        info!(width = size.width, height = size.height, "화면 녹화 시작");
        self.set_state(DetectorState::Recording);
        Ok(())
    }

    async fn stop_screen_record(&mut self) -> Result<(), EngineError> {
        if self.state() == DetectorState::Detecting {
            self.stop_detection().await?;
        }

        match self.state() {
            DetectorState::Recording | DetectorState::ErrorNativeDetectorNotFound => {
                self.set_state(DetectorState::Transitioning);
                self.deps.recorder.stop_projection().await;
                info!("화면 녹화 종료");
                self.set_state(DetectorState::Created);
                Ok(())
            }
            DetectorState::Created | DetectorState::Destroyed => Ok(()),
            state => Err(EngineError::InvalidState {
                operation: "stop_screen_record",
                state,
            }),
        }
    }

    // ============================================================
    // 검출
    // ============================================================

    async fn start_detection(&mut self, request: DetectionRequest) -> Result<(), EngineError> {
        self.ensure_state("start_detection", DetectorState::Recording)?;

        let DetectionRequest {
            bundle,
            auto_stop,
            is_try,
        } = request;

        if !bundle.can_start() {
            return Err(CoreError::Validation {
                field: "events".to_string(),
                message: "시작 시 활성화된 이벤트가 없음".to_string(),
            }
            .into());
        }

        let Some(detector) = self.deps.detectors.create() else {
            error!("네이티브 검출기를 찾을 수 없음");
            self.set_state(DetectorState::ErrorNativeDetectorNotFound);
            return Err(EngineError::DetectorUnavailable);
        };

        self.set_state(DetectorState::Transitioning);
        self.deps.bitmaps.clear_cache();

        let mut scaling = ScalingManager::new(self.deps.display.clone());
        let scaled_size =
            scaling.start_scaling(bundle.scenario.detection_quality, &bundle.image_events);
        self.deps.recorder.resize_display(scaled_size).await;

        let randomizer = Randomizer::new(
            self.deps.processing.randomize_offset_px,
            self.deps.processing.randomize_duration_ms,
        );
        let mut processor = ScenarioProcessor::new(
            bundle,
            detector,
            self.deps.bitmaps.clone(),
            self.deps.executor.clone(),
            self.deps.listener.clone(),
            Some(randomizer),
        );
        processor.on_scenario_start();

        let session_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(
            session = %session_id,
            scenario = %processor.scenario().id,
            quality = processor.scenario().detection_quality,
            width = scaled_size.width,
            height = scaled_size.height,
            is_try,
            started_at = %started_at.to_rfc3339(),
            "검출 시작"
        );

        let lane = self.spawn_frame_lane(processor, scaling);
        let auto_stop = if is_try {
            None
        } else {
            auto_stop
                .or_else(|| self.deps.processing.auto_stop())
                .map(|duration| self.spawn_auto_stop(duration))
        };

        self.session = Some(DetectionSession {
            id: session_id,
            started_at,
            is_try,
            lane,
            auto_stop,
        });
        self.set_state(DetectorState::Detecting);
        Ok(())
    }

    async fn on_screen_size_changed(&mut self) -> Result<(), EngineError> {
        match self.state() {
            DetectorState::Detecting => {
                let Some(session) = self.session.take() else {
                    return Ok(());
                };
                self.set_state(DetectorState::Transitioning);

                let DetectionSession {
                    id,
                    started_at,
                    is_try,
                    lane,
                    auto_stop,
                } = session;
                let (processor, mut scaling) = match join_frame_lane(lane).await {
                    Ok(parts) => parts,
                    Err(e) => {
                        if let Some(auto_stop) = auto_stop {
                            auto_stop.abort();
                        }
                        self.set_state(DetectorState::Recording);
                        return Err(e);
                    }
                };

                let scaled_size = scaling.refresh_scaling();
                self.deps.recorder.resize_display(scaled_size).await;
                info!(
                    session = %id,
                    width = scaled_size.width,
                    height = scaled_size.height,
                    "화면 크기 변경, 검출 재시작"
                );

                self.session = Some(DetectionSession {
                    id,
                    started_at,
                    is_try,
                    lane: self.spawn_frame_lane(processor, scaling),
                    auto_stop,
                });
                self.set_state(DetectorState::Detecting);
                Ok(())
            }
            DetectorState::Recording => {
                let size = self.deps.display.screen_size();
                self.deps.recorder.resize_display(size).await;
                debug!(width = size.width, height = size.height, "녹화 해상도 갱신");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn stop_detection(&mut self) -> Result<(), EngineError> {
        if self.state() != DetectorState::Detecting {
            warn!(state = ?self.state(), "검출 중이 아님, 정지 요청 무시");
            return Ok(());
        }
        let Some(session) = self.session.take() else {
            self.set_state(DetectorState::Recording);
            return Ok(());
        };
        self.set_state(DetectorState::Transitioning);

        if let Some(auto_stop) = session.auto_stop {
            auto_stop.abort();
        }

        let result = match join_frame_lane(session.lane).await {
            Ok((mut processor, mut scaling)) => {
                processor.close_detector().await;
                processor.on_scenario_end();
                scaling.stop_scaling();
                Ok(())
            }
            Err(e) => Err(e),
        };

        self.deps
            .recorder
            .resize_display(self.deps.display.screen_size())
            .await;

        let elapsed = Utc::now().signed_duration_since(session.started_at);
        info!(
            session = %session.id,
            is_try = session.is_try,
            elapsed_ms = elapsed.num_milliseconds(),
            "검출 종료"
        );
        self.set_state(DetectorState::Recording);
        result
    }

    fn spawn_frame_lane(&self, processor: ScenarioProcessor, scaling: ScalingManager) -> FrameLane {
        let (cancel, signal) = CancelSignal::new();
        let handle = tokio::spawn(run_frame_lane(
            processor,
            scaling,
            self.deps.recorder.clone(),
            signal,
            self.deps.detection.no_image_delay(),
            self.commands.clone(),
        ));
        FrameLane { cancel, handle }
    }

    fn spawn_auto_stop(&self, duration: Duration) -> JoinHandle<()> {
        let commands = self.commands.clone();
        info!(secs = duration.as_secs_f64(), "자동 정지 예약");
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(commands) = commands.upgrade() {
                info!("자동 정지 시간 도달");
                let _ = commands.send(EngineCommand::StopDetection(None)).await;
            }
        })
    }
}

/// 프레임 레인 취소 후 join. 프로세서와 스케일링 상태를 돌려받는다.
async fn join_frame_lane(
    lane: FrameLane,
) -> Result<(ScenarioProcessor, ScalingManager), EngineError> {
    lane.cancel.cancel();
    lane.handle.await.map_err(|e| {
        error!("프레임 레인 비정상 종료: {e}");
        EngineError::Core(CoreError::Internal(format!("frame lane: {e}")))
    })
}

/// 프레임 레인 루프
async fn run_frame_lane(
    mut processor: ScenarioProcessor,
    scaling: ScalingManager,
    frames: Arc<dyn DisplayRecorder>,
    cancel: CancelSignal,
    no_image_delay: Duration,
    commands: mpsc::WeakSender<EngineCommand>,
) -> (ScenarioProcessor, ScalingManager) {
    debug!("프레임 레인 시작");

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let frame: Option<Option<Bitmap>> = tokio::select! {
            frame = frames.acquire_latest_frame() => Some(frame),
            _ = cancel.cancelled() => None,
        };
        let Some(frame) = frame else {
            break;
        };
        let Some(frame) = frame else {
            if sleep_or_cancelled(no_image_delay, &cancel).await {
                break;
            }
            continue;
        };

        match processor.process(&frame, &scaling, &cancel).await {
            PassOutcome::Completed => {}
            PassOutcome::Cancelled => break,
            PassOutcome::StopRequested => {
                request_stop(&commands, &cancel).await;
                break;
            }
        }
    }

    debug!("프레임 레인 종료");
    (processor, scaling)
}

/// 대기 중 취소되면 `true`
async fn sleep_or_cancelled(duration: Duration, cancel: &CancelSignal) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = cancel.cancelled() => true,
    }
}

/// 라이프사이클 레인에 검출 정지 요청.
///
/// 채널이 가득 차도 자리가 날 때까지 기다린다. 그 사이 레인이 취소되면
/// 이미 정지가 진행 중이므로 포기한다.
async fn request_stop(commands: &mpsc::WeakSender<EngineCommand>, cancel: &CancelSignal) {
    let Some(commands) = commands.upgrade() else {
        return;
    };
    tokio::select! {
        sent = commands.send(EngineCommand::StopDetection(None)) => {
            if sent.is_err() {
                warn!("정지 요청 전송 실패: 엔진 종료됨");
            }
        }
        _ = cancel.cancelled() => debug!("정지 요청 중 레인 취소됨"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 채널이 가득 차 있어도 자리가 나면 정지 요청이 전달된다
    #[tokio::test]
    async fn stop_request_waits_for_channel_capacity() {
        let (tx, mut rx) = mpsc::channel(1);
        tx.send(EngineCommand::StopDetection(None)).await.unwrap();
        let weak = tx.downgrade();
        let (_cancel, signal) = CancelSignal::new();

        let request = tokio::spawn(async move { request_stop(&weak, &signal).await });
        tokio::task::yield_now().await;
        assert!(!request.is_finished());

        assert!(matches!(rx.recv().await, Some(EngineCommand::StopDetection(None))));
        request.await.unwrap();
        assert!(matches!(rx.recv().await, Some(EngineCommand::StopDetection(None))));
        drop(tx);
    }

    /// 대기 중 레인이 취소되면 요청을 포기한다
    #[tokio::test]
    async fn stop_request_gives_up_when_cancelled() {
        let (tx, mut rx) = mpsc::channel(1);
        tx.send(EngineCommand::StopDetection(None)).await.unwrap();
        let weak = tx.downgrade();
        let (cancel, signal) = CancelSignal::new();

        let request = tokio::spawn(async move { request_stop(&weak, &signal).await });
        cancel.cancel();
        request.await.unwrap();

        drop(tx);
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }
}
