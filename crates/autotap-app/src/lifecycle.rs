//! 라이프사이클 관리.
//!
//! OS 시그널 또는 검출 세션 종료(자동 정지, 시나리오 완료)를 하나의 종료 신호로 모은다.

use autotap_engine::engine::DetectorState;
use tokio::sync::watch;
use tracing::{info, warn};

/// 종료 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT/SIGTERM/Ctrl+C
    Signal,
    /// 검출이 스스로 끝남
    DetectionEnded,
    /// 엔진이 예기치 않게 종료/에러 상태
    EngineStopped,
}

/// 시그널 또는 검출 종료 중 먼저 오는 쪽까지 대기
pub async fn run_until_stopped(engine_state: watch::Receiver<DetectorState>) -> ShutdownReason {
    let reason = tokio::select! {
        result = wait_for_signal() => match result {
            Ok(()) => ShutdownReason::Signal,
            Err(e) => {
                warn!("시그널 핸들러 등록 실패: {e}");
                wait_for_detection_end(engine_state.clone()).await
            }
        },
        reason = wait_for_detection_end(engine_state.clone()) => reason,
    };
    info!(?reason, "실행 종료");
    reason
}

/// OS 시그널 대기 (SIGINT, SIGTERM)
async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => info!("SIGINT 수신"),
            _ = sigterm.recv() => info!("SIGTERM 수신"),
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Ctrl+C 수신");
        Ok(())
    }
}

/// `Detecting` 진입 후 이탈까지 대기
pub async fn wait_for_detection_end(mut state: watch::Receiver<DetectorState>) -> ShutdownReason {
    let mut was_detecting = false;
    loop {
        let current = *state.borrow_and_update();
        match current {
            DetectorState::Detecting => was_detecting = true,
            DetectorState::Recording if was_detecting => return ShutdownReason::DetectionEnded,
            DetectorState::Destroyed | DetectorState::ErrorNativeDetectorNotFound => {
                return ShutdownReason::EngineStopped
            }
            _ => {}
        }
        if state.changed().await.is_err() {
            return ShutdownReason::EngineStopped;
        }
    }
}
