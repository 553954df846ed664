//! 처리 취소 신호.
//!
//! `watch<bool>` 기반. 조건 평가 사이, 일시정지 대기 중에 확인한다.

use std::sync::Arc;

use tokio::sync::watch;

/// 취소 요청 측
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// 취소 확인 측 (복제 가능)
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
    /// `never()`용 송신자 보관 (수신 측이 닫히지 않도록)
    _keep_alive: Option<Arc<watch::Sender<bool>>>,
}

impl CancelSignal {
    /// 새 (핸들, 신호) 쌍
    pub fn new() -> (CancelHandle, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (
            CancelHandle { tx },
            CancelSignal {
                rx,
                _keep_alive: None,
            },
        )
    }

    /// 취소되지 않는 신호 (단발 처리, 테스트)
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            rx,
            _keep_alive: Some(Arc::new(tx)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// 취소될 때까지 대기. 핸들이 취소 없이 사라지면 영원히 대기한다.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_is_observed() {
        let (handle, signal) = CancelSignal::new();
        assert!(!signal.is_cancelled());
        handle.cancel();
        assert!(signal.is_cancelled());
        signal.cancelled().await;
    }

    #[tokio::test(start_paused = true)]
    async fn never_signal_does_not_resolve() {
        let signal = CancelSignal::never();
        let result = tokio::time::timeout(Duration::from_secs(60), signal.cancelled()).await;
        assert!(result.is_err());
        assert!(!signal.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_handle_does_not_cancel() {
        let (handle, signal) = CancelSignal::new();
        drop(handle);
        let result = tokio::time::timeout(Duration::from_secs(1), signal.cancelled()).await;
        assert!(result.is_err());
    }
}
