//! 액션 실행기 포트.
//!
//! 호스트 환경(입력 주입, 인텐트, 알림)과의 상호작용을 정의한다.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::geometry::Point;
use crate::models::identifier::Identifier;

/// 단일 스트로크 제스처 (탭 = 점 1개, 스와이프 = 점 2개)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gesture {
    pub path: Vec<Point>,
    pub duration_ms: u64,
}

impl Gesture {
    pub fn tap(position: Point, duration_ms: u64) -> Self {
        Self {
            path: vec![position],
            duration_ms,
        }
    }

    pub fn line(from: Point, to: Point, duration_ms: u64) -> Self {
        Self {
            path: vec![from, to],
            duration_ms,
        }
    }
}

/// 인텐트 실행 요청
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRequest {
    pub action: String,
    pub component_name: Option<String>,
    pub flags: u32,
    pub extras: BTreeMap<String, String>,
    pub is_broadcast: bool,
}

/// 알림 표시 요청
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub action_id: Identifier,
    pub event_id: Identifier,
    pub title: String,
    pub message: String,
}

/// 액션 실행기: 구현체: `NoOpActionExecutor`, `EnigoActionExecutor`
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// 제스처 실행 (클릭/스와이프)
    async fn execute_gesture(&self, gesture: &Gesture) -> Result<(), CoreError>;

    /// 인텐트 실행 (액티비티 시작/브로드캐스트)
    async fn execute_intent(&self, intent: &IntentRequest) -> Result<(), CoreError>;

    /// 알림 표시
    async fn execute_notification(&self, notification: &NotificationRequest) -> Result<(), CoreError> {
        let _ = notification;
        Ok(())
    }

    /// 실행기 이름 (예: "noop", "enigo")
    fn name(&self) -> &str;
}
