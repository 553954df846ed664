//! 이벤트 액션 모델.
//!
//! 이벤트가 충족되면 `priority` 오름차순으로 실행되는 액션을 정의한다.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::condition::CounterOperationValue;
use super::geometry::Point;
use super::identifier::Identifier;

/// 이벤트 액션
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: Identifier,
    pub event_id: Identifier,
    pub name: String,
    /// 이벤트 내 실행 순서
    pub priority: u32,
    pub kind: ActionKind,
}

/// 액션 종류별 페이로드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    Click(Click),
    Swipe(Swipe),
    Pause(Pause),
    Intent(IntentAction),
    ToggleEvent(ToggleEvent),
    ChangeCounter(ChangeCounter),
    Notification(Notification),
}

impl ActionKind {
    /// 로그용 종류 이름
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Click(_) => "click",
            Self::Swipe(_) => "swipe",
            Self::Pause(_) => "pause",
            Self::Intent(_) => "intent",
            Self::ToggleEvent(_) => "toggle_event",
            Self::ChangeCounter(_) => "change_counter",
            Self::Notification(_) => "notification",
        }
    }
}

/// 클릭 위치 지정 방식
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClickPosition {
    /// 사용자가 지정한 고정 좌표
    UserSelected(Point),
    /// 검출된 이미지 조건 위치 (+ 오프셋)
    ///
    /// OR 이벤트에서는 처음 검출된 조건, AND 이벤트에서는 `condition_id` 조건을 사용한다.
    OnDetectedCondition {
        condition_id: Option<Identifier>,
        #[serde(default)]
        offset: Point,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Click {
    pub position: ClickPosition,
    pub press_duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swipe {
    pub from: Point,
    pub to: Point,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pause {
    pub duration_ms: u64,
}

/// 외부 인텐트 (액티비티 시작 또는 브로드캐스트)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentAction {
    pub action: String,
    #[serde(default)]
    pub component_name: Option<String>,
    #[serde(default)]
    pub flags: u32,
    #[serde(default)]
    pub extras: BTreeMap<String, String>,
    #[serde(default)]
    pub is_broadcast: bool,
}

/// 이벤트 활성 상태 변경 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToggleType {
    Enable,
    Disable,
    Toggle,
}

impl ToggleType {
    /// 현재 상태에 적용한 결과
    pub fn apply(&self, current: bool) -> bool {
        match self {
            Self::Enable => true,
            Self::Disable => false,
            Self::Toggle => !current,
        }
    }
}

/// 단일 이벤트 대상 토글
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventToggle {
    pub target_event_id: Identifier,
    pub toggle_type: ToggleType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleEvent {
    /// true면 `toggle_all_type`을 자신을 제외한 모든 이벤트에 적용
    pub toggle_all: bool,
    #[serde(default)]
    pub toggle_all_type: Option<ToggleType>,
    #[serde(default)]
    pub event_toggles: Vec<EventToggle>,
}

/// 카운터 연산
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CounterOperation {
    Add,
    Minus,
    Set,
}

impl CounterOperation {
    /// 연산 적용. 오버플로우는 포화 처리.
    pub fn apply(&self, current: i32, operand: i32) -> i32 {
        match self {
            Self::Add => current.saturating_add(operand),
            Self::Minus => current.saturating_sub(operand),
            Self::Set => operand,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeCounter {
    pub counter_name: String,
    pub operation: CounterOperation,
    pub value: CounterOperationValue,
}

/// 알림 메시지 내용
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NotificationMessage {
    Text(String),
    /// "<카운터명> = <값>" 형식
    CounterValue(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: NotificationMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_type_apply() {
        assert!(ToggleType::Enable.apply(false));
        assert!(!ToggleType::Disable.apply(true));
        assert!(ToggleType::Toggle.apply(false));
        assert!(!ToggleType::Toggle.apply(true));
    }

    #[test]
    fn counter_operation_apply() {
        assert_eq!(CounterOperation::Add.apply(3, 2), 5);
        assert_eq!(CounterOperation::Minus.apply(3, 5), -2);
        assert_eq!(CounterOperation::Set.apply(3, 9), 9);
        assert_eq!(CounterOperation::Add.apply(i32::MAX, 1), i32::MAX);
    }

    #[test]
    fn action_serde_roundtrip() {
        let action = Action {
            id: Identifier::Database(10),
            event_id: Identifier::Database(1),
            name: "tap".to_string(),
            priority: 0,
            kind: ActionKind::Click(Click {
                position: ClickPosition::OnDetectedCondition {
                    condition_id: Some(Identifier::Database(4)),
                    offset: Point::new(5, -5),
                },
                press_duration_ms: 50,
            }),
        };
        let json = serde_json::to_string(&action).unwrap();
        let deser: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(deser, action);
        assert_eq!(deser.kind.type_name(), "click");
    }
}
