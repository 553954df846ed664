//! 이벤트 조건 모델.
//!
//! 이미지 조건(화면 매칭)과 트리거 조건(카운터/타이머 상태)을 정의한다.

use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::identifier::Identifier;

/// 이미지 조건의 검출 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectionType {
    /// 캡처한 위치 그대로 검출
    Exact,
    /// 화면 전체에서 검출
    WholeScreen,
    /// 사용자가 지정한 영역 내에서 검출
    InArea,
}

/// 화면 이미지 조건
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageCondition {
    pub id: Identifier,
    pub event_id: Identifier,
    pub name: String,
    /// 조건 비트맵 경로 (비트맵 공급자가 해석)
    pub path: String,
    pub detection_type: DetectionType,
    /// 캡처 영역 (원본 해상도 화면 좌표)
    pub area: Rect,
    /// 검출 영역 (`InArea`에서만 사용)
    #[serde(default)]
    pub detection_area: Option<Rect>,
    /// 매칭 허용 오차 (0 ~ 20)
    pub threshold: u32,
    /// true: 검출되어야 충족, false: 검출되지 않아야 충족
    pub should_be_detected: bool,
}

/// 카운터 비교 연산
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperation {
    Equals,
    Greater,
    GreaterOrEquals,
    Lower,
    LowerOrEquals,
}

impl ComparisonOperation {
    /// `value <op> target` 평가
    pub fn compare(&self, value: i32, target: i32) -> bool {
        match self {
            Self::Equals => value == target,
            Self::Greater => value > target,
            Self::GreaterOrEquals => value >= target,
            Self::Lower => value < target,
            Self::LowerOrEquals => value <= target,
        }
    }
}

/// 카운터 연산의 피연산자 (리터럴 또는 다른 카운터 값)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CounterOperationValue {
    Number(i32),
    Counter(String),
}

/// 상태 기반 트리거 조건
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TriggerCondition {
    /// 카운터가 목표값에 도달
    CounterReached {
        id: Identifier,
        event_id: Identifier,
        name: String,
        counter_name: String,
        comparison: ComparisonOperation,
        value: CounterOperationValue,
    },
    /// 세션 시작(또는 재시작) 후 지정 시간 경과
    TimerReached {
        id: Identifier,
        event_id: Identifier,
        name: String,
        duration_ms: u64,
        restart_when_reached: bool,
    },
}

impl TriggerCondition {
    pub fn id(&self) -> Identifier {
        match self {
            Self::CounterReached { id, .. } | Self::TimerReached { id, .. } => *id,
        }
    }

    pub fn event_id(&self) -> Identifier {
        match self {
            Self::CounterReached { event_id, .. } | Self::TimerReached { event_id, .. } => {
                *event_id
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::CounterReached { name, .. } | Self::TimerReached { name, .. } => name,
        }
    }
}
