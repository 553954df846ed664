//! 시나리오 모델.

use serde::{Deserialize, Serialize};

use super::event::{normalize_priorities, ImageEvent, TriggerEvent};
use super::identifier::Identifier;

/// 검출 품질 최소값
pub const DETECTION_QUALITY_MIN: u32 = 400;
/// 검출 품질 최대값 (사실상 축소 없음)
pub const DETECTION_QUALITY_MAX: u32 = 10_000;

/// 자동화 시나리오 (한 번의 실행 단위)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: Identifier,
    pub name: String,
    /// 검출 해상도 예산 (긴 변 기준 픽셀)
    pub detection_quality: u32,
    /// 봇 탐지 회피용 위치/시간 무작위화
    #[serde(default)]
    pub randomize: bool,
}

/// 시나리오 + 이벤트 목록 (외부 저장소가 공급)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBundle {
    pub scenario: Scenario,
    #[serde(default)]
    pub image_events: Vec<ImageEvent>,
    #[serde(default)]
    pub trigger_events: Vec<TriggerEvent>,
}

impl ScenarioBundle {
    /// 실행 전 우선순위 정규화
    pub fn normalized(mut self) -> Self {
        normalize_priorities(&mut self.image_events);
        normalize_priorities(&mut self.trigger_events);
        self
    }

    /// 시작 시 활성 이벤트가 하나라도 있는지 (실행 가능 여부)
    pub fn can_start(&self) -> bool {
        self.image_events.iter().any(|e| e.enabled_on_start)
            || self.trigger_events.iter().any(|e| e.enabled_on_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::ConditionOperator;

    fn trigger(id: i64, priority: u32, enabled: bool) -> TriggerEvent {
        TriggerEvent {
            id: Identifier::Database(id),
            scenario_id: Identifier::Database(1),
            name: String::new(),
            enabled_on_start: enabled,
            operator: ConditionOperator::Or,
            conditions: vec![],
            actions: vec![],
            priority,
        }
    }

    fn bundle(trigger_events: Vec<TriggerEvent>) -> ScenarioBundle {
        ScenarioBundle {
            scenario: Scenario {
                id: Identifier::Database(1),
                name: "test".to_string(),
                detection_quality: 1_200,
                randomize: false,
            },
            image_events: vec![],
            trigger_events,
        }
    }

    #[test]
    fn can_start_requires_an_enabled_event() {
        assert!(!bundle(vec![trigger(1, 0, false)]).can_start());
        assert!(bundle(vec![trigger(1, 0, false), trigger(2, 1, true)]).can_start());
    }

    #[test]
    fn normalized_reorders_trigger_events() {
        let normalized = bundle(vec![trigger(1, 4, true), trigger(2, 2, true)]).normalized();
        assert_eq!(normalized.trigger_events[0].id, Identifier::Database(2));
        assert_eq!(normalized.trigger_events[1].priority, 1);
    }

    #[test]
    fn randomize_defaults_to_false() {
        let json = r#"{"id":{"kind":"Database","value":1},"name":"s","detection_quality":800}"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert!(!scenario.randomize);
    }
}
