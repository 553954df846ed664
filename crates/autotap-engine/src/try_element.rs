//! 요소 시험 실행 (try session).
//!
//! 편집 중인 이벤트/조건/액션 하나만으로 격리된 일회성 시나리오를 만든다.
//! 모든 id는 새 임시(domain) id로 교체되어 저장소의 실제 시나리오와 섞이지 않는다.

use std::collections::HashMap;

use autotap_core::models::action::{
    Action, ActionKind, ClickPosition, EventToggle, ToggleEvent, ToggleType,
};
use autotap_core::models::condition::{ImageCondition, TriggerCondition};
use autotap_core::models::event::{ConditionOperator, ImageEvent, TriggerEvent};
use autotap_core::models::identifier::Identifier;
use autotap_core::models::scenario::{Scenario, ScenarioBundle};

/// 시험 실행 대상 → 격리된 시나리오 번들
pub trait ScenarioTry: Send {
    fn into_bundle(self) -> ScenarioBundle;
}

fn try_scenario(scenario: &Scenario) -> Scenario {
    Scenario {
        id: Identifier::new_domain(),
        name: format!("{} (try)", scenario.name),
        ..scenario.clone()
    }
}

// ============================================================
// ImageEventTry
// ============================================================

/// 이미지 이벤트 하나를 시험. 다른 이벤트가 없으므로 토글 액션은 제외된다.
#[derive(Debug, Clone)]
pub struct ImageEventTry {
    pub scenario: Scenario,
    pub event: ImageEvent,
}

impl ImageEventTry {
    pub fn new(scenario: Scenario, event: ImageEvent) -> Self {
        Self { scenario, event }
    }
}

impl ScenarioTry for ImageEventTry {
    fn into_bundle(self) -> ScenarioBundle {
        let scenario = try_scenario(&self.scenario);
        let event_id = Identifier::new_domain();

        let mut condition_ids = HashMap::new();
        let conditions = self
            .event
            .conditions
            .into_iter()
            .map(|condition| {
                let id = Identifier::new_domain();
                condition_ids.insert(condition.id, id);
                ImageCondition {
                    id,
                    event_id,
                    ..condition
                }
            })
            .collect();

        let actions = self
            .event
            .actions
            .into_iter()
            .filter(|action| !matches!(action.kind, ActionKind::ToggleEvent(_)))
            .map(|action| {
                let mut action = reassign_action(action, event_id);
                if let ActionKind::Click(click) = &mut action.kind {
                    if let ClickPosition::OnDetectedCondition {
                        condition_id: Some(condition_id),
                        ..
                    } = &mut click.position
                    {
                        if let Some(new_id) = condition_ids.get(condition_id) {
                            *condition_id = *new_id;
                        }
                    }
                }
                action
            })
            .collect();

        ScenarioBundle {
            image_events: vec![ImageEvent {
                id: event_id,
                scenario_id: scenario.id,
                enabled_on_start: true,
                conditions,
                actions,
                priority: 0,
                ..self.event
            }],
            trigger_events: vec![],
            scenario,
        }
    }
}

// ============================================================
// ImageConditionTry
// ============================================================

/// 이미지 조건 하나를 시험. 액션 없이 매 프레임 검출 결과만 리스너로 보고된다.
#[derive(Debug, Clone)]
pub struct ImageConditionTry {
    pub scenario: Scenario,
    pub condition: ImageCondition,
}

impl ImageConditionTry {
    pub fn new(scenario: Scenario, condition: ImageCondition) -> Self {
        Self {
            scenario,
            condition,
        }
    }
}

impl ScenarioTry for ImageConditionTry {
    fn into_bundle(self) -> ScenarioBundle {
        let scenario = try_scenario(&self.scenario);
        let event_id = Identifier::new_domain();

        let event = ImageEvent {
            id: event_id,
            scenario_id: scenario.id,
            name: format!("try: {}", self.condition.name),
            enabled_on_start: true,
            operator: ConditionOperator::And,
            conditions: vec![ImageCondition {
                id: Identifier::new_domain(),
                event_id,
                ..self.condition
            }],
            actions: vec![],
            priority: 0,
            keep_detecting: true,
        };

        ScenarioBundle {
            scenario,
            image_events: vec![event],
            trigger_events: vec![],
        }
    }
}

// ============================================================
// ActionTry
// ============================================================

/// 액션 하나를 시험.
///
/// 즉시 도달하는 타이머 트리거 이벤트로 한 번 실행한 뒤 자신을 비활성화한다.
/// 다음 프레임에서 모든 이벤트가 비활성이므로 검출이 정지된다.
#[derive(Debug, Clone)]
pub struct ActionTry {
    pub scenario: Scenario,
    pub action: Action,
}

impl ActionTry {
    pub fn new(scenario: Scenario, action: Action) -> Self {
        Self { scenario, action }
    }
}

impl ScenarioTry for ActionTry {
    fn into_bundle(self) -> ScenarioBundle {
        let scenario = try_scenario(&self.scenario);
        let event_id = Identifier::new_domain();

        let tried = Action {
            priority: 0,
            ..reassign_action(self.action, event_id)
        };
        let disable_self = Action {
            id: Identifier::new_domain(),
            event_id,
            name: "try: disable".to_string(),
            priority: 1,
            kind: ActionKind::ToggleEvent(ToggleEvent {
                toggle_all: false,
                toggle_all_type: None,
                event_toggles: vec![EventToggle {
                    target_event_id: event_id,
                    toggle_type: ToggleType::Disable,
                }],
            }),
        };

        let event = TriggerEvent {
            id: event_id,
            scenario_id: scenario.id,
            name: format!("try: {}", tried.name),
            enabled_on_start: true,
            operator: ConditionOperator::And,
            conditions: vec![TriggerCondition::TimerReached {
                id: Identifier::new_domain(),
                event_id,
                name: "try: now".to_string(),
                duration_ms: 0,
                restart_when_reached: false,
            }],
            actions: vec![tried, disable_self],
            priority: 0,
        };

        ScenarioBundle {
            scenario,
            image_events: vec![],
            trigger_events: vec![event],
        }
    }
}

fn reassign_action(action: Action, event_id: Identifier) -> Action {
    Action {
        id: Identifier::new_domain(),
        event_id,
        ..action
    }
}
