//! 시나리오 이벤트 모델.
//!
//! 이벤트 = 조건 목록(AND/OR 결합) + 액션 목록 + 시작 시 활성 여부 + 우선순위.

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::condition::{ImageCondition, TriggerCondition};
use super::identifier::Identifier;

/// 조건 결합 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOperator {
    /// 모든 조건 충족
    And,
    /// 하나 이상 충족
    Or,
}

/// 화면 이미지 이벤트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEvent {
    pub id: Identifier,
    pub scenario_id: Identifier,
    pub name: String,
    pub enabled_on_start: bool,
    pub operator: ConditionOperator,
    pub conditions: Vec<ImageCondition>,
    pub actions: Vec<Action>,
    pub priority: u32,
    /// 충족 후에도 같은 프레임에서 다음 이벤트 검출을 계속할지
    pub keep_detecting: bool,
}

/// 상태 기반 트리거 이벤트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub id: Identifier,
    pub scenario_id: Identifier,
    pub name: String,
    pub enabled_on_start: bool,
    pub operator: ConditionOperator,
    pub conditions: Vec<TriggerCondition>,
    pub actions: Vec<Action>,
    pub priority: u32,
}

/// 이미지/트리거 이벤트 공통 접근자
pub trait Event {
    fn id(&self) -> Identifier;
    fn name(&self) -> &str;
    fn enabled_on_start(&self) -> bool;
    fn operator(&self) -> ConditionOperator;
    fn actions(&self) -> &[Action];
    fn priority(&self) -> u32;
    fn set_priority(&mut self, priority: u32);
    fn has_conditions(&self) -> bool;
}

macro_rules! impl_event {
    ($ty:ty) => {
        impl Event for $ty {
            fn id(&self) -> Identifier {
                self.id
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn enabled_on_start(&self) -> bool {
                self.enabled_on_start
            }

            fn operator(&self) -> ConditionOperator {
                self.operator
            }

            fn actions(&self) -> &[Action] {
                &self.actions
            }

            fn priority(&self) -> u32 {
                self.priority
            }

            fn set_priority(&mut self, priority: u32) {
                self.priority = priority;
            }

            fn has_conditions(&self) -> bool {
                !self.conditions.is_empty()
            }
        }
    };
}

impl_event!(ImageEvent);
impl_event!(TriggerEvent);

/// 우선순위 정규화: 우선순위 오름차순(동률은 기존 순서 유지)으로 정렬 후 0부터 연속 재부여.
/// 각 이벤트의 액션도 같은 규칙으로 정렬한다.
pub fn normalize_priorities<E: Event + HasActionsMut>(events: &mut [E]) {
    events.sort_by_key(|event| event.priority());
    for (index, event) in events.iter_mut().enumerate() {
        event.set_priority(index as u32);
        let actions = event.actions_mut();
        actions.sort_by_key(|action| action.priority);
        for (action_index, action) in actions.iter_mut().enumerate() {
            action.priority = action_index as u32;
        }
    }
}

/// 액션 목록 가변 접근 (정규화 전용)
pub trait HasActionsMut {
    fn actions_mut(&mut self) -> &mut Vec<Action>;
}

impl HasActionsMut for ImageEvent {
    fn actions_mut(&mut self) -> &mut Vec<Action> {
        &mut self.actions
    }
}

impl HasActionsMut for TriggerEvent {
    fn actions_mut(&mut self) -> &mut Vec<Action> {
        &mut self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::action::{ActionKind, Pause};

    fn event(id: i64, priority: u32, action_priorities: &[u32]) -> TriggerEvent {
        TriggerEvent {
            id: Identifier::Database(id),
            scenario_id: Identifier::Database(1),
            name: format!("event{id}"),
            enabled_on_start: true,
            operator: ConditionOperator::And,
            conditions: vec![],
            actions: action_priorities
                .iter()
                .enumerate()
                .map(|(i, p)| Action {
                    id: Identifier::Database(100 + i as i64),
                    event_id: Identifier::Database(id),
                    name: format!("pause{i}"),
                    priority: *p,
                    kind: ActionKind::Pause(Pause { duration_ms: 1 }),
                })
                .collect(),
            priority,
        }
    }

    #[test]
    fn normalize_makes_priorities_contiguous() {
        let mut events = vec![event(1, 7, &[]), event(2, 3, &[]), event(3, 10, &[])];
        normalize_priorities(&mut events);

        let ids: Vec<_> = events.iter().map(|e| e.id).collect();
        assert_eq!(
            ids,
            vec![
                Identifier::Database(2),
                Identifier::Database(1),
                Identifier::Database(3)
            ]
        );
        let priorities: Vec<_> = events.iter().map(|e| e.priority).collect();
        assert_eq!(priorities, vec![0, 1, 2]);
    }

    #[test]
    fn normalize_keeps_order_of_equal_priorities() {
        let mut events = vec![event(1, 0, &[]), event(2, 0, &[])];
        normalize_priorities(&mut events);
        assert_eq!(events[0].id, Identifier::Database(1));
        assert_eq!(events[1].priority, 1);
    }

    #[test]
    fn normalize_sorts_actions() {
        let mut events = vec![event(1, 0, &[5, 2])];
        normalize_priorities(&mut events);
        let action_ids: Vec<_> = events[0].actions.iter().map(|a| a.id).collect();
        assert_eq!(
            action_ids,
            vec![Identifier::Database(101), Identifier::Database(100)]
        );
        assert_eq!(events[0].actions[1].priority, 1);
    }
}
