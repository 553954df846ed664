//! 타이머 트리거 조건 상태.
//!
//! 조건별 종료 시각을 보관한다. 도달 후 재시작하거나 세션 끝까지 비활성화된다.

use std::collections::HashMap;
use std::time::Duration;

use autotap_core::models::condition::TriggerCondition;
use autotap_core::models::event::TriggerEvent;
use autotap_core::models::identifier::Identifier;
use tokio::time::Instant;

#[derive(Debug, Default)]
pub struct TimerStore {
    /// 조건 id → 종료 시각 (`None` = 비활성)
    ends: HashMap<Identifier, Option<Instant>>,
}

impl TimerStore {
    /// 모든 타이머 조건을 `start` 기준으로 시작
    pub fn start(trigger_events: &[TriggerEvent], start: Instant) -> Self {
        let ends = trigger_events
            .iter()
            .flat_map(|event| event.conditions.iter())
            .filter_map(|condition| match condition {
                TriggerCondition::TimerReached { id, duration_ms, .. } => {
                    Some((*id, Some(start + Duration::from_millis(*duration_ms))))
                }
                TriggerCondition::CounterReached { .. } => None,
            })
            .collect();
        Self { ends }
    }

    /// `now`가 종료 시각을 지났는지. 지났으면 재시작 또는 비활성화한다.
    pub fn check(
        &mut self,
        condition_id: Identifier,
        duration_ms: u64,
        restart_when_reached: bool,
        now: Instant,
    ) -> bool {
        let Some(Some(end)) = self.ends.get(&condition_id).copied() else {
            return false;
        };
        if now <= end {
            return false;
        }

        let next = restart_when_reached.then(|| now + Duration::from_millis(duration_ms));
        self.ends.insert(condition_id, next);
        true
    }

    pub fn clear(&mut self) {
        self.ends.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotap_core::models::event::ConditionOperator;

    fn timer_event(restart: bool) -> TriggerEvent {
        TriggerEvent {
            id: Identifier::Database(1),
            scenario_id: Identifier::Database(1),
            name: "timer".into(),
            enabled_on_start: true,
            operator: ConditionOperator::And,
            conditions: vec![TriggerCondition::TimerReached {
                id: Identifier::Database(10),
                event_id: Identifier::Database(1),
                name: "t".into(),
                duration_ms: 100,
                restart_when_reached: restart,
            }],
            actions: vec![],
            priority: 0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reached_only_after_duration() {
        let start = Instant::now();
        let mut timers = TimerStore::start(&[timer_event(true)], start);
        let id = Identifier::Database(10);

        assert!(!timers.check(id, 100, true, start + Duration::from_millis(100)));
        assert!(timers.check(id, 100, true, start + Duration::from_millis(101)));
        // 재시작됨
        assert!(!timers.check(id, 100, true, start + Duration::from_millis(150)));
        assert!(timers.check(id, 100, true, start + Duration::from_millis(202)));
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_after_reach_without_restart() {
        let start = Instant::now();
        let mut timers = TimerStore::start(&[timer_event(false)], start);
        let id = Identifier::Database(10);

        assert!(timers.check(id, 100, false, start + Duration::from_millis(101)));
        assert!(!timers.check(id, 100, false, start + Duration::from_secs(10)));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_condition_never_reached() {
        let mut timers = TimerStore::default();
        assert!(!timers.check(Identifier::Database(99), 0, true, Instant::now()));
    }
}
