//! 시나리오 처리 상태.
//!
//! 이벤트별 활성 플래그, 카운터, 타이머를 한 곳에서 소유한다.
//! 프레임 처리 중 `&mut`로만 전달되며 토글/카운터 변경은 같은 패스의
//! 이후 이벤트에 즉시 보인다.

pub mod counters;
pub mod timers;

use std::collections::HashMap;

use autotap_core::models::action::ToggleType;
use autotap_core::models::event::{Event, ImageEvent, TriggerEvent};
use autotap_core::models::identifier::Identifier;
use tokio::time::Instant;
use tracing::debug;

use self::counters::CounterStore;
use self::timers::TimerStore;

/// 이벤트 종류 (활성 플래그 조회용)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    Image,
    Trigger,
}

#[derive(Debug, Clone, Copy)]
struct EventFlag {
    kind: EventKind,
    enabled: bool,
    enabled_on_start: bool,
}

/// 처리 세션 상태
#[derive(Debug, Default)]
pub struct ProcessingState {
    events: HashMap<Identifier, EventFlag>,
    counters: CounterStore,
    timers: TimerStore,
}

impl ProcessingState {
    pub fn new(image_events: &[ImageEvent], trigger_events: &[TriggerEvent]) -> Self {
        let image = image_events.iter().map(|e| (e.id(), e.enabled_on_start(), EventKind::Image));
        let trigger = trigger_events
            .iter()
            .map(|e| (e.id(), e.enabled_on_start(), EventKind::Trigger));
        let events = image
            .chain(trigger)
            .map(|(id, enabled_on_start, kind)| {
                (
                    id,
                    EventFlag {
                        kind,
                        enabled: enabled_on_start,
                        enabled_on_start,
                    },
                )
            })
            .collect();

        Self {
            events,
            counters: CounterStore::new(),
            timers: TimerStore::default(),
        }
    }

    /// 세션 시작: 플래그를 시작 값으로 되돌리고 카운터/타이머를 초기화
    pub fn on_processing_started(&mut self, trigger_events: &[TriggerEvent], now: Instant) {
        for flag in self.events.values_mut() {
            flag.enabled = flag.enabled_on_start;
        }
        self.counters.clear();
        self.timers = TimerStore::start(trigger_events, now);
        debug!(events = self.events.len(), "처리 상태 초기화");
    }

    /// 세션 종료: 카운터/타이머 비우기
    pub fn on_processing_stopped(&mut self) {
        self.counters.clear();
        self.timers.clear();
    }

    pub fn is_event_enabled(&self, id: Identifier) -> bool {
        self.events.get(&id).map(|f| f.enabled).unwrap_or(false)
    }

    /// 단일 이벤트 토글. 대상이 없으면 `None` (no-op).
    pub fn apply_toggle(&mut self, id: Identifier, toggle: ToggleType) -> Option<bool> {
        let flag = self.events.get_mut(&id)?;
        flag.enabled = toggle.apply(flag.enabled);
        Some(flag.enabled)
    }

    /// `except`를 제외한 모든 이벤트 토글
    pub fn apply_toggle_all(&mut self, except: Identifier, toggle: ToggleType) {
        for (id, flag) in self.events.iter_mut() {
            if *id != except {
                flag.enabled = toggle.apply(flag.enabled);
            }
        }
    }

    pub fn are_all_events_disabled(&self) -> bool {
        self.events.values().all(|f| !f.enabled)
    }

    pub fn are_all_image_events_disabled(&self) -> bool {
        self.all_disabled(EventKind::Image)
    }

    pub fn are_all_trigger_events_disabled(&self) -> bool {
        self.all_disabled(EventKind::Trigger)
    }

    fn all_disabled(&self, kind: EventKind) -> bool {
        self.events
            .values()
            .filter(|f| f.kind == kind)
            .all(|f| !f.enabled)
    }

    pub fn counters(&self) -> &CounterStore {
        &self.counters
    }

    pub fn counters_mut(&mut self) -> &mut CounterStore {
        &mut self.counters
    }

    pub fn timers_mut(&mut self) -> &mut TimerStore {
        &mut self.timers
    }
}
