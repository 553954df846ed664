//! 이름 있는 정수 카운터 저장소.
//!
//! 없는 카운터는 0으로 읽힌다. 처리 세션 동안만 유지된다.

use std::collections::HashMap;

use autotap_core::models::action::CounterOperation;
use autotap_core::models::condition::{ComparisonOperation, CounterOperationValue};

#[derive(Debug, Default, Clone)]
pub struct CounterStore {
    values: HashMap<String, i32>,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 카운터 값 (없으면 0)
    pub fn get(&self, name: &str) -> i32 {
        self.values.get(name).copied().unwrap_or(0)
    }

    /// 값 설정, 이전 값 반환
    pub fn set(&mut self, name: &str, value: i32) -> i32 {
        self.values.insert(name.to_string(), value).unwrap_or(0)
    }

    /// 피연산자 해석 (리터럴 또는 다른 카운터의 현재 값)
    pub fn resolve(&self, value: &CounterOperationValue) -> i32 {
        match value {
            CounterOperationValue::Number(number) => *number,
            CounterOperationValue::Counter(name) => self.get(name),
        }
    }

    /// `name <comparison> value`
    pub fn compare(
        &self,
        name: &str,
        comparison: ComparisonOperation,
        value: &CounterOperationValue,
    ) -> bool {
        comparison.compare(self.get(name), self.resolve(value))
    }

    /// 연산 적용. (이전 값, 새 값) 반환.
    pub fn apply(
        &mut self,
        name: &str,
        operation: CounterOperation,
        value: &CounterOperationValue,
    ) -> (i32, i32) {
        let operand = self.resolve(value);
        let previous = self.get(name);
        let next = operation.apply(previous, operand);
        self.values.insert(name.to_string(), next);
        (previous, next)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_counter_reads_zero() {
        let store = CounterStore::new();
        assert_eq!(store.get("missing"), 0);
        assert!(store.compare("missing", ComparisonOperation::Equals, &CounterOperationValue::Number(0)));
    }

    #[test]
    fn apply_operations() {
        let mut store = CounterStore::new();
        assert_eq!(
            store.apply("a", CounterOperation::Add, &CounterOperationValue::Number(3)),
            (0, 3)
        );
        assert_eq!(
            store.apply("a", CounterOperation::Minus, &CounterOperationValue::Number(1)),
            (3, 2)
        );
        assert_eq!(
            store.apply("b", CounterOperation::Set, &CounterOperationValue::Counter("a".into())),
            (0, 2)
        );
        assert_eq!(store.get("b"), 2);
    }

    #[test]
    fn compare_against_other_counter() {
        let mut store = CounterStore::new();
        store.set("hits", 5);
        store.set("limit", 5);
        let limit = CounterOperationValue::Counter("limit".into());
        assert!(store.compare("hits", ComparisonOperation::GreaterOrEquals, &limit));
        assert!(!store.compare("hits", ComparisonOperation::Greater, &limit));
        assert!(store.compare("hits", ComparisonOperation::Greater, &CounterOperationValue::Counter("none".into())));
    }

    #[test]
    fn clear_resets() {
        let mut store = CounterStore::new();
        store.set("a", 1);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.get("a"), 0);
    }
}
