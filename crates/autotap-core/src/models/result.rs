//! 조건/이벤트 처리 결과 모델.
//!
//! 리스너와 액션 실행기(검출 위치 클릭)가 소비한다.

use serde::{Deserialize, Serialize};

use super::geometry::Point;
use super::identifier::Identifier;

/// 이미지 검출기 출력 (검출 공간 좌표)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub is_detected: bool,
    pub position: Point,
    pub confidence_rate: f64,
}

impl DetectionResult {
    /// 미검출 결과
    pub fn not_detected() -> Self {
        Self {
            is_detected: false,
            position: Point::default(),
            confidence_rate: 0.0,
        }
    }
}

/// 단일 조건 평가 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionState {
    Fulfilled,
    NotFulfilled,
    /// 단락 평가로 검사하지 않음
    Skipped,
}

/// 이미지 조건 검출 상세 (실제 화면 좌표)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageDetection {
    pub detected: bool,
    pub position: Option<Point>,
    pub confidence_rate: f64,
}

/// 단일 조건 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionResult {
    pub condition_id: Identifier,
    pub state: ConditionState,
    /// 이미지 조건만 `Some`
    pub detection: Option<ImageDetection>,
}

impl ConditionResult {
    pub fn is_fulfilled(&self) -> bool {
        self.state == ConditionState::Fulfilled
    }

    /// 실제로 화면에서 검출된 이미지 조건인지
    pub fn is_detected(&self) -> bool {
        self.detection.map(|d| d.detected).unwrap_or(false)
    }
}

/// 이벤트 한 개의 조건 평가 결과
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionsResults {
    pub fulfilled: bool,
    /// 조건 목록 순서 그대로 (건너뛴 조건 포함)
    pub results: Vec<ConditionResult>,
}

impl ConditionsResults {
    /// 처음 검출된 이미지 조건 결과
    pub fn first_detected(&self) -> Option<&ConditionResult> {
        self.results.iter().find(|r| r.is_detected())
    }

    /// id로 조건 결과 조회
    pub fn get(&self, condition_id: Identifier) -> Option<&ConditionResult> {
        self.results.iter().find(|r| r.condition_id == condition_id)
    }
}

/// 이벤트 처리 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventProcessingOutcome {
    /// 비활성 상태라 평가하지 않음
    NotProcessed,
    /// 평가 완료
    Processed(ConditionsResults),
}

impl EventProcessingOutcome {
    pub fn is_processed(&self) -> bool {
        matches!(self, Self::Processed(_))
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Processed(results) if results.fulfilled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_result(id: i64, detected: bool, state: ConditionState) -> ConditionResult {
        ConditionResult {
            condition_id: Identifier::Database(id),
            state,
            detection: Some(ImageDetection {
                detected,
                position: detected.then(|| Point::new(id as i32, id as i32)),
                confidence_rate: if detected { 0.9 } else { 0.0 },
            }),
        }
    }

    #[test]
    fn first_detected_skips_undetected() {
        let results = ConditionsResults {
            fulfilled: true,
            results: vec![
                image_result(1, false, ConditionState::NotFulfilled),
                image_result(2, true, ConditionState::Fulfilled),
            ],
        };
        let first = results.first_detected().unwrap();
        assert_eq!(first.condition_id, Identifier::Database(2));
        assert!(results.get(Identifier::Database(1)).is_some());
        assert!(results.get(Identifier::Database(3)).is_none());
    }

    #[test]
    fn outcome_flags() {
        assert!(!EventProcessingOutcome::NotProcessed.is_processed());
        assert!(!EventProcessingOutcome::NotProcessed.is_fulfilled());
        let processed = EventProcessingOutcome::Processed(ConditionsResults::default());
        assert!(processed.is_processed());
        assert!(!processed.is_fulfilled());
    }
}
