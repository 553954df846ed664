//! # autotap-core
//!
//! autotap 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`]: 시나리오/이벤트/조건/액션 등 도메인 데이터 (serde Serialize/Deserialize)
//! - [`ports`]: Hexagonal Architecture 포트 인터페이스 (async_trait)
//! - [`error`]: 핵심 에러 타입 (thiserror)
//! - [`config`]: 애플리케이션 설정 구조체
//! - [`config_manager`]: 설정 파일 관리 (로드/저장)

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;

#[cfg(test)]
mod tests {
    use crate::models::scenario::ScenarioBundle;

    #[test]
    fn bundle_json_minimal() {
        let json = r#"{
            "scenario": {"id":{"kind":"Database","value":1},"name":"s","detection_quality":1000},
            "image_events": []
        }"#;
        let bundle: ScenarioBundle = serde_json::from_str(json).unwrap();
        assert!(bundle.trigger_events.is_empty());
        assert!(!bundle.can_start());
    }
}
