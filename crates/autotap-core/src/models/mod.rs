//! 도메인 데이터 모델.
//!
//! 모든 모델은 serde `Serialize`/`Deserialize`를 구현하여
//! 외부 시나리오 저장소 및 CLI 입력 파일과 JSON으로 교환된다.

pub mod action;
pub mod bitmap;
pub mod condition;
pub mod event;
pub mod geometry;
pub mod identifier;
pub mod result;
pub mod scenario;
