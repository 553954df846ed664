//! # autotap-engine
//!
//! 시나리오 처리 엔진.
//! 프레임마다 트리거/이미지 이벤트를 평가하고 충족된 이벤트의 액션을 실행하며,
//! 녹화/검출 세션 라이프사이클을 관리한다.

pub mod action_executor;
pub mod cancel;
pub mod engine;
pub mod error;
pub mod frame_slot;
pub mod input_executor;
pub mod processor;
pub mod state;
pub mod try_element;
pub mod verifier;
