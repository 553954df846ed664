//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! 엔진은 이 trait들에만 의존하며, 어댑터는 `Arc<dyn T>`/`Box<dyn T>`로 주입된다.
//!
//! 모든 async trait은 `async_trait` 매크로를 사용하여 object safety를 보장한다.

pub mod action_executor;
pub mod bitmap_supplier;
pub mod display;
pub mod processing_listener;
pub mod screen_detector;
