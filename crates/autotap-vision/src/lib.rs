//! # autotap-vision
//!
//! 검출 해상도 처리 크레이트.
//! 검출 품질 예산에 따른 좌표/영역 스케일링, 조건 비트맵 로드 및 LRU 캐싱,
//! 기본 검출기 어댑터를 담당한다.

pub mod bitmap_cache;
pub mod detector;
pub mod error;
pub mod scaling;
pub mod scaling_manager;
