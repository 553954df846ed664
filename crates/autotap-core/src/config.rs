//! 애플리케이션 설정 구조체.
//!
//! 검출 루프, 시나리오 처리, 입력 주입, 로깅 설정을 정의한다.
//! `ConfigManager`가 JSON 파일로 저장/로드하며, CLI 플래그로 덮어쓸 수 있다.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 검출 설정
    #[serde(default)]
    pub detection: DetectionConfig,
    /// 시나리오 처리 설정
    #[serde(default)]
    pub processing: ProcessingConfig,
    /// 입력 주입 설정
    #[serde(default)]
    pub input: InputConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============================================================
// 검출 설정
// ============================================================

/// 검출 루프 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// 새 프레임이 없을 때 대기 시간 (밀리초)
    #[serde(default = "default_no_image_delay_ms")]
    pub no_image_delay_ms: u64,
    /// 조건 비트맵 LRU 캐시 크기
    #[serde(default = "default_bitmap_cache_size")]
    pub bitmap_cache_size: usize,
}

impl DetectionConfig {
    pub fn no_image_delay(&self) -> Duration {
        Duration::from_millis(self.no_image_delay_ms)
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            no_image_delay_ms: default_no_image_delay_ms(),
            bitmap_cache_size: default_bitmap_cache_size(),
        }
    }
}

fn default_no_image_delay_ms() -> u64 {
    20
}

fn default_bitmap_cache_size() -> usize {
    64
}

// ============================================================
// 처리 설정
// ============================================================

/// 시나리오 처리 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// 자동 정지 시간 (초). `None`이면 수동 정지까지 실행.
    #[serde(default)]
    pub auto_stop_secs: Option<u64>,
    /// 무작위화 위치 오프셋 (픽셀, ±)
    #[serde(default = "default_randomize_offset_px")]
    pub randomize_offset_px: i32,
    /// 무작위화 시간 오프셋 (밀리초, ±)
    #[serde(default = "default_randomize_duration_ms")]
    pub randomize_duration_ms: u64,
}

impl ProcessingConfig {
    pub fn auto_stop(&self) -> Option<Duration> {
        self.auto_stop_secs.map(Duration::from_secs)
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            auto_stop_secs: None,
            randomize_offset_px: default_randomize_offset_px(),
            randomize_duration_ms: default_randomize_duration_ms(),
        }
    }
}

fn default_randomize_offset_px() -> i32 {
    5
}

fn default_randomize_duration_ms() -> u64 {
    5
}

// ============================================================
// 입력 설정
// ============================================================

/// 입력 실행기 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputBackend {
    /// 실제 입력 없이 로그만 남김
    #[default]
    Noop,
    /// enigo 기반 OS 입력 주입 (`enigo` feature 필요)
    Enigo,
}

/// 입력 주입 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub backend: InputBackend,
}

// ============================================================
// 로깅 설정
// ============================================================

/// 로깅 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 기본 로그 레벨 (RUST_LOG가 우선)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            detection: DetectionConfig::default(),
            processing: ProcessingConfig::default(),
            input: InputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default_config();
        assert_eq!(config.detection.no_image_delay(), Duration::from_millis(20));
        assert_eq!(config.processing.randomize_offset_px, 5);
        assert!(config.processing.auto_stop().is_none());
        assert_eq!(config.input.backend, InputBackend::Noop);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_json_uses_defaults() {
        let json = r#"{"processing":{"auto_stop_secs":30},"input":{"backend":"enigo"}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.processing.auto_stop(), Some(Duration::from_secs(30)));
        assert_eq!(config.processing.randomize_duration_ms, 5);
        assert_eq!(config.input.backend, InputBackend::Enigo);
        assert_eq!(config.detection.bitmap_cache_size, 64);
    }
}
