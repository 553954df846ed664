//! # autotap-app
//!
//! autotap 바이너리 진입점.
//! 설정/시나리오 로드, 어댑터 DI, 검출 엔진 실행과 종료 처리.

mod lifecycle;
mod listener;
mod replay;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use autotap_core::config::{AppConfig, InputBackend};
use autotap_core::config_manager::ConfigManager;
use autotap_core::models::geometry::Size;
use autotap_core::models::identifier::Identifier;
use autotap_core::models::scenario::{
    ScenarioBundle, DETECTION_QUALITY_MAX, DETECTION_QUALITY_MIN,
};
use autotap_core::ports::display::DisplayRecorder;
use autotap_engine::engine::{DetectorEngine, EngineDeps};
use autotap_engine::input_executor::create_action_executor;
use autotap_engine::try_element::ImageEventTry;
use autotap_vision::bitmap_cache::CachedBitmapSupplier;
use autotap_vision::detector::NoOpScreenDetectorFactory;
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::lifecycle::{run_until_stopped, ShutdownReason};
use crate::listener::LoggingListener;
use crate::replay::{parse_screen_size, ReplayRecorder, StaticDisplay};

/// autotap 시나리오 실행기
///
/// 화면 이미지 검출 기반 자동 클릭 시나리오를 실행한다
#[derive(Parser, Debug)]
#[command(name = "autotap")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 시나리오 파일 (JSON, 시나리오 + 이벤트 목록)
    #[arg(long, short = 's', required_unless_present = "print_config")]
    scenario: Option<PathBuf>,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 조건 이미지 기준 디렉토리 (기본: 시나리오 파일 위치)
    #[arg(long)]
    images_dir: Option<PathBuf>,

    /// 재생할 스크린샷 디렉토리 (없으면 빈 화면)
    #[arg(long, short = 'f')]
    frames: Option<PathBuf>,

    /// 프레임 간격 (밀리초)
    #[arg(long, default_value = "100")]
    frame_interval: u64,

    /// 화면 크기 (WIDTHxHEIGHT)
    #[arg(long, default_value = "1920x1080", value_parser = parse_screen_size)]
    screen: Size,

    /// 로그 레벨 (trace, debug, info, warn, error). 기본: 설정 파일
    #[arg(long, short = 'l')]
    log_level: Option<String>,

    /// 자동 정지 시간 (초)
    #[arg(long)]
    auto_stop: Option<u64>,

    /// 검출 품질 재정의 (긴 변 기준 픽셀)
    #[arg(
        long,
        short = 'q',
        value_parser = clap::value_parser!(u32)
            .range(DETECTION_QUALITY_MIN as i64..=DETECTION_QUALITY_MAX as i64)
    )]
    quality: Option<u32>,

    /// 입력 백엔드 재정의
    #[arg(long, value_enum)]
    input: Option<InputArg>,

    /// 이미지 이벤트 하나만 시험 실행 (이벤트 id)
    #[arg(long)]
    try_event: Option<i64>,

    /// 적용된 설정을 출력하고 종료
    #[arg(long)]
    print_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputArg {
    Noop,
    Enigo,
}

impl From<InputArg> for InputBackend {
    fn from(value: InputArg) -> Self {
        match value {
            InputArg::Noop => InputBackend::Noop,
            InputArg::Enigo => InputBackend::Enigo,
        }
    }
}

/// CLI 재정의를 설정에 반영
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(secs) = args.auto_stop {
        config.processing.auto_stop_secs = Some(secs);
    }
    if let Some(input) = args.input {
        config.input.backend = input.into();
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
}

/// 시나리오 파일 로드
fn load_scenario(path: &Path) -> Result<ScenarioBundle> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("시나리오 파일 읽기 실패: {}", path.display()))?;
    let bundle: ScenarioBundle = serde_json::from_str(&content)
        .with_context(|| format!("시나리오 파싱 실패: {}", path.display()))?;
    Ok(bundle)
}

/// 조건 이미지 기준 디렉토리 결정
fn resolve_images_dir(images_dir: Option<&Path>, scenario_path: &Path) -> Result<PathBuf> {
    if let Some(dir) = images_dir {
        return Ok(dir.to_path_buf());
    }
    match scenario_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
        Some(_) => Ok(PathBuf::from(".")),
        None => Ok(ConfigManager::data_dir()?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_manager = match &args.config {
        Some(path) => ConfigManager::with_path(path.clone())?,
        None => ConfigManager::new()?,
    };
    let mut config = config_manager.get();
    apply_overrides(&mut config, &args);

    let log_filter = format!(
        "autotap_app={level},autotap_engine={level},autotap_vision={level},autotap_core={level}",
        level = config.logging.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let scenario_path = args
        .scenario
        .as_deref()
        .ok_or_else(|| anyhow!("--scenario 필요"))?;
    let mut bundle = load_scenario(scenario_path)?;
    if let Some(quality) = args.quality {
        bundle.scenario.detection_quality = quality;
    }

    info!(
        scenario = %bundle.scenario.name,
        config = %config_manager.config_path().display(),
        "autotap 시작"
    );

    // ── 어댑터 ──
    let images_dir = resolve_images_dir(args.images_dir.as_deref(), scenario_path)?;
    let interval = Duration::from_millis(args.frame_interval);
    let recorder: Arc<dyn DisplayRecorder> = match &args.frames {
        Some(dir) => Arc::new(ReplayRecorder::from_dir(dir, interval)?),
        None => {
            warn!("--frames 미지정: 빈 화면으로 실행");
            Arc::new(ReplayRecorder::blank(interval))
        }
    };
    let listener = Arc::new(LoggingListener::new());

    let deps = EngineDeps {
        display: Arc::new(StaticDisplay::new(args.screen)),
        recorder,
        detectors: Arc::new(NoOpScreenDetectorFactory),
        bitmaps: Arc::new(CachedBitmapSupplier::new(
            images_dir,
            config.detection.bitmap_cache_size,
        )),
        executor: create_action_executor(config.input.backend)?,
        listener: listener.clone(),
        detection: config.detection.clone(),
        processing: config.processing.clone(),
    };

    // ── 엔진 ──
    let (engine, engine_task) = DetectorEngine::spawn(deps);
    let state_rx = engine.subscribe_state();
    engine.start_screen_record().await?;

    let started = match args.try_event {
        Some(event_id) => {
            let event_id = Identifier::Database(event_id);
            let event = bundle
                .image_events
                .iter()
                .find(|e| e.id == event_id)
                .cloned()
                .ok_or_else(|| anyhow!("이미지 이벤트 {event_id} 없음"))?;
            engine
                .try_element(ImageEventTry::new(bundle.scenario.clone(), event))
                .await
        }
        None => engine.start_detection(bundle, None).await,
    };

    if let Err(e) = started {
        error!("검출 시작 실패: {e}");
        engine.shutdown().await?;
        let _ = engine_task.await;
        return Err(e.into());
    }

    let reason = run_until_stopped(state_rx).await;

    // ── 종료 ──
    if reason != ShutdownReason::EngineStopped {
        if let Err(e) = engine.shutdown().await {
            warn!("엔진 종료 실패: {e}");
        }
    }
    drop(engine);
    if let Err(e) = engine_task.await {
        warn!("엔진 태스크 종료 에러: {e}");
    }

    let stats = listener.stats();
    info!(
        image_passes = stats.image_passes,
        image_events = stats.image_events_fulfilled,
        trigger_events = stats.trigger_events_fulfilled,
        "autotap 종료"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_to_config() {
        let args = Args::parse_from([
            "autotap",
            "--scenario",
            "s.json",
            "--auto-stop",
            "30",
            "--input",
            "enigo",
            "-l",
            "debug",
        ]);
        let mut config = AppConfig::default_config();
        apply_overrides(&mut config, &args);

        assert_eq!(config.processing.auto_stop(), Some(Duration::from_secs(30)));
        assert_eq!(config.input.backend, InputBackend::Enigo);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(args.screen, Size::new(1920, 1080));
    }

    #[test]
    fn scenario_is_required_unless_printing_config() {
        assert!(Args::try_parse_from(["autotap"]).is_err());
        assert!(Args::try_parse_from(["autotap", "--print-config"]).is_ok());
    }

    #[test]
    fn quality_override_is_range_checked() {
        let args = Args::try_parse_from(["autotap", "-s", "s.json", "-q", "800"]).unwrap();
        assert_eq!(args.quality, Some(800));
        assert!(Args::try_parse_from(["autotap", "-s", "s.json", "-q", "100"]).is_err());
        assert!(Args::try_parse_from(["autotap", "-s", "s.json", "-q", "20000"]).is_err());
    }

    #[test]
    fn images_dir_defaults_to_scenario_parent() {
        let dir = resolve_images_dir(None, Path::new("/tmp/scenarios/game.json")).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/scenarios"));
        let dir = resolve_images_dir(None, Path::new("game.json")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        let dir = resolve_images_dir(Some(Path::new("/imgs")), Path::new("game.json")).unwrap();
        assert_eq!(dir, PathBuf::from("/imgs"));
    }

    #[test]
    fn load_scenario_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{").unwrap();
        assert!(load_scenario(&path).is_err());
        assert!(load_scenario(&dir.path().join("missing.json")).is_err());
    }
}
