//! 화면 어댑터: 고정 크기 디스플레이 + 스크린샷 재생 녹화기.
//!
//! 실제 화면 녹화 대신 디렉토리의 스크린샷을 순서대로(끝나면 처음부터) 프레임으로 공급한다.
//! 디렉토리가 없으면 단색 프레임을 공급한다.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use autotap_core::error::CoreError;
use autotap_core::models::bitmap::Bitmap;
use autotap_core::models::geometry::Size;
use autotap_core::ports::display::{DisplayMetrics, DisplayRecorder, FrameSource};
use autotap_vision::bitmap_cache::load_bitmap;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// 재생 대상 확장자
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// 빈 화면 색 (RGBA)
const BLANK_RGBA: [u8; 4] = [0, 0, 0, 255];

// ============================================================
// 디스플레이
// ============================================================

/// CLI로 지정한 크기를 보고하는 디스플레이
pub struct StaticDisplay {
    size: Size,
}

impl StaticDisplay {
    pub fn new(size: Size) -> Self {
        Self { size }
    }
}

impl DisplayMetrics for StaticDisplay {
    fn screen_size(&self) -> Size {
        self.size
    }
}

/// `1920x1080` 형식 파싱
pub fn parse_screen_size(value: &str) -> Result<Size, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("'{value}': WIDTHxHEIGHT 형식이어야 합니다"))?;
    let width: i32 = width
        .trim()
        .parse()
        .map_err(|e| format!("너비 파싱 실패: {e}"))?;
    let height: i32 = height
        .trim()
        .parse()
        .map_err(|e| format!("높이 파싱 실패: {e}"))?;
    let size = Size::new(width, height);
    if !size.is_valid() {
        return Err(format!("'{value}': 크기는 0보다 커야 합니다"));
    }
    Ok(size)
}

// ============================================================
// 녹화기
// ============================================================

struct ReplayState {
    /// 녹화 중 프레임 크기 (`None`이면 정지 상태)
    size: Option<Size>,
    cursor: usize,
    last_frame_at: Option<Instant>,
}

/// 스크린샷 재생 녹화기
pub struct ReplayRecorder {
    frames: Vec<PathBuf>,
    /// 프레임 간 최소 간격
    interval: Duration,
    state: Mutex<ReplayState>,
}

impl ReplayRecorder {
    /// 단색 프레임만 공급하는 녹화기
    pub fn blank(interval: Duration) -> Self {
        Self::with_frames(Vec::new(), interval)
    }

    /// 디렉토리의 이미지 파일을 이름순으로 재생
    pub fn from_dir(dir: &Path, interval: Duration) -> Result<Self, CoreError> {
        let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_frame_file(path))
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(CoreError::Validation {
                field: "frames".to_string(),
                message: format!("재생할 이미지가 없습니다: {}", dir.display()),
            });
        }
        info!(count = frames.len(), dir = %dir.display(), "재생 프레임 로드");
        Ok(Self::with_frames(frames, interval))
    }

    fn with_frames(frames: Vec<PathBuf>, interval: Duration) -> Self {
        Self {
            frames,
            interval,
            state: Mutex::new(ReplayState {
                size: None,
                cursor: 0,
                last_frame_at: None,
            }),
        }
    }

    /// 다음 프레임 차례면 (경로, 크기) 반환
    fn next_slot(&self) -> Option<(Option<PathBuf>, Size)> {
        let mut state = self.state.lock();
        let size = state.size?;
        let now = Instant::now();
        if let Some(last) = state.last_frame_at {
            if now.duration_since(last) < self.interval {
                return None;
            }
        }
        state.last_frame_at = Some(now);

        if self.frames.is_empty() {
            return Some((None, size));
        }
        let path = self.frames[state.cursor % self.frames.len()].clone();
        state.cursor = (state.cursor + 1) % self.frames.len();
        Some((Some(path), size))
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[async_trait]
impl FrameSource for ReplayRecorder {
    async fn acquire_latest_frame(&self) -> Option<Bitmap> {
        let (path, size) = self.next_slot()?;
        let Some(path) = path else {
            return Some(Bitmap::filled(
                size.width as u32,
                size.height as u32,
                BLANK_RGBA,
            ));
        };

        let loaded = tokio::task::spawn_blocking({
            let path = path.clone();
            move || load_bitmap(&path, size.width, size.height)
        })
        .await;

        match loaded {
            Ok(Ok(bitmap)) => Some(bitmap),
            Ok(Err(e)) => {
                warn!(path = %path.display(), "프레임 로드 실패: {e}");
                None
            }
            Err(e) => {
                warn!("프레임 로드 태스크 실패: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl DisplayRecorder for ReplayRecorder {
    async fn start_projection(&self, size: Size) -> Result<(), CoreError> {
        if !size.is_valid() {
            return Err(CoreError::Validation {
                field: "screen_size".to_string(),
                message: format!("{}x{}", size.width, size.height),
            });
        }
        let mut state = self.state.lock();
        state.size = Some(size);
        state.last_frame_at = None;
        debug!(width = size.width, height = size.height, "재생 녹화 시작");
        Ok(())
    }

    async fn resize_display(&self, size: Size) {
        self.state.lock().size = Some(size);
        debug!(width = size.width, height = size.height, "재생 프레임 크기 변경");
    }

    async fn stop_projection(&self) {
        let mut state = self.state.lock();
        state.size = None;
        state.cursor = 0;
        debug!("재생 녹화 정지");
    }
}
