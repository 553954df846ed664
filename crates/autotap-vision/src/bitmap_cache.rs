//! 조건 비트맵 공급자 (디스크 로드 + LRU 캐싱).
//!
//! 조건 이미지를 `image`로 디코딩해 검출 공간 크기로 리사이즈한다.
//! 동일 (경로, 너비, 높이) 요청은 캐시에서 바로 반환한다.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use autotap_core::models::bitmap::Bitmap;
use autotap_core::ports::bitmap_supplier::BitmapSupplier;
use image::imageops::FilterType;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::VisionError;

/// 캐시 키: (경로, 너비, 높이)
type CacheKey = (String, i32, i32);

/// 캐시 최소 크기
const MIN_CAPACITY: NonZeroUsize = NonZeroUsize::MIN;

/// 디스크 기반 조건 비트맵 공급자
pub struct CachedBitmapSupplier {
    /// 조건 이미지 경로의 기준 디렉토리
    root: PathBuf,
    cache: Mutex<LruCache<CacheKey, Bitmap>>,
}

impl CachedBitmapSupplier {
    pub fn new(root: impl Into<PathBuf>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(MIN_CAPACITY);
        Self {
            root: root.into(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// 캐시된 항목 수
    pub fn cached_count(&self) -> usize {
        self.cache.lock().len()
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }
}

/// 이미지 로드 후 `width`x`height`로 리사이즈
pub fn load_bitmap(path: &Path, width: i32, height: i32) -> Result<Bitmap, VisionError> {
    if width <= 0 || height <= 0 {
        return Err(VisionError::InvalidSize { width, height });
    }
    let (width, height) = (width as u32, height as u32);

    let image = image::open(path)?;
    let rgba = if image.width() == width && image.height() == height {
        image.to_rgba8()
    } else {
        image
            .resize_exact(width, height, FilterType::Triangle)
            .to_rgba8()
    };

    Bitmap::from_rgba(width, height, rgba.into_raw()).ok_or(VisionError::InvalidSize {
        width: width as i32,
        height: height as i32,
    })
}

#[async_trait]
impl BitmapSupplier for CachedBitmapSupplier {
    async fn get_condition_bitmap(&self, path: &str, width: i32, height: i32) -> Option<Bitmap> {
        let key: CacheKey = (path.to_string(), width, height);
        if let Some(bitmap) = self.cache.lock().get(&key) {
            return Some(bitmap.clone());
        }

        let full_path = self.resolve(path);
        let result = tokio::task::spawn_blocking(move || load_bitmap(&full_path, width, height))
            .await
            .map_err(|e| VisionError::Async(e.to_string()))
            .and_then(|r| r);

        match result {
            Ok(bitmap) => {
                debug!(path, width, height, "조건 비트맵 로드");
                self.cache.lock().put(key, bitmap.clone());
                Some(bitmap)
            }
            Err(e) => {
                warn!(path, width, height, "조건 비트맵 로드 실패: {e}");
                None
            }
        }
    }

    fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}
