//! 조건 비트맵 공급자 포트.

use async_trait::async_trait;

use crate::models::bitmap::Bitmap;

/// 조건 이미지 로더.
///
/// 구현: `autotap-vision::bitmap_cache::CachedBitmapSupplier` (디스크 + LRU 캐시)
#[async_trait]
pub trait BitmapSupplier: Send + Sync {
    /// `path` 이미지를 `width`x`height`(검출 공간 크기)로 로드.
    /// 로드 실패 시 `None` (조건은 미검출로 처리된다).
    async fn get_condition_bitmap(&self, path: &str, width: i32, height: i32) -> Option<Bitmap>;

    /// 캐시 비우기 (세션 시작 시 호출)
    fn clear_cache(&self) {}
}
