//! 비트맵 (스크린 프레임, 조건 이미지).
//!
//! 픽셀 버퍼는 `Arc`로 공유되어 프레임 전달 시 복사가 발생하지 않는다.

use std::fmt;
use std::sync::Arc;

use super::geometry::Size;

/// RGBA8 비트맵
#[derive(Clone)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl Bitmap {
    /// RGBA8 픽셀 버퍼로 생성. 버퍼 길이가 맞지 않으면 `None`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if pixels.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// 단색 비트맵 (테스트/플레이스홀더)
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels: Vec<u8> = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as i32, self.height as i32)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba_checks_buffer_length() {
        assert!(Bitmap::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(Bitmap::from_rgba(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn filled_bitmap_has_expected_size() {
        let bitmap = Bitmap::filled(3, 2, [1, 2, 3, 4]);
        assert_eq!(bitmap.size(), Size::new(3, 2));
        assert_eq!(bitmap.pixels().len(), 24);
        assert_eq!(&bitmap.pixels()[4..8], &[1, 2, 3, 4]);
    }
}
