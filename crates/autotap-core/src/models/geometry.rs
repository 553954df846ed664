//! 화면 좌표계 기하 타입.
//!
//! 모든 좌표는 픽셀 단위 정수. `Rect`는 좌/상/우/하 경계를 저장하며
//! 우/하 경계는 영역에 포함되지 않는다.

use serde::{Deserialize, Serialize};

/// 화면 좌표
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// 좌표 오프셋 적용
    pub fn offset(&self, offset: Point) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y)
    }
}

/// 화면/이미지 크기
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// 긴 변 길이
    pub fn max_side(&self) -> i32 {
        self.width.max(self.height)
    }

    /// 두 변 모두 양수인지
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// 직사각형 영역 (left, top, right, bottom)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// 원점 기준 크기로 생성
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// 영역 중심 좌표
    pub fn center(&self) -> Point {
        Point::new(
            self.left + self.width() / 2,
            self.top + self.height() / 2,
        )
    }

    /// 폭 또는 높이가 0 이하인 영역
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// 다른 영역을 완전히 포함하는지
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_dimensions() {
        let rect = Rect::new(10, 20, 30, 60);
        assert_eq!(rect.width(), 20);
        assert_eq!(rect.height(), 40);
        assert_eq!(rect.center(), Point::new(20, 40));
        assert!(!rect.is_empty());
    }

    #[test]
    fn inverted_rect_is_empty() {
        assert!(Rect::new(13, 23, 12, 37).is_empty());
        assert!(Rect::default().is_empty());
    }

    #[test]
    fn size_max_side() {
        assert_eq!(Size::new(1000, 2000).max_side(), 2000);
        assert!(!Size::new(0, 10).is_valid());
    }

    #[test]
    fn contains_rect_is_inclusive_on_edges() {
        let bounds = Rect::new(0, 0, 100, 100);
        assert!(bounds.contains_rect(&bounds));
        assert!(!bounds.contains_rect(&Rect::new(-1, 0, 10, 10)));
    }
}
