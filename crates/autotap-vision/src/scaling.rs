//! 좌표/영역 스케일링 유틸리티.
//!
//! 반올림 규칙: `floor(x + 0.5)` (음수에도 동일 적용, `-2.5 → -2`).
//! 사각형은 left/top/width/height를 각각 반올림한 뒤
//! `right = left + width`, `bottom = top + height`로 재구성한다.

use autotap_core::models::geometry::{Point, Rect, Size};

/// 비율 기반 스케일링
pub trait Scale {
    fn scale(&self, ratio: f64) -> Self;
}

impl Scale for Point {
    fn scale(&self, ratio: f64) -> Self {
        if ratio == 1.0 {
            return *self;
        }
        Point::new(
            round_half_up(self.x as f64 * ratio),
            round_half_up(self.y as f64 * ratio),
        )
    }
}

impl Scale for Size {
    fn scale(&self, ratio: f64) -> Self {
        if ratio == 1.0 {
            return *self;
        }
        Size::new(
            round_half_up(self.width as f64 * ratio),
            round_half_up(self.height as f64 * ratio),
        )
    }
}

impl Scale for Rect {
    fn scale(&self, ratio: f64) -> Self {
        if ratio == 1.0 {
            return *self;
        }
        let left = round_half_up(self.left as f64 * ratio);
        let top = round_half_up(self.top as f64 * ratio);
        let width = round_half_up(self.width() as f64 * ratio);
        let height = round_half_up(self.height() as f64 * ratio);
        Rect::new(left, top, left + width, top + height)
    }
}

/// 반올림 (0.5는 +방향)
#[inline]
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// 각 변을 `grow`만큼 넓힌 뒤 `bounds` 안으로 제한.
///
/// 음수 `grow`는 축소이며, 결과가 뒤집혀도(right < left) 보정하지 않는다.
pub fn grow(rect: &Rect, bounds: &Rect, grow: i32) -> Rect {
    let clamp_x = |x: i32| x.max(bounds.left).min(bounds.right);
    let clamp_y = |y: i32| y.max(bounds.top).min(bounds.bottom);
    Rect::new(
        clamp_x(rect.left - grow),
        clamp_y(rect.top - grow),
        clamp_x(rect.right + grow),
        clamp_y(rect.bottom + grow),
    )
}

/// 원점에서 `point`까지의 영역
pub fn to_area(point: Point) -> Rect {
    Rect::new(0, 0, point.x, point.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_rule() {
        assert_eq!(round_half_up(7.5), 8);
        assert_eq!(round_half_up(8.25), 8);
        assert_eq!(round_half_up(7.7), 8);
        assert_eq!(round_half_up(8.8), 9);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
    }

    #[test]
    fn to_area_from_origin() {
        assert_eq!(to_area(Point::new(100, 200)), Rect::new(0, 0, 100, 200));
        assert_eq!(to_area(Point::new(0, 0)), Rect::new(0, 0, 0, 0));
        assert_eq!(to_area(Point::new(0, 50)), Rect::new(0, 0, 0, 50));
        assert_eq!(to_area(Point::new(50, 0)), Rect::new(0, 0, 50, 0));
    }

    #[test]
    fn scale_point() {
        assert_eq!(Point::new(10, 20).scale(1.0), Point::new(10, 20));
        assert_eq!(Point::new(10, 20).scale(2.0), Point::new(20, 40));
        assert_eq!(Point::new(15, 11).scale(0.5), Point::new(8, 6));
    }

    #[test]
    fn scale_rect_identity_and_ratios() {
        assert_eq!(Rect::new(10, 20, 30, 40).scale(1.0), Rect::new(10, 20, 30, 40));
        assert_eq!(Rect::new(10, 20, 30, 50).scale(2.0), Rect::new(20, 40, 60, 100));
        assert_eq!(
            Rect::new(100, 200, 140, 280).scale(0.5),
            Rect::new(50, 100, 70, 140)
        );
        assert_eq!(Rect::new(0, 0, 10, 20).scale(1.5), Rect::new(0, 0, 15, 30));
        assert_eq!(Rect::new(0, 0, 0, 0).scale(0.5), Rect::new(0, 0, 0, 0));
    }

    #[test]
    fn scale_rect_rounds_each_component() {
        assert_eq!(Rect::new(10, 11, 21, 33).scale(0.75), Rect::new(8, 8, 16, 25));
        assert_eq!(Rect::new(10, 10, 11, 11).scale(0.1), Rect::new(1, 1, 1, 1));
    }

    #[test]
    fn scale_rect_zero_dimensions() {
        assert_eq!(Rect::new(10, 20, 10, 40).scale(2.0), Rect::new(20, 40, 20, 80));
        assert_eq!(Rect::new(10, 20, 30, 20).scale(2.0), Rect::new(20, 40, 60, 40));
        assert_eq!(Rect::new(10, 20, 30, 50).scale(0.0), Rect::new(0, 0, 0, 0));
    }

    #[test]
    fn grow_within_bounds() {
        let bounds = Rect::new(0, 0, 100, 100);
        let rect = Rect::new(10, 20, 30, 40);
        assert_eq!(grow(&rect, &bounds, 1), Rect::new(9, 19, 31, 41));
        assert_eq!(grow(&rect, &bounds, 5), Rect::new(5, 15, 35, 45));
        assert_eq!(grow(&rect, &bounds, 0), rect);
        assert_eq!(grow(&rect, &bounds, -5), Rect::new(15, 25, 25, 35));
    }

    #[test]
    fn grow_clamps_to_bounds() {
        let bounds = Rect::new(0, 0, 100, 100);
        assert_eq!(
            grow(&Rect::new(5, 20, 30, 40), &bounds, 10),
            Rect::new(0, 10, 40, 50)
        );
        assert_eq!(
            grow(&Rect::new(70, 20, 95, 40), &bounds, 10),
            Rect::new(60, 10, 100, 50)
        );
        assert_eq!(
            grow(&Rect::new(10, 70, 30, 95), &bounds, 10),
            Rect::new(0, 60, 40, 100)
        );
        assert_eq!(grow(&Rect::new(5, 5, 95, 95), &bounds, 10), bounds);
        assert_eq!(grow(&bounds, &bounds, 5), bounds);
    }

    #[test]
    fn grow_outside_bounds_collapses() {
        let bounds = Rect::new(0, 0, 100, 100);
        assert_eq!(
            grow(&Rect::new(-20, -20, -10, -10), &bounds, 5),
            Rect::new(0, 0, 0, 0)
        );
        assert_eq!(
            grow(&Rect::new(110, 110, 120, 120), &bounds, 5),
            Rect::new(100, 100, 100, 100)
        );
        let small_bounds = Rect::new(50, 50, 150, 150);
        assert_eq!(
            grow(&Rect::new(0, 0, 200, 200), &small_bounds, 10),
            small_bounds
        );
    }

    #[test]
    fn negative_grow_may_invert() {
        let bounds = Rect::new(0, 0, 100, 100);
        assert_eq!(
            grow(&Rect::new(10, 20, 15, 40), &bounds, -3),
            Rect::new(13, 23, 12, 37)
        );
    }
}
