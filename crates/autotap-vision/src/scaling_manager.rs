//! 검출 해상도 스케일링 관리자.
//!
//! 검출 품질 예산(긴 변 픽셀 수)과 현재 화면 크기로 스케일 비율을 계산하고,
//! 모든 이미지 조건의 검출 공간 좌표(이미지 영역, 검출 영역)를 미리 만들어 둔다.
//!
//! 세션당 한 번 `start_scaling`, 화면 크기 변경 시 `refresh_scaling`,
//! 세션 종료 시 `stop_scaling`을 호출한다.

use std::collections::HashMap;
use std::sync::Arc;

use autotap_core::models::condition::{DetectionType, ImageCondition};
use autotap_core::models::event::ImageEvent;
use autotap_core::models::geometry::{Point, Rect, Size};
use autotap_core::models::identifier::Identifier;
use autotap_core::ports::display::DisplayMetrics;
use tracing::{debug, info};

use crate::scaling::{grow, round_half_up, Scale};

/// 검출 영역 확장 픽셀 (경계 반올림 오차 흡수)
const DETECTION_AREA_GROW: i32 = 1;

/// 이미지 조건별 검출 공간 좌표
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionScalingInfo {
    pub image_condition: ImageCondition,
    /// 스케일된 캡처 영역 (조건 비트맵 크기 결정)
    pub image_area: Rect,
    /// 스케일된 검출 영역
    pub detection_area: Rect,
}

/// 스케일링 관리자
pub struct ScalingManager {
    display: Arc<dyn DisplayMetrics>,
    /// 마지막 `start_scaling` 품질
    quality: Option<u32>,
    /// 재계산용 이미지 조건 목록
    conditions: Vec<ImageCondition>,
    ratio: f64,
    scaled_screen_size: Size,
    infos: HashMap<Identifier, ConditionScalingInfo>,
}

impl ScalingManager {
    pub fn new(display: Arc<dyn DisplayMetrics>) -> Self {
        Self {
            display,
            quality: None,
            conditions: Vec::new(),
            ratio: 1.0,
            scaled_screen_size: Size::default(),
            infos: HashMap::new(),
        }
    }

    /// 스케일링 시작. 검출 공간 화면 크기를 반환한다.
    pub fn start_scaling(&mut self, quality: u32, image_events: &[ImageEvent]) -> Size {
        self.quality = Some(quality);
        self.conditions = image_events
            .iter()
            .flat_map(|event| event.conditions.iter().cloned())
            .collect();
        self.rebuild(quality)
    }

    /// 현재 화면 크기로 재계산 (회전 등). 시작 전이면 화면 크기 그대로 반환.
    pub fn refresh_scaling(&mut self) -> Size {
        match self.quality {
            Some(quality) => self.rebuild(quality),
            None => self.display.screen_size(),
        }
    }

    /// 스케일링 종료. 이후 조회는 모두 `None`.
    pub fn stop_scaling(&mut self) {
        self.quality = None;
        self.conditions.clear();
        self.infos.clear();
        self.ratio = 1.0;
        self.scaled_screen_size = Size::default();
        debug!("스케일링 종료");
    }

    /// 조건의 검출 공간 좌표 조회
    pub fn get_image_condition_scaling_info(
        &self,
        condition: &ImageCondition,
    ) -> Option<&ConditionScalingInfo> {
        self.infos.get(&condition.id)
    }

    /// 검출 공간 좌표 → 실제 화면 좌표
    pub fn scale_up_detection_result(&self, position: Point) -> Point {
        if self.ratio == 1.0 {
            return position;
        }
        Point::new(
            round_half_up(position.x as f64 / self.ratio),
            round_half_up(position.y as f64 / self.ratio),
        )
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn scaled_screen_size(&self) -> Size {
        self.scaled_screen_size
    }

    fn rebuild(&mut self, quality: u32) -> Size {
        let screen_size = self.display.screen_size();
        self.ratio = scaling_ratio(quality, screen_size);
        self.scaled_screen_size = screen_size.scale(self.ratio);

        let screen_rect = Rect::from_size(self.scaled_screen_size);
        let ratio = self.ratio;
        self.infos = self
            .conditions
            .iter()
            .map(|condition| {
                (
                    condition.id,
                    condition_scaling_info(condition, ratio, &screen_rect),
                )
            })
            .collect();

        info!(
            quality,
            ratio = self.ratio,
            screen_width = screen_size.width,
            screen_height = screen_size.height,
            scaled_width = self.scaled_screen_size.width,
            scaled_height = self.scaled_screen_size.height,
            conditions = self.infos.len(),
            "검출 스케일링 계산"
        );
        self.scaled_screen_size
    }
}

/// `min(1.0, quality / max(w, h))`. 화면 또는 품질이 0이면 1.0.
fn scaling_ratio(quality: u32, screen_size: Size) -> f64 {
    let max_side = screen_size.max_side();
    if quality == 0 || max_side <= 0 {
        return 1.0;
    }
    (quality as f64 / max_side as f64).min(1.0)
}

fn condition_scaling_info(
    condition: &ImageCondition,
    ratio: f64,
    screen_rect: &Rect,
) -> ConditionScalingInfo {
    let image_area = condition.area.scale(ratio);
    let detection_area = match condition.detection_type {
        DetectionType::Exact => grow(&image_area, screen_rect, DETECTION_AREA_GROW),
        DetectionType::WholeScreen => *screen_rect,
        DetectionType::InArea => match condition.detection_area {
            Some(area) => grow(&area.scale(ratio), screen_rect, DETECTION_AREA_GROW),
            None => *screen_rect,
        },
    };

    ConditionScalingInfo {
        image_condition: condition.clone(),
        image_area,
        detection_area,
    }
}
