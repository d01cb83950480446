//! 齿轮：多段短弧先放大、修剪旋转，再缩小消失

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{DEFAULT_CENTER_RADIUS, DEFAULT_STROKE_WIDTH, RingTrim};
use crate::canvas::{Cap, Paint, Surface};
use crate::config::{CommonConfig, RendererConfig, merge_color, merge_count, merge_positive};
use crate::easing::Easing;
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Rect};
use crate::renderer::{LoadingRenderer, RendererBase, ring_stroke_inset};

const GEAR_COUNT: usize = 4;
/// 齿数上限，超过后齿间距不足 1°
const MAX_GEAR_COUNT: usize = 360;
const NUM_POINTS: f32 = 3.0;
const DEFAULT_GEAR_SWIPE_DEGREES: f32 = 60.0;

const START_SCALE_DURATION_OFFSET: f32 = 0.3;
const START_TRIM_DURATION_OFFSET: f32 = 0.5;
const END_TRIM_DURATION_OFFSET: f32 = 0.7;
const END_SCALE_DURATION_OFFSET: f32 = 1.0;

/// Gear 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GearConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// 齿数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gear_count: Option<i64>,
    /// 每个齿在一轮内前进的角度
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gear_swipe_degrees: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct GearRenderer {
    base: RendererBase,

    color: Color,
    gear_count: usize,
    gear_swipe_degrees: f32,
    stroke_width: f32,
    center_radius: f32,

    trim: RingTrim,
    scale: f32,
    swipe_degrees: f32,
}

impl Default for GearRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GearRenderer {
    pub fn new() -> Self {
        Self {
            base: RendererBase::default(),
            color: Color::WHITE,
            gear_count: GEAR_COUNT,
            gear_swipe_degrees: DEFAULT_GEAR_SWIPE_DEGREES,
            stroke_width: DEFAULT_STROKE_WIDTH,
            center_radius: DEFAULT_CENTER_RADIUS,
            trim: RingTrim::default(),
            scale: 0.0,
            swipe_degrees: 0.0,
        }
    }

    /// 当前缩放
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// 当前整组旋转角度
    pub fn group_rotation(&self) -> f32 {
        self.trim.group_rotation
    }

    pub fn start_degrees(&self) -> f32 {
        self.trim.start_degrees
    }

    pub fn end_degrees(&self) -> f32 {
        self.trim.end_degrees
    }
}

impl LoadingRenderer for GearRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Gear
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::Gear(gear) = config else {
            return Err(config.mismatch(RendererKind::Gear));
        };
        gear.common.apply_to(&mut self.base);
        merge_positive(&mut self.stroke_width, gear.stroke_width, "stroke_width");
        merge_positive(&mut self.center_radius, gear.center_radius, "center_radius");
        merge_color(&mut self.color, gear.color);
        merge_count(&mut self.gear_count, gear.gear_count, "gear_count");
        if self.gear_count > MAX_GEAR_COUNT {
            warn!(
                field = "gear_count",
                value = self.gear_count,
                max = MAX_GEAR_COUNT,
                "齿数过多，已截断到上限"
            );
            self.gear_count = MAX_GEAR_COUNT;
        }
        merge_positive(
            &mut self.gear_swipe_degrees,
            gear.gear_swipe_degrees,
            "gear_swipe_degrees",
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.trim.reset();
        self.swipe_degrees = 1.0;
    }

    fn on_cycle_start(&mut self) {
        self.trim.on_start();
    }

    fn on_cycle_repeat(&mut self) {
        self.trim.on_repeat(NUM_POINTS);
    }

    fn compute_render(&mut self, progress: f32) {
        // 0 ~ 30%：放大
        if progress <= START_SCALE_DURATION_OFFSET {
            let start_scale_progress = progress / START_SCALE_DURATION_OFFSET;
            self.scale = Easing::DECELERATE.apply(start_scale_progress);
        }

        // 30% ~ 50%：起点前进
        if progress <= START_TRIM_DURATION_OFFSET && progress > START_SCALE_DURATION_OFFSET {
            let start_trim_progress = (progress - START_SCALE_DURATION_OFFSET)
                / (START_TRIM_DURATION_OFFSET - START_SCALE_DURATION_OFFSET);
            self.trim.start_degrees =
                self.trim.origin_start_degrees + self.gear_swipe_degrees * start_trim_progress;
        }

        // 50% ~ 70%：终点追赶
        if progress <= END_TRIM_DURATION_OFFSET && progress > START_TRIM_DURATION_OFFSET {
            let end_trim_progress = (progress - START_TRIM_DURATION_OFFSET)
                / (END_TRIM_DURATION_OFFSET - START_TRIM_DURATION_OFFSET);
            self.trim.end_degrees =
                self.trim.origin_end_degrees + self.gear_swipe_degrees * end_trim_progress;
        }

        // 70% ~ 100%：缩小
        if progress > END_TRIM_DURATION_OFFSET {
            let end_scale_progress = (progress - END_TRIM_DURATION_OFFSET)
                / (END_SCALE_DURATION_OFFSET - END_TRIM_DURATION_OFFSET);
            self.scale = 1.0 - Easing::ACCELERATE.apply(end_scale_progress);
        }

        if progress <= END_TRIM_DURATION_OFFSET && progress > START_SCALE_DURATION_OFFSET {
            let rotate_progress = (progress - START_SCALE_DURATION_OFFSET)
                / (END_TRIM_DURATION_OFFSET - START_SCALE_DURATION_OFFSET);
            self.trim.group_rotation = self.trim.rotation(NUM_POINTS, rotate_progress);
        }

        if (self.trim.end_degrees - self.trim.start_degrees).abs() > 0.0 {
            self.swipe_degrees = self.trim.end_degrees - self.trim.start_degrees;
        }
    }

    fn draw(&self, surface: &mut dyn Surface, bounds: Rect) {
        let save_count = surface.save();

        let stroke_inset = ring_stroke_inset(
            self.base.width,
            self.base.height,
            self.center_radius,
            self.stroke_width,
        );
        let ring = bounds.inset(stroke_inset, stroke_inset);
        let shrink = ring.width() * (1.0 - self.scale) / 2.0;
        let ring = ring.inset(shrink, shrink);

        surface.rotate(self.trim.group_rotation, ring.center_x(), ring.center_y());

        let paint = Paint::stroke(self.color, self.stroke_width * self.scale)
            .with_cap(Cap::Round)
            .with_alpha((255.0 * self.scale) as i32)
            .with_color_filter(self.base.color_filter);

        if self.swipe_degrees != 0.0 {
            // 齿间距按整数度计算
            let spacing = (360 / self.gear_count) as f32;
            for i in 0..self.gear_count {
                surface.draw_arc(
                    ring,
                    self.trim.start_degrees + spacing * i as f32,
                    self.swipe_degrees,
                    false,
                    &paint,
                );
            }
        }

        surface.restore_to_count(save_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};

    fn started() -> GearRenderer {
        let mut renderer = GearRenderer::new();
        renderer.on_bounds_changed(Rect::from_size(56.0, 56.0));
        renderer.reset();
        renderer.on_cycle_start();
        renderer
    }

    #[test]
    fn test_scale_ramps_up_in_first_30_percent() {
        let mut renderer = started();
        renderer.compute_render(0.0);
        assert_eq!(renderer.scale(), 0.0);
        renderer.compute_render(0.15);
        assert!((renderer.scale() - 0.75).abs() < 1e-5);
        renderer.compute_render(0.3);
        assert!((renderer.scale() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_trims_between_30_and_70_percent() {
        let mut renderer = started();
        renderer.compute_render(0.4);
        assert!((renderer.start_degrees() - 30.0).abs() < 1e-3);
        assert_eq!(renderer.end_degrees(), 0.0);
        renderer.compute_render(0.5);
        assert!((renderer.start_degrees() - 60.0).abs() < 1e-3);
        renderer.compute_render(0.7);
        assert!((renderer.end_degrees() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_scale_down_after_70_percent() {
        let mut renderer = started();
        renderer.compute_render(0.85);
        assert!((renderer.scale() - 0.75).abs() < 1e-4);
        renderer.compute_render(0.999);
        assert!(renderer.scale() < 0.01);
    }

    #[test]
    fn test_group_rotation_360_per_cycle() {
        let mut renderer = started();
        renderer.compute_render(0.7);
        assert!((renderer.group_rotation() - 360.0).abs() < 1e-3);
        renderer.on_cycle_repeat();
        renderer.compute_render(0.7);
        assert!((renderer.group_rotation() - 720.0).abs() < 1e-3);
    }

    #[test]
    fn test_draws_one_arc_per_tooth() {
        let mut renderer = started();
        renderer.compute_render(0.6);
        let mut canvas = RecordingCanvas::new();
        renderer.paint(&mut canvas);

        let arcs: Vec<_> = canvas
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Arc { start, .. } => Some(*start),
                _ => None,
            })
            .collect();
        assert_eq!(arcs.len(), 4);
        assert!((arcs[1] - arcs[0] - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_configure_rejects_other_kind() {
        let mut renderer = GearRenderer::new();
        let config = RendererConfig::default_for(RendererKind::Swap);
        assert!(renderer.configure(&config).is_err());
    }

    #[test]
    fn test_configure_gear_count() {
        let mut renderer = GearRenderer::new();
        let config = RendererConfig::Gear(GearConfig {
            gear_count: Some(6),
            gear_swipe_degrees: Some(-5.0),
            ..Default::default()
        });
        renderer.configure(&config).unwrap();
        assert_eq!(renderer.gear_count, 6);
        assert_eq!(renderer.gear_swipe_degrees, 60.0);
    }

    #[test]
    fn test_configure_clamps_huge_gear_count() {
        let mut renderer = GearRenderer::new();
        let config = RendererConfig::Gear(GearConfig {
            gear_count: Some(1_000_000_000),
            ..Default::default()
        });
        renderer.configure(&config).unwrap();
        assert_eq!(renderer.gear_count, MAX_GEAR_COUNT);

        renderer.on_bounds_changed(Rect::from_size(56.0, 56.0));
        renderer.reset();
        renderer.compute_render(0.5);
        let mut canvas = RecordingCanvas::new();
        renderer.paint(&mut canvas);
        let arcs = canvas
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Arc { .. }))
            .count();
        assert_eq!(arcs, MAX_GEAR_COUNT);
    }
}
