//! 守护：圆环收缩成点，泛起水波，小球在环内弹跳后放大，再展开成环

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ring_insets;
use crate::canvas::{Cap, Paint, Surface};
use crate::config::{CommonConfig, RendererConfig, merge_color, merge_positive};
use crate::easing::Easing;
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Point, Rect};
use crate::path::{Path, PathMeasure};
use crate::renderer::{DEFAULT_SIZE, LoadingRenderer, RendererBase};

const DURATION_MS: u64 = 5000;

const DEFAULT_STROKE_WIDTH: f32 = 1.0;
const DEFAULT_CENTER_RADIUS: f32 = 12.5;
const DEFAULT_SKIP_BALL_RADIUS: f32 = 1.0;

const START_TRIM_INIT_ROTATION: f32 = -0.5;
const START_TRIM_MAX_ROTATION: f32 = -0.25;
const END_TRIM_INIT_ROTATION: f32 = 0.25;
const END_TRIM_MAX_ROTATION: f32 = 0.75;

const START_TRIM_DURATION_OFFSET: f32 = 0.23;
const WAVE_DURATION_OFFSET: f32 = 0.36;
const BALL_SKIP_DURATION_OFFSET: f32 = 0.74;
const BALL_SCALE_DURATION_OFFSET: f32 = 0.82;
const END_TRIM_DURATION_OFFSET: f32 = 1.0;

/// 弹跳落点的横坐标（相对半径）与上下半圆
const SKIP_POINTS: [(f32, f32); 7] = [
    (0.0, 1.0),
    (0.0, -1.0),
    (-0.8, 1.0),
    (0.75, 1.0),
    (-0.45, -1.0),
    (0.9, -1.0),
    (-0.5, 1.0),
];

/// Guard 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_ball_radius: Option<f32>,
    /// 圆环与水波颜色
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball_color: Option<Color>,
}

#[derive(Debug, Clone)]
pub struct GuardRenderer {
    base: RendererBase,

    color: Color,
    ball_color: Color,
    stroke_width: f32,
    center_radius: f32,
    skip_ball_radius: f32,

    scale: f32,
    end_trim: f32,
    rotation: f32,
    start_trim: f32,
    wave_progress: f32,
    ball_position: Point,
    /// 弹跳轨迹，只在弹跳到放大阶段存在
    skip_path: Option<PathMeasure>,
}

impl Default for GuardRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardRenderer {
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(DEFAULT_SIZE, DEFAULT_SIZE, DURATION_MS),
            color: Color::WHITE,
            ball_color: Color::RED,
            stroke_width: DEFAULT_STROKE_WIDTH,
            center_radius: DEFAULT_CENTER_RADIUS,
            skip_ball_radius: DEFAULT_SKIP_BALL_RADIUS,
            scale: 1.0,
            end_trim: 0.0,
            rotation: 0.0,
            start_trim: 0.0,
            wave_progress: 1.0,
            ball_position: Point::ZERO,
            skip_path: None,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn wave_progress(&self) -> f32 {
        self.wave_progress
    }

    /// 小球当前位置，轨迹不存在时为 `None`
    pub fn ball_position(&self) -> Option<Point> {
        self.skip_path.as_ref().map(|_| self.ball_position)
    }

    fn ring_bounds(&self, bounds: Rect) -> Rect {
        let insets = ring_insets(
            self.base.width,
            self.base.height,
            self.center_radius,
            self.stroke_width,
        );
        bounds.inset(insets, insets)
    }

    /// 在圆内来回弹跳的折线，最后回到圆心
    fn create_skip_ball_path(ring: Rect) -> Path {
        let radius = ring.width().min(ring.height()) / 2.0;
        let (origin_x, origin_y) = (ring.center_x(), ring.center_y());

        let mut path = Path::new();
        for (i, (x_rate, sign)) in SKIP_POINTS.iter().enumerate() {
            let x = x_rate * radius;
            // x^2 + y^2 = r^2
            let y = sign * (radius * radius - x * x).max(0.0).sqrt();
            if i == 0 {
                path.move_to(origin_x + x, origin_y + y);
            } else {
                path.line_to(origin_x + x, origin_y + y);
            }
        }
        path.line_to(origin_x, origin_y);
        path
    }
}

impl LoadingRenderer for GuardRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Guard
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::Guard(guard) = config else {
            return Err(config.mismatch(RendererKind::Guard));
        };
        guard.common.apply_to(&mut self.base);
        merge_positive(&mut self.stroke_width, guard.stroke_width, "stroke_width");
        merge_positive(&mut self.center_radius, guard.center_radius, "center_radius");
        merge_positive(
            &mut self.skip_ball_radius,
            guard.skip_ball_radius,
            "skip_ball_radius",
        );
        merge_color(&mut self.color, guard.color);
        merge_color(&mut self.ball_color, guard.ball_color);
        Ok(())
    }

    fn on_bounds_changed(&mut self, bounds: Rect) {
        self.base.bounds = bounds;
        self.skip_path = None;
    }

    fn reset(&mut self) {
        self.scale = 1.0;
        self.end_trim = 0.0;
        self.rotation = 0.0;
        self.start_trim = 0.0;
        self.wave_progress = 1.0;
        self.skip_path = None;
    }

    fn compute_render(&mut self, progress: f32) {
        if progress <= START_TRIM_DURATION_OFFSET {
            let start_trim_progress = progress / START_TRIM_DURATION_OFFSET;
            let eased = Easing::FastOutSlowIn.apply(start_trim_progress);
            self.end_trim = -eased;
            self.rotation = START_TRIM_INIT_ROTATION + START_TRIM_MAX_ROTATION * eased;
        }

        if progress <= WAVE_DURATION_OFFSET && progress > START_TRIM_DURATION_OFFSET {
            let wave_progress = (progress - START_TRIM_DURATION_OFFSET)
                / (WAVE_DURATION_OFFSET - START_TRIM_DURATION_OFFSET);
            self.wave_progress = Easing::ACCELERATE.apply(wave_progress);
        }

        if progress <= BALL_SKIP_DURATION_OFFSET && progress > WAVE_DURATION_OFFSET {
            let ring = self.ring_bounds(self.base.bounds);
            if self.skip_path.is_none() && !ring.is_empty() {
                let measure = PathMeasure::new(&Self::create_skip_ball_path(ring));
                debug!(kind = "guard", length = measure.length(), "构建弹跳轨迹");
                self.skip_path = Some(measure);
            }
            if let Some(measure) = &self.skip_path {
                let skip_progress = (progress - WAVE_DURATION_OFFSET)
                    / (BALL_SKIP_DURATION_OFFSET - WAVE_DURATION_OFFSET);
                if let Some(position) = measure.position_at(skip_progress * measure.length()) {
                    self.ball_position = position;
                }
            }
            self.wave_progress = 1.0;
        }

        if progress <= BALL_SCALE_DURATION_OFFSET && progress > BALL_SKIP_DURATION_OFFSET {
            let scale_progress = (progress - BALL_SKIP_DURATION_OFFSET)
                / (BALL_SCALE_DURATION_OFFSET - BALL_SKIP_DURATION_OFFSET);
            self.scale = if scale_progress < 0.5 {
                1.0 + Easing::DECELERATE.apply(scale_progress * 2.0)
            } else {
                2.0 - Easing::ACCELERATE.apply((scale_progress - 0.5) * 2.0) * 2.0
            };
        }

        if progress >= BALL_SCALE_DURATION_OFFSET {
            // 从弹跳结束处起算，与放大阶段重叠
            let end_trim_progress = (progress - BALL_SKIP_DURATION_OFFSET)
                / (END_TRIM_DURATION_OFFSET - BALL_SKIP_DURATION_OFFSET);
            let eased = Easing::FastOutSlowIn.apply(end_trim_progress);
            self.end_trim = -1.0 + eased;
            self.rotation = END_TRIM_INIT_ROTATION + END_TRIM_MAX_ROTATION * eased;
            self.scale = 1.0;
            self.skip_path = None;
        }
    }

    fn draw(&self, surface: &mut dyn Surface, bounds: Rect) {
        let ring = self.ring_bounds(bounds);
        let save_count = surface.save();

        let start_angle = (self.start_trim + self.rotation) * 360.0;
        let end_angle = (self.end_trim + self.rotation) * 360.0;
        let sweep_angle = end_angle - start_angle;
        if sweep_angle != 0.0 {
            let paint = Paint::stroke(self.color, self.stroke_width)
                .with_cap(Cap::Round)
                .with_color_filter(self.base.color_filter);
            surface.draw_arc(ring, start_angle, sweep_angle, false, &paint);
        }

        // 水波
        if self.wave_progress < 1.0 {
            let alpha = (f32::from(self.color.alpha()) * (1.0 - self.wave_progress)) as u8;
            let paint = Paint::stroke(self.color.with_alpha(alpha), self.stroke_width)
                .with_cap(Cap::Round)
                .with_color_filter(self.base.color_filter);
            let radius = ring.width().min(ring.height()) / 2.0;
            surface.draw_circle(
                ring.center_x(),
                ring.center_y(),
                radius * (1.0 + self.wave_progress),
                &paint,
            );
        }

        // 弹跳小球
        if self.skip_path.is_some() {
            let paint = Paint::fill(self.ball_color).with_color_filter(self.base.color_filter);
            surface.draw_circle(
                self.ball_position.x,
                self.ball_position.y,
                self.skip_ball_radius * self.scale,
                &paint,
            );
        }

        surface.restore_to_count(save_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};

    fn started() -> GuardRenderer {
        let mut renderer = GuardRenderer::new();
        renderer.on_bounds_changed(Rect::from_size(56.0, 56.0));
        renderer.reset();
        renderer
    }

    #[test]
    fn test_wave_grows_then_stops() {
        let mut renderer = started();
        renderer.compute_render(0.3);
        assert!(renderer.wave_progress() > 0.0 && renderer.wave_progress() < 1.0);
        renderer.compute_render(0.4);
        assert_eq!(renderer.wave_progress(), 1.0);
    }

    #[test]
    fn test_ball_skips_then_returns_to_center() {
        let mut renderer = started();
        renderer.compute_render(0.37);
        let start = renderer.ball_position().unwrap();
        // 第一个落点在圆环底部
        assert!((start.x - 28.0).abs() < 0.5);
        assert!(start.y > 28.0);

        renderer.compute_render(BALL_SKIP_DURATION_OFFSET);
        let end = renderer.ball_position().unwrap();
        assert!((end.x - 28.0).abs() < 0.5 && (end.y - 28.0).abs() < 0.5);
    }

    #[test]
    fn test_scale_peaks_mid_window() {
        let mut renderer = started();
        renderer.compute_render(0.78);
        assert!((renderer.scale() - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_shared_boundary_runs_both_branches() {
        let mut renderer = started();
        renderer.compute_render(0.5);
        renderer.compute_render(BALL_SCALE_DURATION_OFFSET);
        // 放大分支先算出 0，结束分支随后把缩放恢复为 1
        assert_eq!(renderer.scale(), 1.0);
        assert!(renderer.ball_position().is_none());
    }

    #[test]
    fn test_empty_bounds_skip_path() {
        let mut renderer = GuardRenderer::new();
        renderer.reset();
        renderer.compute_render(0.5);
        assert!(renderer.ball_position().is_none());
    }

    #[test]
    fn test_draws_ball_only_while_skipping() {
        let mut renderer = started();
        renderer.compute_render(0.5);
        let mut canvas = RecordingCanvas::new();
        renderer.paint(&mut canvas);
        let red = canvas
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Circle { paint, .. } if paint.color == Color::RED))
            .count();
        assert_eq!(red, 1);
    }
}
