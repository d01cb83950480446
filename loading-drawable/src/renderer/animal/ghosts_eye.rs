//! 幽灵眼睛：两只眼睛先后起跳，眼珠比眼眶跳得更早落得更晚

use serde::{Deserialize, Serialize};

use crate::canvas::{Cap, Join, Paint, Surface};
use crate::config::{CommonConfig, RendererConfig, merge_color, merge_positive};
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Rect};
use crate::path::Path;
use crate::renderer::{LoadingRenderer, RendererBase};

const DURATION_MS: u64 = 2333;

const DEFAULT_WIDTH: f32 = 200.0;
const DEFAULT_HEIGHT: f32 = 176.0;
const DEFAULT_EYE_EDGE_WIDTH: f32 = 5.0;

const DEFAULT_EYE_BALL_HEIGHT: f32 = 9.0;
const DEFAULT_EYE_BALL_WIDTH: f32 = 11.0;

const DEFAULT_EYE_CIRCLE_INTERVAL: f32 = 8.0;
const DEFAULT_EYE_BALL_OFFSET_Y: f32 = 2.0;
const DEFAULT_ABOVE_RADIAN_EYE_CIRCLE_OFFSET: f32 = 6.0;
const DEFAULT_EYE_CIRCLE_RADIUS: f32 = 21.0;
const DEFAULT_MAX_EYE_JUMP_DISTANCE: f32 = 11.0;

const LEFT_EYE_START_JUMP_UP_OFFSET: f32 = 0.0;
const RIGHT_EYE_START_JUMP_UP_OFFSET: f32 = 0.067;

const LEFT_EYE_BALL_END_JUMP_OFFSET: f32 = 0.4;
const LEFT_EYE_CIRCLE_END_JUMP_OFFSET: f32 = 0.533;
const RIGHT_EYE_BALL_END_JUMP_OFFSET: f32 = 0.467;
const RIGHT_EYE_CIRCLE_END_JUMP_OFFSET: f32 = 0.60;

/// 眼眶圆弧多画出的角度，与上方的眉弧相接
const EYE_ARC_EXTRA_DEGREES: f32 = 15.0;

const DEFAULT_COLOR: Color = Color(0xFF48_4852);

/// GhostsEye 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostsEyeConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    /// 眼眶描边宽度
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eye_edge_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

/// 眼眶：快速弹起、回落，再弹起一半高度后回落
fn eye_circle_curve(input: f32) -> f32 {
    if input < 0.25 {
        input * 4.0
    } else if input < 0.5 {
        1.0 - (input - 0.25) * 4.0
    } else if input < 0.75 {
        (input - 0.5) * 2.0
    } else {
        0.5 - (input - 0.75) * 2.0
    }
}

/// 眼珠：前三分之一弹起，之后缓慢回落
fn eye_ball_curve(input: f32) -> f32 {
    if input < 0.333333 {
        input * 3.0
    } else {
        1.0 - (input - 0.333333) * 1.5
    }
}

/// 眼睛在哪一侧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct GhostsEyeRenderer {
    base: RendererBase,

    color: Color,
    eye_edge_width: f32,
    eye_interval: f32,
    eye_circle_radius: f32,
    max_eye_jump_distance: f32,
    above_radian_eye_offset_x: f32,
    eye_ball_offset_y: f32,
    eye_ball_width: f32,
    eye_ball_height: f32,

    left_eye_circle_offset_y: f32,
    right_eye_circle_offset_y: f32,
    left_eye_ball_offset_y: f32,
    right_eye_ball_offset_y: f32,
}

impl Default for GhostsEyeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GhostsEyeRenderer {
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DURATION_MS),
            color: DEFAULT_COLOR,
            eye_edge_width: DEFAULT_EYE_EDGE_WIDTH,
            eye_interval: DEFAULT_EYE_CIRCLE_INTERVAL,
            eye_circle_radius: DEFAULT_EYE_CIRCLE_RADIUS,
            max_eye_jump_distance: DEFAULT_MAX_EYE_JUMP_DISTANCE,
            above_radian_eye_offset_x: DEFAULT_ABOVE_RADIAN_EYE_CIRCLE_OFFSET,
            eye_ball_offset_y: DEFAULT_EYE_BALL_OFFSET_Y,
            eye_ball_width: DEFAULT_EYE_BALL_WIDTH,
            eye_ball_height: DEFAULT_EYE_BALL_HEIGHT,
            left_eye_circle_offset_y: 0.0,
            right_eye_circle_offset_y: 0.0,
            left_eye_ball_offset_y: 0.0,
            right_eye_ball_offset_y: 0.0,
        }
    }

    /// 眼眶纵向偏移（左，右），向上为负
    pub fn eye_circle_offsets(&self) -> (f32, f32) {
        (self.left_eye_circle_offset_y, self.right_eye_circle_offset_y)
    }

    /// 眼珠纵向偏移（左，右），向上为负
    pub fn eye_ball_offsets(&self) -> (f32, f32) {
        (self.left_eye_ball_offset_y, self.right_eye_ball_offset_y)
    }

    fn eye_center_x(&self, bounds: Rect, side: Side) -> f32 {
        let offset = self.eye_interval / 2.0 + self.eye_circle_radius;
        match side {
            Side::Left => bounds.center_x() - offset,
            Side::Right => bounds.center_x() + offset,
        }
    }

    fn eye_ball(&self, bounds: Rect, side: Side, offset_y: f32) -> Rect {
        let cx = self.eye_center_x(bounds, side);
        let cy = bounds.center_y() - self.eye_ball_offset_y + offset_y;
        Rect::new(
            cx - self.eye_ball_width / 2.0,
            cy - self.eye_ball_height / 2.0,
            cx + self.eye_ball_width / 2.0,
            cy + self.eye_ball_height / 2.0,
        )
    }

    /// 眼眶：大半个圆加上方一段眉弧，左右两只互为镜像
    fn eye_circle(&self, bounds: Rect, side: Side, offset_y: f32) -> Path {
        let r = self.eye_circle_radius;
        let cx = self.eye_center_x(bounds, side);
        let cy = bounds.center_y() + offset_y;
        let eye = Rect::new(cx - r, cy - r, cx + r, cy + r);
        let offset_x = self.above_radian_eye_offset_x;

        let mut path = Path::new();
        match side {
            Side::Left => {
                path.add_arc(eye, 0.0, 180.0 + EYE_ARC_EXTRA_DEGREES);
                path.quad_to(
                    eye.left + offset_x,
                    eye.top + r * 0.2,
                    eye.left + offset_x / 4.0,
                    eye.top - r * 0.15,
                );
            }
            Side::Right => {
                path.add_arc(eye, 180.0, -(180.0 + EYE_ARC_EXTRA_DEGREES));
                path.quad_to(
                    eye.right - offset_x,
                    eye.top + r * 0.2,
                    eye.right - offset_x / 4.0,
                    eye.top - r * 0.15,
                );
            }
        }
        path
    }
}

impl LoadingRenderer for GhostsEyeRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::GhostsEye
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::GhostsEye(ghosts_eye) = config else {
            return Err(config.mismatch(RendererKind::GhostsEye));
        };
        ghosts_eye.common.apply_to(&mut self.base);
        merge_positive(
            &mut self.eye_edge_width,
            ghosts_eye.eye_edge_width,
            "eye_edge_width",
        );
        merge_color(&mut self.color, ghosts_eye.color);
        Ok(())
    }

    fn reset(&mut self) {
        self.left_eye_ball_offset_y = 0.0;
        self.right_eye_ball_offset_y = 0.0;
        self.left_eye_circle_offset_y = 0.0;
        self.right_eye_circle_offset_y = 0.0;
    }

    fn compute_render(&mut self, progress: f32) {
        let jump = self.max_eye_jump_distance;

        if progress <= LEFT_EYE_BALL_END_JUMP_OFFSET && progress >= LEFT_EYE_START_JUMP_UP_OFFSET {
            let local = (progress - LEFT_EYE_START_JUMP_UP_OFFSET)
                / (LEFT_EYE_BALL_END_JUMP_OFFSET - LEFT_EYE_START_JUMP_UP_OFFSET);
            self.left_eye_ball_offset_y = -jump * eye_ball_curve(local);
        }

        if progress <= LEFT_EYE_CIRCLE_END_JUMP_OFFSET && progress >= LEFT_EYE_START_JUMP_UP_OFFSET {
            let local = (progress - LEFT_EYE_START_JUMP_UP_OFFSET)
                / (LEFT_EYE_CIRCLE_END_JUMP_OFFSET - LEFT_EYE_START_JUMP_UP_OFFSET);
            self.left_eye_circle_offset_y = -jump * eye_circle_curve(local);
        }

        if progress <= RIGHT_EYE_BALL_END_JUMP_OFFSET && progress >= RIGHT_EYE_START_JUMP_UP_OFFSET {
            let local = (progress - RIGHT_EYE_START_JUMP_UP_OFFSET)
                / (RIGHT_EYE_BALL_END_JUMP_OFFSET - RIGHT_EYE_START_JUMP_UP_OFFSET);
            self.right_eye_ball_offset_y = -jump * eye_ball_curve(local);
        }

        if progress <= RIGHT_EYE_CIRCLE_END_JUMP_OFFSET && progress >= RIGHT_EYE_START_JUMP_UP_OFFSET {
            let local = (progress - RIGHT_EYE_START_JUMP_UP_OFFSET)
                / (RIGHT_EYE_CIRCLE_END_JUMP_OFFSET - RIGHT_EYE_START_JUMP_UP_OFFSET);
            self.right_eye_circle_offset_y = -jump * eye_circle_curve(local);
        }
    }

    fn draw(&self, surface: &mut dyn Surface, bounds: Rect) {
        let save_count = surface.save();
        let filter = self.base.color_filter;

        let edge = Paint::stroke(self.color, self.eye_edge_width)
            .with_cap(Cap::Round)
            .with_join(Join::Round)
            .with_color_filter(filter);
        surface.draw_path(
            &self.eye_circle(bounds, Side::Left, self.left_eye_circle_offset_y),
            &edge,
        );
        surface.draw_path(
            &self.eye_circle(bounds, Side::Right, self.right_eye_circle_offset_y),
            &edge,
        );

        let ball = Paint::fill(self.color).with_color_filter(filter);
        surface.draw_oval(
            self.eye_ball(bounds, Side::Left, self.left_eye_ball_offset_y),
            &ball,
        );
        surface.draw_oval(
            self.eye_ball(bounds, Side::Right, self.right_eye_ball_offset_y),
            &ball,
        );

        surface.restore_to_count(save_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};

    #[test]
    fn test_curves_peak_and_settle() {
        assert_eq!(eye_circle_curve(0.0), 0.0);
        assert_eq!(eye_circle_curve(0.25), 1.0);
        assert!((eye_circle_curve(0.75) - 0.5).abs() < 1e-6);
        assert!(eye_circle_curve(1.0).abs() < 1e-6);

        assert!((eye_ball_curve(0.333333) - 1.0).abs() < 1e-5);
        assert!((eye_ball_curve(1.0) - 0.0).abs() < 1e-5);
    }

    #[test]
    fn test_right_eye_follows_left() {
        let mut renderer = GhostsEyeRenderer::new();
        renderer.reset();
        renderer.compute_render(0.05);
        let (left, right) = renderer.eye_ball_offsets();
        assert!(left < 0.0);
        assert_eq!(right, 0.0);

        renderer.compute_render(0.1);
        let (_, right) = renderer.eye_ball_offsets();
        assert!(right < 0.0);
    }

    #[test]
    fn test_eye_circle_peak_height() {
        let mut renderer = GhostsEyeRenderer::new();
        renderer.compute_render(LEFT_EYE_CIRCLE_END_JUMP_OFFSET / 4.0);
        let (left, _) = renderer.eye_circle_offsets();
        assert!((left + DEFAULT_MAX_EYE_JUMP_DISTANCE).abs() < 1e-3);
    }

    #[test]
    fn test_reset_lands_both_eyes() {
        let mut renderer = GhostsEyeRenderer::new();
        renderer.compute_render(0.2);
        renderer.reset();
        assert_eq!(renderer.eye_ball_offsets(), (0.0, 0.0));
        assert_eq!(renderer.eye_circle_offsets(), (0.0, 0.0));
    }

    #[test]
    fn test_draw_two_eyes() {
        let mut renderer = GhostsEyeRenderer::new();
        renderer.on_bounds_changed(Rect::from_size(DEFAULT_WIDTH, DEFAULT_HEIGHT));
        renderer.compute_render(0.3);

        let mut canvas = RecordingCanvas::new();
        renderer.paint(&mut canvas);
        let ovals: Vec<Rect> = canvas
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Oval { oval, .. } => Some(*oval),
                _ => None,
            })
            .collect();
        assert_eq!(ovals.len(), 2);
        // 两只眼珠关于中线对称
        assert!((ovals[0].center_x() + ovals[1].center_x() - DEFAULT_WIDTH).abs() < 1e-3);
    }
}
