//! 碰撞：一排小球，两端的球交替沿抛物线荡出再撞回（牛顿摆）

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::canvas::{Paint, Shader, Surface};
use crate::config::{CommonConfig, RendererConfig, merge_count, merge_positive};
use crate::easing::Easing;
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Rect};
use crate::renderer::{DEFAULT_DURATION_MS, LoadingRenderer, RendererBase};

const MAX_ALPHA: i32 = 255;
const OVAL_ALPHA: i32 = 64;

const DEFAULT_BALL_COUNT: usize = 7;
const DEFAULT_OVAL_HEIGHT: f32 = 1.5;
const DEFAULT_BALL_RADIUS: f32 = 7.5;
const DEFAULT_WIDTH: f32 = 15.0 * 11.0;
const DEFAULT_HEIGHT: f32 = 15.0 * 4.0;

const START_LEFT_DURATION_OFFSET: f32 = 0.25;
const START_RIGHT_DURATION_OFFSET: f32 = 0.5;
const END_RIGHT_DURATION_OFFSET: f32 = 0.75;
const END_LEFT_DURATION_OFFSET: f32 = 1.0;

const DEFAULT_COLORS: [Color; 2] = [Color(0xFF28_435D), Color(0xFFC3_2720)];
const DEFAULT_POSITIONS: [f32; 2] = [0.0, 1.0];

/// Collision 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball_radius: Option<f32>,
    /// 影子的纵向半径
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oval_vertical_radius: Option<f32>,
    /// 两端小球的最大水平位移
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball_move_x_offsets: Option<f32>,
    /// 抛物线 `y = k * x^2` 的系数 k
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball_quad_coefficient: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball_count: Option<i64>,
    /// 渐变的两端颜色
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<Color>>,
}

#[derive(Debug, Clone)]
pub struct CollisionRenderer {
    base: RendererBase,

    colors: [Color; 2],
    ball_count: usize,
    ball_radius: f32,
    oval_vertical_radius: f32,
    ball_move_x_offsets: f32,
    ball_quad_coefficient: f32,

    left_ball_move_x_offsets: f32,
    left_ball_move_y_offsets: f32,
    right_ball_move_x_offsets: f32,
    right_ball_move_y_offsets: f32,
    left_oval_shape_rate: f32,
    right_oval_shape_rate: f32,
}

impl Default for CollisionRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionRenderer {
    pub fn new() -> Self {
        // 令最大位移处 y == x，即 k = 1 / x
        let ball_move_x_offsets = 1.5 * (2.0 * DEFAULT_BALL_RADIUS);
        Self {
            base: RendererBase::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_DURATION_MS),
            colors: DEFAULT_COLORS,
            ball_count: DEFAULT_BALL_COUNT,
            ball_radius: DEFAULT_BALL_RADIUS,
            oval_vertical_radius: DEFAULT_OVAL_HEIGHT,
            ball_move_x_offsets,
            ball_quad_coefficient: 1.0 / ball_move_x_offsets,
            left_ball_move_x_offsets: 0.0,
            left_ball_move_y_offsets: 0.0,
            right_ball_move_x_offsets: 0.0,
            right_ball_move_y_offsets: 0.0,
            left_oval_shape_rate: 0.0,
            right_oval_shape_rate: 0.0,
        }
    }

    /// 左球相对原位的偏移（向左、向上为正）
    pub fn left_offsets(&self) -> (f32, f32) {
        (self.left_ball_move_x_offsets, self.left_ball_move_y_offsets)
    }

    /// 右球相对原位的偏移（向右、向上为正）
    pub fn right_offsets(&self) -> (f32, f32) {
        (self.right_ball_move_x_offsets, self.right_ball_move_y_offsets)
    }

    fn ball_side_offsets(&self) -> f32 {
        (self.base.width - self.ball_radius * 2.0 * (self.ball_count as f32 - 2.0)) / 2.0
    }

    fn gradient(&self) -> Shader {
        let side = self.ball_side_offsets();
        Shader::LinearGradient {
            x0: side,
            y0: 0.0,
            x1: self.base.width - side,
            y1: 0.0,
            colors: self.colors.to_vec(),
            positions: DEFAULT_POSITIONS.to_vec(),
        }
    }

    fn compute_left_ball_move_offsets(&mut self, progress: f32) {
        self.right_ball_move_x_offsets = 0.0;
        self.right_ball_move_y_offsets = 0.0;

        self.left_oval_shape_rate = 1.0 - progress;
        self.left_ball_move_x_offsets = self.ball_move_x_offsets * progress;
        self.left_ball_move_y_offsets =
            self.left_ball_move_x_offsets.powi(2) * self.ball_quad_coefficient;
    }

    fn compute_right_ball_move_offsets(&mut self, progress: f32) {
        self.left_ball_move_x_offsets = 0.0;
        self.left_ball_move_y_offsets = 0.0;

        self.right_oval_shape_rate = 1.0 - progress;
        self.right_ball_move_x_offsets = self.ball_move_x_offsets * progress;
        self.right_ball_move_y_offsets =
            self.right_ball_move_x_offsets.powi(2) * self.ball_quad_coefficient;
    }
}

impl LoadingRenderer for CollisionRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Collision
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::Collision(collision) = config else {
            return Err(config.mismatch(RendererKind::Collision));
        };
        collision.common.apply_to(&mut self.base);
        merge_positive(
            &mut self.oval_vertical_radius,
            collision.oval_vertical_radius,
            "oval_vertical_radius",
        );
        merge_positive(&mut self.ball_radius, collision.ball_radius, "ball_radius");
        merge_positive(
            &mut self.ball_move_x_offsets,
            collision.ball_move_x_offsets,
            "ball_move_x_offsets",
        );
        merge_positive(
            &mut self.ball_quad_coefficient,
            collision.ball_quad_coefficient,
            "ball_quad_coefficient",
        );
        merge_count(&mut self.ball_count, collision.ball_count, "ball_count");
        if let Some(colors) = &collision.colors {
            match <[Color; 2]>::try_from(colors.as_slice()) {
                Ok(colors) => self.colors = colors,
                Err(_) => warn!(len = colors.len(), "colors 需要恰好 2 个颜色，保留默认值"),
            }
        }
        Ok(())
    }

    fn reset(&mut self) {}

    fn compute_render(&mut self, progress: f32) {
        // 0% ~ 25%：左球荡出
        if progress <= START_LEFT_DURATION_OFFSET {
            let local = progress / START_LEFT_DURATION_OFFSET;
            self.compute_left_ball_move_offsets(Easing::DECELERATE.apply(local));
            return;
        }

        // 25% ~ 50%：左球落回
        if progress <= START_RIGHT_DURATION_OFFSET {
            let local = (progress - START_LEFT_DURATION_OFFSET)
                / (START_RIGHT_DURATION_OFFSET - START_LEFT_DURATION_OFFSET);
            self.compute_left_ball_move_offsets(Easing::ACCELERATE.apply(1.0 - local));
            return;
        }

        // 50% ~ 75%：右球荡出
        if progress <= END_RIGHT_DURATION_OFFSET {
            let local = (progress - START_RIGHT_DURATION_OFFSET)
                / (END_RIGHT_DURATION_OFFSET - START_RIGHT_DURATION_OFFSET);
            self.compute_right_ball_move_offsets(Easing::DECELERATE.apply(local));
            return;
        }

        // 75% ~ 100%：右球落回
        if progress <= END_LEFT_DURATION_OFFSET {
            let local = (progress - END_RIGHT_DURATION_OFFSET)
                / (END_LEFT_DURATION_OFFSET - END_RIGHT_DURATION_OFFSET);
            self.compute_right_ball_move_offsets(Easing::ACCELERATE.apply(1.0 - local));
        }
    }

    fn draw(&self, surface: &mut dyn Surface, bounds: Rect) {
        let save_count = surface.save();
        surface.translate(bounds.left, bounds.top);

        let height = self.base.height;
        let radius = self.ball_radius;
        let oval_radius = self.oval_vertical_radius;
        let center_y = height / 2.0;
        let side = self.ball_side_offsets();

        let paint = Paint::fill(Color::BLACK)
            .with_shader(Some(self.gradient()))
            .with_color_filter(self.base.color_filter);
        let ball = paint.clone().with_alpha(MAX_ALPHA);
        let shadow = paint.with_alpha(OVAL_ALPHA);

        for i in 1..self.ball_count.saturating_sub(1) {
            let i = i as f32;
            surface.draw_circle(radius * (i * 2.0 - 1.0) + side, center_y, radius, &ball);
            let oval = Rect::new(
                radius * (i * 2.0 - 2.0) + side,
                height - oval_radius * 2.0,
                radius * (i * 2.0) + side,
                height,
            );
            surface.draw_oval(oval, &shadow);
        }

        // 第一个球
        let left_x = side - radius - self.left_ball_move_x_offsets;
        surface.draw_circle(
            left_x,
            center_y - self.left_ball_move_y_offsets,
            radius,
            &ball,
        );
        let rate = self.left_oval_shape_rate;
        let oval = Rect::new(
            left_x - radius * rate,
            height - oval_radius - oval_radius * rate,
            left_x + radius * rate,
            height - oval_radius + oval_radius * rate,
        );
        surface.draw_oval(oval, &shadow);

        // 最后一个球
        let right_x = radius * (self.ball_count as f32 * 2.0 - 3.0)
            + side
            + self.right_ball_move_x_offsets;
        surface.draw_circle(
            right_x,
            center_y - self.right_ball_move_y_offsets,
            radius,
            &ball,
        );
        let rate = self.right_oval_shape_rate;
        let oval = Rect::new(
            right_x - radius * rate,
            height - oval_radius - oval_radius * rate,
            right_x + radius * rate,
            height - oval_radius + oval_radius * rate,
        );
        surface.draw_oval(oval, &shadow);

        surface.restore_to_count(save_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};

    #[test]
    fn test_left_ball_peaks_at_quarter() {
        let mut renderer = CollisionRenderer::new();
        renderer.compute_render(0.25);
        let (x, y) = renderer.left_offsets();
        assert!((x - 22.5).abs() < 1e-3);
        // 最高点 y == x
        assert!((y - 22.5).abs() < 1e-3);
        assert_eq!(renderer.right_offsets(), (0.0, 0.0));
    }

    #[test]
    fn test_right_ball_takes_over() {
        let mut renderer = CollisionRenderer::new();
        renderer.compute_render(0.2);
        renderer.compute_render(0.6);
        assert_eq!(renderer.left_offsets(), (0.0, 0.0));
        assert!(renderer.right_offsets().0 > 0.0);
        // 落回后停在原位
        renderer.compute_render(1.0);
        assert!(renderer.right_offsets().0.abs() < 1e-5);
    }

    #[test]
    fn test_draw_balls_and_shadows() {
        let mut renderer = CollisionRenderer::new();
        renderer.on_bounds_changed(Rect::from_size(165.0, 60.0));
        renderer.compute_render(0.1);

        let mut canvas = RecordingCanvas::new();
        renderer.paint(&mut canvas);
        let circles = canvas
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Circle { .. }))
            .count();
        let shadows = canvas
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Oval { paint, .. } if paint.alpha() == 64))
            .count();
        assert_eq!(circles, 7);
        assert_eq!(shadows, 7);
    }

    #[test]
    fn test_colors_need_exactly_two() {
        let mut renderer = CollisionRenderer::new();
        let config = RendererConfig::Collision(CollisionConfig {
            common: CommonConfig::default(),
            colors: Some(vec![Color::RED]),
            ..Default::default()
        });
        renderer.configure(&config).unwrap();
        assert_eq!(renderer.colors, DEFAULT_COLORS);

        let config = RendererConfig::Collision(CollisionConfig {
            colors: Some(vec![Color::RED, Color::BLUE]),
            ..Default::default()
        });
        renderer.configure(&config).unwrap();
        assert_eq!(renderer.colors, [Color::RED, Color::BLUE]);
    }
}
