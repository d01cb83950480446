//! 舞蹈：三个小球沿圆环的三条直径进出，圆环正转一圈再反转一圈

use serde::{Deserialize, Serialize};

use super::ring_insets;
use crate::canvas::{Paint, Surface};
use crate::config::{CommonConfig, RendererConfig, merge_color, merge_positive};
use crate::easing::Easing;
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Point, Rect};
use crate::renderer::{DEFAULT_SIZE, LoadingRenderer, RendererBase};

const DURATION_MS: u64 = 1888;

const DEFAULT_CENTER_RADIUS: f32 = 12.5;
const DEFAULT_STROKE_WIDTH: f32 = 1.5;
const DEFAULT_DANCE_BALL_RADIUS: f32 = 2.0;

const NUM_POINTS: usize = 3;
const RING_START_ANGLE: f32 = -90.0;
const DANCE_START_ANGLE: f32 = 0.0;
const DANCE_INTERVAL_ANGLE: f32 = 60.0;

/// 1：x 由小到大；-1：x 由大到小
const DIRECTION: [f32; NUM_POINTS] = [1.0, 1.0, -1.0];

const BALL_FORWARD_START_ENTER_DURATION_OFFSET: f32 = 0.0;
const BALL_FORWARD_END_ENTER_DURATION_OFFSET: f32 = 0.125;

const RING_FORWARD_START_ROTATE_DURATION_OFFSET: f32 = 0.125;
const RING_FORWARD_END_ROTATE_DURATION_OFFSET: f32 = 0.375;

const CENTER_CIRCLE_FORWARD_START_SCALE_DURATION_OFFSET: f32 = 0.225;
const CENTER_CIRCLE_FORWARD_END_SCALE_DURATION_OFFSET: f32 = 0.475;

const BALL_FORWARD_START_EXIT_DURATION_OFFSET: f32 = 0.375;
const BALL_FORWARD_END_EXIT_DURATION_OFFSET: f32 = 0.54;

const RING_REVERSAL_START_ROTATE_DURATION_OFFSET: f32 = 0.5;
const RING_REVERSAL_END_ROTATE_DURATION_OFFSET: f32 = 0.75;

const BALL_REVERSAL_START_ENTER_DURATION_OFFSET: f32 = 0.6;
const BALL_REVERSAL_END_ENTER_DURATION_OFFSET: f32 = 0.725;

const CENTER_CIRCLE_REVERSAL_START_SCALE_DURATION_OFFSET: f32 = 0.675;
const CENTER_CIRCLE_REVERSAL_END_SCALE_DURATION_OFFSET: f32 = 0.875;

const BALL_REVERSAL_START_EXIT_DURATION_OFFSET: f32 = 0.875;
const BALL_REVERSAL_END_EXIT_DURATION_OFFSET: f32 = 1.0;

/// Dance 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DanceConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dance_ball_radius: Option<f32>,
    /// 圆环与小球颜色，旋转弧线取其半透明色
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

#[derive(Debug, Clone)]
pub struct DanceRenderer {
    base: RendererBase,

    color: Color,
    stroke_width: f32,
    center_radius: f32,
    dance_ball_radius: f32,

    scale: f32,
    rotation: f32,
    shape_change_width: f32,
    shape_change_height: f32,
    /// 三个小球（椭圆）的中心
    points: [Point; NUM_POINTS],
}

impl Default for DanceRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// alpha 减半
fn half_alpha_color(color: Color) -> Color {
    color.with_alpha(color.alpha() / 2)
}

impl DanceRenderer {
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(DEFAULT_SIZE, DEFAULT_SIZE, DURATION_MS),
            color: Color::WHITE,
            stroke_width: DEFAULT_STROKE_WIDTH,
            center_radius: DEFAULT_CENTER_RADIUS,
            dance_ball_radius: DEFAULT_DANCE_BALL_RADIUS,
            scale: 1.0,
            rotation: 0.0,
            shape_change_width: 0.0,
            shape_change_height: 0.0,
            points: [Point::ZERO; NUM_POINTS],
        }
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn points(&self) -> [Point; NUM_POINTS] {
        self.points
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

    /// 把小球放到各自直径上
    ///
    /// 直线 `y = k(x - r)` 与圆 `(x - r)^2 + y^2 = r^2` 的交点横坐标为
    /// `r ± r / sqrt(k^2 + 1)`；`position` 在 `[-1, 1]` 内描述小球在直径上的位置。
    fn place_balls(&mut self, ring: Rect, position: impl Fn(f32) -> f32) {
        let radius = ring.width().min(ring.height()) / 2.0;
        // 以 ring 左侧中点为原点
        let origin_x = ring.left;
        let origin_y = ring.top + radius;

        for (i, point) in self.points.iter_mut().enumerate() {
            let k = (DANCE_START_ANGLE + DANCE_INTERVAL_ANGLE * i as f32).to_radians().tan();
            let progress = position(DIRECTION[i]);
            let x = radius + progress * (radius / (k * k + 1.0).sqrt());
            let y = k * (x - radius);
            *point = Point::new(x + origin_x, y + origin_y);
        }
    }

    fn set_shape_change(&mut self, height: f32) {
        self.shape_change_height = height;
        self.shape_change_width = -height;
    }

    fn center_scale(scale_progress: f32) -> f32 {
        if scale_progress <= 0.5 {
            1.0 + Easing::DECELERATE.apply(scale_progress * 2.0) * 0.2
        } else {
            1.2 - Easing::ACCELERATE.apply((scale_progress - 0.5) * 2.0) * 0.2
        }
    }
}

impl LoadingRenderer for DanceRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Dance
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::Dance(dance) = config else {
            return Err(config.mismatch(RendererKind::Dance));
        };
        dance.common.apply_to(&mut self.base);
        merge_positive(&mut self.stroke_width, dance.stroke_width, "stroke_width");
        merge_positive(&mut self.center_radius, dance.center_radius, "center_radius");
        merge_positive(
            &mut self.dance_ball_radius,
            dance.dance_ball_radius,
            "dance_ball_radius",
        );
        merge_color(&mut self.color, dance.color);
        Ok(())
    }

    fn reset(&mut self) {
        self.scale = 1.0;
        self.rotation = 0.0;
        self.set_shape_change(0.0);
        self.points = [Point::ZERO; NUM_POINTS];
    }

    fn compute_render(&mut self, progress: f32) {
        let ring = self.ring_bounds(self.base.bounds);
        let ball_radius = self.dance_ball_radius;

        // 正向：小球进入
        if progress <= BALL_FORWARD_END_ENTER_DURATION_OFFSET
            && progress > BALL_FORWARD_START_ENTER_DURATION_OFFSET
        {
            let enter_progress = (progress - BALL_FORWARD_START_ENTER_DURATION_OFFSET)
                / (BALL_FORWARD_END_ENTER_DURATION_OFFSET
                    - BALL_FORWARD_START_ENTER_DURATION_OFFSET);
            self.set_shape_change((0.5 - enter_progress) * ball_radius / 2.0);
            let eased = Easing::ACCELERATE.apply(enter_progress);
            self.place_balls(ring, |direction| (eased / 2.0 - 0.5) * 2.0 * direction);
        }

        // 正向：圆环旋转
        if progress <= RING_FORWARD_END_ROTATE_DURATION_OFFSET
            && progress > RING_FORWARD_START_ROTATE_DURATION_OFFSET
        {
            let rotate_progress = (progress - RING_FORWARD_START_ROTATE_DURATION_OFFSET)
                / (RING_FORWARD_END_ROTATE_DURATION_OFFSET
                    - RING_FORWARD_START_ROTATE_DURATION_OFFSET);
            self.rotation = 360.0 * Easing::FastOutSlowIn.apply(rotate_progress);
        }

        // 正向：中心圆脉动
        if progress <= CENTER_CIRCLE_FORWARD_END_SCALE_DURATION_OFFSET
            && progress > CENTER_CIRCLE_FORWARD_START_SCALE_DURATION_OFFSET
        {
            let scale_progress = (progress - CENTER_CIRCLE_FORWARD_START_SCALE_DURATION_OFFSET)
                / (CENTER_CIRCLE_FORWARD_END_SCALE_DURATION_OFFSET
                    - CENTER_CIRCLE_FORWARD_START_SCALE_DURATION_OFFSET);
            self.scale = Self::center_scale(scale_progress);
        }

        // 正向：小球离开
        if progress <= BALL_FORWARD_END_EXIT_DURATION_OFFSET
            && progress > BALL_FORWARD_START_EXIT_DURATION_OFFSET
        {
            let exit_progress = (progress - BALL_FORWARD_START_EXIT_DURATION_OFFSET)
                / (BALL_FORWARD_END_EXIT_DURATION_OFFSET - BALL_FORWARD_START_EXIT_DURATION_OFFSET);
            self.set_shape_change((exit_progress - 0.5) * ball_radius / 2.0);
            let eased = Easing::DECELERATE.apply(exit_progress);
            self.place_balls(ring, |direction| eased / 2.0 * 2.0 * direction);
        }

        // 反向：圆环旋转
        if progress <= RING_REVERSAL_END_ROTATE_DURATION_OFFSET
            && progress > RING_REVERSAL_START_ROTATE_DURATION_OFFSET
        {
            let rotate_progress = (progress - RING_REVERSAL_START_ROTATE_DURATION_OFFSET)
                / (RING_REVERSAL_END_ROTATE_DURATION_OFFSET
                    - RING_REVERSAL_START_ROTATE_DURATION_OFFSET);
            self.rotation = 360.0 * Easing::FastOutSlowIn.apply(rotate_progress) - 360.0;
        } else if progress > RING_REVERSAL_END_ROTATE_DURATION_OFFSET {
            self.rotation = 0.0;
        }

        // 反向：小球进入
        if progress <= BALL_REVERSAL_END_ENTER_DURATION_OFFSET
            && progress > BALL_REVERSAL_START_ENTER_DURATION_OFFSET
        {
            let enter_progress = (progress - BALL_REVERSAL_START_ENTER_DURATION_OFFSET)
                / (BALL_REVERSAL_END_ENTER_DURATION_OFFSET
                    - BALL_REVERSAL_START_ENTER_DURATION_OFFSET);
            self.set_shape_change((0.5 - enter_progress) * ball_radius / 2.0);
            let eased = Easing::ACCELERATE.apply(enter_progress);
            self.place_balls(ring, |direction| (0.5 - eased / 2.0) * 2.0 * direction);
        }

        // 反向：中心圆脉动
        if progress <= CENTER_CIRCLE_REVERSAL_END_SCALE_DURATION_OFFSET
            && progress > CENTER_CIRCLE_REVERSAL_START_SCALE_DURATION_OFFSET
        {
            let scale_progress = (progress - CENTER_CIRCLE_REVERSAL_START_SCALE_DURATION_OFFSET)
                / (CENTER_CIRCLE_REVERSAL_END_SCALE_DURATION_OFFSET
                    - CENTER_CIRCLE_REVERSAL_START_SCALE_DURATION_OFFSET);
            self.scale = Self::center_scale(scale_progress);
        }

        // 反向：小球离开
        if progress <= BALL_REVERSAL_END_EXIT_DURATION_OFFSET
            && progress > BALL_REVERSAL_START_EXIT_DURATION_OFFSET
        {
            let exit_progress = (progress - BALL_REVERSAL_START_EXIT_DURATION_OFFSET)
                / (BALL_REVERSAL_END_EXIT_DURATION_OFFSET
                    - BALL_REVERSAL_START_EXIT_DURATION_OFFSET);
            self.set_shape_change((exit_progress - 0.5) * ball_radius / 2.0);
            let eased = Easing::DECELERATE.apply(exit_progress);
            self.place_balls(ring, |direction| (0.0 - eased / 2.0) * 2.0 * direction);
        }
    }

    fn draw(&self, surface: &mut dyn Surface, bounds: Rect) {
        let save_count = surface.save();
        let ring = self.ring_bounds(bounds);
        let filter = self.base.color_filter;

        let outer_radius = ring.width().min(ring.height()) / 2.0;
        let inner_radius = outer_radius / 2.0;
        let center_ring_width = inner_radius - self.stroke_width / 2.0;

        let stroke = Paint::stroke(self.color, self.stroke_width).with_color_filter(filter);
        surface.draw_circle(ring.center_x(), ring.center_y(), outer_radius, &stroke);

        let fill = Paint::fill(self.color).with_color_filter(filter);
        surface.draw_circle(
            ring.center_x(),
            ring.center_y(),
            inner_radius * self.scale,
            &fill,
        );

        if self.rotation != 0.0 {
            // 描边落在内外圆之间
            let inset = center_ring_width / 2.0 + self.stroke_width / 2.0;
            let arc_paint =
                Paint::stroke(half_alpha_color(self.color), center_ring_width).with_color_filter(filter);
            surface.draw_arc(
                ring.inset(inset, inset),
                RING_START_ANGLE,
                self.rotation,
                false,
                &arc_paint,
            );
        }

        for (i, point) in self.points.iter().enumerate() {
            let angle = i as f32 * DANCE_INTERVAL_ANGLE;
            surface.rotate(angle, point.x, point.y);
            let oval = Rect::new(
                point.x - self.dance_ball_radius - self.shape_change_width / 2.0,
                point.y - self.dance_ball_radius - self.shape_change_height / 2.0,
                point.x + self.dance_ball_radius + self.shape_change_width / 2.0,
                point.y + self.dance_ball_radius + self.shape_change_height / 2.0,
            );
            surface.draw_oval(oval, &fill);
            surface.rotate(-angle, point.x, point.y);
        }

        surface.restore_to_count(save_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> DanceRenderer {
        let mut renderer = DanceRenderer::new();
        renderer.on_bounds_changed(Rect::from_size(56.0, 56.0));
        renderer.reset();
        renderer
    }

    #[test]
    fn test_balls_start_on_ring_and_meet_at_center() {
        let mut renderer = started();
        // 进入开始：三个小球都在圆环上
        renderer.compute_render(1e-4);
        for point in renderer.points() {
            let d = point.distance(Point::new(28.0, 28.0));
            assert!((d - 12.5).abs() < 0.1, "distance {d}");
        }
        // 进入结束：汇聚到圆心
        renderer.compute_render(BALL_FORWARD_END_ENTER_DURATION_OFFSET);
        for point in renderer.points() {
            assert!(point.distance(Point::new(28.0, 28.0)) < 1e-3);
        }
    }

    #[test]
    fn test_ring_rotates_forward_then_back() {
        let mut renderer = started();
        renderer.compute_render(0.375);
        assert!((renderer.rotation() - 360.0).abs() < 1e-3);
        renderer.compute_render(0.625);
        assert!(renderer.rotation() < 0.0);
        renderer.compute_render(0.8);
        assert_eq!(renderer.rotation(), 0.0);
    }

    #[test]
    fn test_center_circle_pulses() {
        let mut renderer = started();
        renderer.compute_render(0.35);
        assert!((renderer.scale() - 1.2).abs() < 1e-3);
        renderer.compute_render(0.475);
        assert!((renderer.scale() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_half_alpha_color() {
        assert_eq!(half_alpha_color(Color::WHITE), Color(0x7FFF_FFFF));
    }
}
