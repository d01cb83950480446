//! Material 风格的环形进度：一条弧线伸缩旋转，每轮末尾过渡到下一个颜色

use serde::{Deserialize, Serialize};

use super::{DEFAULT_CENTER_RADIUS, DEFAULT_STROKE_WIDTH, RingTrim};
use crate::canvas::{Cap, Paint, Surface};
use crate::config::{CommonConfig, RendererConfig, merge_colors, merge_positive};
use crate::easing::Easing;
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Rect};
use crate::renderer::{LoadingRenderer, RendererBase, ring_stroke_inset};

const NUM_POINTS: f32 = 5.0;
const MAX_SWIPE_DEGREES: f32 = 0.8 * 360.0;

const COLOR_START_DELAY_OFFSET: f32 = 0.8;
const END_TRIM_START_DELAY_OFFSET: f32 = 0.5;
const START_TRIM_DURATION_OFFSET: f32 = 0.5;

/// Material 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_radius: Option<f32>,
    /// 依次循环的颜色
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<Color>>,
}

#[derive(Debug, Clone)]
pub struct MaterialRenderer {
    base: RendererBase,

    colors: Vec<Color>,
    stroke_width: f32,
    center_radius: f32,

    trim: RingTrim,
    swipe_degrees: f32,
    color_index: usize,
    current_color: Color,
}

impl Default for MaterialRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialRenderer {
    pub fn new() -> Self {
        let colors = vec![Color::RED, Color::GREEN, Color::BLUE];
        Self {
            base: RendererBase::default(),
            current_color: colors[0],
            colors,
            stroke_width: DEFAULT_STROKE_WIDTH,
            center_radius: DEFAULT_CENTER_RADIUS,
            trim: RingTrim::default(),
            swipe_degrees: 0.0,
            color_index: 0,
        }
    }

    /// 当前弧线颜色
    pub fn current_color(&self) -> Color {
        self.current_color
    }

    pub fn swipe_degrees(&self) -> f32 {
        self.swipe_degrees
    }

    fn next_color_index(&self) -> usize {
        (self.color_index + 1) % self.colors.len()
    }

    fn update_ring_color(&mut self, progress: f32) {
        if progress > COLOR_START_DELAY_OFFSET {
            let fraction =
                (progress - COLOR_START_DELAY_OFFSET) / (1.0 - COLOR_START_DELAY_OFFSET);
            let start = self.colors[self.color_index];
            let end = self.colors[self.next_color_index()];
            self.current_color = start.lerp(end, fraction);
        }
    }
}

impl LoadingRenderer for MaterialRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Material
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::Material(material) = config else {
            return Err(config.mismatch(RendererKind::Material));
        };
        material.common.apply_to(&mut self.base);
        merge_positive(&mut self.stroke_width, material.stroke_width, "stroke_width");
        merge_positive(&mut self.center_radius, material.center_radius, "center_radius");
        merge_colors(&mut self.colors, material.colors.as_ref(), "colors");
        self.color_index = 0;
        self.current_color = self.colors[0];
        Ok(())
    }

    fn reset(&mut self) {
        self.trim.reset();
        self.swipe_degrees = 0.0;
        self.color_index = 0;
        self.current_color = self.colors[0];
    }

    fn on_cycle_start(&mut self) {
        self.trim.on_start();
    }

    fn on_cycle_repeat(&mut self) {
        self.trim.on_repeat(NUM_POINTS);
        self.color_index = self.next_color_index();
        self.current_color = self.colors[self.color_index];
    }

    fn compute_render(&mut self, progress: f32) {
        self.update_ring_color(progress);

        // 前 50%：起点前进
        if progress <= START_TRIM_DURATION_OFFSET {
            let start_trim_progress = progress / START_TRIM_DURATION_OFFSET;
            self.trim.start_degrees = self.trim.origin_start_degrees
                + MAX_SWIPE_DEGREES * Easing::FastOutSlowIn.apply(start_trim_progress);
        }

        // 后 50%：终点追赶
        if progress > END_TRIM_START_DELAY_OFFSET {
            let end_trim_progress =
                (progress - END_TRIM_START_DELAY_OFFSET) / (1.0 - END_TRIM_START_DELAY_OFFSET);
            self.trim.end_degrees = self.trim.origin_end_degrees
                + MAX_SWIPE_DEGREES * Easing::FastOutSlowIn.apply(end_trim_progress);
        }

        if (self.trim.end_degrees - self.trim.start_degrees).abs() > 0.0 {
            self.swipe_degrees = self.trim.end_degrees - self.trim.start_degrees;
        }

        self.trim.group_rotation = self.trim.rotation(NUM_POINTS, progress);
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
        surface.rotate(self.trim.group_rotation, ring.center_x(), ring.center_y());

        if self.swipe_degrees != 0.0 {
            let paint = Paint::stroke(self.current_color, self.stroke_width)
                .with_cap(Cap::Round)
                .with_color_filter(self.base.color_filter);
            surface.draw_arc(ring, self.trim.start_degrees, self.swipe_degrees, false, &paint);
        }

        surface.restore_to_count(save_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_blends_in_last_20_percent() {
        let mut renderer = MaterialRenderer::new();
        renderer.reset();
        renderer.compute_render(0.5);
        assert_eq!(renderer.current_color(), Color::RED);
        renderer.compute_render(0.9);
        let color = renderer.current_color();
        assert!(color.red() < 255 && color.green() > 0);
    }

    #[test]
    fn test_repeat_advances_color() {
        let mut renderer = MaterialRenderer::new();
        renderer.reset();
        renderer.on_cycle_repeat();
        assert_eq!(renderer.current_color(), Color::GREEN);
        renderer.on_cycle_repeat();
        renderer.on_cycle_repeat();
        assert_eq!(renderer.current_color(), Color::RED);
    }

    #[test]
    fn test_trim_meets_max_swipe() {
        let mut renderer = MaterialRenderer::new();
        renderer.reset();
        renderer.compute_render(0.5);
        assert!((renderer.swipe_degrees() + MAX_SWIPE_DEGREES).abs() < 1e-3);
    }

    #[test]
    fn test_reset_restores_first_color() {
        let mut renderer = MaterialRenderer::new();
        renderer.on_cycle_repeat();
        renderer.reset();
        assert_eq!(renderer.current_color(), Color::RED);
    }
}
