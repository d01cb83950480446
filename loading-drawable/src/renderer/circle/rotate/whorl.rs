//! 漩涡：同心的三条弧线，描边逐层变细，奇数层反向半圈

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
const MAX_SWIPE_DEGREES: f32 = 0.6 * 360.0;

const START_TRIM_DURATION_OFFSET: f32 = 0.5;
const END_TRIM_DURATION_OFFSET: f32 = 1.0;

/// Whorl 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhorlConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_radius: Option<f32>,
    /// 由外到内每层的颜色
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<Color>>,
}

#[derive(Debug, Clone)]
pub struct WhorlRenderer {
    base: RendererBase,

    colors: Vec<Color>,
    stroke_width: f32,
    center_radius: f32,

    trim: RingTrim,
    swipe_degrees: f32,
}

impl Default for WhorlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl WhorlRenderer {
    pub fn new() -> Self {
        Self {
            base: RendererBase::default(),
            colors: vec![Color::RED, Color::GREEN, Color::BLUE],
            stroke_width: DEFAULT_STROKE_WIDTH,
            center_radius: DEFAULT_CENTER_RADIUS,
            trim: RingTrim::default(),
            swipe_degrees: 0.0,
        }
    }

    pub fn swipe_degrees(&self) -> f32 {
        self.swipe_degrees
    }

    /// 第 `index` 层的弧线外框
    ///
    /// 每层向内收缩前面各层描边的 1.5 倍（取整），坐标截断为整数。
    fn arc_bounds(&self, ring: Rect, index: usize) -> Rect {
        let interval: i32 = (0..index)
            .map(|i| (self.stroke_width / (i as f32 + 1.0) * 1.5) as i32)
            .sum();
        let interval = interval as f32;
        Rect::new(
            ((ring.left + interval) as i32) as f32,
            ((ring.top + interval) as i32) as f32,
            ((ring.right - interval) as i32) as f32,
            ((ring.bottom - interval) as i32) as f32,
        )
    }
}

impl LoadingRenderer for WhorlRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Whorl
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::Whorl(whorl) = config else {
            return Err(config.mismatch(RendererKind::Whorl));
        };
        whorl.common.apply_to(&mut self.base);
        merge_positive(&mut self.stroke_width, whorl.stroke_width, "stroke_width");
        merge_positive(&mut self.center_radius, whorl.center_radius, "center_radius");
        merge_colors(&mut self.colors, whorl.colors.as_ref(), "colors");
        Ok(())
    }

    fn reset(&mut self) {
        self.trim.reset();
        self.swipe_degrees = 0.0;
    }

    fn on_cycle_start(&mut self) {
        self.trim.on_start();
    }

    fn on_cycle_repeat(&mut self) {
        self.trim.on_repeat(NUM_POINTS);
    }

    fn compute_render(&mut self, progress: f32) {
        if progress <= START_TRIM_DURATION_OFFSET {
            let start_trim_progress = progress / (1.0 - START_TRIM_DURATION_OFFSET);
            self.trim.start_degrees = self.trim.origin_start_degrees
                + MAX_SWIPE_DEGREES * Easing::FastOutSlowIn.apply(start_trim_progress);
        }

        if progress > START_TRIM_DURATION_OFFSET {
            let end_trim_progress = (progress - START_TRIM_DURATION_OFFSET)
                / (END_TRIM_DURATION_OFFSET - START_TRIM_DURATION_OFFSET);
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
            for (i, color) in self.colors.iter().enumerate() {
                let paint = Paint::stroke(*color, self.stroke_width / (i as f32 + 1.0))
                    .with_cap(Cap::Round)
                    .with_color_filter(self.base.color_filter);
                let start = self.trim.start_degrees + 180.0 * (i % 2) as f32;
                surface.draw_arc(
                    self.arc_bounds(ring, i),
                    start,
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

    #[test]
    fn test_arc_bounds_shrink_by_integer_steps() {
        let renderer = WhorlRenderer::new();
        let ring = Rect::new(15.5, 15.5, 40.5, 40.5);
        assert_eq!(renderer.arc_bounds(ring, 0), Rect::new(15.0, 15.0, 40.0, 40.0));
        // 2.5 * 1.5 = 3.75 -> 3
        assert_eq!(renderer.arc_bounds(ring, 1), Rect::new(18.0, 18.0, 37.0, 37.0));
        // 3 + (1.25 * 1.5 = 1.875 -> 1)
        assert_eq!(renderer.arc_bounds(ring, 2), Rect::new(19.0, 19.0, 36.0, 36.0));
    }

    #[test]
    fn test_swipe_keeps_last_nonzero() {
        let mut renderer = WhorlRenderer::new();
        renderer.reset();
        renderer.compute_render(0.25);
        let swipe = renderer.swipe_degrees();
        assert!(swipe < 0.0);
        renderer.compute_render(0.5);
        assert!((renderer.swipe_degrees() + MAX_SWIPE_DEGREES).abs() < 1e-3);
    }

    #[test]
    fn test_layers_alternate_half_turn() {
        let mut renderer = WhorlRenderer::new();
        renderer.on_bounds_changed(Rect::from_size(56.0, 56.0));
        renderer.reset();
        renderer.compute_render(0.3);

        let mut canvas = RecordingCanvas::new();
        renderer.paint(&mut canvas);
        let arcs: Vec<_> = canvas
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Arc { start, paint, .. } => Some((*start, paint.stroke_width)),
                _ => None,
            })
            .collect();
        assert_eq!(arcs.len(), 3);
        assert!((arcs[1].0 - arcs[0].0 - 180.0).abs() < 1e-3);
        assert_eq!(arcs[0].0, arcs[2].0);
        assert!((arcs[2].1 - 2.5 / 3.0).abs() < 1e-5);
    }
}
