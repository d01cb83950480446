//! 分层：三条共起点、长度按比例分层的弧线

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{DEFAULT_CENTER_RADIUS, DEFAULT_STROKE_WIDTH, RingTrim};
use crate::canvas::{Cap, Paint, Surface};
use crate::config::{CommonConfig, RendererConfig, merge_positive};
use crate::easing::Easing;
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Rect};
use crate::renderer::{LoadingRenderer, RendererBase, ring_stroke_inset};

const NUM_POINTS: f32 = 5.0;
const MAX_SWIPE_DEGREES: f32 = 0.8 * 360.0;

const LEVEL_SWEEP_ANGLE_OFFSETS: [f32; 3] = [1.0, 7.0 / 8.0, 5.0 / 8.0];

const START_TRIM_DURATION_OFFSET: f32 = 0.5;
const END_TRIM_DURATION_OFFSET: f32 = 1.0;

const DEFAULT_LEVEL_COLORS: [Color; 3] = [
    Color(0x55FF_FFFF),
    Color(0xB1FF_FFFF),
    Color(0xFFFF_FFFF),
];

/// Level 配置
///
/// `level_colors` 优先于 `level_color`；后者按 1/3、2/3、原值的 alpha 派生三层颜色。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_colors: Option<Vec<Color>>,
}

/// 由一个颜色派生三层颜色
fn derive_level_colors(color: Color) -> [Color; 3] {
    let alpha = u32::from(color.alpha());
    [
        color.with_alpha((alpha / 3) as u8),
        color.with_alpha((alpha * 2 / 3) as u8),
        color,
    ]
}

#[derive(Debug, Clone)]
pub struct LevelRenderer {
    base: RendererBase,

    level_colors: [Color; 3],
    stroke_width: f32,
    center_radius: f32,

    trim: RingTrim,
    level_swipe_degrees: [f32; 3],
}

impl Default for LevelRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelRenderer {
    pub fn new() -> Self {
        Self {
            base: RendererBase::default(),
            level_colors: DEFAULT_LEVEL_COLORS,
            stroke_width: DEFAULT_STROKE_WIDTH,
            center_radius: DEFAULT_CENTER_RADIUS,
            trim: RingTrim::default(),
            level_swipe_degrees: [0.0; 3],
        }
    }

    /// 三层弧线的扫过角度
    pub fn level_swipe_degrees(&self) -> [f32; 3] {
        self.level_swipe_degrees
    }

    pub fn group_rotation(&self) -> f32 {
        self.trim.group_rotation
    }
}

impl LoadingRenderer for LevelRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Level
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::Level(level) = config else {
            return Err(config.mismatch(RendererKind::Level));
        };
        level.common.apply_to(&mut self.base);
        merge_positive(&mut self.stroke_width, level.stroke_width, "stroke_width");
        merge_positive(&mut self.center_radius, level.center_radius, "center_radius");

        if let Some(color) = level.level_color {
            self.level_colors = derive_level_colors(color);
        }
        if let Some(colors) = &level.level_colors {
            match <[Color; 3]>::try_from(colors.as_slice()) {
                Ok(colors) => self.level_colors = colors,
                Err(_) => warn!(
                    field = "level_colors",
                    len = colors.len(),
                    "需要恰好三个颜色，保留默认值"
                ),
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.trim.reset();
        self.level_swipe_degrees = [0.0; 3];
    }

    fn on_cycle_start(&mut self) {
        self.trim.on_start();
    }

    fn on_cycle_repeat(&mut self) {
        self.trim.on_repeat(NUM_POINTS);
    }

    fn compute_render(&mut self, progress: f32) {
        let trim = &mut self.trim;
        let levels = &mut self.level_swipe_degrees;

        // 前 50%：起点前进，三层按比例分层
        if progress <= START_TRIM_DURATION_OFFSET {
            let start_trim_progress = progress / START_TRIM_DURATION_OFFSET;
            trim.start_degrees = trim.origin_start_degrees
                + MAX_SWIPE_DEGREES * Easing::FastOutSlowIn.apply(start_trim_progress);

            let swipe_degrees = trim.end_degrees - trim.start_degrees;
            let level_progress = swipe_degrees.abs() / MAX_SWIPE_DEGREES;

            let level1_increment = Easing::DECELERATE.apply(level_progress) - level_progress;
            let level3_increment = Easing::ACCELERATE.apply(level_progress) - level_progress;

            levels[0] = -swipe_degrees * LEVEL_SWEEP_ANGLE_OFFSETS[0] * (1.0 + level1_increment);
            levels[1] = -swipe_degrees * LEVEL_SWEEP_ANGLE_OFFSETS[1];
            levels[2] = -swipe_degrees * LEVEL_SWEEP_ANGLE_OFFSETS[2] * (1.0 + level3_increment);
        }

        // 后 50%：终点追赶，层级依次收回
        if progress > START_TRIM_DURATION_OFFSET {
            let end_trim_progress = (progress - START_TRIM_DURATION_OFFSET)
                / (END_TRIM_DURATION_OFFSET - START_TRIM_DURATION_OFFSET);
            trim.end_degrees = trim.origin_end_degrees
                + MAX_SWIPE_DEGREES * Easing::FastOutSlowIn.apply(end_trim_progress);

            let swipe_degrees = trim.end_degrees - trim.start_degrees;
            let level_progress = swipe_degrees.abs() / MAX_SWIPE_DEGREES;

            if level_progress > LEVEL_SWEEP_ANGLE_OFFSETS[1] {
                levels[0] = -swipe_degrees;
                levels[1] = MAX_SWIPE_DEGREES * LEVEL_SWEEP_ANGLE_OFFSETS[1];
                levels[2] = MAX_SWIPE_DEGREES * LEVEL_SWEEP_ANGLE_OFFSETS[2];
            } else if level_progress > LEVEL_SWEEP_ANGLE_OFFSETS[2] {
                levels[0] = 0.0;
                levels[1] = -swipe_degrees;
                levels[2] = MAX_SWIPE_DEGREES * LEVEL_SWEEP_ANGLE_OFFSETS[2];
            } else {
                levels[0] = 0.0;
                levels[1] = 0.0;
                levels[2] = -swipe_degrees;
            }
        }

        trim.group_rotation = trim.rotation(NUM_POINTS, progress);
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

        for (swipe, color) in self.level_swipe_degrees.iter().zip(self.level_colors) {
            if *swipe != 0.0 {
                let paint = Paint::stroke(color, self.stroke_width)
                    .with_cap(Cap::Round)
                    .with_color_filter(self.base.color_filter);
                surface.draw_arc(ring, self.trim.end_degrees, *swipe, false, &paint);
            }
        }

        surface.restore_to_count(save_count);
    }
}
