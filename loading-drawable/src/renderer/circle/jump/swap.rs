//! 交换：一排小球，实心球依次沿半圆与右邻交换位置

use serde::{Deserialize, Serialize};

use crate::canvas::{Paint, Surface};
use crate::config::{CommonConfig, RendererConfig, merge_color, merge_count, merge_positive};
use crate::easing::Easing;
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Rect};
use crate::renderer::{LoadingRenderer, RendererBase};

const DURATION_MS: u64 = 2500;
const DEFAULT_BALL_COUNT: usize = 5;
const DEFAULT_BALL_RADIUS: f32 = 7.5;
const DEFAULT_WIDTH: f32 = 15.0 * 11.0;
const DEFAULT_HEIGHT: f32 = 15.0 * 5.0;
const DEFAULT_STROKE_WIDTH: f32 = 1.5;

/// Swap 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball_radius: Option<f32>,
    /// 相邻小球的间距
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball_interval: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

#[derive(Debug, Clone)]
pub struct SwapRenderer {
    base: RendererBase,

    color: Color,
    ball_count: usize,
    ball_radius: f32,
    ball_interval: f32,
    stroke_width: f32,

    swap_index: usize,
    swap_ball_offset_x: f32,
    swap_ball_offset_y: f32,
}

impl Default for SwapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SwapRenderer {
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DURATION_MS),
            color: Color::WHITE,
            ball_count: DEFAULT_BALL_COUNT,
            ball_radius: DEFAULT_BALL_RADIUS,
            ball_interval: DEFAULT_BALL_RADIUS,
            stroke_width: DEFAULT_STROKE_WIDTH,
            swap_index: 0,
            swap_ball_offset_x: 0.0,
            swap_ball_offset_y: 0.0,
        }
    }

    /// 正在交换的小球下标
    pub fn swap_index(&self) -> usize {
        self.swap_index
    }

    /// 交换球相对原位的偏移
    pub fn swap_offset(&self) -> (f32, f32) {
        (self.swap_ball_offset_x, self.swap_ball_offset_y)
    }

    fn swap_threshold(&self) -> f32 {
        1.0 / self.ball_count as f32
    }

    fn ball_side_offsets(&self) -> f32 {
        let count = self.ball_count as f32;
        (self.base.width - self.ball_radius * 2.0 * count - self.ball_interval * (count - 1.0))
            / 2.0
    }

    fn ball_center_x(&self, index: usize) -> f32 {
        self.ball_side_offsets()
            + self.ball_radius * (index * 2 + 1) as f32
            + index as f32 * self.ball_interval
    }
}

impl LoadingRenderer for SwapRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Swap
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::Swap(swap) = config else {
            return Err(config.mismatch(RendererKind::Swap));
        };
        swap.common.apply_to(&mut self.base);
        merge_positive(&mut self.stroke_width, swap.stroke_width, "stroke_width");
        merge_positive(&mut self.ball_radius, swap.ball_radius, "ball_radius");
        merge_positive(&mut self.ball_interval, swap.ball_interval, "ball_interval");
        merge_count(&mut self.ball_count, swap.ball_count, "ball_count");
        merge_color(&mut self.color, swap.color);
        Ok(())
    }

    fn reset(&mut self) {}

    fn compute_render(&mut self, progress: f32) {
        let threshold = self.swap_threshold();
        let last = self.ball_count - 1;
        self.swap_index = ((progress / threshold) as usize).min(last);
        let is_last = self.swap_index == last;

        // 交换轨迹：x^2 + y^2 = r^2
        let trace_progress = Easing::AccelerateDecelerate
            .apply((progress - self.swap_index as f32 * threshold) / threshold);

        let trace_radius = if is_last {
            (self.ball_radius * 2.0 * last as f32 + self.ball_interval * last as f32) / 2.0
        } else {
            (self.ball_radius * 2.0 + self.ball_interval) / 2.0
        };

        // 最后一个球向左绕回第一个位置
        self.swap_ball_offset_x = if is_last {
            -trace_progress * trace_radius * 2.0
        } else {
            trace_progress * trace_radius * 2.0
        };

        let x = if is_last {
            self.swap_ball_offset_x + trace_radius
        } else {
            self.swap_ball_offset_x - trace_radius
        };

        let y = (trace_radius * trace_radius - x * x).max(0.0).sqrt();
        self.swap_ball_offset_y = if self.swap_index % 2 == 0 && !is_last {
            y
        } else {
            -y
        };
    }

    fn draw(&self, surface: &mut dyn Surface, bounds: Rect) {
        let save_count = surface.save();
        surface.translate(bounds.left, bounds.top);

        let center_y = self.base.height / 2.0;
        let color = self.base.modulate_alpha(self.color);
        let fill = Paint::fill(color).with_color_filter(self.base.color_filter);
        let stroke = Paint::stroke(color, self.stroke_width).with_color_filter(self.base.color_filter);
        let hollow_radius = self.ball_radius - self.stroke_width / 2.0;
        let partner = (self.swap_index + 1) % self.ball_count;

        for i in 0..self.ball_count {
            let cx = self.ball_center_x(i);
            if i == self.swap_index {
                surface.draw_circle(
                    cx + self.swap_ball_offset_x,
                    center_y - self.swap_ball_offset_y,
                    self.ball_radius,
                    &fill,
                );
            } else if i == partner {
                surface.draw_circle(
                    cx - self.swap_ball_offset_x,
                    center_y + self.swap_ball_offset_y,
                    hollow_radius,
                    &stroke,
                );
            } else {
                surface.draw_circle(cx, center_y, hollow_radius, &stroke);
            }
        }

        surface.restore_to_count(save_count);
    }
}
