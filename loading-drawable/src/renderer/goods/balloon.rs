//! 气球：打气筒推杆下压，气球随之鼓起并显示充气百分比

use serde::{Deserialize, Serialize};

use crate::canvas::{Paint, Style, Surface};
use crate::config::{CommonConfig, RendererConfig, merge_color, merge_positive};
use crate::easing::Easing;
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Rect};
use crate::path::{Direction, Path};
use crate::renderer::{LoadingRenderer, RendererBase};

const DURATION_MS: u64 = 3333;

/// 推杆上提（吸气）阶段结束的进度
const START_INHALE_DURATION_OFFSET: f32 = 0.4;

const DEFAULT_WIDTH: f32 = 200.0;
const DEFAULT_HEIGHT: f32 = 150.0;
const DEFAULT_STROKE_WIDTH: f32 = 2.0;
const DEFAULT_GAS_TUBE_WIDTH: f32 = 48.0;
const DEFAULT_GAS_TUBE_HEIGHT: f32 = 20.0;
const DEFAULT_CANNULA_WIDTH: f32 = 13.0;
const DEFAULT_CANNULA_HEIGHT: f32 = 37.0;
const DEFAULT_CANNULA_OFFSET_Y: f32 = 3.0;
const DEFAULT_CANNULA_MAX_OFFSET_Y: f32 = 15.0;
const DEFAULT_PIPE_BODY_WIDTH: f32 = 16.0;
const DEFAULT_PIPE_BODY_HEIGHT: f32 = 36.0;
const DEFAULT_BALLOON_WIDTH: f32 = 38.0;
const DEFAULT_BALLOON_HEIGHT: f32 = 48.0;
const DEFAULT_RECT_CORNER_RADIUS: f32 = 2.0;
const DEFAULT_TEXT_SIZE: f32 = 7.0;

/// 推杆头部圆角矩形高度与宽度之比
const CANNULA_HEAD_RATIO: f32 = 0.833;

const DEFAULT_BALLOON_COLOR: Color = Color(0xFFF3_C211);
const DEFAULT_GAS_TUBE_COLOR: Color = Color(0xFF17_4469);
const DEFAULT_PIPE_BODY_COLOR: Color = Color(0xAA23_69B1);
const DEFAULT_CANNULA_COLOR: Color = Color(0xFF17_4469);

/// Balloon 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalloonConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balloon_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_tube_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cannula_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipe_body_color: Option<Color>,
}

/// 百分比取整到十位并反转，加 10 后不超过 100
fn adjust_percent(exhale_percent: i32) -> i32 {
    (100 - exhale_percent / 10 * 10 + 10).min(100)
}

#[derive(Debug, Clone)]
pub struct BalloonRenderer {
    base: RendererBase,

    stroke_width: f32,
    text_size: f32,
    balloon_color: Color,
    gas_tube_color: Color,
    cannula_color: Color,
    pipe_body_color: Color,

    gas_tube_width: f32,
    gas_tube_height: f32,
    cannula_width: f32,
    cannula_height: f32,
    cannula_offset_y: f32,
    cannula_max_offset_y: f32,
    pipe_body_width: f32,
    pipe_body_height: f32,
    balloon_width: f32,
    balloon_height: f32,
    rect_corner_radius: f32,

    progress: f32,
    progress_text: String,
    gas_tube_bounds: Rect,
    pipe_body_bounds: Rect,
    cannula_bounds: Rect,
    balloon_bounds: Rect,
}

impl Default for BalloonRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl BalloonRenderer {
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DURATION_MS),
            stroke_width: DEFAULT_STROKE_WIDTH,
            text_size: DEFAULT_TEXT_SIZE,
            balloon_color: DEFAULT_BALLOON_COLOR,
            gas_tube_color: DEFAULT_GAS_TUBE_COLOR,
            cannula_color: DEFAULT_CANNULA_COLOR,
            pipe_body_color: DEFAULT_PIPE_BODY_COLOR,
            gas_tube_width: DEFAULT_GAS_TUBE_WIDTH,
            gas_tube_height: DEFAULT_GAS_TUBE_HEIGHT,
            cannula_width: DEFAULT_CANNULA_WIDTH,
            cannula_height: DEFAULT_CANNULA_HEIGHT,
            cannula_offset_y: DEFAULT_CANNULA_OFFSET_Y,
            cannula_max_offset_y: DEFAULT_CANNULA_MAX_OFFSET_Y,
            pipe_body_width: DEFAULT_PIPE_BODY_WIDTH,
            pipe_body_height: DEFAULT_PIPE_BODY_HEIGHT,
            balloon_width: DEFAULT_BALLOON_WIDTH,
            balloon_height: DEFAULT_BALLOON_HEIGHT,
            rect_corner_radius: DEFAULT_RECT_CORNER_RADIUS,
            progress: 0.0,
            progress_text: "10%".to_owned(),
            gas_tube_bounds: Rect::ZERO,
            pipe_body_bounds: Rect::ZERO,
            cannula_bounds: Rect::ZERO,
            balloon_bounds: Rect::ZERO,
        }
    }

    /// 当前显示的百分比文字
    pub fn progress_text(&self) -> &str {
        &self.progress_text
    }

    /// 气球鼓起程度 `[0, 1]`
    pub fn inflation(&self) -> f32 {
        self.progress
    }

    pub fn cannula_bounds(&self) -> Rect {
        self.cannula_bounds
    }

    pub fn balloon_bounds(&self) -> Rect {
        self.balloon_bounds
    }

    fn gas_tube_path(&self) -> Path {
        let rect = self.gas_tube_bounds;
        let mut path = Path::new();
        path.move_to(rect.left, rect.top);
        path.line_to(rect.left, rect.bottom);
        path.line_to(rect.right, rect.bottom);
        path.line_to(rect.right, rect.top);
        path
    }

    fn cannula_head_path(&self) -> Path {
        let rect = self.cannula_bounds;
        let mut path = Path::new();
        path.move_to(rect.left, rect.top);
        path.line_to(rect.right, rect.top);
        path.move_to(rect.center_x(), rect.top);
        path.line_to(
            rect.center_x(),
            rect.bottom - CANNULA_HEAD_RATIO * rect.width(),
        );
        path
    }

    fn cannula_bottom_path(&self) -> Path {
        let rect = self.cannula_bounds;
        let head = Rect::new(
            rect.left,
            rect.bottom - CANNULA_HEAD_RATIO * rect.width(),
            rect.right,
            rect.bottom,
        );
        let mut path = Path::new();
        path.add_round_rect(
            head,
            self.rect_corner_radius,
            self.rect_corner_radius,
            Direction::Ccw,
        );
        path
    }

    /// 气球轮廓
    ///
    /// 左右两段三次曲线的控制点随鼓起程度线性偏移。
    fn balloon_path(&self) -> Path {
        let rect = self.balloon_bounds;
        let (w, h) = (rect.width(), rect.height());
        let progress_width = w * self.progress;
        let progress_height = h * self.progress;

        let mut path = Path::new();
        path.move_to(rect.center_x(), rect.bottom);

        path.cubic_to(
            rect.left + w * 0.25 + progress_width * -0.48,
            rect.center_y() - h * 0.4 + progress_height * 0.75,
            rect.left - w * 0.20 + progress_width * -0.03,
            rect.center_y() + h * 1.15 + progress_height * -1.6,
            rect.left - w * 0.4 + progress_width * 0.9,
            rect.bottom + progress_height * -1.0,
        );

        path.cubic_to(
            rect.left - w * 0.38 + progress_width * 1.51,
            rect.center_y() - h * 0.4 + progress_height * -0.05,
            rect.left + w * 1.1 + progress_width * 0.03,
            rect.center_y() - h * 0.15 + progress_height * 0.5,
            rect.left + w * 0.5,
            rect.bottom,
        );
        path
    }
}

impl LoadingRenderer for BalloonRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Balloon
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::Balloon(balloon) = config else {
            return Err(config.mismatch(RendererKind::Balloon));
        };
        balloon.common.apply_to(&mut self.base);
        merge_positive(&mut self.stroke_width, balloon.stroke_width, "stroke_width");
        merge_positive(&mut self.text_size, balloon.text_size, "text_size");
        merge_color(&mut self.balloon_color, balloon.balloon_color);
        merge_color(&mut self.gas_tube_color, balloon.gas_tube_color);
        merge_color(&mut self.cannula_color, balloon.cannula_color);
        merge_color(&mut self.pipe_body_color, balloon.pipe_body_color);
        Ok(())
    }

    fn reset(&mut self) {
        self.progress = 0.0;
        self.progress_text = "10%".to_owned();
    }

    fn compute_render(&mut self, progress: f32) {
        let bounds = self.base.bounds;
        let (cx, cy) = (bounds.center_x(), bounds.center_y());
        let tube_half = self.gas_tube_width / 2.0;

        let cannula_offset = if progress <= START_INHALE_DURATION_OFFSET {
            self.progress = 0.0;
            self.progress_text = "10%".to_owned();
            -self.cannula_max_offset_y * progress / START_INHALE_DURATION_OFFSET
        } else {
            let exhale = Easing::ACCELERATE.apply(
                1.0 - (progress - START_INHALE_DURATION_OFFSET)
                    / (1.0 - START_INHALE_DURATION_OFFSET),
            );
            self.progress = 1.0 - exhale;
            self.progress_text = format!("{}%", adjust_percent((exhale * 100.0) as i32));
            -self.cannula_max_offset_y * exhale
        };

        self.gas_tube_bounds = Rect::new(
            cx - tube_half,
            cy,
            cx + tube_half,
            cy + self.gas_tube_height,
        );
        self.pipe_body_bounds = Rect::new(
            cx + tube_half - self.pipe_body_width / 2.0,
            cy - self.pipe_body_height,
            cx + tube_half + self.pipe_body_width / 2.0,
            cy,
        );
        self.cannula_bounds = Rect::new(
            cx + tube_half - self.cannula_width / 2.0,
            cy - self.cannula_height - self.cannula_offset_y,
            cx + tube_half + self.cannula_width / 2.0,
            cy - self.cannula_offset_y,
        )
        .offset(0.0, cannula_offset);

        let inset_x = self.balloon_width * 0.333 * (1.0 - self.progress);
        let inset_y = self.balloon_height * 0.667 * (1.0 - self.progress);
        self.balloon_bounds = Rect::new(
            cx - tube_half - self.balloon_width / 2.0 + inset_x,
            cy - self.balloon_height + inset_y,
            cx - tube_half + self.balloon_width / 2.0 - inset_x,
            cy,
        );
    }

    fn draw(&self, surface: &mut dyn Surface, bounds: Rect) {
        let save_count = surface.save();
        let filter = self.base.color_filter;

        let tube = Paint::stroke(self.gas_tube_color, self.stroke_width).with_color_filter(filter);
        surface.draw_path(&self.gas_tube_path(), &tube);

        let balloon = Paint::stroke(self.balloon_color, self.stroke_width)
            .with_style(Style::FillAndStroke)
            .with_color_filter(filter);
        surface.draw_path(&self.balloon_path(), &balloon);

        let text = Paint::stroke(self.gas_tube_color, self.stroke_width / 5.0)
            .with_style(Style::FillAndStroke)
            .with_text_size(self.text_size)
            .with_color_filter(filter);
        let text_bounds = surface.text_bounds(&self.progress_text, &text);
        surface.draw_text(
            &self.progress_text,
            bounds.center_x() - text_bounds.width() / 2.0,
            self.gas_tube_bounds.center_y() + text_bounds.height() / 2.0,
            &text,
        );

        let cannula =
            Paint::stroke(self.cannula_color, self.stroke_width).with_color_filter(filter);
        surface.draw_path(&self.cannula_head_path(), &cannula);
        let cannula_fill = Paint::fill(self.cannula_color).with_color_filter(filter);
        surface.draw_path(&self.cannula_bottom_path(), &cannula_fill);

        let pipe = Paint::fill(self.pipe_body_color).with_color_filter(filter);
        surface.draw_round_rect(
            self.pipe_body_bounds,
            self.rect_corner_radius,
            self.rect_corner_radius,
            &pipe,
        );

        surface.restore_to_count(save_count);
    }
}
