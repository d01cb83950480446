//! 鱼：一条小鱼沿着虚线河道一格一格地游，转角处掉头

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::{ClipOp, Join, Paint, PathEffect, Surface};
use crate::config::{CommonConfig, RendererConfig, merge_color};
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Point, Rect};
use crate::path::{Direction, Path, PathMeasure};
use crate::renderer::{LoadingRenderer, RendererBase};

const DURATION_MS: u64 = 800;

const DEFAULT_PATH_FULL_LINE_SIZE: f32 = 7.0;
const DEFAULT_PATH_DOTTED_LINE_SIZE: f32 = DEFAULT_PATH_FULL_LINE_SIZE / 2.0;
const DEFAULT_RIVER_HEIGHT: f32 = DEFAULT_PATH_FULL_LINE_SIZE * 8.5;
const DEFAULT_RIVER_WIDTH: f32 = DEFAULT_PATH_FULL_LINE_SIZE * 5.5;

const DEFAULT_FISH_EYE_SIZE: f32 = DEFAULT_PATH_FULL_LINE_SIZE * 0.5;
const DEFAULT_FISH_WIDTH: f32 = DEFAULT_PATH_FULL_LINE_SIZE * 3.0;
const DEFAULT_FISH_HEIGHT: f32 = DEFAULT_PATH_FULL_LINE_SIZE * 4.5;

const DEFAULT_WIDTH: f32 = 200.0;
const DEFAULT_HEIGHT: f32 = 150.0;
const DEFAULT_RIVER_BANK_WIDTH: f32 = DEFAULT_PATH_FULL_LINE_SIZE;

/// 河道一圈的虚线段数
const DOTTED_LINE_WIDTH_COUNT: f32 = (8.5 + 5.5 - 2.0) * 2.0 * 2.0;
const DOTTED_LINE_WIDTH_RATE: f32 = 1.0 / DOTTED_LINE_WIDTH_COUNT;

/// 鱼依次停靠的位置（占河道全长的比例）
const FISH_MOVE_POINTS: [f32; 8] = [
    DOTTED_LINE_WIDTH_RATE * 3.0,
    DOTTED_LINE_WIDTH_RATE * 6.0,
    DOTTED_LINE_WIDTH_RATE * 15.0,
    DOTTED_LINE_WIDTH_RATE * 18.0,
    DOTTED_LINE_WIDTH_RATE * 27.0,
    DOTTED_LINE_WIDTH_RATE * 30.0,
    DOTTED_LINE_WIDTH_RATE * 39.0,
    DOTTED_LINE_WIDTH_RATE * 42.0,
];
const FISH_MOVE_POINTS_RATE: f32 = 1.0 / FISH_MOVE_POINTS.len() as f32;

const DEFAULT_COLOR: Color = Color(0xFFFE_FED6);

/// Fish 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FishConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

/// 阶梯曲线：把进度映射到最近的停靠点
fn fish_step(input: f32) -> f32 {
    let index = ((input / FISH_MOVE_POINTS_RATE) as usize).min(FISH_MOVE_POINTS.len() - 1);
    FISH_MOVE_POINTS[index]
}

fn rotate_degrees(fish_progress: f32) -> f32 {
    if fish_progress < FISH_MOVE_POINTS_RATE * 2.0 {
        90.0
    } else if fish_progress < FISH_MOVE_POINTS_RATE * 4.0 {
        180.0
    } else if fish_progress < FISH_MOVE_POINTS_RATE * 6.0 {
        270.0
    } else {
        0.0
    }
}

/// 矩形绕自身中心旋转后的外接矩形
fn rotated_bounds(rect: Rect, degrees: f32) -> Rect {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let half_w = rect.width() / 2.0;
    let half_h = rect.height() / 2.0;
    let w = half_w * cos + half_h * sin;
    let h = half_w * sin + half_h * cos;
    Rect::new(
        rect.center_x() - w,
        rect.center_y() - h,
        rect.center_x() + w,
        rect.center_y() + h,
    )
}

#[derive(Debug, Clone)]
pub struct FishRenderer {
    base: RendererBase,

    color: Color,
    river_bank_width: f32,
    river_width: f32,
    river_height: f32,
    fish_width: f32,
    fish_height: f32,
    fish_eye_size: f32,
    path_full_line_size: f32,
    path_dotted_line_size: f32,

    /// 河道路径与测量结果，随 bounds 重建
    river: Option<(Path, PathMeasure)>,
    fish_head: Point,
    fish_rotate_degrees: f32,
}

impl Default for FishRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl FishRenderer {
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DURATION_MS),
            color: DEFAULT_COLOR,
            river_bank_width: DEFAULT_RIVER_BANK_WIDTH,
            river_width: DEFAULT_RIVER_WIDTH,
            river_height: DEFAULT_RIVER_HEIGHT,
            fish_width: DEFAULT_FISH_WIDTH,
            fish_height: DEFAULT_FISH_HEIGHT,
            fish_eye_size: DEFAULT_FISH_EYE_SIZE,
            path_full_line_size: DEFAULT_PATH_FULL_LINE_SIZE,
            path_dotted_line_size: DEFAULT_PATH_DOTTED_LINE_SIZE,
            river: None,
            fish_head: Point::ZERO,
            fish_rotate_degrees: 0.0,
        }
    }

    pub fn fish_head(&self) -> Point {
        self.fish_head
    }

    pub fn fish_rotate_degrees(&self) -> f32 {
        self.fish_rotate_degrees
    }

    fn build_river(&self, bounds: Rect) -> Option<(Path, PathMeasure)> {
        if bounds.is_empty() {
            return None;
        }
        let half_bank = self.river_bank_width / 2.0;
        let rect = Rect::new(
            bounds.center_x() - self.river_width / 2.0,
            bounds.center_y() - self.river_height / 2.0,
            bounds.center_x() + self.river_width / 2.0,
            bounds.center_y() + self.river_height / 2.0,
        )
        .inset(half_bank, half_bank);

        let mut path = Path::new();
        path.add_rect(rect, Direction::Cw);
        let measure = PathMeasure::new(&path);
        debug!(length = measure.length(), "河道已重建");
        Some((path, measure))
    }

    fn fish_path(&self, cx: f32, cy: f32) -> Path {
        let w = self.fish_width;
        let h = self.fish_height;
        let head_y = cy - h / 2.0;

        let mut path = Path::new();
        // 鱼头
        path.move_to(cx, head_y);
        // 左半身
        path.quad_to(cx - w * 0.333, head_y + h * 0.222, cx - w * 0.333, head_y + h * 0.444);
        path.line_to(cx - w * 0.333, head_y + h * 0.666);
        path.line_to(cx - w * 0.5, head_y + h * 0.8);
        path.line_to(cx - w * 0.5, head_y + h);
        // 鱼尾
        path.line_to(cx, head_y + h * 0.9);
        // 右半身
        path.line_to(cx + w * 0.5, head_y + h);
        path.line_to(cx + w * 0.5, head_y + h * 0.8);
        path.line_to(cx + w * 0.333, head_y + h * 0.666);
        path.line_to(cx + w * 0.333, head_y + h * 0.444);
        path.quad_to(cx + w * 0.333, head_y + h * 0.222, cx, head_y);
        path.close();
        path
    }
}

impl LoadingRenderer for FishRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Fish
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::Fish(fish) = config else {
            return Err(config.mismatch(RendererKind::Fish));
        };
        fish.common.apply_to(&mut self.base);
        merge_color(&mut self.color, fish.color);
        Ok(())
    }

    fn on_bounds_changed(&mut self, bounds: Rect) {
        self.base.bounds = bounds;
        self.river = self.build_river(bounds);
    }

    fn reset(&mut self) {}

    fn compute_render(&mut self, progress: f32) {
        let Some((_, measure)) = &self.river else {
            return;
        };

        let fish_progress = fish_step(progress);
        if let Some(head) = measure.position_at(measure.length() * fish_progress) {
            self.fish_head = head;
        }
        self.fish_rotate_degrees = rotate_degrees(fish_progress);
    }

    fn draw(&self, surface: &mut dyn Surface, _bounds: Rect) {
        let Some((river, _)) = &self.river else {
            return;
        };
        let save_count = surface.save();
        let head = self.fish_head;

        // 鱼所在的一段河道不画，左右多留一点虚线间隔
        let fish_rect = Rect::new(
            head.x - self.fish_width / 2.0 - self.path_dotted_line_size * 1.2,
            head.y - self.fish_height / 2.0,
            head.x + self.fish_width / 2.0 + self.path_dotted_line_size * 1.2,
            head.y + self.fish_height / 2.0,
        );
        let fish_clip = rotated_bounds(fish_rect, self.fish_rotate_degrees);

        let river_save_count = surface.save();
        let bank = Paint::stroke(self.color, self.river_bank_width)
            .with_join(Join::Miter)
            .with_path_effect(Some(PathEffect::Dash {
                intervals: vec![self.path_full_line_size, self.path_dotted_line_size],
                phase: self.path_dotted_line_size,
            }))
            .with_color_filter(self.base.color_filter);
        surface.clip_rect(fish_clip, ClipOp::Difference);
        surface.draw_path(river, &bank);
        surface.restore_to_count(river_save_count);

        let fish_save_count = surface.save();
        surface.rotate(self.fish_rotate_degrees, head.x, head.y);
        let mut eye = Path::new();
        eye.add_circle(
            head.x,
            head.y - self.fish_height * 0.06,
            self.fish_eye_size,
            Direction::Cw,
        );
        surface.clip_path(&eye, ClipOp::Difference);
        let body = Paint::fill(self.color).with_color_filter(self.base.color_filter);
        surface.draw_path(&self.fish_path(head.x, head.y), &body);
        surface.restore_to_count(fish_save_count);

        surface.restore_to_count(save_count);
    }
}
