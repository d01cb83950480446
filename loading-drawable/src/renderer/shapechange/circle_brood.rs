//! 母子圆：母圆沿轨迹伸缩移动，子圆脱离再回归，期间背景以圆形揭开换色

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::{Paint, Surface};
use crate::config::{CommonConfig, RendererConfig, merge_color, merge_positive};
use crate::easing::Easing;
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Point, Rect};
use crate::path::{Path, PathMeasure};
use crate::renderer::{LoadingRenderer, RendererBase};

const DURATION_MS: u64 = 4111;

const DEFAULT_WIDTH: f32 = 200.0;
const DEFAULT_HEIGHT: f32 = 150.0;
const MAX_MOTHER_OVAL_SIZE: f32 = 19.0;
const MIN_CHILD_OVAL_RADIUS: f32 = 5.0;
const MAX_MOTHER_SHAPE_CHANGE_FACTOR: f32 = 0.8452;

/// 用三次曲线逼近四分之一圆的控制点系数
const OVAL_BEZIER_FACTOR: f32 = 0.55152;

// ========== 阶段 ==========

const STAGE_MOTHER_FORWARD_TOP_LEFT: f32 = 0.34;
const STAGE_MOTHER_BACKWARD_TOP_LEFT: f32 = 0.5;
const STAGE_MOTHER_FORWARD_BOTTOM_LEFT: f32 = 0.65;
const STAGE_MOTHER_BACKWARD_BOTTOM_LEFT: f32 = 0.833;

const STAGE_CHILD_DELAY: f32 = 0.1;
const STAGE_CHILD_PRE_FORWARD_TOP_LEFT: f32 = 0.26;
const STAGE_CHILD_FORWARD_TOP_LEFT: f32 = 0.34;
const STAGE_CHILD_PRE_BACKWARD_TOP_LEFT: f32 = 0.42;
const STAGE_CHILD_BACKWARD_TOP_LEFT: f32 = 0.5;
const STAGE_CHILD_FORWARD_BOTTOM_LEFT: f32 = 0.7;
const STAGE_CHILD_BACKWARD_BOTTOM_LEFT: f32 = 0.9;

const MOTHER_STAGES: [f32; 4] = [
    STAGE_MOTHER_FORWARD_TOP_LEFT,
    STAGE_MOTHER_BACKWARD_TOP_LEFT,
    STAGE_MOTHER_FORWARD_BOTTOM_LEFT,
    STAGE_MOTHER_BACKWARD_BOTTOM_LEFT,
];

const CHILD_STAGES: [f32; 6] = [
    STAGE_CHILD_PRE_FORWARD_TOP_LEFT,
    STAGE_CHILD_FORWARD_TOP_LEFT,
    STAGE_CHILD_PRE_BACKWARD_TOP_LEFT,
    STAGE_CHILD_BACKWARD_TOP_LEFT,
    STAGE_CHILD_FORWARD_BOTTOM_LEFT,
    STAGE_CHILD_BACKWARD_BOTTOM_LEFT,
];

const DEFAULT_OVAL_COLOR: Color = Color(0xFFBE_1C23);
const DEFAULT_OVAL_DEEP_COLOR: Color = Color(0xFFB2_1721);
const DEFAULT_BACKGROUND_COLOR: Color = Color(0xFFE3_C172);
const DEFAULT_BACKGROUND_DEEP_COLOR: Color = Color(0xFFE2_B552);

/// CircleBrood 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleBroodConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    /// 母圆最大半径
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mother_oval_size: Option<f32>,
    /// 子圆基础半径
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_oval_radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oval_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oval_deep_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_deep_color: Option<Color>,
}

// ========== 时间曲线 ==========

fn mother_move_curve(input: f32) -> f32 {
    if input <= STAGE_MOTHER_FORWARD_TOP_LEFT {
        Easing::Accelerate(1.0).apply(input * 2.941) / 2.941
    } else if input <= STAGE_MOTHER_BACKWARD_TOP_LEFT {
        0.34 + Easing::Decelerate(1.0).apply((input - 0.34) * 6.25) / 6.25
    } else if input <= STAGE_MOTHER_FORWARD_BOTTOM_LEFT {
        0.5 + Easing::Accelerate(0.3).apply((input - 0.5) * 6.666) / 4.0
    } else if input <= STAGE_MOTHER_BACKWARD_BOTTOM_LEFT {
        0.75 + Easing::Decelerate(0.3).apply((input - 0.65) * 5.46) / 4.0
    } else {
        1.0
    }
}

fn child_move_curve(input: f32) -> f32 {
    if input < STAGE_CHILD_DELAY {
        0.0
    } else if input <= STAGE_CHILD_PRE_FORWARD_TOP_LEFT {
        Easing::Decelerate(1.0).apply((input - 0.1) * 6.25) / 3.846
    } else if input <= STAGE_CHILD_FORWARD_TOP_LEFT {
        0.26 + Easing::Accelerate(1.0).apply((input - 0.26) * 12.5) / 12.5
    } else if input <= STAGE_CHILD_PRE_BACKWARD_TOP_LEFT {
        0.34 + Easing::Decelerate(0.8).apply((input - 0.34) * 12.5) / 12.5
    } else if input <= STAGE_CHILD_BACKWARD_TOP_LEFT {
        0.42 + Easing::Accelerate(0.8).apply((input - 0.42) * 12.5) / 12.5
    } else if input <= STAGE_CHILD_FORWARD_BOTTOM_LEFT {
        0.5 + Easing::Decelerate(0.5).apply((input - 0.5) * 5.0) / 5.0
    } else if input <= STAGE_CHILD_BACKWARD_BOTTOM_LEFT {
        0.7 + Easing::Accelerate(0.5).apply((input - 0.7) * 5.0) / 3.33
    } else {
        1.0
    }
}

/// 母圆纵向压缩系数：每个阶段内先压扁到最小再恢复
fn mother_shape_factor(input: f32) -> f32 {
    let mut shape_progress = 1.0;
    let mut stage_start = 0.0;
    for end in MOTHER_STAGES {
        if input <= end {
            shape_progress = (input - stage_start) / (end - stage_start);
            break;
        }
        stage_start = end;
    }

    if shape_progress < 0.5 {
        1.0 - (1.0 - MAX_MOTHER_SHAPE_CHANGE_FACTOR) * shape_progress * 2.0
    } else {
        MAX_MOTHER_SHAPE_CHANGE_FACTOR
            + (1.0 - MAX_MOTHER_SHAPE_CHANGE_FACTOR) * (shape_progress - 0.5) * 2.0
    }
}

/// 分段轨迹上的行进距离
///
/// 每个阶段在 `(上一阶段终点, 本阶段终点]` 内线性走完对应长度，
/// 超过最后一个阶段时停在轨迹末端。
fn stage_distance(input: f32, stage_ends: &[f32], stage_lengths: &[f32]) -> f32 {
    if input <= 0.0 {
        return 0.0;
    }
    let mut start_distance = 0.0;
    let mut start_progress = 0.0;
    for (&end, &length) in stage_ends.iter().zip(stage_lengths) {
        if input <= end {
            return start_distance + (input - start_progress) / (end - start_progress) * length;
        }
        start_distance += length;
        start_progress = end;
    }
    start_distance
}

/// 带分段长度的移动轨迹
#[derive(Debug, Clone, Default)]
struct MoveTrack {
    measure: PathMeasure,
    stage_lengths: Vec<f32>,
}

impl MoveTrack {
    /// 逐段构建轨迹，每段追加后记录新增长度
    fn build(start: Point, stages: &[&dyn Fn(&mut Path)]) -> Self {
        let mut path = Path::new();
        path.move_to(start.x, start.y);
        let mut stage_lengths = Vec::with_capacity(stages.len());
        let mut consumed = 0.0;
        for append in stages {
            append(&mut path);
            let length = PathMeasure::new(&path).length();
            stage_lengths.push(length - consumed);
            consumed = length;
        }
        Self {
            measure: PathMeasure::new(&path),
            stage_lengths,
        }
    }

    fn position(&self, input: f32, stage_ends: &[f32]) -> Point {
        let distance = stage_distance(input, stage_ends, &self.stage_lengths);
        self.measure.position_at(distance).unwrap_or(Point::ZERO)
    }
}

#[derive(Debug, Clone)]
pub struct CircleBroodRenderer {
    base: RendererBase,

    max_mother_oval_size: f32,
    basic_child_oval_radius: f32,
    oval_color: Color,
    oval_deep_color: Color,
    background_color: Color,
    background_deep_color: Color,

    mother_track: Option<MoveTrack>,
    child_track: Option<MoveTrack>,

    mother_position: Point,
    child_position: Point,
    mother_half_width: f32,
    mother_half_height: f32,
    child_radius: f32,
    child_left_x_offset: f32,
    rotate_degrees: f32,
    reveal_radius: f32,
    current_oval_color: Color,
    current_background_color: Color,
}

impl Default for CircleBroodRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CircleBroodRenderer {
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DURATION_MS),
            max_mother_oval_size: MAX_MOTHER_OVAL_SIZE,
            basic_child_oval_radius: MIN_CHILD_OVAL_RADIUS,
            oval_color: DEFAULT_OVAL_COLOR,
            oval_deep_color: DEFAULT_OVAL_DEEP_COLOR,
            background_color: DEFAULT_BACKGROUND_COLOR,
            background_deep_color: DEFAULT_BACKGROUND_DEEP_COLOR,
            mother_track: None,
            child_track: None,
            mother_position: Point::ZERO,
            child_position: Point::ZERO,
            mother_half_width: MAX_MOTHER_OVAL_SIZE,
            mother_half_height: MAX_MOTHER_OVAL_SIZE,
            child_radius: MIN_CHILD_OVAL_RADIUS,
            child_left_x_offset: 0.0,
            rotate_degrees: 0.0,
            reveal_radius: 0.0,
            current_oval_color: DEFAULT_OVAL_COLOR,
            current_background_color: DEFAULT_BACKGROUND_COLOR,
        }
    }

    pub fn mother_position(&self) -> Point {
        self.mother_position
    }

    pub fn child_position(&self) -> Point {
        self.child_position
    }

    pub fn child_radius(&self) -> f32 {
        self.child_radius
    }

    /// 母圆半宽与半高
    pub fn mother_size(&self) -> (f32, f32) {
        (self.mother_half_width, self.mother_half_height)
    }

    pub fn reveal_radius(&self) -> f32 {
        self.reveal_radius
    }

    pub fn oval_color(&self) -> Color {
        self.current_oval_color
    }

    pub fn background_color(&self) -> Color {
        self.current_background_color
    }

    fn build_tracks(&mut self) {
        let bounds = self.base.bounds;
        let (cx, cy) = (bounds.center_x(), bounds.center_y());
        let w = self.max_mother_oval_size;
        let h = self.max_mother_oval_size;
        let center = Point::new(cx, cy);

        self.mother_track = Some(MoveTrack::build(
            center,
            &[
                &|p: &mut Path| p.quad_to(cx - w * 2.0, cy, cx - w * 2.0, cy - h),
                &|p: &mut Path| p.quad_to(cx - w, cy - h, cx, cy),
                &|p: &mut Path| p.quad_to(cx, cy + h, cx - w / 2.0, cy + h * 1.1),
                &|p: &mut Path| p.quad_to(cx - w / 2.0, cy + h * 0.6, cx, cy),
            ],
        ));

        self.child_track = Some(MoveTrack::build(
            center,
            &[
                &|p: &mut Path| p.line_to(cx + w * 0.75, cy),
                &|p: &mut Path| p.quad_to(cx - w * 0.5, cy, cx - w * 2.0, cy - h),
                &|p: &mut Path| {
                    p.line_to(cx - w * 2.0 + w * 0.2, cy - h);
                    p.quad_to(cx - w * 2.5, cy - h * 2.0, cx - w * 1.5, cy - h * 2.25);
                },
                &|p: &mut Path| p.quad_to(cx - w * 0.2, cy - h * 2.25, cx, cy),
                &|p: &mut Path| {
                    p.cubic_to(cx, cy + h, cx - w, cy + h * 2.5, cx - w * 1.5, cy + h * 2.5)
                },
                &|p: &mut Path| {
                    p.cubic_to(cx - w * 2.0, cy + h * 2.5, cx - w * 3.0, cy + h * 0.8, cx, cy)
                },
            ],
        ));
        debug!(?bounds, "移动轨迹已重建");
    }

    /// 子圆半径与左侧凸起
    fn setup_child_params(&mut self, input: f32) {
        let basic = self.basic_child_oval_radius;
        self.child_radius = basic;
        self.child_left_x_offset = 0.0;

        if input <= STAGE_CHILD_PRE_FORWARD_TOP_LEFT {
            self.child_left_x_offset = if input >= 0.25 {
                let shape_progress = (input - 0.25) / 0.01;
                (1.0 - shape_progress) * basic * 0.25
            } else {
                basic * 0.25
            };
        } else if input <= STAGE_CHILD_FORWARD_TOP_LEFT {
            if input > 0.275 && input < 0.285 {
                let shape_progress = (input - 0.275) / 0.01;
                self.child_left_x_offset = shape_progress * basic * 0.25;
            } else if input > 0.285 {
                self.child_left_x_offset = basic * 0.25;
            }
        } else if input <= STAGE_CHILD_PRE_BACKWARD_TOP_LEFT {
            if input > 0.38 {
                self.child_radius = basic * (1.0 + (input - 0.38) / 0.04);
            }
        } else if input <= STAGE_CHILD_BACKWARD_TOP_LEFT {
            if input < 0.46 {
                self.child_radius = basic * (2.0 - (input - 0.42) / 0.04);
            }
        } else if input <= STAGE_CHILD_FORWARD_BOTTOM_LEFT {
            if input > 0.65 {
                self.child_radius = basic * (1.0 + (input - 0.65) / 0.05);
            }
        } else if input <= STAGE_CHILD_BACKWARD_BOTTOM_LEFT {
            if input < 0.71 {
                self.child_radius = basic * 2.0;
            } else if input < 0.76 {
                self.child_radius = basic * (2.0 - (input - 0.71) / 0.05);
            }
        }
    }

    fn max_reveal_radius(&self) -> f32 {
        let (w, h) = (self.base.width, self.base.height);
        ((w * w + h * h).sqrt() / 2.0 + 1.0).trunc()
    }

    fn current_reveal_radius(&self, input: f32) -> f32 {
        let max = self.max_reveal_radius();
        let mut radius = 0.0;
        if input > 0.44 && input < 0.48 {
            radius = ((input - 0.44) / 0.04 * max).trunc();
        }
        if input > 0.81 && input < 0.85 {
            radius = ((input - 0.81) / 0.04 * max).trunc();
        }
        radius
    }

    fn current_background(&self, input: f32) -> Color {
        if !(0.48..=0.85).contains(&input) {
            self.background_color
        } else {
            self.background_deep_color
        }
    }

    fn current_oval(&self, input: f32) -> Color {
        if input < 0.5 {
            self.oval_color
        } else if input < 0.75 {
            self.oval_color
                .lerp(self.oval_deep_color, (input - 0.5) / 0.2)
        } else if input < 0.85 {
            self.oval_deep_color
        } else {
            self.oval_deep_color
                .lerp(self.oval_color, (input - 0.9) / 0.1)
        }
    }

    /// 子圆：四段三次曲线，左侧可向外凸起
    fn child_path(&self) -> Path {
        let Point { x, y } = self.child_position;
        let r = self.child_radius;
        let bezier = r * OVAL_BEZIER_FACTOR;
        let left_x = self.child_left_x_offset;
        let left_y = left_x / 2.5;

        let mut path = Path::new();
        path.move_to(x, y - r);
        path.cubic_to(
            x - bezier - left_x,
            y - r,
            x - r - left_x,
            y - bezier + left_y,
            x - r - left_x,
            y,
        );
        path.cubic_to(
            x - r - left_x,
            y + bezier - left_y,
            x - bezier - left_x,
            y + r,
            x,
            y + r,
        );
        path.cubic_to(x + bezier, y + r, x + r, y + bezier, x + r, y);
        path.cubic_to(x + r, y - bezier, x + bezier, y - r, x, y - r);
        path
    }

    /// 母子圆距离足够近时连接两者的粘连部分
    fn link_path(&self) -> Option<Path> {
        let mother = self.mother_position;
        let child = self.child_position;
        let half_width = self.mother_half_width;
        let child_r = self.child_radius;
        let distance = mother.distance(child);

        if distance > half_width + child_r * 1.2 || distance < half_width - child_r * 1.2 {
            return None;
        }

        let bezier = half_width * OVAL_BEZIER_FACTOR;
        let max_offset_y = 2.0 * child_r * 1.2;
        let offset_rate = (distance - (half_width - child_r * 1.2)) / max_offset_y;
        let offset_y =
            self.mother_half_height - offset_rate * (self.mother_half_height - child_r) * 0.85;
        let x_offset = distance - half_width + child_r;

        let ultra_left = Point::new(mother.x - half_width, mother.y).distance(child);
        let ultra_right = Point::new(mother.x + half_width, mother.y).distance(child);
        // 向子圆所在一侧延伸
        let side = if ultra_right < ultra_left { 1.0 } else { -1.0 };

        let mut path = Path::new();
        path.move_to(mother.x, mother.y + offset_y);
        path.cubic_to(
            mother.x + side * (bezier + x_offset),
            mother.y + offset_y,
            mother.x + side * (distance + child_r),
            mother.y + child_r * 1.5,
            mother.x + side * (distance + child_r),
            mother.y,
        );
        path.cubic_to(
            mother.x + side * (distance + child_r),
            mother.y - child_r * 1.5,
            mother.x + side * (bezier + x_offset),
            mother.y - offset_y,
            mother.x,
            mother.y - offset_y,
        );
        path.line_to(mother.x, mother.y + offset_y);
        Some(path)
    }
}

impl LoadingRenderer for CircleBroodRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::CircleBrood
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::CircleBrood(brood) = config else {
            return Err(config.mismatch(RendererKind::CircleBrood));
        };
        brood.common.apply_to(&mut self.base);
        merge_positive(
            &mut self.max_mother_oval_size,
            brood.mother_oval_size,
            "mother_oval_size",
        );
        merge_positive(
            &mut self.basic_child_oval_radius,
            brood.child_oval_radius,
            "child_oval_radius",
        );
        merge_color(&mut self.oval_color, brood.oval_color);
        merge_color(&mut self.oval_deep_color, brood.oval_deep_color);
        merge_color(&mut self.background_color, brood.background_color);
        merge_color(&mut self.background_deep_color, brood.background_deep_color);
        self.mother_track = None;
        self.child_track = None;
        self.reset();
        Ok(())
    }

    fn on_bounds_changed(&mut self, bounds: Rect) {
        self.base.bounds = bounds;
        self.mother_track = None;
        self.child_track = None;
    }

    fn reset(&mut self) {
        self.mother_half_width = self.max_mother_oval_size;
        self.mother_half_height = self.max_mother_oval_size;
        self.child_radius = self.basic_child_oval_radius;
        self.child_left_x_offset = 0.0;
        self.rotate_degrees = 0.0;
        self.reveal_radius = 0.0;
        self.current_oval_color = self.oval_color;
        self.current_background_color = self.background_color;
    }

    fn compute_render(&mut self, progress: f32) {
        if self.base.bounds.is_empty() {
            return;
        }
        if self.mother_track.is_none() || self.child_track.is_none() {
            self.build_tracks();
        }

        let mother_progress = mother_move_curve(progress);
        if let Some(track) = &self.mother_track {
            self.mother_position = track.position(mother_progress, &MOTHER_STAGES);
        }
        self.mother_half_width = self.max_mother_oval_size;
        self.mother_half_height = self.max_mother_oval_size * mother_shape_factor(mother_progress);

        let child_progress = child_move_curve(progress);
        if let Some(track) = &self.child_track {
            self.child_position = track.position(child_progress, &CHILD_STAGES);
        }
        self.setup_child_params(child_progress);

        let dx = self.mother_position.x - self.child_position.x;
        let dy = self.mother_position.y - self.child_position.y;
        // 重合时除零得到 NaN，按 0 度处理
        self.rotate_degrees = ((dy / dx).atan().to_degrees() as i32) as f32;

        self.reveal_radius = self.current_reveal_radius(progress);
        self.current_oval_color = self.current_oval(progress);
        self.current_background_color = self.current_background(progress);
    }

    fn draw(&self, surface: &mut dyn Surface, bounds: Rect) {
        let save_count = surface.save();
        let filter = self.base.color_filter;

        let background = Paint::fill(self.current_background_color).with_color_filter(filter);
        surface.draw_rect(bounds, &background);

        if self.reveal_radius > 0.0 {
            let reveal_color = if self.current_background_color == self.background_color {
                self.background_deep_color
            } else {
                self.background_color
            };
            let reveal = Paint::fill(reveal_color).with_color_filter(filter);
            surface.draw_circle(
                bounds.center_x(),
                bounds.center_y(),
                self.reveal_radius,
                &reveal,
            );
        }

        let oval = Paint::fill(self.current_oval_color).with_color_filter(filter);

        let mother = self.mother_position;
        let mother_save = surface.save();
        surface.rotate(self.rotate_degrees, mother.x, mother.y);
        surface.draw_oval(
            Rect::new(
                mother.x - self.mother_half_width,
                mother.y - self.mother_half_height,
                mother.x + self.mother_half_width,
                mother.y + self.mother_half_height,
            ),
            &oval,
        );
        if let Some(link) = self.link_path() {
            surface.draw_path(&link, &oval);
        }
        surface.restore_to_count(mother_save);

        let child = self.child_position;
        let child_save = surface.save();
        surface.rotate(self.rotate_degrees, child.x, child.y);
        surface.draw_path(&self.child_path(), &oval);
        surface.restore_to_count(child_save);

        surface.restore_to_count(save_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};

    fn renderer() -> CircleBroodRenderer {
        let mut renderer = CircleBroodRenderer::new();
        renderer.on_bounds_changed(Rect::from_size(DEFAULT_WIDTH, DEFAULT_HEIGHT));
        renderer.reset();
        renderer
    }

    fn center() -> Point {
        Point::new(DEFAULT_WIDTH / 2.0, DEFAULT_HEIGHT / 2.0)
    }

    #[test]
    fn test_stage_distance() {
        let ends = [0.5, 1.0];
        let lengths = [10.0, 30.0];
        assert_eq!(stage_distance(0.0, &ends, &lengths), 0.0);
        assert_eq!(stage_distance(0.25, &ends, &lengths), 5.0);
        assert_eq!(stage_distance(0.75, &ends, &lengths), 25.0);
        assert_eq!(stage_distance(1.5, &ends, &lengths), 40.0);
    }

    #[test]
    fn test_move_curves_are_continuous() {
        assert_eq!(mother_move_curve(0.0), 0.0);
        assert!((mother_move_curve(STAGE_MOTHER_FORWARD_TOP_LEFT) - 0.34).abs() < 1e-3);
        assert_eq!(mother_move_curve(0.9), 1.0);

        assert_eq!(child_move_curve(0.05), 0.0);
        assert!((child_move_curve(STAGE_CHILD_PRE_FORWARD_TOP_LEFT) - 0.26).abs() < 1e-3);
        assert!((child_move_curve(STAGE_CHILD_FORWARD_BOTTOM_LEFT) - 0.7).abs() < 1e-3);
        assert_eq!(child_move_curve(0.95), 1.0);
    }

    #[test]
    fn test_mother_shape_factor() {
        assert_eq!(mother_shape_factor(0.0), 1.0);
        assert!((mother_shape_factor(0.17) - MAX_MOTHER_SHAPE_CHANGE_FACTOR).abs() < 1e-4);
        assert!((mother_shape_factor(STAGE_MOTHER_BACKWARD_TOP_LEFT) - 1.0).abs() < 1e-4);
        assert_eq!(mother_shape_factor(0.95), 1.0);
    }

    #[test]
    fn test_no_bounds_no_compute() {
        let mut renderer = CircleBroodRenderer::new();
        renderer.compute_render(0.3);
        assert_eq!(renderer.mother_position(), Point::ZERO);
    }

    #[test]
    fn test_both_start_and_end_at_center() {
        let mut renderer = renderer();
        renderer.compute_render(0.0);
        assert!(renderer.mother_position().distance(center()) < 1e-3);
        assert!(renderer.child_position().distance(center()) < 1e-3);

        renderer.compute_render(0.95);
        assert!(renderer.mother_position().distance(center()) < 0.1);
        assert!(renderer.child_position().distance(center()) < 0.1);
    }

    #[test]
    fn test_child_leaves_mother() {
        let mut renderer = renderer();
        renderer.compute_render(0.38);
        assert!(renderer.child_position().distance(renderer.mother_position()) > 1.0);
    }

    #[test]
    fn test_child_grows_while_returning() {
        let mut renderer = renderer();
        renderer.compute_render(0.68);
        assert!(child_move_curve(0.68) > 0.65);
        assert!(renderer.child_radius() > MIN_CHILD_OVAL_RADIUS);
    }

    #[test]
    fn test_colors_and_reveal() {
        let mut renderer = renderer();
        renderer.compute_render(0.3);
        assert_eq!(renderer.oval_color(), DEFAULT_OVAL_COLOR);
        assert_eq!(renderer.background_color(), DEFAULT_BACKGROUND_COLOR);
        assert_eq!(renderer.reveal_radius(), 0.0);

        renderer.compute_render(0.46);
        assert!(renderer.reveal_radius() > 0.0);

        renderer.compute_render(0.8);
        assert_eq!(renderer.oval_color(), DEFAULT_OVAL_DEEP_COLOR);
        assert_eq!(renderer.background_color(), DEFAULT_BACKGROUND_DEEP_COLOR);

        renderer.compute_render(0.95);
        assert_eq!(renderer.background_color(), DEFAULT_BACKGROUND_COLOR);
    }

    #[test]
    fn test_bounds_change_moves_tracks() {
        let mut renderer = renderer();
        renderer.compute_render(0.0);
        renderer.on_bounds_changed(Rect::new(100.0, 100.0, 300.0, 250.0));
        renderer.compute_render(0.0);
        assert!(renderer.mother_position().distance(Point::new(200.0, 175.0)) < 1e-3);
    }

    #[test]
    fn test_draw_background_first() {
        let mut renderer = renderer();
        renderer.compute_render(0.46);
        let mut canvas = RecordingCanvas::new();
        renderer.paint(&mut canvas);
        let ops = canvas.ops();
        match &ops[1] {
            DrawOp::Rect { rect, paint } => {
                assert_eq!(*rect, Rect::from_size(DEFAULT_WIDTH, DEFAULT_HEIGHT));
                assert_eq!(paint.color, DEFAULT_BACKGROUND_COLOR);
            }
            other => panic!("unexpected op: {other:?}"),
        }
        assert!(matches!(ops[2], DrawOp::Circle { .. }));
        assert_eq!(
            ops.iter()
                .filter(|op| matches!(op, DrawOp::Rotate { .. }))
                .count(),
            2
        );
    }
}
