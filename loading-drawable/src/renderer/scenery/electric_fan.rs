//! 电风扇：进度条推进，右端的风扇转动并把叶子吹向左侧，满格后显示 100%
//!
//! 叶子是一个小粒子池：进度每越过一个阈值生成一片叶子，叶子在自己的寿命内
//! 沿三次贝塞尔曲线飞行，寿命结束即移出。寿命以动画进度计量，
//! 不会超过本轮剩余的进度。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::random_easing;
use crate::canvas::{Cap, ImageKind, Paint, Surface};
use crate::config::{CommonConfig, RendererConfig, merge_color, merge_positive};
use crate::easing::Easing;
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Point, Rect};
use crate::path::{Direction, Path};
use crate::renderer::{DEFAULT_SEED, LoadingRenderer, RendererBase};

const DURATION_MS: u64 = 7333;

const PERCENTAGE_100: &str = "100%";

const LEAF_COUNT: usize = 28;
const DEGREE_180: f32 = 180.0;
const DEGREE_360: f32 = 360.0;
const FULL_GROUP_ROTATION: f32 = 1890.0;

const DEFAULT_PROGRESS_COLOR: Color = Color(0xFFFC_A72E);
const DEFAULT_PROGRESS_BG_COLOR: Color = Color(0xFFFC_D49F);
const DEFAULT_ELECTRIC_FAN_BG_COLOR: Color = Color(0xFFFC_CC59);
const DEFAULT_ELECTRIC_FAN_OUTLINE_COLOR: Color = Color::WHITE;

const DEFAULT_WIDTH: f32 = 182.0;
const DEFAULT_HEIGHT: f32 = 65.0;
const DEFAULT_TEXT_SIZE: f32 = 11.0;
const DEFAULT_STROKE_WIDTH: f32 = 2.0;
const DEFAULT_STROKE_INTERVAL: f32 = 0.2;
const DEFAULT_CENTER_RADIUS: f32 = 16.0;
const DEFAULT_PROGRESS_CENTER_RADIUS: f32 = 11.0;

const DEFAULT_LEAF_FLY_DURATION_FACTOR: f32 = 0.1;
/// 叶子寿命的随机附加量（毫秒）
const LEAF_FLY_EXTRA_MS: u32 = 300;
const MAX_LEAF_ROTATION: u32 = 120;

const LEAF_CREATE_DURATION_INTERVAL: f32 = 1.0 / LEAF_COUNT as f32;
const DECELERATE_DURATION_PERCENTAGE: f32 = 0.4;
const ACCELERATE_DURATION_PERCENTAGE: f32 = 0.6;

/// 位图的固有尺寸
const LEAF_IMAGE_SIZE: (f32, f32) = (16.0, 16.0);
const LOADING_IMAGE_SIZE: (f32, f32) = (110.0, 24.0);
const ELECTRIC_FAN_IMAGE_SIZE: (f32, f32) = (24.0, 24.0);

/// 进度条的填充依据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressMode {
    /// 按动画进度填充
    #[default]
    Normal,
    /// 按已经飞完的叶子数填充
    LeafCount,
}

/// ElectricFan 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricFanConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ProgressMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_bg_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electric_fan_bg_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electric_fan_outline_color: Option<Color>,
    /// 叶子轨迹的随机种子
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// 一片飞行中的叶子
#[derive(Debug, Clone)]
struct Leaf {
    /// 生成时的动画进度
    spawn: f32,
    /// 寿命（动画进度单位）
    life: f32,
    start: Point,
    control1: Point,
    control2: Point,
    end: Point,
    max_rotation: f32,
    easing: Easing,

    rect: Rect,
    rotation: f32,
}

impl Leaf {
    /// 三次贝塞尔：B(t) = P0(1-t)^3 + 3P1 t(1-t)^2 + 3P2 t^2(1-t) + P3 t^3
    fn bezier(&self, t: f32) -> Point {
        let u = 1.0 - t;
        let a = u * u * u;
        let b = 3.0 * t * u * u;
        let c = 3.0 * t * t * u;
        let d = t * t * t;
        Point::new(
            self.start.x * a + self.control1.x * b + self.control2.x * c + self.end.x * d,
            self.start.y * a + self.control1.y * b + self.control2.y * c + self.end.y * d,
        )
    }

    fn update(&mut self, fraction: f32) {
        let eased = self.easing.apply(fraction);
        let point = self.bezier(eased);
        let (w, h) = LEAF_IMAGE_SIZE;
        self.rect = Rect::new(
            (point.x as i32) as f32,
            (point.y as i32) as f32,
            ((point.x + w) as i32) as f32,
            ((point.y + h) as i32) as f32,
        );
        self.rotation = self.max_rotation * eased;
    }
}

/// 本帧的布局
struct Layout {
    arc: Rect,
    /// 进度条外框（含描边）
    progress_bounds: Rect,
    /// 进度条填充区域
    progress_rect: Rect,
}

#[derive(Debug, Clone)]
pub struct ElectricFanRenderer {
    base: RendererBase,

    mode: ProgressMode,
    text_size: f32,
    stroke_width: f32,
    center_radius: f32,
    progress_center_radius: f32,
    progress_color: Color,
    progress_bg_color: Color,
    electric_fan_bg_color: Color,
    electric_fan_outline_color: Color,
    seed: u64,
    rng: StdRng,

    progress: f32,
    scale: f32,
    rotation: f32,
    progress_path: Path,

    leaves: Vec<Leaf>,
    next_leaf_create_threshold: f32,
    current_leaf_count: usize,
}

impl Default for ElectricFanRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ElectricFanRenderer {
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DURATION_MS),
            mode: ProgressMode::Normal,
            text_size: DEFAULT_TEXT_SIZE,
            stroke_width: DEFAULT_STROKE_WIDTH,
            center_radius: DEFAULT_CENTER_RADIUS,
            progress_center_radius: DEFAULT_PROGRESS_CENTER_RADIUS,
            progress_color: DEFAULT_PROGRESS_COLOR,
            progress_bg_color: DEFAULT_PROGRESS_BG_COLOR,
            electric_fan_bg_color: DEFAULT_ELECTRIC_FAN_BG_COLOR,
            electric_fan_outline_color: DEFAULT_ELECTRIC_FAN_OUTLINE_COLOR,
            seed: DEFAULT_SEED,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
            progress: 0.0,
            scale: 1.0,
            rotation: 0.0,
            progress_path: Path::new(),
            leaves: Vec::new(),
            next_leaf_create_threshold: 0.0,
            current_leaf_count: 0,
        }
    }

    /// 进度条进度（先减速后加速）
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// 风扇缩放，小于 1 时显示 100%
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// 正在飞的叶子数
    pub fn live_leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// 已经飞完的叶子数
    pub fn finished_leaf_count(&self) -> usize {
        self.current_leaf_count
    }

    fn layout(&self, bounds: Rect) -> Layout {
        let min_edge = (self.base.width as i32).min(self.base.height as i32);
        let half_radius = (self.center_radius / 2.0).ceil();
        let x_inset = if self.center_radius <= 0.0 || min_edge < 0 {
            half_radius
        } else {
            self.center_radius
        };
        let arc = bounds.inset(x_inset, half_radius);

        let progress_bounds = Rect::new(
            arc.left,
            arc.bottom - 2.0 * self.center_radius,
            arc.right,
            arc.bottom,
        );
        // 少缩一点，避免背景与外框之间出现缝隙
        let progress_inset =
            self.center_radius - self.progress_center_radius - DEFAULT_STROKE_INTERVAL;
        let progress_rect = progress_bounds.inset(progress_inset, progress_inset);

        Layout {
            arc,
            progress_bounds,
            progress_rect,
        }
    }

    fn clear_cycle_state(&mut self) {
        self.scale = 1.0;
        self.current_leaf_count = 0;
        self.next_leaf_create_threshold = 0.0;
        self.leaves.clear();
    }

    /// 推进所有叶子，寿命结束的移出
    fn update_leaves(&mut self, render_progress: f32) {
        let before = self.leaves.len();
        self.leaves.retain_mut(|leaf| {
            let fraction = (render_progress - leaf.spawn) / leaf.life;
            if fraction >= 1.0 {
                return false;
            }
            leaf.update(fraction.max(0.0));
            true
        });
        self.current_leaf_count += before - self.leaves.len();
    }

    /// 进度条路径；同时更新风扇转角与缩放，并按需生成叶子
    fn update_progress_path(&mut self, layout: &Layout, render_progress: f32) {
        let rect = layout.progress_rect;
        let radius = self.progress_center_radius;
        let width = rect.width();

        let arc_rect = Rect::new(rect.left, rect.top, rect.left + radius * 2.0, rect.bottom);
        let progress_width = self.progress * width;
        let mode_width = match self.mode {
            ProgressMode::LeafCount => self.current_leaf_count as f32 / LEAF_COUNT as f32 * width,
            ProgressMode::Normal => progress_width,
        };

        // 左侧半圆
        let mut swipe = DEGREE_180;
        if mode_width < radius {
            swipe = mode_width / radius * DEGREE_180;
        }

        // 中间矩形
        let mut body = None;
        if mode_width < width - radius && mode_width >= radius {
            body = Some(Rect::new(rect.left + radius, rect.top, rect.left + mode_width, rect.bottom));
        }

        // 到达右侧半圆：风扇缩小
        if progress_width >= width - radius {
            body = Some(Rect::new(rect.left + radius, rect.top, rect.right - radius, rect.bottom));
            self.scale = (width - progress_width) / radius;
        }

        if progress_width < width - radius {
            self.rotation = (progress_width / (width - radius) * FULL_GROUP_ROTATION) % DEGREE_360;

            let fly_rect = Rect::new(rect.left + progress_width, rect.top, rect.right - radius, rect.bottom);
            self.add_leaf(layout, fly_rect, render_progress);
        }

        let mut path = Path::new();
        path.add_arc(arc_rect, DEGREE_180 - swipe / 2.0, swipe);
        if let Some(body) = body {
            path.add_rect(body, Direction::Cw);
        }
        self.progress_path = path;
    }

    fn add_leaf(&mut self, layout: &Layout, fly_rect: Rect, render_progress: f32) {
        if self.progress < self.next_leaf_create_threshold {
            return;
        }
        self.next_leaf_create_threshold += LEAF_CREATE_DURATION_INTERVAL;

        let (leaf_w, leaf_h) = LEAF_IMAGE_SIZE;
        let rng = &mut self.rng;
        let mut next_int = |bound: i32| rng.gen_range(0..bound.max(1)) as f32;

        let max_rotation = next_int(MAX_LEAF_ROTATION as i32);
        // 右半边与左半边各取一个控制点
        let control1 = Point::new(
            fly_rect.right - next_int((fly_rect.width() / 2.0) as i32),
            ((fly_rect.bottom - next_int(fly_rect.height() as i32)) as i32) as f32,
        );
        let control2 = Point::new(
            fly_rect.left + next_int((fly_rect.width() / 2.0) as i32),
            ((fly_rect.bottom - next_int(fly_rect.height() as i32)) as i32) as f32,
        );

        let fly_start_y = ((layout.progress_bounds.bottom - leaf_h) as i32) as f32;
        let fly_range = (layout.progress_bounds.height() - leaf_h) as i32;
        let start = Point::new(
            ((fly_rect.right - leaf_w) as i32) as f32,
            fly_start_y - next_int(fly_range),
        );
        let end = Point::new(fly_rect.left, fly_start_y - next_int(fly_range));

        let duration_ms = self.base.duration_ms();
        let fly_ms = (next_int(LEAF_FLY_EXTRA_MS as i32) + duration_ms * DEFAULT_LEAF_FLY_DURATION_FACTOR)
            * (1.0 - self.progress);
        let easing = random_easing(&mut self.rng);

        // 寿命不超过本轮剩余进度
        let life = (fly_ms / duration_ms).min(1.0 - render_progress);
        if life <= 0.0 {
            return;
        }

        let mut leaf = Leaf {
            spawn: render_progress,
            life,
            start,
            control1,
            control2,
            end,
            max_rotation,
            easing,
            rect: Rect::ZERO,
            rotation: 0.0,
        };
        leaf.update(0.0);
        trace!(spawn = render_progress, life, "生成叶子");
        self.leaves.push(leaf);
    }
}

impl LoadingRenderer for ElectricFanRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::ElectricFan
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::ElectricFan(fan) = config else {
            return Err(config.mismatch(RendererKind::ElectricFan));
        };
        fan.common.apply_to(&mut self.base);
        if let Some(mode) = fan.mode {
            self.mode = mode;
        }
        merge_positive(&mut self.stroke_width, fan.stroke_width, "stroke_width");
        merge_positive(&mut self.text_size, fan.text_size, "text_size");
        merge_color(&mut self.progress_color, fan.progress_color);
        merge_color(&mut self.progress_bg_color, fan.progress_bg_color);
        merge_color(&mut self.electric_fan_bg_color, fan.electric_fan_bg_color);
        merge_color(&mut self.electric_fan_outline_color, fan.electric_fan_outline_color);
        if let Some(seed) = fan.seed {
            self.seed = seed;
        }
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.clear_cycle_state();
    }

    fn on_cycle_repeat(&mut self) {
        self.clear_cycle_state();
    }

    fn compute_render(&mut self, progress: f32) {
        self.progress = if progress < DECELERATE_DURATION_PERCENTAGE {
            Easing::DECELERATE.apply(progress / DECELERATE_DURATION_PERCENTAGE)
                * DECELERATE_DURATION_PERCENTAGE
        } else {
            Easing::ACCELERATE
                .apply((progress - DECELERATE_DURATION_PERCENTAGE) / ACCELERATE_DURATION_PERCENTAGE)
                * ACCELERATE_DURATION_PERCENTAGE
                + DECELERATE_DURATION_PERCENTAGE
        };

        self.update_leaves(progress);
        let layout = self.layout(self.base.bounds);
        self.update_progress_path(&layout, progress);
    }

    fn draw(&self, surface: &mut dyn Surface, bounds: Rect) {
        let save_count = surface.save();
        let filter = self.base.color_filter;
        let layout = self.layout(bounds);
        let arc = layout.arc;
        let image_paint = Paint::fill(Color::WHITE).with_color_filter(filter);

        // 顶部的 loading 图标
        let (loading_w, loading_h) = LOADING_IMAGE_SIZE;
        let center_x = arc.center_x() as i32 as f32;
        surface.draw_image(
            ImageKind::Loading,
            Rect::new(
                center_x - loading_w / 2.0,
                bounds.top,
                center_x + loading_w / 2.0,
                bounds.top + loading_h,
            ),
            &image_paint,
        );

        // 进度条背景与进度
        let radius = self.progress_center_radius;
        let bg = Paint::fill(self.progress_bg_color).with_color_filter(filter);
        surface.draw_round_rect(layout.progress_rect, radius, radius, &bg);
        let progress = Paint::fill(self.progress_color).with_color_filter(filter);
        surface.draw_path(&self.progress_path, &progress);

        for leaf in &self.leaves {
            let leaf_save_count = surface.save();
            surface.rotate(leaf.rotation, leaf.rect.center_x(), leaf.rect.center_y());
            surface.draw_image(ImageKind::Leaf, leaf.rect, &image_paint);
            surface.restore_to_count(leaf_save_count);
        }

        // 外框最后画，盖住飞出进度条的叶子
        let outline_width = self.center_radius - self.progress_center_radius;
        let outline = Paint::stroke(self.progress_bg_color, outline_width)
            .with_cap(Cap::Round)
            .with_color_filter(filter);
        surface.draw_round_rect(
            layout.progress_bounds.inset(outline_width / 2.0, outline_width / 2.0),
            self.center_radius,
            self.center_radius,
            &outline,
        );

        // 风扇
        let fan_x = arc.right - self.center_radius;
        let fan_y = arc.bottom - self.center_radius;
        let fan_outline = Paint::stroke(self.electric_fan_outline_color, self.stroke_width)
            .with_cap(Cap::Round)
            .with_color_filter(filter);
        surface.draw_circle(
            fan_x,
            fan_y,
            self.center_radius - self.stroke_width / 2.0,
            &fan_outline,
        );
        let fan_bg = Paint::fill(self.electric_fan_bg_color).with_color_filter(filter);
        surface.draw_circle(
            fan_x,
            fan_y,
            self.center_radius - self.stroke_width + DEFAULT_STROKE_INTERVAL,
            &fan_bg,
        );

        let rotate_save_count = surface.save();
        surface.rotate(self.rotation, fan_x, fan_y);
        let (fan_w, fan_h) = ELECTRIC_FAN_IMAGE_SIZE;
        let half_w = fan_w / 2.0 * self.scale;
        let half_h = fan_h / 2.0 * self.scale;
        surface.draw_image(
            ImageKind::ElectricFan,
            Rect::new(
                ((fan_x - half_w) as i32) as f32,
                ((fan_y - half_h) as i32) as f32,
                ((fan_x + half_w) as i32) as f32,
                ((fan_y + half_h) as i32) as f32,
            ),
            &image_paint,
        );
        surface.restore_to_count(rotate_save_count);

        if self.scale < 1.0 {
            let text = Paint::fill(self.electric_fan_outline_color)
                .with_text_size(self.text_size * (1.0 - self.scale))
                .with_color_filter(filter);
            let text_bounds = surface.text_bounds(PERCENTAGE_100, &text);
            surface.draw_text(
                PERCENTAGE_100,
                fan_x - text_bounds.width() / 2.0,
                fan_y + text_bounds.height() / 2.0,
                &text,
            );
        }

        surface.restore_to_count(save_count);
    }
}
