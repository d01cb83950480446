//! 水瓶：瓶中水面起伏，水滴随机升起再落回

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::{Join, Paint, Style, Surface};
use crate::config::{CommonConfig, RendererConfig, merge_color, merge_count, merge_positive};
use crate::easing::Easing;
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Rect};
use crate::path::Path;
use crate::renderer::{DEFAULT_SEED, LoadingRenderer, RendererBase};

const DURATION_MS: u64 = 11111;

const DEFAULT_WIDTH: f32 = 200.0;
const DEFAULT_HEIGHT: f32 = 150.0;
const DEFAULT_STROKE_WIDTH: f32 = 1.5;
const DEFAULT_BOTTLE_WIDTH: f32 = 30.0;
const DEFAULT_BOTTLE_HEIGHT: f32 = 43.0;
const WATER_LOWEST_POINT_TO_BOTTLENECK_DISTANCE: f32 = 30.0;
const DEFAULT_TEXT_SIZE: f32 = 7.0;

const DEFAULT_WAVE_COUNT: usize = 5;
const DEFAULT_WATER_DROP_COUNT: usize = 25;

const MAX_WATER_DROP_RADIUS: i32 = 5;
const MIN_WATER_DROP_RADIUS: i32 = 1;

/// 水滴最早出现的进度
const DROP_MIN_DELAY: f32 = 0.1;
/// 水滴出现进度的随机范围
const DROP_DELAY_RANGE: f32 = 0.6;
/// 升起一个瓶身半径所需的进度
const DROP_UNIT_DURATION: f32 = 0.1;

const DEFAULT_BOTTLE_COLOR: Color = Color(0xFFDA_EBEB);
const DEFAULT_WATER_COLOR: Color = Color(0xFF29_E3F2);

const LOADING_TEXT: &str = "loading";

/// WaterBottle 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterBottleConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottle_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottle_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_size: Option<f32>,
    /// 每个周期的水波数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottle_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_color: Option<Color>,
    /// 水滴随机种子
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// 水滴
#[derive(Debug, Clone, PartialEq)]
pub struct WaterDrop {
    pub x: f32,
    pub init_y: f32,
    pub current_y: f32,
    pub radius: f32,
    pub rise_height: f32,
    /// 出现时的进度
    pub delay: f32,
    /// 持续的进度长度
    pub duration: f32,
    pub visible: bool,
}

/// 瓶身圆弧内某一横坐标处水滴能升起的最大高度
///
/// 瓶颈正下方的水滴可以一直升到瓶口。
fn max_rise_height(bottle_radius: f32, drop_radius: f32, x: f32) -> f32 {
    let coordinate_x = x - bottle_radius;
    let bottleneck_radius = bottle_radius * 0.3;
    if coordinate_x - drop_radius > -bottleneck_radius
        && coordinate_x + drop_radius < bottleneck_radius
    {
        bottle_radius * 2.0
    } else {
        (bottle_radius * bottle_radius - coordinate_x * coordinate_x)
            .max(0.0)
            .sqrt()
            - drop_radius
    }
}

#[derive(Debug, Clone)]
pub struct WaterBottleRenderer {
    base: RendererBase,

    stroke_width: f32,
    bottle_width: f32,
    bottle_height: f32,
    water_lowest_point_to_bottleneck: f32,
    text_size: f32,
    wave_count: usize,
    bottle_color: Color,
    water_color: Color,

    seed: u64,
    rng: StdRng,

    wave_progress: f32,
    bottle_bounds: Rect,
    water_bounds: Rect,
    drops: Vec<WaterDrop>,
}

impl Default for WaterBottleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl WaterBottleRenderer {
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DURATION_MS),
            stroke_width: DEFAULT_STROKE_WIDTH,
            bottle_width: DEFAULT_BOTTLE_WIDTH,
            bottle_height: DEFAULT_BOTTLE_HEIGHT,
            water_lowest_point_to_bottleneck: WATER_LOWEST_POINT_TO_BOTTLENECK_DISTANCE,
            text_size: DEFAULT_TEXT_SIZE,
            wave_count: DEFAULT_WAVE_COUNT,
            bottle_color: DEFAULT_BOTTLE_COLOR,
            water_color: DEFAULT_WATER_COLOR,
            seed: DEFAULT_SEED,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
            wave_progress: 0.0,
            bottle_bounds: Rect::ZERO,
            water_bounds: Rect::ZERO,
            drops: Vec::new(),
        }
    }

    /// 当前水波幅度 `[0, 1]`
    pub fn wave_progress(&self) -> f32 {
        self.wave_progress
    }

    pub fn drops(&self) -> &[WaterDrop] {
        &self.drops
    }

    pub fn bottle_bounds(&self) -> Rect {
        self.bottle_bounds
    }

    fn init_drops(&mut self) {
        let bottle = self.bottle_bounds;
        let bottle_radius = bottle.width() / 2.0;
        let lowest_water_y = self.water_bounds.top;
        let two_sides_interval = 0.2 * bottle.width();
        let x_range = bottle.width() * 0.6;

        let rng = &mut self.rng;
        self.drops = (0..DEFAULT_WATER_DROP_COUNT)
            .map(|_| {
                let radius = rng.gen_range(MIN_WATER_DROP_RADIUS..MAX_WATER_DROP_RADIUS) as f32;
                let x = bottle.left + two_sides_interval + rng.r#gen::<f32>() * x_range;
                let init_y = lowest_water_y + radius / 2.0;
                let rise_height = max_rise_height(bottle_radius, radius, x - bottle.left)
                    * (0.2 + 0.8 * rng.r#gen::<f32>());
                let delay = DROP_MIN_DELAY + rng.r#gen::<f32>() * DROP_DELAY_RANGE;
                WaterDrop {
                    x,
                    init_y,
                    current_y: init_y,
                    radius,
                    rise_height,
                    delay,
                    duration: rise_height / bottle_radius * DROP_UNIT_DURATION,
                    visible: false,
                }
            })
            .collect();
        debug!(count = self.drops.len(), "水滴已生成");
    }

    /// 瓶子轮廓：瓶口装饰、左侧瓶身、瓶底、右侧瓶身
    fn bottle_path(&self) -> Path {
        let rect = self.bottle_bounds;
        let cx = rect.center_x();
        let bottleneck_width = rect.width() * 0.3;
        let bottleneck_height = rect.height() * 0.415;
        let decoration_width = bottleneck_width * 1.1;
        let decoration_height = bottleneck_height * 0.167;

        let mut path = Path::new();
        path.move_to(cx - decoration_width * 0.5, rect.top);
        path.quad_to(
            cx - decoration_width * 0.5 - bottleneck_width * 0.15,
            rect.top + decoration_height * 0.5,
            cx - bottleneck_width * 0.5,
            rect.top + decoration_height,
        );
        path.line_to(cx - bottleneck_width * 0.5, rect.top + bottleneck_height);

        let radius = (rect.width() - self.stroke_width) / 2.0;
        let center_y = rect.bottom - 0.86 * radius;
        let body = Rect::new(rect.left, center_y - radius, rect.right, center_y + radius);
        path.add_arc(body, 255.0, -135.0);

        let bottom_width = rect.width() / 2.0;
        path.line_to(cx - bottom_width / 2.0, rect.bottom);
        path.line_to(cx + bottom_width / 2.0, rect.bottom);

        path.add_arc(body, 60.0, -135.0);

        path.line_to(cx + bottleneck_width * 0.5, rect.top + decoration_height);
        path.quad_to(
            cx + decoration_width * 0.5 + bottleneck_width * 0.15,
            rect.top + decoration_height * 0.5,
            cx + decoration_width * 0.5,
            rect.top,
        );
        path
    }

    fn water_path(&self) -> Path {
        let rect = self.water_bounds;
        let radius = (rect.width() - self.stroke_width) / 2.0;
        let center_y = rect.bottom - 0.86 * radius;
        let bottom_width = rect.width() / 2.0;
        let body = Rect::new(rect.left, center_y - radius, rect.right, center_y + radius);

        let mut path = Path::new();
        path.move_to(rect.left, rect.top);
        path.add_arc(body, 187.5, -67.5);
        path.line_to(rect.center_x() - bottom_width / 2.0, rect.bottom);
        path.line_to(rect.center_x() + bottom_width / 2.0, rect.bottom);
        path.add_arc(body, 60.0, -67.5);

        // 水面
        let dx = rect.width() * 0.35 * self.wave_progress;
        let dy = rect.height() * 1.2 * self.wave_progress;
        path.cubic_to(
            rect.left + rect.width() * 0.80 - dx,
            rect.top - rect.height() * 1.2 + dy,
            rect.left + rect.width() * 0.55 - dx,
            rect.top - dy,
            rect.left,
            rect.top - self.stroke_width / 2.0,
        );
        path.line_to(rect.left, rect.top);
        path
    }
}

impl LoadingRenderer for WaterBottleRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::WaterBottle
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::WaterBottle(water_bottle) = config else {
            return Err(config.mismatch(RendererKind::WaterBottle));
        };
        water_bottle.common.apply_to(&mut self.base);
        merge_positive(&mut self.stroke_width, water_bottle.stroke_width, "stroke_width");
        merge_positive(&mut self.bottle_width, water_bottle.bottle_width, "bottle_width");
        merge_positive(&mut self.bottle_height, water_bottle.bottle_height, "bottle_height");
        merge_positive(&mut self.text_size, water_bottle.text_size, "text_size");
        merge_count(&mut self.wave_count, water_bottle.wave_count, "wave_count");
        merge_color(&mut self.bottle_color, water_bottle.bottle_color);
        merge_color(&mut self.water_color, water_bottle.water_color);
        if let Some(seed) = water_bottle.seed {
            self.seed = seed;
        }
        self.reset();
        Ok(())
    }

    fn on_bounds_changed(&mut self, bounds: Rect) {
        self.base.bounds = bounds;
        self.drops.clear();
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.drops.clear();
        self.wave_progress = 0.0;
    }

    fn compute_render(&mut self, progress: f32) {
        let bounds = self.base.bounds;
        if bounds.width() <= 0.0 {
            return;
        }

        self.bottle_bounds = Rect::new(
            bounds.center_x() - self.bottle_width / 2.0,
            bounds.center_y() - self.bottle_height / 2.0,
            bounds.center_x() + self.bottle_width / 2.0,
            bounds.center_y() + self.bottle_height / 2.0,
        );
        let inset = self.stroke_width * 1.5;
        self.water_bounds = Rect::new(
            self.bottle_bounds.left + inset,
            self.bottle_bounds.top + self.water_lowest_point_to_bottleneck,
            self.bottle_bounds.right - inset,
            self.bottle_bounds.bottom - inset,
        );

        let total_wave = progress * self.wave_count as f32;
        let current_wave = total_wave.fract();
        self.wave_progress = if current_wave > 0.5 {
            1.0 - Easing::FastOutSlowIn.apply((current_wave - 0.5) * 2.0)
        } else {
            Easing::FastOutSlowIn.apply(current_wave * 2.0)
        };

        if self.drops.is_empty() {
            self.init_drops();
        }

        for drop in &mut self.drops {
            if drop.delay < progress && drop.delay + drop.duration > progress {
                let rise = (progress - drop.delay) / drop.duration;
                let rise = if rise < 0.5 {
                    rise * 2.0
                } else {
                    1.0 - (rise - 0.5) * 2.0
                };
                drop.current_y = drop.init_y - Easing::FastOutSlowIn.apply(rise) * drop.rise_height;
                drop.visible = true;
            } else {
                drop.visible = false;
            }
        }
    }

    fn draw(&self, surface: &mut dyn Surface, _bounds: Rect) {
        let save_count = surface.save();
        let filter = self.base.color_filter;

        let bottle = Paint::stroke(self.bottle_color, self.stroke_width)
            .with_join(Join::Round)
            .with_color_filter(filter);
        surface.draw_path(&self.bottle_path(), &bottle);

        let water = Paint::stroke(self.water_color, self.stroke_width)
            .with_style(Style::FillAndStroke)
            .with_join(Join::Round)
            .with_color_filter(filter);
        surface.draw_path(&self.water_path(), &water);

        let drop_paint = Paint::fill(self.water_color).with_color_filter(filter);
        for drop in self.drops.iter().filter(|drop| drop.visible) {
            surface.draw_circle(drop.x, drop.current_y, drop.radius, &drop_paint);
        }

        let text = Paint::fill(self.bottle_color)
            .with_text_size(self.text_size)
            .with_color_filter(filter);
        let text_bounds = surface.text_bounds(LOADING_TEXT, &text);
        surface.draw_text(
            LOADING_TEXT,
            self.bottle_bounds.center_x() - text_bounds.width() / 2.0,
            self.bottle_bounds.bottom + self.bottle_bounds.height() * 0.2,
            &text,
        );

        surface.restore_to_count(save_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};

    fn renderer() -> WaterBottleRenderer {
        let mut renderer = WaterBottleRenderer::new();
        renderer.on_bounds_changed(Rect::from_size(DEFAULT_WIDTH, DEFAULT_HEIGHT));
        renderer.reset();
        renderer
    }

    #[test]
    fn test_max_rise_height() {
        // 瓶颈正下方
        assert_eq!(max_rise_height(15.0, 1.0, 15.0), 30.0);
        // 贴着瓶壁
        assert!((max_rise_height(15.0, 1.0, 27.0) - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_no_bounds_no_compute() {
        let mut renderer = WaterBottleRenderer::new();
        renderer.compute_render(0.5);
        assert!(renderer.drops().is_empty());
        assert_eq!(renderer.bottle_bounds(), Rect::ZERO);
    }

    #[test]
    fn test_wave_rises_and_falls() {
        let mut renderer = renderer();
        renderer.compute_render(0.0);
        assert_eq!(renderer.wave_progress(), 0.0);
        // 第一道水波的波峰
        renderer.compute_render(0.1);
        assert!((renderer.wave_progress() - 1.0).abs() < 1e-3);
        renderer.compute_render(0.19);
        assert!(renderer.wave_progress() < 0.1);
    }

    #[test]
    fn test_drops_inside_bottle() {
        let mut renderer = renderer();
        renderer.compute_render(0.05);
        let bottle = renderer.bottle_bounds();
        assert_eq!(renderer.drops().len(), DEFAULT_WATER_DROP_COUNT);
        for drop in renderer.drops() {
            assert!(!drop.visible);
            assert!(drop.x >= bottle.left + bottle.width() * 0.2);
            assert!(drop.x <= bottle.right - bottle.width() * 0.2 + 1e-3);
            assert!((MIN_WATER_DROP_RADIUS as f32..MAX_WATER_DROP_RADIUS as f32).contains(&drop.radius));
            assert!(drop.delay >= DROP_MIN_DELAY);
        }
    }

    #[test]
    fn test_drop_rises_above_start() {
        let mut renderer = renderer();
        renderer.compute_render(0.0);
        let drop = renderer.drops()[0].clone();
        renderer.compute_render(drop.delay + drop.duration / 2.0);
        let risen = &renderer.drops()[0];
        assert!(risen.visible);
        assert!(risen.current_y < drop.init_y);
    }

    #[test]
    fn test_same_seed_same_frames() {
        let mut a = renderer();
        let mut b = renderer();
        for step in 0..50 {
            let progress = step as f32 / 50.0;
            a.compute_render(progress);
            b.compute_render(progress);
        }
        assert_eq!(a.drops(), b.drops());

        let mut canvas_a = RecordingCanvas::new();
        let mut canvas_b = RecordingCanvas::new();
        a.paint(&mut canvas_a);
        b.paint(&mut canvas_b);
        assert_eq!(canvas_a.ops(), canvas_b.ops());
    }

    #[test]
    fn test_reset_regenerates_same_drops() {
        let mut renderer = renderer();
        renderer.compute_render(0.3);
        let first = renderer.drops().to_vec();
        renderer.reset();
        assert!(renderer.drops().is_empty());
        renderer.compute_render(0.3);
        assert_eq!(renderer.drops(), first.as_slice());
    }

    #[test]
    fn test_draw_text_below_bottle() {
        let mut renderer = renderer();
        renderer.compute_render(0.2);
        let mut canvas = RecordingCanvas::new();
        renderer.paint(&mut canvas);
        let bottle = renderer.bottle_bounds();
        let y = canvas.ops().iter().find_map(|op| match op {
            DrawOp::Text { text, y, .. } if text == LOADING_TEXT => Some(*y),
            _ => None,
        });
        assert_eq!(y, Some(bottle.bottom + bottle.height() * 0.2));
    }
}
