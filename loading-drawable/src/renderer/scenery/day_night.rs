//! 日夜交替：太阳升起、放出光芒、落下，月亮升起，星星闪烁后坠落

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::random_easing;
use crate::canvas::{Cap, Join, Paint, Surface};
use crate::config::{CommonConfig, RendererConfig, merge_color, merge_positive};
use crate::easing::Easing;
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Point, Rect};
use crate::path::Path;
use crate::renderer::{DEFAULT_SEED, LoadingRenderer, RendererBase};

const DURATION_MS: u64 = 5111;

const MAX_ALPHA: i32 = 255;
const DEGREE_360: f32 = 360.0;
const MAX_SUN_RAY_COUNT: usize = 12;

const DEFAULT_WIDTH: f32 = 200.0;
const DEFAULT_HEIGHT: f32 = 150.0;
const DEFAULT_STROKE_WIDTH: f32 = 2.5;
const DEFAULT_SUN_MOON_RADIUS: f32 = 12.0;
const DEFAULT_STAR_RADIUS: f32 = 2.5;
const DEFAULT_SUN_RAY_LENGTH: f32 = 10.0;
const DEFAULT_SUN_RAY_OFFSET: f32 = 3.0;

const STAR_RISE_PROGRESS_OFFSET: f32 = 0.2;
const STAR_DECREASE_PROGRESS_OFFSET: f32 = 0.8;
const STAR_FLASH_PROGRESS_PERCENTAGE: f32 = 0.2;

const MAX_SUN_ROTATE_DEGREE: f32 = DEGREE_360 / 3.0;
const MAX_MOON_ROTATE_DEGREE: f32 = DEGREE_360 / 6.0;
const SUN_RAY_INTERVAL_DEGREE: f32 = DEGREE_360 / 3.0 / 55.0;

const SUN_RISE_DURATION_OFFSET: f32 = 0.143;
const SUN_ROTATE_DURATION_OFFSET: f32 = 0.492;
const SUN_DECREASE_DURATION_OFFSET: f32 = 0.570;
const MOON_RISE_DURATION_OFFSET: f32 = 0.713;
const MOON_DECREASE_START_DURATION_OFFSET: f32 = 0.935;
const MOON_DECREASE_END_DURATION_OFFSET: f32 = 1.0;
const STAR_RISE_START_DURATION_OFFSET: f32 = 0.684;
const STAR_DECREASE_START_DURATION_OFFSET: f32 = 1.0;

const DEFAULT_COLOR: Color = Color(0xFF21_FD8E);

/// 星星的闪烁起点与相对位置（占宽高的比例），闪烁起点为 1 的星星不闪烁
const STAR_LAYOUT: [(f32, f32, f32); 11] = [
    (0.3, 0.175, 0.0934),
    (0.2, 0.175, 0.62),
    (0.2, 0.2525, 0.43),
    (0.5, 0.4075, 0.0934),
    (1.0, 0.825, 0.04),
    (1.0, 0.7075, 0.147),
    (1.0, 0.3475, 0.2567),
    (0.6, 0.5825, 0.277),
    (1.0, 0.84, 0.32),
    (1.0, 0.8, 0.502),
    (0.6, 0.7, 0.473),
];

/// DayNight 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayNightConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    /// 太阳与月亮的半径
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sun_moon_radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star_radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// 星星缓动曲线的随机种子
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
struct Star {
    flash_offset: f32,
    point: Point,
    current_point: Point,
    alpha: i32,
    easing: Easing,
}

#[derive(Debug, Clone)]
pub struct DayNightRenderer {
    base: RendererBase,

    color: Color,
    stroke_width: f32,
    star_radius: f32,
    sun_moon_radius: f32,
    seed: u64,
    rng: StdRng,

    /// 太阳/月亮藏在底部时的圆心 y
    init_sun_moon_y: f32,
    /// 升到画面中央所需的距离
    max_sun_moon_rise_distance: f32,
    sun_ray_start_y: f32,
    sun_ray_end_y: f32,

    sun_y: f32,
    moon_y: f32,
    sun_ray_rotation: f32,
    moon_rotation: f32,
    /// 光芒数量正在增加
    expand_sun_ray: bool,
    sun_ray_count: usize,

    stars: Vec<Star>,
    max_star_offsets: f32,
    show_star: bool,
}

impl Default for DayNightRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DayNightRenderer {
    pub fn new() -> Self {
        let mut renderer = Self {
            base: RendererBase::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DURATION_MS),
            color: DEFAULT_COLOR,
            stroke_width: DEFAULT_STROKE_WIDTH,
            star_radius: DEFAULT_STAR_RADIUS,
            sun_moon_radius: DEFAULT_SUN_MOON_RADIUS,
            seed: DEFAULT_SEED,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
            init_sun_moon_y: 0.0,
            max_sun_moon_rise_distance: 0.0,
            sun_ray_start_y: 0.0,
            sun_ray_end_y: 0.0,
            sun_y: 0.0,
            moon_y: 0.0,
            sun_ray_rotation: 0.0,
            moon_rotation: 0.0,
            expand_sun_ray: false,
            sun_ray_count: 0,
            stars: Vec::new(),
            max_star_offsets: 0.0,
            show_star: false,
        };
        renderer.adjust_params();
        renderer.sun_y = renderer.init_sun_moon_y;
        renderer.moon_y = renderer.init_sun_moon_y;
        renderer
    }

    pub fn sun_y(&self) -> f32 {
        self.sun_y
    }

    pub fn moon_y(&self) -> f32 {
        self.moon_y
    }

    /// 太阳/月亮不可见时的圆心 y
    pub fn hidden_y(&self) -> f32 {
        self.init_sun_moon_y
    }

    pub fn sun_ray_count(&self) -> usize {
        self.sun_ray_count
    }

    pub fn is_star_visible(&self) -> bool {
        self.show_star
    }

    pub fn star_count(&self) -> usize {
        self.stars.len()
    }

    fn adjust_params(&mut self) {
        let height = self.base.height;
        self.init_sun_moon_y = height + self.sun_moon_radius + self.stroke_width * 2.0;
        self.max_sun_moon_rise_distance = height / 2.0 + self.sun_moon_radius;

        // 升到中央的太阳圆心，减去半径、描边与间隔
        self.sun_ray_start_y = self.init_sun_moon_y
            - self.max_sun_moon_rise_distance
            - self.sun_moon_radius
            - self.stroke_width
            - DEFAULT_SUN_RAY_OFFSET;
        // 圆头线帽会额外伸出半个描边
        self.sun_ray_end_y = self.sun_ray_start_y - DEFAULT_SUN_RAY_LENGTH + self.stroke_width;
    }

    /// 按当前 bounds 的尺寸放置星星，坐标相对 bounds 左上角
    fn init_stars(&mut self) {
        let width = self.base.bounds.width();
        let height = self.base.bounds.height();
        let rng = &mut self.rng;
        self.stars = STAR_LAYOUT
            .iter()
            .map(|&(flash_offset, x, y)| Star {
                flash_offset,
                point: Point::new(width * x, height * y),
                current_point: Point::ZERO,
                alpha: MAX_ALPHA,
                easing: random_easing(rng),
            })
            .collect();
        self.max_star_offsets = height;
        debug!(count = self.stars.len(), "星星已生成");
    }

    fn moon_path(&self, cx: f32, cy: f32) -> Path {
        let r = self.sun_moon_radius;
        let mut path = Path::new();
        path.add_arc(Rect::new(cx - r, cy - r, cx + r, cy + r), -90.0, 180.0);
        path.quad_to(cx + r / 2.0, cy, cx, cy - r);
        path
    }

    fn update_stars(&mut self, star_progress: f32) {
        let max_offsets = self.max_star_offsets;

        if star_progress <= STAR_RISE_PROGRESS_OFFSET {
            for star in &mut self.stars {
                let rise = 1.0 - star.easing.apply(star_progress * 5.0);
                star.current_point = Point::new(star.point.x, star.point.y - rise * (max_offsets * 0.65));
            }
        }

        if star_progress > STAR_RISE_PROGRESS_OFFSET && star_progress < STAR_DECREASE_PROGRESS_OFFSET {
            let half_flash = STAR_FLASH_PROGRESS_PERCENTAGE / 2.0;
            for star in &mut self.stars {
                if star.flash_offset < star_progress
                    && star_progress < star.flash_offset + STAR_FLASH_PROGRESS_PERCENTAGE
                {
                    let distance = (star_progress - (star.flash_offset + half_flash)).abs() / half_flash;
                    star.alpha = (MAX_ALPHA as f32 * Easing::FastOutSlowIn.apply(distance)) as i32;
                }
            }
        }

        if star_progress >= STAR_DECREASE_PROGRESS_OFFSET {
            for star in &mut self.stars {
                let fall = star
                    .easing
                    .apply((star_progress - STAR_DECREASE_PROGRESS_OFFSET) * 5.0);
                star.current_point = Point::new(star.point.x, star.point.y + fall * max_offsets);
            }
        }
    }
}

impl LoadingRenderer for DayNightRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::DayNight
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::DayNight(day_night) = config else {
            return Err(config.mismatch(RendererKind::DayNight));
        };
        day_night.common.apply_to(&mut self.base);
        merge_positive(&mut self.stroke_width, day_night.stroke_width, "stroke_width");
        merge_positive(
            &mut self.sun_moon_radius,
            day_night.sun_moon_radius,
            "sun_moon_radius",
        );
        merge_positive(&mut self.star_radius, day_night.star_radius, "star_radius");
        merge_color(&mut self.color, day_night.color);
        if let Some(seed) = day_night.seed {
            self.seed = seed;
        }
        self.adjust_params();
        self.reset();
        Ok(())
    }

    fn on_bounds_changed(&mut self, bounds: Rect) {
        self.base.bounds = bounds;
        self.stars.clear();
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.stars.clear();
        self.sun_y = self.init_sun_moon_y;
        self.moon_y = self.init_sun_moon_y;
        self.sun_ray_rotation = 0.0;
        self.moon_rotation = 0.0;
        self.expand_sun_ray = false;
        self.sun_ray_count = 0;
        self.show_star = false;
    }

    fn compute_render(&mut self, progress: f32) {
        let init_y = self.init_sun_moon_y;
        let rise_distance = self.max_sun_moon_rise_distance;

        // 太阳升起
        if progress <= SUN_RISE_DURATION_OFFSET {
            let sun_rise_progress = progress / SUN_RISE_DURATION_OFFSET;
            self.sun_y = init_y - rise_distance * Easing::FastOutSlowIn.apply(sun_rise_progress);
            self.moon_y = init_y;
            self.show_star = false;
        }

        // 太阳转动，光芒先增后减
        if progress <= SUN_ROTATE_DURATION_OFFSET && progress > SUN_RISE_DURATION_OFFSET {
            let sun_rotate_progress = (progress - SUN_RISE_DURATION_OFFSET)
                / (SUN_ROTATE_DURATION_OFFSET - SUN_RISE_DURATION_OFFSET);
            self.sun_ray_rotation = sun_rotate_progress * MAX_SUN_ROTATE_DEGREE;

            let expanding = (self.sun_ray_rotation / SUN_RAY_INTERVAL_DEGREE) as usize;
            if expanding <= MAX_SUN_RAY_COUNT {
                self.expand_sun_ray = true;
                self.sun_ray_count = expanding;
            }

            let shrinking =
                ((MAX_SUN_ROTATE_DEGREE - self.sun_ray_rotation) / SUN_RAY_INTERVAL_DEGREE) as usize;
            if shrinking <= MAX_SUN_RAY_COUNT {
                self.expand_sun_ray = false;
                self.sun_ray_count = shrinking;
            }
        }

        // 太阳落下
        if progress <= SUN_DECREASE_DURATION_OFFSET && progress > SUN_ROTATE_DURATION_OFFSET {
            let sun_decrease_progress = (progress - SUN_ROTATE_DURATION_OFFSET)
                / (SUN_DECREASE_DURATION_OFFSET - SUN_ROTATE_DURATION_OFFSET);
            self.sun_y = init_y
                - rise_distance * (1.0 - Easing::ACCELERATE.apply(sun_decrease_progress));
        }

        // 月亮升起
        if progress <= MOON_RISE_DURATION_OFFSET && progress > SUN_DECREASE_DURATION_OFFSET {
            let moon_rise_progress = (progress - SUN_DECREASE_DURATION_OFFSET)
                / (MOON_RISE_DURATION_OFFSET - SUN_DECREASE_DURATION_OFFSET);
            let eased = Easing::FastOutSlowIn.apply(moon_rise_progress);
            self.moon_rotation = eased * MAX_MOON_ROTATE_DEGREE;
            self.sun_y = init_y;
            self.moon_y = init_y - rise_distance * eased;
        }

        // 星星
        if progress <= STAR_DECREASE_START_DURATION_OFFSET && progress > STAR_RISE_START_DURATION_OFFSET {
            if self.stars.is_empty() {
                self.init_stars();
            }
            let star_progress = (progress - STAR_RISE_START_DURATION_OFFSET)
                / (STAR_DECREASE_START_DURATION_OFFSET - STAR_RISE_START_DURATION_OFFSET);
            self.update_stars(star_progress);
            self.show_star = true;
        }

        // 月亮落下
        if progress <= MOON_DECREASE_END_DURATION_OFFSET && progress > MOON_DECREASE_START_DURATION_OFFSET {
            let moon_decrease_progress = (progress - MOON_DECREASE_START_DURATION_OFFSET)
                / (MOON_DECREASE_END_DURATION_OFFSET - MOON_DECREASE_START_DURATION_OFFSET);
            self.moon_y = init_y
                - rise_distance * (1.0 - Easing::ACCELERATE.apply(moon_decrease_progress));
        }
    }

    fn draw(&self, surface: &mut dyn Surface, bounds: Rect) {
        let save_count = surface.save();
        surface.translate(bounds.left, bounds.top);

        let center_x = bounds.width() / 2.0;
        let filter = self.base.color_filter;
        let stroke = Paint::stroke(self.color, self.stroke_width)
            .with_cap(Cap::Round)
            .with_join(Join::Round)
            .with_alpha(MAX_ALPHA)
            .with_color_filter(filter);

        if self.sun_y < self.init_sun_moon_y {
            surface.draw_circle(center_x, self.sun_y, self.sun_moon_radius, &stroke);
        }

        if self.moon_y < self.init_sun_moon_y {
            let moon_save_count = surface.save();
            surface.rotate(self.moon_rotation, center_x, self.moon_y);
            surface.draw_path(&self.moon_path(center_x, self.moon_y), &stroke);
            surface.restore_to_count(moon_save_count);
        }

        let ray_step = DEGREE_360 / MAX_SUN_RAY_COUNT as f32;
        for i in 0..self.sun_ray_count {
            let ray_save_count = surface.save();
            // 0° 转到一点半方向，光芒反向旋转
            let slot = if self.expand_sun_ray { i } else { MAX_SUN_RAY_COUNT - i };
            surface.rotate(
                45.0 - self.sun_ray_rotation + slot as f32 * ray_step,
                center_x,
                self.sun_y,
            );
            surface.draw_line(center_x, self.sun_ray_start_y, center_x, self.sun_ray_end_y, &stroke);
            surface.restore_to_count(ray_save_count);
        }

        if self.show_star {
            for star in &self.stars {
                let paint = Paint::fill(self.color)
                    .with_alpha(star.alpha)
                    .with_color_filter(filter);
                surface.draw_circle(
                    star.current_point.x,
                    star.current_point.y,
                    self.star_radius,
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
    use crate::canvas::RecordingCanvas;

    fn started() -> DayNightRenderer {
        let mut renderer = DayNightRenderer::new();
        renderer.on_bounds_changed(Rect::from_size(DEFAULT_WIDTH, DEFAULT_HEIGHT));
        renderer.reset();
        renderer
    }

    #[test]
    fn test_sun_rises_to_center() {
        let mut renderer = started();
        renderer.compute_render(SUN_RISE_DURATION_OFFSET);
        // 升到画面中央
        assert!((renderer.sun_y() - DEFAULT_HEIGHT / 2.0 - 2.0 * DEFAULT_STROKE_WIDTH).abs() < 1e-3);
        assert_eq!(renderer.moon_y(), renderer.hidden_y());
    }

    #[test]
    fn test_sun_rays_expand_then_shrink() {
        let mut renderer = started();
        renderer.compute_render(0.16);
        assert!(renderer.expand_sun_ray);
        assert!(renderer.sun_ray_count() > 0);

        for step in 160..=300 {
            renderer.compute_render(step as f32 / 1000.0);
        }
        assert_eq!(renderer.sun_ray_count(), MAX_SUN_RAY_COUNT);

        renderer.compute_render(0.48);
        assert!(!renderer.expand_sun_ray);
        assert!(renderer.sun_ray_count() < MAX_SUN_RAY_COUNT);
    }

    #[test]
    fn test_stars_appear_at_night() {
        let mut renderer = started();
        renderer.compute_render(0.5);
        assert!(!renderer.is_star_visible());
        assert_eq!(renderer.star_count(), 0);

        renderer.compute_render(0.8);
        assert!(renderer.is_star_visible());
        assert_eq!(renderer.star_count(), STAR_LAYOUT.len());

        renderer.reset();
        assert!(!renderer.is_star_visible());
        assert_eq!(renderer.star_count(), 0);
    }

    #[test]
    fn test_same_seed_same_frames() {
        let record = || {
            let mut renderer = started();
            let mut canvas = RecordingCanvas::new();
            for step in 0..40 {
                renderer.compute_render(0.68 + step as f32 * 0.008);
                renderer.paint(&mut canvas);
            }
            canvas.ops().to_vec()
        };
        assert_eq!(record(), record());
    }

    #[test]
    fn test_bounds_change_rebuilds_stars() {
        let mut renderer = started();
        renderer.compute_render(0.75);
        assert_eq!(renderer.star_count(), STAR_LAYOUT.len());
        renderer.on_bounds_changed(Rect::from_size(100.0, 75.0));
        assert_eq!(renderer.star_count(), 0);
        renderer.compute_render(0.76);
        assert_eq!(renderer.star_count(), STAR_LAYOUT.len());
    }
}
