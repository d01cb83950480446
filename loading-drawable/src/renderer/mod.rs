//! # Renderer 模块
//!
//! 16 种加载动画渲染器及其公共接口。
//!
//! ## 渲染流程
//!
//! ```text
//! AnimationDriver ──progress──► compute_render()  （计算本帧渲染状态）
//!                                     │
//! Host ──────────────────────► paint(surface)     （只读渲染状态，发出绘制调用）
//! ```
//!
//! ## 模块结构
//!
//! - [`circle`]：圆形旋转（Material/Level/Whorl/Gear）与圆形跳跃（Swap/Guard/Dance/Collision）
//! - [`scenery`]：风景（DayNight/ElectricFan）
//! - [`animal`]：动物（Fish/GhostsEye）
//! - [`goods`]：物品（Balloon/WaterBottle）
//! - [`shapechange`]：变形（CircleBrood/CoolWait）

pub mod animal;
pub mod circle;
pub mod goods;
pub mod scenery;
pub mod shapechange;

use std::fmt;
use std::time::Duration;

use crate::canvas::{ColorFilter, Surface};
use crate::config::RendererConfig;
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Rect};

pub use animal::{FishRenderer, GhostsEyeRenderer};
pub use circle::{
    CollisionRenderer, DanceRenderer, GearRenderer, GuardRenderer, LevelRenderer,
    MaterialRenderer, SwapRenderer, WhorlRenderer,
};
pub use goods::{BalloonRenderer, WaterBottleRenderer};
pub use scenery::{DayNightRenderer, ElectricFanRenderer};
pub use shapechange::{CircleBroodRenderer, CoolWaitRenderer};

/// 默认单次动画时长（毫秒）
pub const DEFAULT_DURATION_MS: u64 = 1333;
/// 默认尺寸
pub const DEFAULT_SIZE: f32 = 56.0;
/// 随机化渲染器的默认种子
pub const DEFAULT_SEED: u64 = 0x5EED_2016;

/// 渲染器公共状态
#[derive(Debug, Clone, PartialEq)]
pub struct RendererBase {
    /// 当前绘制区域，由宿主在尺寸变化时更新
    pub bounds: Rect,
    /// 固有宽度
    pub width: f32,
    /// 固有高度
    pub height: f32,
    /// 单次动画时长
    pub duration: Duration,
    /// 宿主设置的 alpha
    pub alpha: u8,
    /// 宿主设置的颜色滤镜
    pub color_filter: Option<ColorFilter>,
}

impl Default for RendererBase {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE, DEFAULT_SIZE, DEFAULT_DURATION_MS)
    }
}

impl RendererBase {
    pub fn new(width: f32, height: f32, duration_ms: u64) -> Self {
        Self {
            bounds: Rect::ZERO,
            width,
            height,
            duration: Duration::from_millis(duration_ms),
            alpha: u8::MAX,
            color_filter: None,
        }
    }

    /// 单次动画时长（毫秒）
    pub fn duration_ms(&self) -> f32 {
        self.duration.as_secs_f32() * 1000.0
    }

    /// 按宿主 alpha 调制颜色
    ///
    /// 只有不在每帧重设画笔 alpha 的渲染器使用。
    pub fn modulate_alpha(&self, color: Color) -> Color {
        let alpha = u32::from(color.alpha()) * u32::from(self.alpha) / 255;
        color.with_alpha(alpha as u8)
    }
}

/// 加载动画渲染器
///
/// 每个实现都是一个以进度为输入的小状态机：
/// - `compute_render` 是进度、bounds、参数与滞后状态（旋转计数等）的确定性函数
/// - `paint` 只读取上一次计算的状态，不修改任何东西
/// - `reset` 把所有滞后状态恢复为初始值，驱动器在每次启动前调用
pub trait LoadingRenderer: fmt::Debug {
    /// 渲染器种类
    fn kind(&self) -> RendererKind;

    fn base(&self) -> &RendererBase;

    fn base_mut(&mut self) -> &mut RendererBase;

    /// 应用配置
    ///
    /// 只覆盖显式给出且合法的字段；配置种类不匹配时返回错误，参数保持不变。
    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()>;

    /// 绘制区域变化
    ///
    /// 缓存了轨迹路径的渲染器需要覆盖此方法使缓存失效。
    fn on_bounds_changed(&mut self, bounds: Rect) {
        self.base_mut().bounds = bounds;
    }

    /// 恢复所有滞后状态
    fn reset(&mut self);

    /// 根据进度计算本帧渲染状态
    ///
    /// # 参数
    /// - `progress`: 单次动画内的归一化进度 `[0, 1)`
    fn compute_render(&mut self, progress: f32);

    /// 在指定区域绘制上一次计算的状态
    fn draw(&self, surface: &mut dyn Surface, bounds: Rect);

    /// 在当前 bounds 绘制
    fn paint(&self, surface: &mut dyn Surface) {
        let bounds = self.base().bounds;
        self.draw(surface, bounds);
    }

    /// 宿主设置 alpha（只有部分渲染器使用）
    fn set_alpha(&mut self, alpha: u8) {
        self.base_mut().alpha = alpha;
    }

    /// 宿主设置颜色滤镜
    fn set_color_filter(&mut self, filter: Option<ColorFilter>) {
        self.base_mut().color_filter = filter;
    }

    /// 动画开始
    fn on_cycle_start(&mut self) {}

    /// 动画进入下一轮，在下一轮第一次 `compute_render` 之前调用
    fn on_cycle_repeat(&mut self) {}

    fn duration(&self) -> Duration {
        self.base().duration
    }

    fn width(&self) -> f32 {
        self.base().width
    }

    fn height(&self) -> f32 {
        self.base().height
    }
}

/// 环形描边的内缩量
///
/// 让半径为 `center_radius` 的圆落在 `width × height` 的中央，
/// 至少内缩半个描边宽度（向上取整）以免描边被裁掉。
pub(crate) fn ring_stroke_inset(
    width: f32,
    height: f32,
    center_radius: f32,
    stroke_width: f32,
) -> f32 {
    let inset = width.min(height) / 2.0 - center_radius;
    let min_inset = (stroke_width / 2.0).ceil();
    if inset < min_inset { min_inset } else { inset }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_stroke_inset() {
        assert_eq!(ring_stroke_inset(56.0, 56.0, 12.5, 2.5), 15.5);
        // 半径超出时退化为半个描边
        assert_eq!(ring_stroke_inset(20.0, 56.0, 12.5, 2.5), 2.0);
    }

    #[test]
    fn test_base_defaults() {
        let base = RendererBase::default();
        assert_eq!(base.width, 56.0);
        assert_eq!(base.duration, Duration::from_millis(1333));
        assert_eq!(base.alpha, 255);
        assert!(base.bounds.is_empty());
    }

    #[test]
    fn test_modulate_alpha() {
        let mut base = RendererBase::default();
        assert_eq!(base.modulate_alpha(Color::WHITE), Color::WHITE);
        base.alpha = 128;
        assert_eq!(base.modulate_alpha(Color::WHITE).alpha(), 128);
        assert_eq!(base.modulate_alpha(Color(0x80FF_FFFF)).alpha(), 64);
    }
}
