//! # Drawable 模块
//!
//! 宿主入口：一个渲染器加一个驱动器。

use std::time::Duration;

use crate::canvas::{ColorFilter, Surface};
use crate::driver::{AnimationDriver, FrameTick};
use crate::factory::{self, RendererKind};
use crate::geometry::Rect;
use crate::renderer::LoadingRenderer;

/// 可被宿主嵌入的加载动画
#[derive(Debug)]
pub struct LoadingDrawable {
    renderer: Box<dyn LoadingRenderer>,
    driver: AnimationDriver,
}

impl LoadingDrawable {
    pub fn new(renderer: Box<dyn LoadingRenderer>) -> Self {
        Self {
            renderer,
            driver: AnimationDriver::new(),
        }
    }

    /// 以默认参数创建指定种类
    pub fn from_kind(kind: RendererKind) -> Self {
        Self::new(factory::create(kind))
    }

    pub fn start(&mut self) {
        self.driver.start(self.renderer.as_mut());
    }

    pub fn stop(&mut self) {
        self.driver.stop();
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    /// 推进一帧，返回 `Some` 表示需要重绘
    pub fn advance(&mut self, dt: Duration) -> Option<FrameTick> {
        self.driver.advance(dt, self.renderer.as_mut())
    }

    /// 绘制区域变化，下一帧生效
    pub fn on_bounds_changed(&mut self, bounds: Rect) {
        self.renderer.on_bounds_changed(bounds);
    }

    pub fn paint(&self, surface: &mut dyn Surface) {
        self.renderer.paint(surface);
    }

    pub fn set_alpha(&mut self, alpha: u8) {
        self.renderer.set_alpha(alpha);
    }

    pub fn set_color_filter(&mut self, filter: Option<ColorFilter>) {
        self.renderer.set_color_filter(filter);
    }

    pub fn intrinsic_width(&self) -> f32 {
        self.renderer.width()
    }

    pub fn intrinsic_height(&self) -> f32 {
        self.renderer.height()
    }

    pub fn renderer(&self) -> &dyn LoadingRenderer {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> &mut dyn LoadingRenderer {
        self.renderer.as_mut()
    }

    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }
}
