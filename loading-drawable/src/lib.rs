//! # Loading Drawable
//!
//! 一组与平台无关的加载动画渲染器。
//!
//! ## 架构概述
//!
//! 核心库不做光栅化，也不持有时钟。宿主每帧把经过的时间交给驱动器，
//! 驱动器换算出单次动画内的进度，渲染器据此计算渲染状态，再通过
//! [`Surface`] 发出 2D 绘制调用：
//!
//! ```text
//! Host                     AnimationDriver              LoadingRenderer
//!   │                            │                             │
//!   │──── advance(dt) ─────────►│                             │
//!   │                            │── on_cycle_repeat() ──────►│ （跨过周期边界时）
//!   │                            │── compute_render(p) ──────►│
//!   │                            │                             │
//!   │──── paint(surface) ──────────────────────────────────────►│
//!   │◄─── draw_arc / draw_path / ... ─────────────────────────│
//! ```
//!
//! ## 核心类型
//!
//! - [`LoadingRenderer`]：渲染器接口，16 种实现
//! - [`AnimationDriver`]：无限循环的进度驱动
//! - [`LoadingDrawable`]：渲染器 + 驱动器，宿主的唯一入口
//! - [`RendererKind`]：渲染器种类与整数 id
//! - [`RendererConfig`]：可从 JSON 反序列化的渲染器配置
//! - [`RecordingCanvas`]：把绘制调用记录下来的表面
//!
//! ## 使用示例
//!
//! ```ignore
//! use loading_drawable::{LoadingDrawable, RecordingCanvas, RendererKind, Rect};
//!
//! let mut drawable = LoadingDrawable::from_kind(RendererKind::Gear);
//! drawable.on_bounds_changed(Rect::from_size(56.0, 56.0));
//! drawable.start();
//!
//! loop {
//!     drawable.advance(frame_time);
//!     let mut canvas = RecordingCanvas::new();
//!     drawable.paint(&mut canvas);
//!     host.replay(canvas.ops());
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`geometry`]：点、矩形、ARGB 颜色
//! - [`easing`]：缓动曲线
//! - [`path`]：路径构建与测量
//! - [`canvas`]：绘制表面抽象
//! - [`renderer`]：渲染器接口与实现
//! - [`driver`]：动画驱动
//! - [`drawable`]：宿主入口
//! - [`factory`]：种类与构造
//! - [`config`]：配置与合并规则
//! - [`error`]：错误类型定义

pub mod canvas;
pub mod config;
pub mod drawable;
pub mod driver;
pub mod easing;
pub mod error;
pub mod factory;
pub mod geometry;
pub mod path;
pub mod renderer;

// 重导出核心类型
pub use canvas::{
    Cap, ClipOp, ColorFilter, DrawOp, ImageKind, Join, Paint, PathEffect, RecordingCanvas, Shader,
    Style, Surface,
};
pub use config::{CommonConfig, RendererConfig};
pub use drawable::LoadingDrawable;
pub use driver::{AnimationDriver, DriverState, FrameTick};
pub use easing::{CubicBezier, Easing};
pub use error::{DrawableError, DrawableResult};
pub use factory::{RendererFamily, RendererKind, create, create_by_id, create_with};
pub use geometry::{Color, Point, Rect};
pub use path::{Direction, Path, PathMeasure, PathVerb};
pub use renderer::{DEFAULT_DURATION_MS, DEFAULT_SEED, DEFAULT_SIZE, LoadingRenderer, RendererBase};
