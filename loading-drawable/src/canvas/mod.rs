//! # Canvas 模块
//!
//! 绘制表面抽象。
//!
//! 渲染器不做任何光栅化，只通过 [`Surface`] 发出绘制调用；宿主负责把这些调用
//! 落到真实的 2D 绘图 API 上。[`RecordingCanvas`] 是一个把调用记录为
//! [`DrawOp`] 列表的实现，用于无头预览与测试。

mod paint;
mod recording;

pub use paint::{Cap, ColorFilter, Join, Paint, PathEffect, Shader, Style};
pub use recording::{DrawOp, RecordingCanvas};

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::path::Path;

/// 裁剪方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipOp {
    /// 与当前裁剪区求交
    Intersect,
    /// 从当前裁剪区中扣除
    Difference,
}

/// 位图资源
///
/// 核心库不加载图片，只以种类 + 目标矩形的形式发出绘制请求。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    /// 飞舞的叶子
    Leaf,
    /// 进度条上的加载图标
    Loading,
    /// 电风扇
    ElectricFan,
}

/// 2D 绘制表面
///
/// 变换与裁剪遵循 save/restore 栈语义；角度单位为度，正值顺时针。
pub trait Surface {
    /// 保存当前变换与裁剪，返回保存前的栈深度
    fn save(&mut self) -> usize;
    /// 恢复到指定栈深度
    fn restore_to_count(&mut self, count: usize);

    fn translate(&mut self, dx: f32, dy: f32);
    /// 绕 (px, py) 旋转
    fn rotate(&mut self, degrees: f32, px: f32, py: f32);
    /// 以 (px, py) 为中心缩放
    fn scale(&mut self, sx: f32, sy: f32, px: f32, py: f32);

    fn clip_rect(&mut self, rect: Rect, op: ClipOp);
    fn clip_path(&mut self, path: &Path, op: ClipOp);

    /// 绘制椭圆弧
    fn draw_arc(
        &mut self,
        oval: Rect,
        start_degrees: f32,
        sweep_degrees: f32,
        use_center: bool,
        paint: &Paint,
    );
    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, paint: &Paint);
    fn draw_oval(&mut self, oval: Rect, paint: &Paint);
    fn draw_rect(&mut self, rect: Rect, paint: &Paint);
    fn draw_round_rect(&mut self, rect: Rect, rx: f32, ry: f32, paint: &Paint);
    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, paint: &Paint);
    fn draw_path(&mut self, path: &Path, paint: &Paint);
    /// 以 (x, y) 为基线起点绘制文字
    fn draw_text(&mut self, text: &str, x: f32, y: f32, paint: &Paint);
    fn draw_image(&mut self, image: ImageKind, dst: Rect, paint: &Paint);

    /// 文字包围盒（相对基线起点）
    fn text_bounds(&self, text: &str, paint: &Paint) -> Rect;
}
