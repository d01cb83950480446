//! # Jump 子模块
//!
//! 圆形跳跃家族：小球沿半圆、折线或抛物线运动。
//!
//! Swap 与 Collision 按固有尺寸布局，绘制时把原点移到 bounds 左上角；
//! Guard 与 Dance 以 bounds 内缩后的圆环为参照。

mod collision;
mod dance;
mod guard;
mod swap;

pub use collision::{CollisionConfig, CollisionRenderer};
pub use dance::{DanceConfig, DanceRenderer};
pub use guard::{GuardConfig, GuardRenderer};
pub use swap::{SwapConfig, SwapRenderer};

/// 以 `center_radius` 为半径的圆环内缩量
///
/// 半径不为正时退化为半个描边宽度（向上取整）。
pub(crate) fn ring_insets(width: f32, height: f32, center_radius: f32, stroke_width: f32) -> f32 {
    let min_edge = (width as i32).min(height as i32) as f32;
    if center_radius <= 0.0 || min_edge < 0.0 {
        (stroke_width / 2.0).ceil()
    } else {
        min_edge / 2.0 - center_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_insets() {
        assert_eq!(ring_insets(56.0, 56.0, 12.5, 1.0), 15.5);
        assert_eq!(ring_insets(56.0, 56.0, 0.0, 1.5), 1.0);
        // 宽高先截断为整数
        assert_eq!(ring_insets(56.9, 57.0, 12.5, 1.0), 15.5);
    }
}
