//! # Rotate 子模块
//!
//! 圆形旋转家族：一条（或一组）弧线的起点和终点先后追赶，同时整组旋转。
//!
//! 四个渲染器共享同一套滞后状态 [`RingTrim`]：
//! - 每轮结束时把终点角度锁存为下一轮的起点（`store_originals`）
//! - 旋转计数按 `NUM_POINTS` 取模递增，使整组旋转跨多轮连续
//!
//! 锁存时 `origin_start` 与 `origin_end` 都取自 `end_degrees`，
//! 这一不对称决定了视觉节奏，保持原样。

mod gear;
mod level;
mod material;
mod whorl;

pub use gear::{GearConfig, GearRenderer};
pub use level::{LevelConfig, LevelRenderer};
pub use material::{MaterialConfig, MaterialRenderer};
pub use whorl::{WhorlConfig, WhorlRenderer};

/// 一次完整的整组旋转（三圈）
pub(crate) const FULL_GROUP_ROTATION: f32 = 3.0 * 360.0;

/// 环形默认描边宽度
pub(crate) const DEFAULT_STROKE_WIDTH: f32 = 2.5;
/// 环形默认半径
pub(crate) const DEFAULT_CENTER_RADIUS: f32 = 12.5;

/// 弧线修剪的滞后状态
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct RingTrim {
    pub start_degrees: f32,
    pub end_degrees: f32,
    pub origin_start_degrees: f32,
    pub origin_end_degrees: f32,
    /// 已完成的轮数（取模后）
    pub rotation_count: f32,
    pub group_rotation: f32,
}

impl RingTrim {
    /// 清零角度；旋转计数由 `on_start` 负责
    pub fn reset(&mut self) {
        self.origin_start_degrees = 0.0;
        self.origin_end_degrees = 0.0;
        self.start_degrees = 0.0;
        self.end_degrees = 0.0;
    }

    pub fn on_start(&mut self) {
        self.rotation_count = 0.0;
    }

    /// 进入下一轮
    ///
    /// # 参数
    /// - `num_points`: 旋转计数的周期
    pub fn on_repeat(&mut self, num_points: f32) {
        self.origin_end_degrees = self.end_degrees;
        self.origin_start_degrees = self.end_degrees;
        self.start_degrees = self.end_degrees;
        self.rotation_count = (self.rotation_count + 1.0) % num_points;
    }

    /// 整组旋转角度
    ///
    /// `rotate_progress` 为本轮内的旋转进度 `[0, 1]`。
    pub fn rotation(&self, num_points: f32, rotate_progress: f32) -> f32 {
        FULL_GROUP_ROTATION / num_points * rotate_progress
            + FULL_GROUP_ROTATION * (self.rotation_count / num_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_originals_latches_end() {
        let mut trim = RingTrim {
            start_degrees: 30.0,
            end_degrees: 120.0,
            ..Default::default()
        };
        trim.on_repeat(5.0);
        assert_eq!(trim.origin_start_degrees, 120.0);
        assert_eq!(trim.origin_end_degrees, 120.0);
        assert_eq!(trim.start_degrees, 120.0);
        assert_eq!(trim.rotation_count, 1.0);
    }

    #[test]
    fn test_rotation_count_wraps() {
        let mut trim = RingTrim::default();
        for _ in 0..3 {
            trim.on_repeat(3.0);
        }
        assert_eq!(trim.rotation_count, 0.0);
    }

    #[test]
    fn test_rotation_is_continuous_across_cycles() {
        let mut trim = RingTrim::default();
        let end_of_first = trim.rotation(5.0, 1.0);
        trim.on_repeat(5.0);
        let start_of_second = trim.rotation(5.0, 0.0);
        assert!((end_of_first - start_of_second).abs() < 1e-3);
    }

    #[test]
    fn test_reset_keeps_rotation_count() {
        let mut trim = RingTrim::default();
        trim.end_degrees = 90.0;
        trim.on_repeat(5.0);
        trim.reset();
        assert_eq!(trim.end_degrees, 0.0);
        assert_eq!(trim.rotation_count, 1.0);
        trim.on_start();
        assert_eq!(trim.rotation_count, 0.0);
    }
}
