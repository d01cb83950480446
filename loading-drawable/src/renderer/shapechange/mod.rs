//! # ShapeChange 子模块
//!
//! 变形家族：母子圆分离与回归、沿 "w" 路径修剪的多层描边。

mod circle_brood;
mod cool_wait;

pub use circle_brood::{CircleBroodConfig, CircleBroodRenderer};
pub use cool_wait::{CoolWaitConfig, CoolWaitRenderer, WaitLayer};
