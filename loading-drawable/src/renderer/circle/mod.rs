//! # Circle 模块
//!
//! 圆形家族。
//!
//! - [`rotate`]：弧线修剪 + 整组旋转
//! - [`jump`]：小球跳跃、交换与碰撞

pub mod jump;
pub mod rotate;

pub use jump::{
    CollisionConfig, CollisionRenderer, DanceConfig, DanceRenderer, GuardConfig, GuardRenderer,
    SwapConfig, SwapRenderer,
};
pub use rotate::{
    GearConfig, GearRenderer, LevelConfig, LevelRenderer, MaterialConfig, MaterialRenderer,
    WhorlConfig, WhorlRenderer,
};
