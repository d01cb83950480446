//! # Animal 子模块
//!
//! 动物家族：沿河道游动的鱼与跳动的幽灵眼睛。

mod fish;
mod ghosts_eye;

pub use fish::{FishConfig, FishRenderer};
pub use ghosts_eye::{GhostsEyeConfig, GhostsEyeRenderer};
