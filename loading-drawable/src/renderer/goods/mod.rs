//! # Goods 子模块
//!
//! 物件家族：打气筒给气球充气、水瓶中的水波与水滴。

mod balloon;
mod water_bottle;

pub use balloon::{BalloonConfig, BalloonRenderer};
pub use water_bottle::{WaterBottleConfig, WaterBottleRenderer, WaterDrop};
