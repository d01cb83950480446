//! # Scenery 子模块
//!
//! 风景家族：日夜交替与电风扇吹叶子。两者都带有随机元素，
//! 随机数来自实例自己的 [`StdRng`]，`reset()` 时按种子重新播种。

mod day_night;
mod electric_fan;

pub use day_night::{DayNightConfig, DayNightRenderer};
pub use electric_fan::{ElectricFanConfig, ElectricFanRenderer};

use rand::Rng;
use rand::rngs::StdRng;

use crate::easing::Easing;

/// 星星与叶子随机挑选的缓动曲线
const RANDOM_EASINGS: [Easing; 5] = [
    Easing::Linear,
    Easing::DECELERATE,
    Easing::ACCELERATE,
    Easing::FastOutLinearIn,
    Easing::FastOutSlowIn,
];

pub(crate) fn random_easing(rng: &mut StdRng) -> Easing {
    RANDOM_EASINGS[rng.gen_range(0..RANDOM_EASINGS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_random_easing_is_seeded() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let left: Vec<_> = (0..16).map(|_| random_easing(&mut a)).collect();
        let right: Vec<_> = (0..16).map(|_| random_easing(&mut b)).collect();
        assert_eq!(left, right);
    }
}
