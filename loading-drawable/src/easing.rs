//! # Easing 模块
//!
//! 缓动函数库，用于把线性的动画进度映射为带加速/减速感的进度。
//!
//! 所有缓动函数都是纯函数 `[0, 1] -> ℝ`，输入超出范围时先钳制到 `[0, 1]`。
//! 渲染器各自的分段曲线（鱼的阶梯曲线、眼球跳跃曲线等）定义在渲染器内部。

use std::f32::consts::PI;

const SAMPLE_COUNT: usize = 11;
const SAMPLE_STEP: f32 = 1.0 / (SAMPLE_COUNT as f32 - 1.0);
const NEWTON_ITERATIONS: usize = 8;
const NEWTON_MIN_SLOPE: f32 = 0.001;
const SUBDIVISION_PRECISION: f32 = 1e-7;
const SUBDIVISION_MAX_ITERATIONS: usize = 20;

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    /// 线性（匀速）
    #[default]
    Linear,
    /// 加速：`x^(2 * factor)`
    Accelerate(f32),
    /// 减速：`1 - (1 - x)^(2 * factor)`
    Decelerate(f32),
    /// 先加速后减速：`cos((x + 1)π) / 2 + 0.5`
    AccelerateDecelerate,
    /// 标准曲线 (0.4, 0) / (0.2, 1)
    FastOutSlowIn,
    /// 标准曲线 (0.4, 0) / (1, 1)
    FastOutLinearIn,
    /// 自定义三次贝塞尔曲线
    CubicBezier(CubicBezier),
}

impl Easing {
    /// 默认因子的加速曲线
    pub const ACCELERATE: Easing = Easing::Accelerate(1.0);
    /// 默认因子的减速曲线
    pub const DECELERATE: Easing = Easing::Decelerate(1.0);

    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)，超出范围会被钳制
    ///
    /// # 返回
    /// - 缓动后的进度值
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::Accelerate(factor) => accelerate(t, *factor),
            Easing::Decelerate(factor) => decelerate(t, *factor),
            Easing::AccelerateDecelerate => ((t + 1.0) * PI).cos() / 2.0 + 0.5,
            Easing::FastOutSlowIn => CubicBezier::FAST_OUT_SLOW_IN.value(t),
            Easing::FastOutLinearIn => CubicBezier::FAST_OUT_LINEAR_IN.value(t),
            Easing::CubicBezier(curve) => curve.value(t),
        }
    }
}

fn accelerate(t: f32, factor: f32) -> f32 {
    if factor == 1.0 {
        t * t
    } else {
        t.powf(2.0 * factor)
    }
}

fn decelerate(t: f32, factor: f32) -> f32 {
    if factor == 1.0 {
        1.0 - (1.0 - t) * (1.0 - t)
    } else {
        1.0 - (1.0 - t).powf(2.0 * factor)
    }
}

/// 三次贝塞尔缓动曲线
///
/// 端点固定为 (0, 0) 与 (1, 1)，由两个控制点决定形状。
/// 求值时先由 x 反解参数 t（牛顿迭代，斜率过小时退化为二分），再计算 y。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl CubicBezier {
    /// 快出慢入
    pub const FAST_OUT_SLOW_IN: CubicBezier = CubicBezier::new(0.4, 0.0, 0.2, 1.0);
    /// 快出线性入
    pub const FAST_OUT_LINEAR_IN: CubicBezier = CubicBezier::new(0.4, 0.0, 1.0, 1.0);

    /// 创建曲线
    ///
    /// 控制点的 x 坐标应在 `[0, 1]` 内，保证曲线对 x 单调。
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// 计算 x 处的曲线值
    pub fn value(&self, x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        if self.x1 == self.y1 && self.x2 == self.y2 {
            return x;
        }
        if x == 0.0 || x == 1.0 {
            return x;
        }
        let t = self.t_for_x(x);
        calc_bezier(t, self.y1, self.y2)
    }

    fn t_for_x(&self, x: f32) -> f32 {
        // 粗采样确定初始区间
        let mut interval_start = 0.0;
        let mut current = 1;
        while current < SAMPLE_COUNT - 1
            && calc_bezier(current as f32 * SAMPLE_STEP, self.x1, self.x2) <= x
        {
            current += 1;
            interval_start += SAMPLE_STEP;
        }
        let sample_lo = calc_bezier(interval_start, self.x1, self.x2);
        let sample_hi = calc_bezier(interval_start + SAMPLE_STEP, self.x1, self.x2);
        let dist = if sample_hi > sample_lo {
            (x - sample_lo) / (sample_hi - sample_lo)
        } else {
            0.0
        };
        let mut guess = interval_start + dist * SAMPLE_STEP;

        let initial_slope = slope(guess, self.x1, self.x2);
        if initial_slope >= NEWTON_MIN_SLOPE {
            for _ in 0..NEWTON_ITERATIONS {
                let current_slope = slope(guess, self.x1, self.x2);
                if current_slope == 0.0 {
                    break;
                }
                let current_x = calc_bezier(guess, self.x1, self.x2) - x;
                guess -= current_x / current_slope;
            }
            guess.clamp(0.0, 1.0)
        } else if initial_slope == 0.0 {
            guess
        } else {
            self.binary_subdivide(x, interval_start, interval_start + SAMPLE_STEP)
        }
    }

    fn binary_subdivide(&self, x: f32, mut a: f32, mut b: f32) -> f32 {
        let mut current_t = a;
        for _ in 0..SUBDIVISION_MAX_ITERATIONS {
            current_t = a + (b - a) / 2.0;
            let current_x = calc_bezier(current_t, self.x1, self.x2) - x;
            if current_x.abs() <= SUBDIVISION_PRECISION {
                break;
            }
            if current_x > 0.0 {
                b = current_t;
            } else {
                a = current_t;
            }
        }
        current_t
    }
}

fn calc_bezier(t: f32, a1: f32, a2: f32) -> f32 {
    ((coeff_a(a1, a2) * t + coeff_b(a1, a2)) * t + coeff_c(a1)) * t
}

fn slope(t: f32, a1: f32, a2: f32) -> f32 {
    3.0 * coeff_a(a1, a2) * t * t + 2.0 * coeff_b(a1, a2) * t + coeff_c(a1)
}

const fn coeff_a(a1: f32, a2: f32) -> f32 {
    1.0 - 3.0 * a2 + 3.0 * a1
}

const fn coeff_b(a1: f32, a2: f32) -> f32 {
    3.0 * a2 - 6.0 * a1
}

const fn coeff_c(a1: f32) -> f32 {
    3.0 * a1
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 6] = [
        Easing::Linear,
        Easing::ACCELERATE,
        Easing::DECELERATE,
        Easing::AccelerateDecelerate,
        Easing::FastOutSlowIn,
        Easing::FastOutLinearIn,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_clamp() {
        for easing in ALL {
            assert_eq!(easing.apply(-0.5), easing.apply(0.0));
            assert_eq!(easing.apply(1.5), easing.apply(1.0));
        }
    }

    #[test]
    fn test_continuity() {
        // 密集采样，相邻两点差值必须很小
        for easing in ALL {
            let mut prev = easing.apply(0.0);
            for i in 1..=1000 {
                let value = easing.apply(i as f32 / 1000.0);
                assert!((value - prev).abs() < 0.01, "{easing:?} jumps at {i}");
                prev = value;
            }
        }
    }

    #[test]
    fn test_accelerate_decelerate_factor() {
        assert!((Easing::ACCELERATE.apply(0.5) - 0.25).abs() < 1e-6);
        assert!((Easing::DECELERATE.apply(0.5) - 0.75).abs() < 1e-6);
        assert!((Easing::Accelerate(2.0).apply(0.5) - 0.0625).abs() < 1e-6);
        assert!((Easing::Decelerate(0.5).apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_accelerate_decelerate_midpoint() {
        assert!((Easing::AccelerateDecelerate.apply(0.5) - 0.5).abs() < 1e-6);
    }

    /// 直接按参数 t 计算曲线上的点，用于校验反解精度
    fn point_at(curve: &CubicBezier, t: f32) -> (f32, f32) {
        (
            calc_bezier(t, curve.x1, curve.x2),
            calc_bezier(t, curve.y1, curve.y2),
        )
    }

    #[test]
    fn test_cubic_bezier_matches_parametric_curve() {
        for curve in [CubicBezier::FAST_OUT_SLOW_IN, CubicBezier::FAST_OUT_LINEAR_IN] {
            for i in 0..=100 {
                let (x, y) = point_at(&curve, i as f32 / 100.0);
                assert!((curve.value(x) - y).abs() < 1e-3, "{curve:?} at t={i}");
            }
        }
    }

    #[test]
    fn test_fast_out_slow_in_shape() {
        // 前半段上升更快
        assert!(Easing::FastOutSlowIn.apply(0.5) > 0.7);
        assert!(Easing::FastOutLinearIn.apply(0.5) < 0.5);
    }

    #[test]
    fn test_linear_bezier_is_identity() {
        let curve = CubicBezier::new(0.3, 0.3, 0.7, 0.7);
        assert_eq!(curve.value(0.42), 0.42);
    }
}
