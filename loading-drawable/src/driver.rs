//! # Driver 模块
//!
//! 无限循环的动画驱动。
//!
//! 驱动器不持有时钟：宿主每帧调用 [`AnimationDriver::advance`] 传入经过的时间，
//! 驱动器把它换算为单次动画内的线性进度 `[0, 1)` 并交给渲染器。
//!
//! ## 状态机
//!
//! ```text
//!          start()                  stop()
//!  Idle ───────────► Running ─────────────► Idle
//!                     │   ▲
//!                     └───┘ advance(dt)
//! ```
//!
//! 跨过周期边界的那一帧先调用一次 `on_cycle_repeat`，再计算新一轮的进度。

use std::time::Duration;

use tracing::{debug, trace};

use crate::renderer::{DEFAULT_DURATION_MS, LoadingRenderer};

/// 驱动器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    /// 未运行，不产生任何帧
    #[default]
    Idle,
    /// 运行中
    Running,
}

/// 单帧结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// 本帧进度
    pub progress: f32,
    /// 已完成的周期数
    pub cycle: u64,
    /// 本帧是否跨过了周期边界
    pub repeated: bool,
}

/// 动画驱动器
#[derive(Debug, Clone, Default)]
pub struct AnimationDriver {
    state: DriverState,
    duration: Duration,
    /// 当前周期内已经过的时间
    elapsed: Duration,
    cycle: u64,
    progress: f32,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    /// 最近一帧的进度
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// 已完成的周期数
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// 启动
    ///
    /// 依次调用 `reset`、`on_cycle_start`，并立即以进度 0 计算第一帧。
    /// 运行中再次启动等价于重新开始。
    pub fn start(&mut self, renderer: &mut dyn LoadingRenderer) {
        self.duration = renderer.duration();
        if self.duration.is_zero() {
            self.duration = Duration::from_millis(DEFAULT_DURATION_MS);
        }
        self.elapsed = Duration::ZERO;
        self.cycle = 0;
        self.progress = 0.0;
        self.state = DriverState::Running;

        renderer.reset();
        renderer.on_cycle_start();
        renderer.compute_render(0.0);

        debug!(
            kind = %renderer.kind(),
            duration_ms = self.duration.as_millis() as u64,
            "动画驱动启动"
        );
    }

    /// 停止，之后的 `advance` 不再产生帧
    pub fn stop(&mut self) {
        if self.state == DriverState::Running {
            self.state = DriverState::Idle;
            debug!(cycle = self.cycle, "动画驱动停止");
        }
    }

    /// 推进一帧
    ///
    /// # 参数
    /// - `dt`: 距离上一帧经过的时间
    ///
    /// # 返回
    /// 运行中返回本帧结果（宿主应重绘），未运行返回 `None`
    pub fn advance(&mut self, dt: Duration, renderer: &mut dyn LoadingRenderer) -> Option<FrameTick> {
        if self.state != DriverState::Running {
            return None;
        }

        let total = self.elapsed.saturating_add(dt);
        let duration_nanos = self.duration.as_nanos();
        let wraps = total.as_nanos() / duration_nanos;
        let repeated = wraps > 0;

        if repeated {
            self.elapsed = Duration::from_nanos((total.as_nanos() % duration_nanos) as u64);
            self.cycle = self
                .cycle
                .saturating_add(u64::try_from(wraps).unwrap_or(u64::MAX));
            renderer.on_cycle_repeat();
            trace!(kind = %renderer.kind(), cycle = self.cycle, "动画进入下一轮");
        } else {
            self.elapsed = total;
        }

        self.progress = cycle_progress(self.elapsed, self.duration);
        renderer.compute_render(self.progress);

        Some(FrameTick {
            progress: self.progress,
            cycle: self.cycle,
            repeated,
        })
    }
}

/// 周期内的归一化进度，保证小于 1
fn cycle_progress(elapsed: Duration, duration: Duration) -> f32 {
    let progress = (elapsed.as_secs_f64() / duration.as_secs_f64()) as f32;
    progress.clamp(0.0, 1.0 - f32::EPSILON)
}
