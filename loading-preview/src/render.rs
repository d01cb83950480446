//! 帧录制
//!
//! 以固定帧率推进 [`LoadingDrawable`]，把每一帧的绘制调用记录下来。

use std::time::Duration;

use anyhow::Context;
use loading_drawable::{DrawOp, LoadingDrawable, RecordingCanvas, Rect};
use serde::Serialize;
use tracing::debug;

/// 一帧的录制结果
#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    pub index: usize,
    pub progress: f32,
    pub cycle: u64,
    pub ops: Vec<DrawOp>,
}

impl FrameRecord {
    /// 摘要行：帧号、进度、绘制调用数
    pub fn summary(&self) -> String {
        let paints = self.ops.iter().filter(|op| op.is_paint()).count();
        format!(
            "frame {:>4}  cycle {:>3}  progress {:.4}  ops {:>3}  paints {:>3}",
            self.index,
            self.cycle,
            self.progress,
            self.ops.len(),
            paints
        )
    }
}

/// 录制 `frames` 帧
///
/// 第 0 帧是启动后的初始画面，之后每帧推进 `1 / fps` 秒。
/// 帧间隔无法表示为 `Duration` 时返回错误。
pub fn record_frames(
    drawable: &mut LoadingDrawable,
    bounds: Rect,
    frames: usize,
    fps: f32,
) -> anyhow::Result<Vec<FrameRecord>> {
    let step = Duration::try_from_secs_f32(1.0 / fps)
        .with_context(|| format!("帧率 {fps} 对应的帧间隔无效"))?;
    drawable.on_bounds_changed(bounds);
    drawable.start();

    let mut records = Vec::with_capacity(frames);
    let mut canvas = RecordingCanvas::new();
    for index in 0..frames {
        if index > 0 {
            drawable.advance(step);
        }
        drawable.paint(&mut canvas);
        let driver = drawable.driver();
        records.push(FrameRecord {
            index,
            progress: driver.progress(),
            cycle: driver.cycle(),
            ops: canvas.take_ops(),
        });
    }
    drawable.stop();

    debug!(
        kind = %drawable.renderer().kind(),
        frames = records.len(),
        "录制完成"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loading_drawable::RendererKind;

    #[test]
    fn test_record_frames_count_and_progress() {
        let mut drawable = LoadingDrawable::from_kind(RendererKind::Material);
        let records = record_frames(&mut drawable, Rect::from_size(56.0, 56.0), 5, 60.0).unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(records[0].index, 0);
        assert_eq!(records[0].progress, 0.0);
        assert!(records[4].progress > records[1].progress);
        assert!(records.iter().all(|r| !r.ops.is_empty()));
        assert!(!drawable.is_running());
    }

    #[test]
    fn test_unrepresentable_step_is_error() {
        let mut drawable = LoadingDrawable::from_kind(RendererKind::Gear);
        let result = record_frames(&mut drawable, Rect::from_size(56.0, 56.0), 2, 1e-30);
        assert!(result.is_err());
        assert!(!drawable.is_running());
    }

    #[test]
    fn test_zero_frames() {
        let mut drawable = LoadingDrawable::from_kind(RendererKind::Gear);
        let records = record_frames(&mut drawable, Rect::from_size(56.0, 56.0), 0, 30.0).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_summary_line() {
        let mut drawable = LoadingDrawable::from_kind(RendererKind::Swap);
        let records = record_frames(&mut drawable, Rect::from_size(56.0, 56.0), 1, 60.0).unwrap();
        let line = records[0].summary();
        assert!(line.starts_with("frame    0"));
        assert!(line.contains("paints"));
    }

    #[test]
    fn test_frames_serialize() {
        let mut drawable = LoadingDrawable::from_kind(RendererKind::CoolWait);
        let records = record_frames(&mut drawable, Rect::from_size(200.0, 200.0), 2, 60.0).unwrap();
        let json = serde_json::to_value(&records).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(2));
        assert!(json[0]["ops"].is_array());
    }
}
