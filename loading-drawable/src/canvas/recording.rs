//! 记录型绘制表面

use serde::{Deserialize, Serialize};

use super::{ClipOp, ImageKind, Paint, Surface};
use crate::geometry::Rect;
use crate::path::Path;

/// 每个字符的估算宽度（相对字号）
const TEXT_ADVANCE_RATIO: f32 = 0.6;

/// 一次绘制调用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Save,
    Restore {
        count: usize,
    },
    Translate {
        dx: f32,
        dy: f32,
    },
    Rotate {
        degrees: f32,
        px: f32,
        py: f32,
    },
    Scale {
        sx: f32,
        sy: f32,
        px: f32,
        py: f32,
    },
    ClipRect {
        rect: Rect,
        clip: ClipOp,
    },
    ClipPath {
        path: Path,
        clip: ClipOp,
    },
    Arc {
        oval: Rect,
        start: f32,
        sweep: f32,
        use_center: bool,
        paint: Paint,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        paint: Paint,
    },
    Oval {
        oval: Rect,
        paint: Paint,
    },
    Rect {
        rect: Rect,
        paint: Paint,
    },
    RoundRect {
        rect: Rect,
        rx: f32,
        ry: f32,
        paint: Paint,
    },
    Line {
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        paint: Paint,
    },
    Path {
        path: Path,
        paint: Paint,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        paint: Paint,
    },
    Image {
        image: ImageKind,
        dst: Rect,
        paint: Paint,
    },
}

impl DrawOp {
    /// 是否是实际产生像素的调用（不含变换/裁剪/栈操作）
    pub fn is_paint(&self) -> bool {
        !matches!(
            self,
            DrawOp::Save
                | DrawOp::Restore { .. }
                | DrawOp::Translate { .. }
                | DrawOp::Rotate { .. }
                | DrawOp::Scale { .. }
                | DrawOp::ClipRect { .. }
                | DrawOp::ClipPath { .. }
        )
    }

    /// 绘制调用使用的画笔
    pub fn paint(&self) -> Option<&Paint> {
        match self {
            DrawOp::Arc { paint, .. }
            | DrawOp::Circle { paint, .. }
            | DrawOp::Oval { paint, .. }
            | DrawOp::Rect { paint, .. }
            | DrawOp::RoundRect { paint, .. }
            | DrawOp::Line { paint, .. }
            | DrawOp::Path { paint, .. }
            | DrawOp::Text { paint, .. }
            | DrawOp::Image { paint, .. } => Some(paint),
            _ => None,
        }
    }
}

/// 把绘制调用记录下来的表面
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    ops: Vec<DrawOp>,
    depth: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// 取出已记录的调用并清空
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        self.depth = 0;
        std::mem::take(&mut self.ops)
    }

    /// 实际绘制调用的数量
    pub fn paint_count(&self) -> usize {
        self.ops.iter().filter(|op| op.is_paint()).count()
    }

    /// 当前 save 栈深度
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }
}

impl Surface for RecordingCanvas {
    fn save(&mut self) -> usize {
        let count = self.depth;
        self.depth += 1;
        self.push(DrawOp::Save);
        count
    }

    fn restore_to_count(&mut self, count: usize) {
        if count < self.depth {
            self.depth = count;
            self.push(DrawOp::Restore { count });
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.push(DrawOp::Translate { dx, dy });
    }

    fn rotate(&mut self, degrees: f32, px: f32, py: f32) {
        self.push(DrawOp::Rotate { degrees, px, py });
    }

    fn scale(&mut self, sx: f32, sy: f32, px: f32, py: f32) {
        self.push(DrawOp::Scale { sx, sy, px, py });
    }

    fn clip_rect(&mut self, rect: Rect, op: ClipOp) {
        self.push(DrawOp::ClipRect { rect, clip: op });
    }

    fn clip_path(&mut self, path: &Path, op: ClipOp) {
        self.push(DrawOp::ClipPath {
            path: path.clone(),
            clip: op,
        });
    }

    fn draw_arc(
        &mut self,
        oval: Rect,
        start_degrees: f32,
        sweep_degrees: f32,
        use_center: bool,
        paint: &Paint,
    ) {
        self.push(DrawOp::Arc {
            oval,
            start: start_degrees,
            sweep: sweep_degrees,
            use_center,
            paint: paint.clone(),
        });
    }

    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, paint: &Paint) {
        self.push(DrawOp::Circle {
            cx,
            cy,
            radius,
            paint: paint.clone(),
        });
    }

    fn draw_oval(&mut self, oval: Rect, paint: &Paint) {
        self.push(DrawOp::Oval {
            oval,
            paint: paint.clone(),
        });
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        self.push(DrawOp::Rect {
            rect,
            paint: paint.clone(),
        });
    }

    fn draw_round_rect(&mut self, rect: Rect, rx: f32, ry: f32, paint: &Paint) {
        self.push(DrawOp::RoundRect {
            rect,
            rx,
            ry,
            paint: paint.clone(),
        });
    }

    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, paint: &Paint) {
        self.push(DrawOp::Line {
            x0,
            y0,
            x1,
            y1,
            paint: paint.clone(),
        });
    }

    fn draw_path(&mut self, path: &Path, paint: &Paint) {
        self.push(DrawOp::Path {
            path: path.clone(),
            paint: paint.clone(),
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, paint: &Paint) {
        self.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            paint: paint.clone(),
        });
    }

    fn draw_image(&mut self, image: ImageKind, dst: Rect, paint: &Paint) {
        self.push(DrawOp::Image {
            image,
            dst,
            paint: paint.clone(),
        });
    }

    fn text_bounds(&self, text: &str, paint: &Paint) -> Rect {
        let width = text.chars().count() as f32 * paint.text_size * TEXT_ADVANCE_RATIO;
        Rect::new(0.0, -paint.text_size, width, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Color;

    #[test]
    fn test_save_restore_depth() {
        let mut canvas = RecordingCanvas::new();
        let outer = canvas.save();
        let inner = canvas.save();
        assert_eq!((outer, inner), (0, 1));
        canvas.restore_to_count(inner);
        assert_eq!(canvas.depth(), 1);
        canvas.restore_to_count(outer);
        assert_eq!(canvas.depth(), 0);
        // 重复恢复不再记录
        canvas.restore_to_count(outer);
        assert_eq!(canvas.ops().len(), 4);
    }

    #[test]
    fn test_paint_count() {
        let mut canvas = RecordingCanvas::new();
        let count = canvas.save();
        canvas.rotate(45.0, 10.0, 10.0);
        canvas.draw_circle(10.0, 10.0, 5.0, &Paint::fill(Color::RED));
        canvas.restore_to_count(count);
        assert_eq!(canvas.paint_count(), 1);
    }

    #[test]
    fn test_ops_serialize_with_tag() {
        let mut canvas = RecordingCanvas::new();
        canvas.draw_line(0.0, 0.0, 1.0, 1.0, &Paint::stroke(Color::WHITE, 1.0));
        let json = serde_json::to_value(canvas.ops()).unwrap();
        assert_eq!(json[0]["op"], "line");
        assert_eq!(json[0]["paint"]["color"], "#FFFFFFFF");
    }

    #[test]
    fn test_text_bounds() {
        let canvas = RecordingCanvas::new();
        let paint = Paint::fill(Color::WHITE).with_text_size(10.0);
        let bounds = canvas.text_bounds("100%", &paint);
        assert!((bounds.width() - 24.0).abs() < 1e-4);
        assert!((bounds.height() - 10.0).abs() < 1e-4);
    }
}
