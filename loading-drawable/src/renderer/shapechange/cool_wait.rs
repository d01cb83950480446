//! 酷等待：一笔写成的 "w" 加外圈，三层不同颜色的描边依次沿路径修剪前进

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::{Cap, Join, Paint, Surface};
use crate::config::{CommonConfig, RendererConfig, merge_color, merge_positive};
use crate::easing::Easing;
use crate::error::DrawableResult;
use crate::factory::RendererKind;
use crate::geometry::{Color, Rect};
use crate::path::{Path, PathMeasure};
use crate::renderer::{LoadingRenderer, RendererBase};

const DURATION_MS: u64 = 2222;

const DEFAULT_WIDTH: f32 = 200.0;
const DEFAULT_HEIGHT: f32 = 150.0;
const DEFAULT_STROKE_WIDTH: f32 = 8.0;
const WAIT_CIRCLE_RADIUS: f32 = 50.0;

const WAIT_TRIM_DURATION_OFFSET: f32 = 0.5;
const END_TRIM_DURATION_OFFSET: f32 = 1.0;

/// 初始可见段的起止位置（占路径总长的比例）
const ORIGIN_START_RATIO: f32 = 0.045;
const ORIGIN_END_RATIO: f32 = 0.255;

const DEFAULT_TOP_COLOR: Color = Color::WHITE;
const DEFAULT_MIDDLE_COLOR: Color = Color(0xFFF3_C742);
const DEFAULT_BOTTOM_COLOR: Color = Color(0xFF89_CC59);

/// CoolWait 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoolWaitConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    /// 外圈半径
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_circle_radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom_color: Option<Color>,
}

/// 描边层，绘制顺序自底向上
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitLayer {
    Bottom,
    Middle,
    Top,
}

impl WaitLayer {
    const ALL: [WaitLayer; 3] = [WaitLayer::Bottom, WaitLayer::Middle, WaitLayer::Top];

    fn index(self) -> usize {
        self as usize
    }
}

/// 修剪端点的起算位置
#[derive(Debug, Clone, Copy)]
enum Anchor {
    OriginStart,
    OriginEnd,
}

/// 修剪端点：`anchor + length * (base + range * easing(local))`
#[derive(Debug, Clone, Copy)]
struct TrimEdge {
    anchor: Anchor,
    easing: Easing,
    base: f32,
    range: f32,
}

/// 一个修剪窗口
///
/// 进度落在 `(after, until]` 内时，该层显示 `[start, end]` 段；
/// 同一层命中多个窗口时后者生效。
#[derive(Debug, Clone, Copy)]
struct TrimWindow {
    layer: WaitLayer,
    after: f32,
    until: f32,
    origin: f32,
    span: f32,
    start: TrimEdge,
    end: TrimEdge,
}

const fn edge(anchor: Anchor, easing: Easing, base: f32, range: f32) -> TrimEdge {
    TrimEdge {
        anchor,
        easing,
        base,
        range,
    }
}

const W: f32 = WAIT_TRIM_DURATION_OFFSET;

const TRIM_WINDOWS: [TrimWindow; 8] = [
    // 前半程
    TrimWindow {
        layer: WaitLayer::Top,
        after: f32::NEG_INFINITY,
        until: W,
        origin: 0.0,
        span: W,
        start: edge(Anchor::OriginStart, Easing::AccelerateDecelerate, 0.0, 0.48),
        end: edge(Anchor::OriginEnd, Easing::AccelerateDecelerate, 0.0, 0.3),
    },
    TrimWindow {
        layer: WaitLayer::Middle,
        after: 0.02 * W,
        until: 0.75 * W,
        origin: 0.02 * W,
        span: 0.73 * W,
        start: edge(Anchor::OriginStart, Easing::Accelerate(1.0), 0.0, 0.42),
        end: edge(Anchor::OriginStart, Easing::Decelerate(0.8), 0.0, 0.42),
    },
    TrimWindow {
        layer: WaitLayer::Bottom,
        after: 0.04 * W,
        until: 0.75 * W,
        origin: 0.04 * W,
        span: 0.71 * W,
        start: edge(Anchor::OriginStart, Easing::Accelerate(1.5), 0.0, 0.42),
        end: edge(Anchor::OriginStart, Easing::Decelerate(0.5), 0.0, 0.42),
    },
    // 后半程
    TrimWindow {
        layer: WaitLayer::Top,
        after: W,
        until: END_TRIM_DURATION_OFFSET,
        origin: W,
        span: END_TRIM_DURATION_OFFSET - W,
        start: edge(Anchor::OriginStart, Easing::AccelerateDecelerate, 0.48, 0.27),
        end: edge(Anchor::OriginEnd, Easing::AccelerateDecelerate, 0.3, 0.45),
    },
    TrimWindow {
        layer: WaitLayer::Middle,
        after: W + 0.02 * W,
        until: W + 0.62 * W,
        origin: W + 0.02 * W,
        span: 0.60 * W,
        start: edge(Anchor::OriginStart, Easing::Accelerate(0.8), 0.48, 0.10),
        end: edge(Anchor::OriginStart, Easing::Decelerate(0.3), 0.48, 0.20),
    },
    TrimWindow {
        layer: WaitLayer::Middle,
        after: W + 0.62 * W,
        until: END_TRIM_DURATION_OFFSET,
        origin: W + 0.62 * W,
        span: 0.38 * W,
        start: edge(Anchor::OriginStart, Easing::Decelerate(1.0), 0.58, 0.17),
        end: edge(Anchor::OriginStart, Easing::Decelerate(0.3), 0.68, 0.325),
    },
    TrimWindow {
        layer: WaitLayer::Bottom,
        after: W + 0.10 * W,
        until: W + 0.70 * W,
        origin: W + 0.10 * W,
        span: 0.60 * W,
        start: edge(Anchor::OriginStart, Easing::Accelerate(1.5), 0.48, 0.10),
        end: edge(Anchor::OriginStart, Easing::Decelerate(0.3), 0.48, 0.20),
    },
    TrimWindow {
        layer: WaitLayer::Bottom,
        after: W + 0.70 * W,
        until: END_TRIM_DURATION_OFFSET,
        origin: W + 0.70 * W,
        span: 0.30 * W,
        start: edge(Anchor::OriginStart, Easing::Decelerate(0.5), 0.58, 0.17),
        end: edge(Anchor::OriginStart, Easing::Decelerate(0.3), 0.68, 0.325),
    },
];

/// 测量好的等待路径
#[derive(Debug, Clone)]
struct WaitTrack {
    measure: PathMeasure,
    length: f32,
}

impl WaitTrack {
    fn edge_distance(&self, edge: &TrimEdge, local: f32) -> f32 {
        let anchor = match edge.anchor {
            Anchor::OriginStart => self.length * ORIGIN_START_RATIO,
            Anchor::OriginEnd => self.length * ORIGIN_END_RATIO,
        };
        anchor + self.length * (edge.base + edge.range * edge.easing.apply(local))
    }
}

#[derive(Debug, Clone)]
pub struct CoolWaitRenderer {
    base: RendererBase,

    stroke_width: f32,
    wait_circle_radius: f32,
    colors: [Color; 3],

    track: Option<WaitTrack>,
    trims: [Option<(f32, f32)>; 3],
    segments: [Path; 3],
}

impl Default for CoolWaitRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CoolWaitRenderer {
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DURATION_MS),
            stroke_width: DEFAULT_STROKE_WIDTH,
            wait_circle_radius: WAIT_CIRCLE_RADIUS,
            colors: [DEFAULT_BOTTOM_COLOR, DEFAULT_MIDDLE_COLOR, DEFAULT_TOP_COLOR],
            track: None,
            trims: [None; 3],
            segments: [Path::new(), Path::new(), Path::new()],
        }
    }

    /// 某一层当前显示的 `[start, end]` 弧长区间
    pub fn trim(&self, layer: WaitLayer) -> Option<(f32, f32)> {
        self.trims[layer.index()]
    }

    /// 等待路径总长，尚未构建时为 `None`
    pub fn path_length(&self) -> Option<f32> {
        self.track.as_ref().map(|track| track.length)
    }

    /// 外圈加 "w"，"w" 写两遍以便修剪段首尾衔接
    fn wait_path(&self) -> Path {
        let bounds = self.base.bounds;
        let (cx, cy) = (bounds.center_x(), bounds.center_y());
        let r = self.wait_circle_radius;
        let circle = Rect::new(cx - r, cy - r, cx + r, cy + r);

        let write_w = |path: &mut Path| {
            path.cubic_to(cx + r, cy - r * 0.5, cx + r * 0.3, cy - r, cx - r * 0.35, cy + r * 0.5);
            path.quad_to(cx + r, cy - r, cx + r * 0.05, cy + r * 0.5);
            path.line_to(cx + r * 0.75, cy - r * 0.2);
            path.cubic_to(cx, cy + r, cx + r, cy + r * 0.4, cx + r, cy);
        };

        let mut path = Path::new();
        path.move_to(cx + r, cy);
        write_w(&mut path);
        path.arc_to(circle, 0.0, -359.0);
        path.arc_to(circle, 1.0, -359.0);
        path.arc_to(circle, 2.0, -2.0);
        write_w(&mut path);
        path
    }

    fn build_track(&mut self) {
        let measure = PathMeasure::new(&self.wait_path());
        let length = measure.length();
        debug!(length, "等待路径已构建");
        self.track = Some(WaitTrack { measure, length });
    }
}

impl LoadingRenderer for CoolWaitRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::CoolWait
    }

    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn configure(&mut self, config: &RendererConfig) -> DrawableResult<()> {
        let RendererConfig::CoolWait(cool_wait) = config else {
            return Err(config.mismatch(RendererKind::CoolWait));
        };
        cool_wait.common.apply_to(&mut self.base);
        merge_positive(&mut self.stroke_width, cool_wait.stroke_width, "stroke_width");
        merge_positive(
            &mut self.wait_circle_radius,
            cool_wait.wait_circle_radius,
            "wait_circle_radius",
        );
        merge_color(&mut self.colors[WaitLayer::Bottom.index()], cool_wait.bottom_color);
        merge_color(&mut self.colors[WaitLayer::Middle.index()], cool_wait.middle_color);
        merge_color(&mut self.colors[WaitLayer::Top.index()], cool_wait.top_color);
        self.track = None;
        self.reset();
        Ok(())
    }

    fn on_bounds_changed(&mut self, bounds: Rect) {
        self.base.bounds = bounds;
        self.track = None;
    }

    fn reset(&mut self) {
        self.trims = [None; 3];
        self.segments = [Path::new(), Path::new(), Path::new()];
    }

    fn compute_render(&mut self, progress: f32) {
        if self.base.bounds.is_empty() {
            return;
        }
        if self.track.is_none() {
            self.build_track();
        }
        let Some(track) = &self.track else {
            return;
        };

        let mut trims = [None; 3];
        for window in TRIM_WINDOWS
            .iter()
            .filter(|window| progress > window.after && progress <= window.until)
        {
            let local = (progress - window.origin) / window.span;
            trims[window.layer.index()] = Some((
                track.edge_distance(&window.start, local),
                track.edge_distance(&window.end, local),
            ));
        }

        let segments = trims.map(|trim| match trim {
            Some((start, end)) => track.measure.extract_segment(start, end),
            None => Path::new(),
        });
        self.trims = trims;
        self.segments = segments;
    }

    fn draw(&self, surface: &mut dyn Surface, _bounds: Rect) {
        let save_count = surface.save();

        for layer in WaitLayer::ALL {
            let segment = &self.segments[layer.index()];
            if segment.is_empty() {
                continue;
            }
            let paint = Paint::stroke(self.colors[layer.index()], self.stroke_width)
                .with_cap(Cap::Round)
                .with_join(Join::Round)
                .with_color_filter(self.base.color_filter);
            surface.draw_path(segment, &paint);
        }

        surface.restore_to_count(save_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};

    fn renderer() -> CoolWaitRenderer {
        let mut renderer = CoolWaitRenderer::new();
        renderer.on_bounds_changed(Rect::from_size(DEFAULT_WIDTH, DEFAULT_HEIGHT));
        renderer.reset();
        renderer
    }

    #[test]
    fn test_no_bounds_no_compute() {
        let mut renderer = CoolWaitRenderer::new();
        renderer.compute_render(0.3);
        assert_eq!(renderer.path_length(), None);
        assert_eq!(renderer.trim(WaitLayer::Top), None);
    }

    #[test]
    fn test_initial_top_segment() {
        let mut renderer = renderer();
        renderer.compute_render(0.0);
        let length = renderer.path_length().unwrap();
        let (start, end) = renderer.trim(WaitLayer::Top).unwrap();
        assert!((start - length * ORIGIN_START_RATIO).abs() < 1e-3);
        assert!((end - length * ORIGIN_END_RATIO).abs() < 1e-3);
        assert_eq!(renderer.trim(WaitLayer::Middle), None);
        assert_eq!(renderer.trim(WaitLayer::Bottom), None);
    }

    #[test]
    fn test_layers_by_phase() {
        let mut renderer = renderer();

        renderer.compute_render(0.2);
        assert!(renderer.trim(WaitLayer::Top).is_some());
        assert!(renderer.trim(WaitLayer::Middle).is_some());
        assert!(renderer.trim(WaitLayer::Bottom).is_some());

        // 中下两层在 0.375 后收起
        renderer.compute_render(0.4);
        assert!(renderer.trim(WaitLayer::Top).is_some());
        assert_eq!(renderer.trim(WaitLayer::Middle), None);
        assert_eq!(renderer.trim(WaitLayer::Bottom), None);

        renderer.compute_render(0.9);
        assert!(renderer.trim(WaitLayer::Top).is_some());
        assert!(renderer.trim(WaitLayer::Middle).is_some());
        assert!(renderer.trim(WaitLayer::Bottom).is_some());
    }

    #[test]
    fn test_top_segment_advances() {
        let mut renderer = renderer();
        renderer.compute_render(0.1);
        let (early_start, early_end) = renderer.trim(WaitLayer::Top).unwrap();
        renderer.compute_render(0.7);
        let (late_start, late_end) = renderer.trim(WaitLayer::Top).unwrap();
        assert!(late_start > early_start);
        assert!(late_end > early_end);
    }

    #[test]
    fn test_late_window_overrides() {
        let mut renderer = renderer();
        renderer.compute_render(0.95);
        let length = renderer.path_length().unwrap();
        let (start, _) = renderer.trim(WaitLayer::Middle).unwrap();
        // 最后一个中层窗口从 0.58 起算
        assert!(start >= length * (ORIGIN_START_RATIO + 0.58) - 1e-3);
    }

    #[test]
    fn test_draw_bottom_to_top() {
        let mut renderer = renderer();
        renderer.compute_render(0.2);
        let mut canvas = RecordingCanvas::new();
        renderer.paint(&mut canvas);
        let colors: Vec<Color> = canvas
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Path { paint, .. } => Some(paint.color),
                _ => None,
            })
            .collect();
        assert_eq!(
            colors,
            vec![DEFAULT_BOTTOM_COLOR, DEFAULT_MIDDLE_COLOR, DEFAULT_TOP_COLOR]
        );
    }

    #[test]
    fn test_bounds_change_rebuilds_path() {
        let mut renderer = renderer();
        renderer.compute_render(0.2);
        assert!(renderer.path_length().is_some());
        renderer.on_bounds_changed(Rect::from_size(400.0, 300.0));
        assert_eq!(renderer.path_length(), None);
    }
}
