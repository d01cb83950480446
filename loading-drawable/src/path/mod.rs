//! # Path 模块
//!
//! 几何路径的构建与测量。
//!
//! ## 模块结构
//!
//! - [`Path`]：由 move/line/quad/cubic/close 组成的路径，圆弧在构建时转换为三次贝塞尔
//! - [`PathMeasure`]：对路径第一条轮廓做弧长测量，支持按距离取点与截取子路径

mod measure;

pub use measure::PathMeasure;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// 单段圆弧转换为贝塞尔时的最大角度
const MAX_ARC_PIECE_DEGREES: f32 = 90.0;

/// 路径指令
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathVerb {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Close,
}

/// 闭合图形的绘制方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// 顺时针（y 轴向下时角度递增方向）
    #[default]
    Cw,
    /// 逆时针
    Ccw,
}

/// 几何路径
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    verbs: Vec<PathVerb>,
    /// 当前轮廓起点（close 之后的落笔点）
    #[serde(skip)]
    contour_start: Point,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbs(&self) -> &[PathVerb] {
        &self.verbs
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    /// 清空路径
    pub fn reset(&mut self) {
        self.verbs.clear();
        self.contour_start = Point::ZERO;
    }

    /// 最后一个落点
    pub fn last_point(&self) -> Option<Point> {
        self.verbs.iter().rev().find_map(|verb| match *verb {
            PathVerb::MoveTo(p) | PathVerb::LineTo(p) => Some(p),
            PathVerb::QuadTo(_, p) | PathVerb::CubicTo(_, _, p) => Some(p),
            PathVerb::Close => None,
        })
    }

    /// 当前笔位置
    fn current_point(&self) -> Point {
        match self.verbs.last() {
            Some(PathVerb::Close) | None => self.contour_start,
            Some(_) => self.last_point().unwrap_or(self.contour_start),
        }
    }

    /// 空路径或刚 close 时补一个 move，保证线段有起点
    fn ensure_move(&mut self) {
        if matches!(self.verbs.last(), None | Some(PathVerb::Close)) {
            let start = self.contour_start;
            self.verbs.push(PathVerb::MoveTo(start));
        }
    }

    // ========== 基本指令 ==========

    pub fn move_to(&mut self, x: f32, y: f32) {
        let p = Point::new(x, y);
        self.contour_start = p;
        self.verbs.push(PathVerb::MoveTo(p));
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.ensure_move();
        self.verbs.push(PathVerb::LineTo(Point::new(x, y)));
    }

    pub fn quad_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.ensure_move();
        self.verbs
            .push(PathVerb::QuadTo(Point::new(x1, y1), Point::new(x2, y2)));
    }

    pub fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        self.ensure_move();
        self.verbs.push(PathVerb::CubicTo(
            Point::new(x1, y1),
            Point::new(x2, y2),
            Point::new(x3, y3),
        ));
    }

    pub fn close(&mut self) {
        if matches!(self.verbs.last(), Some(v) if *v != PathVerb::Close) {
            self.verbs.push(PathVerb::Close);
        }
    }

    // ========== 圆弧与图形 ==========

    /// 追加圆弧
    ///
    /// 空路径时以 move 落到圆弧起点，否则先用直线连接到圆弧起点。
    /// 角度单位为度，0° 指向 x 正方向，正值顺时针（y 轴向下）。
    pub fn arc_to(&mut self, oval: Rect, start_degrees: f32, sweep_degrees: f32) {
        let start = arc_point(oval, start_degrees);
        if self.verbs.is_empty() {
            self.move_to(start.x, start.y);
        } else if self.current_point().distance(start) > f32::EPSILON {
            self.line_to(start.x, start.y);
        }
        self.push_arc(oval, start_degrees, sweep_degrees);
    }

    /// 以新轮廓添加圆弧
    pub fn add_arc(&mut self, oval: Rect, start_degrees: f32, sweep_degrees: f32) {
        let start = arc_point(oval, start_degrees);
        self.move_to(start.x, start.y);
        self.push_arc(oval, start_degrees, sweep_degrees);
    }

    /// 添加椭圆（从最右点开始）
    pub fn add_oval(&mut self, oval: Rect, direction: Direction) {
        let sweep = match direction {
            Direction::Cw => 360.0,
            Direction::Ccw => -360.0,
        };
        self.add_arc(oval, 0.0, sweep);
        self.close();
    }

    pub fn add_circle(&mut self, cx: f32, cy: f32, radius: f32, direction: Direction) {
        let oval = Rect::new(cx - radius, cy - radius, cx + radius, cy + radius);
        self.add_oval(oval, direction);
    }

    /// 添加矩形（从左上角开始）
    pub fn add_rect(&mut self, rect: Rect, direction: Direction) {
        self.move_to(rect.left, rect.top);
        match direction {
            Direction::Cw => {
                self.line_to(rect.right, rect.top);
                self.line_to(rect.right, rect.bottom);
                self.line_to(rect.left, rect.bottom);
            }
            Direction::Ccw => {
                self.line_to(rect.left, rect.bottom);
                self.line_to(rect.right, rect.bottom);
                self.line_to(rect.right, rect.top);
            }
        }
        self.close();
    }

    /// 添加圆角矩形
    pub fn add_round_rect(&mut self, rect: Rect, rx: f32, ry: f32, direction: Direction) {
        let rx = rx.min(rect.width() / 2.0).max(0.0);
        let ry = ry.min(rect.height() / 2.0).max(0.0);
        if rx == 0.0 || ry == 0.0 {
            self.add_rect(rect, direction);
            return;
        }

        // 四个角的椭圆外接矩形
        let top_left = Rect::new(rect.left, rect.top, rect.left + 2.0 * rx, rect.top + 2.0 * ry);
        let top_right = top_left.offset(rect.width() - 2.0 * rx, 0.0);
        let bottom_right = top_right.offset(0.0, rect.height() - 2.0 * ry);
        let bottom_left = top_left.offset(0.0, rect.height() - 2.0 * ry);

        let (corners, sweep) = match direction {
            Direction::Cw => (
                [
                    (top_left, 180.0),
                    (top_right, 270.0),
                    (bottom_right, 0.0),
                    (bottom_left, 90.0),
                ],
                90.0,
            ),
            Direction::Ccw => (
                [
                    (top_left, 270.0),
                    (bottom_left, 180.0),
                    (bottom_right, 90.0),
                    (top_right, 0.0),
                ],
                -90.0,
            ),
        };

        let (first_oval, first_start) = corners[0];
        self.add_arc(first_oval, first_start, sweep);
        for (oval, start) in &corners[1..] {
            self.arc_to(*oval, *start, sweep);
        }
        self.close();
    }

    /// 平移整条路径
    pub fn offset(&mut self, dx: f32, dy: f32) {
        let shift = |p: &mut Point| {
            p.x += dx;
            p.y += dy;
        };
        for verb in &mut self.verbs {
            match verb {
                PathVerb::MoveTo(p) | PathVerb::LineTo(p) => shift(p),
                PathVerb::QuadTo(c, p) => {
                    shift(c);
                    shift(p);
                }
                PathVerb::CubicTo(c1, c2, p) => {
                    shift(c1);
                    shift(c2);
                    shift(p);
                }
                PathVerb::Close => {}
            }
        }
        shift(&mut self.contour_start);
    }

    /// 圆弧拆成不超过 90° 的三次贝塞尔
    fn push_arc(&mut self, oval: Rect, start_degrees: f32, sweep_degrees: f32) {
        let pieces = (sweep_degrees.abs() / MAX_ARC_PIECE_DEGREES).ceil() as usize;
        if pieces == 0 {
            return;
        }
        let step = sweep_degrees / pieces as f32;
        let rx = oval.width() / 2.0;
        let ry = oval.height() / 2.0;
        let (cx, cy) = (oval.center_x(), oval.center_y());

        for i in 0..pieces {
            let a0 = (start_degrees + step * i as f32).to_radians();
            let a1 = (start_degrees + step * (i + 1) as f32).to_radians();
            let k = 4.0 / 3.0 * ((a1 - a0) / 4.0).tan();
            let (s0, c0) = a0.sin_cos();
            let (s1, c1) = a1.sin_cos();
            self.cubic_to(
                cx + rx * (c0 - k * s0),
                cy + ry * (s0 + k * c0),
                cx + rx * (c1 + k * s1),
                cy + ry * (s1 - k * c1),
                cx + rx * c1,
                cy + ry * s1,
            );
        }
    }
}

/// 椭圆上指定角度的点
fn arc_point(oval: Rect, degrees: f32) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point::new(
        oval.center_x() + oval.width() / 2.0 * cos,
        oval.center_y() + oval.height() / 2.0 * sin,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn test_line_without_move_starts_at_origin() {
        let mut path = Path::new();
        path.line_to(10.0, 0.0);
        assert_eq!(path.verbs()[0], PathVerb::MoveTo(Point::ZERO));
    }

    #[test]
    fn test_arc_to_connects_with_line() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.arc_to(Rect::new(10.0, 10.0, 30.0, 30.0), 0.0, 90.0);
        assert!(matches!(path.verbs()[1], PathVerb::LineTo(p) if approx(p, Point::new(30.0, 20.0))));
        assert!(approx(path.last_point().unwrap(), Point::new(20.0, 30.0)));
    }

    #[test]
    fn test_add_arc_starts_new_contour() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.line_to(5.0, 5.0);
        path.add_arc(Rect::new(0.0, 0.0, 20.0, 20.0), -90.0, 180.0);
        assert!(matches!(path.verbs()[2], PathVerb::MoveTo(p) if approx(p, Point::new(10.0, 0.0))));
        // 180° 拆成两段
        assert_eq!(path.verbs().len(), 5);
        assert!(approx(path.last_point().unwrap(), Point::new(10.0, 20.0)));
    }

    #[test]
    fn test_negative_sweep() {
        let mut path = Path::new();
        path.add_arc(Rect::new(-10.0, -10.0, 10.0, 10.0), 0.0, -359.0);
        let end = arc_point(Rect::new(-10.0, -10.0, 10.0, 10.0), -359.0);
        assert!(approx(path.last_point().unwrap(), end));
        assert_eq!(path.verbs().len(), 1 + 4);
    }

    #[test]
    fn test_add_rect_cw() {
        let mut path = Path::new();
        path.add_rect(Rect::new(0.0, 0.0, 10.0, 5.0), Direction::Cw);
        assert_eq!(
            path.verbs(),
            &[
                PathVerb::MoveTo(Point::new(0.0, 0.0)),
                PathVerb::LineTo(Point::new(10.0, 0.0)),
                PathVerb::LineTo(Point::new(10.0, 5.0)),
                PathVerb::LineTo(Point::new(0.0, 5.0)),
                PathVerb::Close,
            ]
        );
    }

    #[test]
    fn test_offset() {
        let mut path = Path::new();
        path.move_to(1.0, 1.0);
        path.quad_to(2.0, 2.0, 3.0, 1.0);
        path.offset(10.0, -1.0);
        assert_eq!(
            path.verbs()[1],
            PathVerb::QuadTo(Point::new(12.0, 1.0), Point::new(13.0, 0.0))
        );
    }

    #[test]
    fn test_round_rect_is_closed() {
        let mut path = Path::new();
        path.add_round_rect(Rect::new(0.0, 0.0, 20.0, 10.0), 2.0, 2.0, Direction::Ccw);
        assert_eq!(path.verbs().last(), Some(&PathVerb::Close));
        assert!(matches!(path.verbs()[0], PathVerb::MoveTo(p) if approx(p, Point::new(2.0, 0.0))));
    }
}
