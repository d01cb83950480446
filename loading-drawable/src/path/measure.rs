//! # PathMeasure
//!
//! 路径弧长测量。
//!
//! 只测量路径的第一条（长度非零的）轮廓：曲线按弦误差容限展平成折线，
//! 预计算累计长度，之后按距离取点、截取子路径都是对折线的二分查找。

use tracing::trace;

use super::{Path, PathVerb};
use crate::geometry::Point;

/// 展平时允许的最大弦误差
const FLATTEN_TOLERANCE: f32 = 0.25;
/// 单段曲线最多展平成的线段数
const MAX_CURVE_SUBDIVISIONS: usize = 256;

/// 路径测量结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathMeasure {
    /// 展平后的折线顶点
    points: Vec<Point>,
    /// 每个顶点处的累计弧长，`lengths[0] == 0`
    lengths: Vec<f32>,
    closed: bool,
}

impl PathMeasure {
    /// 测量路径的第一条轮廓
    pub fn new(path: &Path) -> Self {
        let mut contour = Contour::default();
        let mut current = Point::ZERO;

        for verb in path.verbs() {
            match *verb {
                PathVerb::MoveTo(p) => {
                    if contour.has_length() {
                        break;
                    }
                    contour = Contour::starting_at(p);
                    current = p;
                }
                PathVerb::LineTo(p) => {
                    contour.push(p);
                    current = p;
                }
                PathVerb::QuadTo(c, p) => {
                    let n = subdivisions(2.0, quad_second_difference(current, c, p));
                    for i in 1..=n {
                        contour.push(quad_point(current, c, p, i as f32 / n as f32));
                    }
                    current = p;
                }
                PathVerb::CubicTo(c1, c2, p) => {
                    let n = subdivisions(3.0, second_difference(current, c1, c2, p));
                    for i in 1..=n {
                        contour.push(cubic_point(current, c1, c2, p, i as f32 / n as f32));
                    }
                    current = p;
                }
                PathVerb::Close => {
                    if let Some(&start) = contour.points.first() {
                        contour.push(start);
                        current = start;
                    }
                    if contour.has_length() {
                        contour.closed = true;
                        break;
                    }
                }
            }
        }

        if !contour.has_length() {
            return Self::default();
        }

        trace!(
            points = contour.points.len(),
            length = contour.length(),
            "路径测量完成"
        );

        Self {
            points: contour.points,
            lengths: contour.lengths,
            closed: contour.closed,
        }
    }

    /// 轮廓总长
    pub fn length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// 轮廓是否闭合（包含闭合段）
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// 指定弧长处的位置与切线角（度）
    ///
    /// 距离会被钳制到 `[0, length]`；空轮廓返回 `None`。
    pub fn pos_tan(&self, distance: f32) -> Option<(Point, f32)> {
        if self.points.len() < 2 {
            return None;
        }
        let distance = distance.clamp(0.0, self.length());
        let index = self.segment_index(distance);
        let (a, b) = (self.points[index], self.points[index + 1]);
        let (la, lb) = (self.lengths[index], self.lengths[index + 1]);
        let t = if lb > la { (distance - la) / (lb - la) } else { 0.0 };
        let tangent = (b.y - a.y).atan2(b.x - a.x).to_degrees();
        Some((a.lerp(b, t), tangent))
    }

    /// 指定弧长处的位置
    pub fn position_at(&self, distance: f32) -> Option<Point> {
        self.pos_tan(distance).map(|(point, _)| point)
    }

    /// 截取 `[start, end]` 区间的子路径，追加到 `dst`
    ///
    /// - 距离钳制到 `[0, length]`
    /// - `start > end` 时按反方向截取（从 `start` 走回 `end`）
    /// - `start == end` 时追加一段零长度线段（带圆头画笔时呈现为一个点）
    /// - `start_with_move_to == false` 时第一个点用直线连接到 `dst` 的当前位置
    ///
    /// 空轮廓返回 `false` 且不修改 `dst`。
    pub fn append_segment(
        &self,
        start: f32,
        end: f32,
        dst: &mut Path,
        start_with_move_to: bool,
    ) -> bool {
        if self.points.len() < 2 {
            return false;
        }
        let length = self.length();
        let start = start.clamp(0.0, length);
        let end = end.clamp(0.0, length);

        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        let mut points = self.points_between(lo, hi);
        if start > end {
            points.reverse();
        }

        let first = points[0];
        if start_with_move_to || dst.is_empty() {
            dst.move_to(first.x, first.y);
        } else {
            dst.line_to(first.x, first.y);
        }
        if points.len() == 1 {
            dst.line_to(first.x, first.y);
        }
        for p in &points[1..] {
            dst.line_to(p.x, p.y);
        }
        true
    }

    /// 截取子路径
    pub fn extract_segment(&self, start: f32, end: f32) -> Path {
        let mut path = Path::new();
        self.append_segment(start, end, &mut path, true);
        path
    }

    /// `[lo, hi]` 区间内的折线点（含两端插值点），`lo <= hi`
    fn points_between(&self, lo: f32, hi: f32) -> Vec<Point> {
        let first = self.point_at(lo);
        if hi <= lo {
            return vec![first];
        }
        let mut points = vec![first];
        let start_index = self.segment_index(lo) + 1;
        for i in start_index..self.points.len() {
            if self.lengths[i] >= hi {
                break;
            }
            if self.lengths[i] > lo {
                points.push(self.points[i]);
            }
        }
        points.push(self.point_at(hi));
        points
    }

    fn point_at(&self, distance: f32) -> Point {
        let index = self.segment_index(distance);
        let (la, lb) = (self.lengths[index], self.lengths[index + 1]);
        let t = if lb > la { (distance - la) / (lb - la) } else { 0.0 };
        self.points[index].lerp(self.points[index + 1], t)
    }

    /// 满足 `lengths[i] <= distance <= lengths[i + 1]` 的线段下标
    fn segment_index(&self, distance: f32) -> usize {
        let upper = self.lengths.partition_point(|&l| l < distance);
        upper.saturating_sub(1).min(self.points.len() - 2)
    }
}

/// 构建中的轮廓
#[derive(Default)]
struct Contour {
    points: Vec<Point>,
    lengths: Vec<f32>,
    closed: bool,
}

impl Contour {
    fn starting_at(p: Point) -> Self {
        Self {
            points: vec![p],
            lengths: vec![0.0],
            closed: false,
        }
    }

    /// 追加顶点，跳过零长度线段
    fn push(&mut self, p: Point) {
        let Some(&last) = self.points.last() else {
            *self = Self::starting_at(Point::ZERO);
            self.push(p);
            return;
        };
        let d = last.distance(p);
        if d > 0.0 {
            let total = self.length() + d;
            self.points.push(p);
            self.lengths.push(total);
        }
    }

    fn length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    fn has_length(&self) -> bool {
        self.length() > 0.0
    }
}

/// 二次曲线控制多边形的二阶差分
fn quad_second_difference(p0: Point, c: Point, p1: Point) -> f32 {
    (p0.x - 2.0 * c.x + p1.x).hypot(p0.y - 2.0 * c.y + p1.y)
}

/// 三次曲线控制多边形的最大二阶差分
fn second_difference(p0: Point, p1: Point, p2: Point, p3: Point) -> f32 {
    let d1 = (p0.x - 2.0 * p1.x + p2.x).hypot(p0.y - 2.0 * p1.y + p2.y);
    let d2 = (p1.x - 2.0 * p2.x + p3.x).hypot(p1.y - 2.0 * p2.y + p3.y);
    d1.max(d2)
}

/// Wang 公式：满足弦误差容限所需的分段数
fn subdivisions(degree: f32, second_difference: f32) -> usize {
    let n = (degree * (degree - 1.0) / 8.0 * second_difference / FLATTEN_TOLERANCE).sqrt();
    (n.ceil() as usize).clamp(1, MAX_CURVE_SUBDIVISIONS)
}

fn quad_point(p0: Point, c: Point, p1: Point, t: f32) -> Point {
    let mt = 1.0 - t;
    Point::new(
        mt * mt * p0.x + 2.0 * mt * t * c.x + t * t * p1.x,
        mt * mt * p0.y + 2.0 * mt * t * c.y + t * t * p1.y,
    )
}

fn cubic_point(p0: Point, c1: Point, c2: Point, p1: Point, t: f32) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * c1.x + c * c2.x + d * p1.x,
        a * p0.y + b * c1.y + c * c2.y + d * p1.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::path::Direction;

    fn approx(a: Point, b: Point, tolerance: f32) -> bool {
        a.distance(b) <= tolerance
    }

    fn first_point(path: &Path) -> Point {
        match path.verbs()[0] {
            PathVerb::MoveTo(p) => p,
            other => panic!("路径应以 move 开始: {other:?}"),
        }
    }

    fn curved_path() -> Path {
        let mut path = Path::new();
        path.move_to(10.0, 10.0);
        path.cubic_to(40.0, -20.0, 80.0, 60.0, 120.0, 20.0);
        path.quad_to(140.0, 0.0, 150.0, 40.0);
        path.line_to(150.0, 80.0);
        path
    }

    #[test]
    fn test_line_length() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.line_to(30.0, 40.0);
        let measure = PathMeasure::new(&path);
        assert!((measure.length() - 50.0).abs() < 1e-4);
        assert!(!measure.is_closed());
    }

    #[test]
    fn test_circle_length() {
        let mut path = Path::new();
        path.add_circle(0.0, 0.0, 50.0, Direction::Cw);
        let measure = PathMeasure::new(&path);
        let expected = 2.0 * std::f32::consts::PI * 50.0;
        assert!((measure.length() - expected).abs() / expected < 0.005);
        assert!(measure.is_closed());
    }

    #[test]
    fn test_closed_rect_includes_closing_segment() {
        let mut path = Path::new();
        path.add_rect(Rect::new(0.0, 0.0, 10.0, 20.0), Direction::Cw);
        let measure = PathMeasure::new(&path);
        assert!((measure.length() - 60.0).abs() < 1e-4);
        // 最后一段沿左边向上回到起点
        let (point, tangent) = measure.pos_tan(55.0).unwrap();
        assert!(approx(point, Point::new(0.0, 5.0), 1e-4));
        assert!((tangent + 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_only_first_contour_is_measured() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.move_to(5.0, 5.0);
        path.line_to(15.0, 5.0);
        path.move_to(100.0, 100.0);
        path.line_to(300.0, 100.0);
        let measure = PathMeasure::new(&path);
        assert!((measure.length() - 10.0).abs() < 1e-4);
        assert_eq!(measure.position_at(0.0), Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_empty_path() {
        let measure = PathMeasure::new(&Path::new());
        assert_eq!(measure.length(), 0.0);
        assert_eq!(measure.pos_tan(1.0), None);
        let mut dst = Path::new();
        assert!(!measure.append_segment(0.0, 1.0, &mut dst, true));
        assert!(dst.is_empty());
    }

    #[test]
    fn test_endpoints_round_trip() {
        let path = curved_path();
        let measure = PathMeasure::new(&path);
        let start = measure.position_at(0.0).unwrap();
        let end = measure.position_at(measure.length()).unwrap();
        assert!(approx(start, Point::new(10.0, 10.0), 1e-3));
        assert!(approx(end, Point::new(150.0, 80.0), 1e-3));
    }

    #[test]
    fn test_distance_is_clamped() {
        let measure = PathMeasure::new(&curved_path());
        assert_eq!(measure.position_at(-10.0), measure.position_at(0.0));
        assert_eq!(
            measure.position_at(measure.length() + 10.0),
            measure.position_at(measure.length())
        );
    }

    #[test]
    fn test_flatten_tolerance() {
        // 圆上采样点到圆心的距离应接近半径
        let mut path = Path::new();
        path.add_circle(100.0, 100.0, 80.0, Direction::Cw);
        let measure = PathMeasure::new(&path);
        for i in 0..200 {
            let d = measure.length() * i as f32 / 200.0;
            let p = measure.position_at(d).unwrap();
            let r = p.distance(Point::new(100.0, 100.0));
            assert!((r - 80.0).abs() <= 0.5, "r = {r}");
        }
    }

    #[test]
    fn test_segments_concatenate_to_full_path() {
        let path = curved_path();
        let measure = PathMeasure::new(&path);
        let length = measure.length();

        for t in [0.0, 0.1, 0.37, 0.5, 0.92, 1.0] {
            let split = length * t;
            let head = measure.extract_segment(0.0, split);
            let tail = measure.extract_segment(split, length);

            assert!(approx(first_point(&head), Point::new(10.0, 10.0), 1e-3));
            assert!(approx(
                tail.last_point().unwrap(),
                Point::new(150.0, 80.0),
                1e-3
            ));
            // 接缝处两段首尾相接
            assert!(approx(head.last_point().unwrap(), first_point(&tail), 1e-3));
        }
    }

    #[test]
    fn test_segment_length_matches_request() {
        let measure = PathMeasure::new(&curved_path());
        let segment = measure.extract_segment(20.0, 90.0);
        let sub = PathMeasure::new(&segment);
        assert!((sub.length() - 70.0).abs() < 0.01);
    }

    #[test]
    fn test_reversed_segment() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.line_to(100.0, 0.0);
        let measure = PathMeasure::new(&path);
        let segment = measure.extract_segment(80.0, 20.0);
        assert_eq!(first_point(&segment), Point::new(80.0, 0.0));
        assert_eq!(segment.last_point(), Some(Point::new(20.0, 0.0)));
    }

    #[test]
    fn test_zero_length_segment_is_a_dot() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.line_to(100.0, 0.0);
        let measure = PathMeasure::new(&path);
        let segment = measure.extract_segment(40.0, 40.0);
        assert_eq!(
            segment.verbs(),
            &[
                PathVerb::MoveTo(Point::new(40.0, 0.0)),
                PathVerb::LineTo(Point::new(40.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_append_without_move_connects() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.line_to(100.0, 0.0);
        let measure = PathMeasure::new(&path);

        let mut dst = Path::new();
        dst.move_to(0.0, 50.0);
        measure.append_segment(10.0, 20.0, &mut dst, false);
        assert_eq!(dst.verbs()[1], PathVerb::LineTo(Point::new(10.0, 0.0)));
    }
}
