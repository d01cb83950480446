//! # Geometry 模块
//!
//! 二维几何基础类型：点、矩形与 ARGB 颜色。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DrawableError;

/// 二维点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// 原点
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// 创建新的点
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 线性插值
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// 到另一个点的距离
    pub fn distance(self, other: Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// 轴对齐矩形
///
/// 以 left/top/right/bottom 表示，y 轴向下。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// 空矩形
    pub const ZERO: Rect = Rect {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// 从原点开始、指定尺寸的矩形
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center_x(&self) -> f32 {
        (self.left + self.right) * 0.5
    }

    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) * 0.5
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x(), self.center_y())
    }

    /// 宽或高不为正时视为空
    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// 四边同时向内收缩（负值为向外扩张）
    pub fn inset(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(
            self.left + dx,
            self.top + dy,
            self.right - dx,
            self.bottom - dy,
        )
    }

    /// 平移
    pub fn offset(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }
}

/// ARGB 颜色
///
/// 序列化为 `#AARRGGBB` 字符串；解析时也接受 `#RRGGBB`（不透明）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const RED: Color = Color(0xFFFF_0000);
    pub const GREEN: Color = Color(0xFF00_FF00);
    pub const BLUE: Color = Color(0xFF00_00FF);

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn argb(self) -> u32 {
        self.0
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// 替换 alpha 通道
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Color((self.0 & 0x00FF_FFFF) | (alpha as u32) << 24)
    }

    /// 逐通道线性插值
    ///
    /// 每个通道按 `start + (int)(fraction * (end - start))` 计算（向零截断），
    /// 结果钳制到 `0..=255`，因此 `fraction` 超出 `[0, 1]` 也不会越界。
    pub fn lerp(self, end: Color, fraction: f32) -> Color {
        let channel = |shift: u32| {
            let start = ((self.0 >> shift) & 0xFF) as i32;
            let end = ((end.0 >> shift) & 0xFF) as i32;
            let value = start + (fraction * (end - start) as f32) as i32;
            value.clamp(0, 255) as u32
        };
        Color(channel(24) << 24 | channel(16) << 16 | channel(8) << 8 | channel(0))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::TRANSPARENT
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

impl FromStr for Color {
    type Err = DrawableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DrawableError::InvalidColor {
            value: s.to_string(),
        };
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        match hex.len() {
            6 => Ok(Color(0xFF00_0000 | value)),
            8 => Ok(Color(value)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = DrawableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_inset_and_center() {
        let rect = Rect::from_size(56.0, 56.0).inset(15.5, 15.5);
        assert_eq!(rect, Rect::new(15.5, 15.5, 40.5, 40.5));
        assert_eq!(rect.center(), Point::new(28.0, 28.0));
        assert_eq!(rect.width(), 25.0);
    }

    #[test]
    fn test_rect_empty() {
        assert!(Rect::ZERO.is_empty());
        assert!(Rect::new(10.0, 0.0, 5.0, 10.0).is_empty());
        assert!(!Rect::from_size(1.0, 1.0).is_empty());
    }

    #[test]
    fn test_color_channels() {
        let color = Color(0x55FF_8000);
        assert_eq!(color.alpha(), 0x55);
        assert_eq!(color.red(), 0xFF);
        assert_eq!(color.green(), 0x80);
        assert_eq!(color.blue(), 0x00);
        assert_eq!(color.with_alpha(0xFF), Color(0xFFFF_8000));
        assert_eq!(Color::from_argb(0x55, 0xFF, 0x80, 0), color);
    }

    #[test]
    fn test_color_lerp() {
        let start = Color(0xFF00_0000);
        let end = Color(0xFFFF_FFFF);
        assert_eq!(start.lerp(end, 0.0), start);
        assert_eq!(start.lerp(end, 1.0), end);
        assert_eq!(start.lerp(end, 0.5), Color(0xFF7F_7F7F));
        // 超出范围的比例被钳制到合法通道值
        assert_eq!(start.lerp(end, -1.0), start);
    }

    #[test]
    fn test_color_parse() {
        assert_eq!("#FFBE1C23".parse::<Color>(), Ok(Color(0xFFBE_1C23)));
        assert_eq!("#21fd8e".parse::<Color>(), Ok(Color(0xFF21_FD8E)));
        assert!("21fd8e".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#GGGGGG".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_serde() {
        let json = serde_json::to_string(&Color(0xFF29_E3F2)).unwrap();
        assert_eq!(json, "\"#FF29E3F2\"");
        let color: Color = serde_json::from_str("\"#aa2369B1\"").unwrap();
        assert_eq!(color, Color(0xAA23_69B1));
    }
}
