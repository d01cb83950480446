//! 画笔

use serde::{Deserialize, Serialize};

use crate::geometry::Color;

/// 填充方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    #[default]
    Fill,
    Stroke,
    FillAndStroke,
}

/// 线帽
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cap {
    #[default]
    Butt,
    Round,
    Square,
}

/// 拐角
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Join {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// 着色器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shader {
    /// 线性渐变，超出端点时取端点颜色
    LinearGradient {
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        colors: Vec<Color>,
        positions: Vec<f32>,
    },
}

/// 路径效果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathEffect {
    /// 虚线：`intervals` 交替为实线/空白长度
    Dash { intervals: Vec<f32>, phase: f32 },
}

/// 颜色滤镜
///
/// 宿主设置后由渲染器原样带到画笔上，由宿主解释。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFilter {
    /// 用指定颜色替换源颜色（保留源 alpha）
    Tint(Color),
}

/// 画笔
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    pub color: Color,
    pub style: Style,
    pub stroke_width: f32,
    pub cap: Cap,
    pub join: Join,
    pub text_size: f32,
    pub anti_alias: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shader: Option<Shader>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_effect: Option<PathEffect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_filter: Option<ColorFilter>,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            style: Style::Fill,
            stroke_width: 0.0,
            cap: Cap::Butt,
            join: Join::Miter,
            text_size: 12.0,
            anti_alias: true,
            shader: None,
            path_effect: None,
            color_filter: None,
        }
    }
}

impl Paint {
    pub fn new() -> Self {
        Self::default()
    }

    /// 填充画笔
    pub fn fill(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// 描边画笔
    pub fn stroke(color: Color, width: f32) -> Self {
        Self {
            color,
            style: Style::Stroke,
            stroke_width: width,
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_cap(mut self, cap: Cap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: Join) -> Self {
        self.join = join;
        self
    }

    pub fn with_text_size(mut self, text_size: f32) -> Self {
        self.text_size = text_size;
        self
    }

    pub fn with_shader(mut self, shader: Option<Shader>) -> Self {
        self.shader = shader;
        self
    }

    pub fn with_path_effect(mut self, effect: Option<PathEffect>) -> Self {
        self.path_effect = effect;
        self
    }

    pub fn with_color_filter(mut self, filter: Option<ColorFilter>) -> Self {
        self.color_filter = filter;
        self
    }

    pub fn alpha(&self) -> u8 {
        self.color.alpha()
    }

    pub fn set_alpha(&mut self, alpha: u8) {
        self.color = self.color.with_alpha(alpha);
    }

    /// 设置 alpha，按 `0..=255` 钳制
    pub fn with_alpha(mut self, alpha: i32) -> Self {
        self.set_alpha(alpha.clamp(0, 255) as u8);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_paint() {
        let paint = Paint::stroke(Color::WHITE, 2.5).with_cap(Cap::Round);
        assert_eq!(paint.style, Style::Stroke);
        assert_eq!(paint.stroke_width, 2.5);
        assert_eq!(paint.cap, Cap::Round);
    }

    #[test]
    fn test_alpha_is_clamped() {
        let paint = Paint::fill(Color::RED).with_alpha(300);
        assert_eq!(paint.alpha(), 255);
        let paint = Paint::fill(Color::RED).with_alpha(-20);
        assert_eq!(paint.alpha(), 0);
        assert_eq!(paint.color, Color(0x00FF_0000));
    }
}
