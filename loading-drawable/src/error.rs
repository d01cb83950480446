//! # Error 模块
//!
//! 定义 loading-drawable 中使用的错误类型。
//!
//! 核心库只有一类错误：配置错误。数值上的边界情况（空 bounds、零长度路径等）
//! 一律通过钳制/跳过处理，不会产生错误。

use thiserror::Error;

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrawableError {
    /// 未知的渲染器 id
    #[error("未知的渲染器 id {id}，有效范围是 0..{max}")]
    UnknownRenderer { id: i32, max: usize },

    /// 未知的渲染器名称
    #[error("未知的渲染器名称 '{name}'")]
    UnknownRendererName { name: String },

    /// 配置类型与渲染器不匹配
    #[error("配置类型不匹配：渲染器为 {expected}，配置为 {found}")]
    ConfigKindMismatch { expected: String, found: String },

    /// 无效的颜色字面量
    #[error("无效的颜色 '{value}'，应为 #RRGGBB 或 #AARRGGBB")]
    InvalidColor { value: String },

    /// 配置 JSON 解析失败
    #[error("配置解析失败: {message}")]
    InvalidConfig { message: String },
}

/// Result 类型别名
pub type DrawableResult<T> = Result<T, DrawableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DrawableError::UnknownRenderer { id: 42, max: 16 };
        assert_eq!(err.to_string(), "未知的渲染器 id 42，有效范围是 0..16");

        let err = DrawableError::ConfigKindMismatch {
            expected: "gear".to_string(),
            found: "swap".to_string(),
        };
        assert!(err.to_string().contains("gear"));
        assert!(err.to_string().contains("swap"));
    }
}
