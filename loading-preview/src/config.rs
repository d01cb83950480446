//! # Config 模块
//!
//! 预览工具的宿主配置。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (preview.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 输出格式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 完整的帧列表（JSON）
    #[default]
    Json,
    /// 每帧一行摘要
    Summary,
}

/// 预览配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreviewConfig {
    /// 模拟帧率
    #[serde(default = "default_fps")]
    pub fps: f32,

    /// 渲染帧数
    #[serde(default = "default_frames")]
    pub frames: usize,

    /// 绘制区域宽度，缺省时使用渲染器的固有宽度
    #[serde(default)]
    pub width: Option<f32>,

    /// 绘制区域高度，缺省时使用渲染器的固有高度
    #[serde(default)]
    pub height: Option<f32>,

    /// 输出格式
    #[serde(default)]
    pub output: OutputFormat,
}

/// 允许的最低帧率
pub const MIN_FPS: f32 = 1e-3;

fn default_fps() -> f32 {
    60.0
}

fn default_frames() -> usize {
    60
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            frames: default_frames(),
            width: None,
            height: None,
            output: OutputFormat::default(),
        }
    }
}

impl PreviewConfig {
    /// 加载配置文件
    ///
    /// 文件不存在或解析失败时返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match Self::from_json(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.fps >= MIN_FPS) || !self.fps.is_finite() {
            anyhow::bail!("帧率必须不低于 {MIN_FPS}，当前为 {}", self.fps);
        }
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if let Some(v) = value {
                if !(v > 0.0) {
                    anyhow::bail!("{name} 必须为正数，当前为 {v}");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PreviewConfig::default();
        assert_eq!(config.fps, 60.0);
        assert_eq!(config.frames, 60);
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PreviewConfig::from_json(r#"{"frames": 10, "output": "summary"}"#).unwrap();
        assert_eq!(config.frames, 10);
        assert_eq!(config.fps, 60.0);
        assert_eq!(config.output, OutputFormat::Summary);
        assert!(config.width.is_none());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = PreviewConfig::load("definitely/not/here/preview.json");
        assert_eq!(config, PreviewConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = PreviewConfig {
            fps: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PreviewConfig {
            fps: 1e-30,
            frames: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PreviewConfig {
            fps: f32::INFINITY,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PreviewConfig {
            width: Some(-1.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
