//! # Config 模块
//!
//! 渲染器配置。
//!
//! 每种渲染器都有一个字段全部可选的配置结构，[`RendererConfig`] 以 `kind` 字段
//! 区分种类，可以直接从 JSON 预设反序列化：
//!
//! ```json
//! { "kind": "gear", "duration_ms": 2000, "color": "#FFFF8800", "gear_count": 6 }
//! ```
//!
//! ## 合并规则
//!
//! - 尺寸、时长、数量：只有严格为正时才覆盖默认值
//! - 颜色：显式给出即覆盖
//! - 被拒绝的值保留默认，并记录一条警告日志

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{DrawableError, DrawableResult};
use crate::factory::RendererKind;
use crate::geometry::Color;
use crate::renderer::RendererBase;
use crate::renderer::animal::{FishConfig, GhostsEyeConfig};
use crate::renderer::circle::{
    CollisionConfig, DanceConfig, GearConfig, GuardConfig, LevelConfig, MaterialConfig,
    SwapConfig, WhorlConfig,
};
use crate::renderer::goods::{BalloonConfig, WaterBottleConfig};
use crate::renderer::scenery::{DayNightConfig, ElectricFanConfig};
use crate::renderer::shapechange::{CircleBroodConfig, CoolWaitConfig};

/// 所有渲染器共有的配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonConfig {
    /// 固有宽度
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// 固有高度
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// 单次动画时长（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
}

impl CommonConfig {
    /// 合并到渲染器公共状态
    pub(crate) fn apply_to(&self, base: &mut RendererBase) {
        merge_positive(&mut base.width, self.width, "width");
        merge_positive(&mut base.height, self.height, "height");
        merge_duration(&mut base.duration, self.duration_ms);
    }
}

/// 渲染器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RendererConfig {
    Material(MaterialConfig),
    Level(LevelConfig),
    Whorl(WhorlConfig),
    Gear(GearConfig),
    Swap(SwapConfig),
    Guard(GuardConfig),
    Dance(DanceConfig),
    Collision(CollisionConfig),
    DayNight(DayNightConfig),
    ElectricFan(ElectricFanConfig),
    Fish(FishConfig),
    GhostsEye(GhostsEyeConfig),
    Balloon(BalloonConfig),
    WaterBottle(WaterBottleConfig),
    CircleBrood(CircleBroodConfig),
    CoolWait(CoolWaitConfig),
}

impl RendererConfig {
    /// 指定种类的空配置（全部使用默认值）
    pub fn default_for(kind: RendererKind) -> Self {
        match kind {
            RendererKind::Material => Self::Material(Default::default()),
            RendererKind::Level => Self::Level(Default::default()),
            RendererKind::Whorl => Self::Whorl(Default::default()),
            RendererKind::Gear => Self::Gear(Default::default()),
            RendererKind::Swap => Self::Swap(Default::default()),
            RendererKind::Guard => Self::Guard(Default::default()),
            RendererKind::Dance => Self::Dance(Default::default()),
            RendererKind::Collision => Self::Collision(Default::default()),
            RendererKind::DayNight => Self::DayNight(Default::default()),
            RendererKind::ElectricFan => Self::ElectricFan(Default::default()),
            RendererKind::Fish => Self::Fish(Default::default()),
            RendererKind::GhostsEye => Self::GhostsEye(Default::default()),
            RendererKind::Balloon => Self::Balloon(Default::default()),
            RendererKind::WaterBottle => Self::WaterBottle(Default::default()),
            RendererKind::CircleBrood => Self::CircleBrood(Default::default()),
            RendererKind::CoolWait => Self::CoolWait(Default::default()),
        }
    }

    /// 配置对应的渲染器种类
    pub fn kind(&self) -> RendererKind {
        match self {
            Self::Material(_) => RendererKind::Material,
            Self::Level(_) => RendererKind::Level,
            Self::Whorl(_) => RendererKind::Whorl,
            Self::Gear(_) => RendererKind::Gear,
            Self::Swap(_) => RendererKind::Swap,
            Self::Guard(_) => RendererKind::Guard,
            Self::Dance(_) => RendererKind::Dance,
            Self::Collision(_) => RendererKind::Collision,
            Self::DayNight(_) => RendererKind::DayNight,
            Self::ElectricFan(_) => RendererKind::ElectricFan,
            Self::Fish(_) => RendererKind::Fish,
            Self::GhostsEye(_) => RendererKind::GhostsEye,
            Self::Balloon(_) => RendererKind::Balloon,
            Self::WaterBottle(_) => RendererKind::WaterBottle,
            Self::CircleBrood(_) => RendererKind::CircleBrood,
            Self::CoolWait(_) => RendererKind::CoolWait,
        }
    }

    /// 公共配置
    pub fn common(&self) -> &CommonConfig {
        match self {
            Self::Material(c) => &c.common,
            Self::Level(c) => &c.common,
            Self::Whorl(c) => &c.common,
            Self::Gear(c) => &c.common,
            Self::Swap(c) => &c.common,
            Self::Guard(c) => &c.common,
            Self::Dance(c) => &c.common,
            Self::Collision(c) => &c.common,
            Self::DayNight(c) => &c.common,
            Self::ElectricFan(c) => &c.common,
            Self::Fish(c) => &c.common,
            Self::GhostsEye(c) => &c.common,
            Self::Balloon(c) => &c.common,
            Self::WaterBottle(c) => &c.common,
            Self::CircleBrood(c) => &c.common,
            Self::CoolWait(c) => &c.common,
        }
    }

    /// 从 JSON 解析
    pub fn from_json(json: &str) -> DrawableResult<Self> {
        serde_json::from_str(json).map_err(|e| DrawableError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// 种类不匹配错误
    pub(crate) fn mismatch(&self, expected: RendererKind) -> DrawableError {
        DrawableError::ConfigKindMismatch {
            expected: expected.name().to_string(),
            found: self.kind().name().to_string(),
        }
    }
}

// ========== 合并辅助 ==========

/// 正数才覆盖
pub(crate) fn merge_positive(target: &mut f32, value: Option<f32>, field: &'static str) {
    if let Some(value) = value {
        if value > 0.0 {
            *target = value;
        } else {
            warn!(field, value, "配置值必须为正数，保留默认值");
        }
    }
}

/// 正整数才覆盖
pub(crate) fn merge_count(target: &mut usize, value: Option<i64>, field: &'static str) {
    if let Some(value) = value {
        if value > 0 {
            *target = value as usize;
        } else {
            warn!(field, value, "数量必须为正整数，保留默认值");
        }
    }
}

/// 显式给出即覆盖
pub(crate) fn merge_color(target: &mut Color, value: Option<Color>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// 非空颜色列表才覆盖
pub(crate) fn merge_colors(target: &mut Vec<Color>, value: Option<&Vec<Color>>, field: &'static str) {
    if let Some(value) = value {
        if value.is_empty() {
            warn!(field, "颜色列表为空，保留默认值");
        } else {
            *target = value.clone();
        }
    }
}

fn merge_duration(target: &mut Duration, value: Option<i64>) {
    if let Some(value) = value {
        if value > 0 {
            *target = Duration::from_millis(value as u64);
        } else {
            warn!(field = "duration_ms", value, "时长必须为正数，保留默认值");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_config() {
        let config = RendererConfig::from_json(
            r##"{ "kind": "gear", "duration_ms": 2000, "color": "#FFFF8800", "gear_count": 6 }"##,
        )
        .unwrap();
        assert_eq!(config.kind(), RendererKind::Gear);
        assert_eq!(config.common().duration_ms, Some(2000));
        let RendererConfig::Gear(gear) = config else {
            panic!("应为 gear 配置");
        };
        assert_eq!(gear.color, Some(Color(0xFFFF_8800)));
        assert_eq!(gear.gear_count, Some(6));
    }

    #[test]
    fn test_parse_unknown_kind() {
        let err = RendererConfig::from_json(r#"{ "kind": "spinner" }"#).unwrap_err();
        assert!(matches!(err, DrawableError::InvalidConfig { .. }));
    }

    #[test]
    fn test_parse_bad_color() {
        let err = RendererConfig::from_json(r#"{ "kind": "fish", "color": "red" }"#).unwrap_err();
        assert!(err.to_string().contains("red"));
    }

    #[test]
    fn test_default_for_round_trip_kind() {
        for kind in RendererKind::ALL {
            assert_eq!(RendererConfig::default_for(kind).kind(), kind);
        }
    }

    #[test]
    fn test_serialize_snapshot() {
        let config = RendererConfig::from_json(
            r##"{ "kind": "gear", "gear_count": 6, "color": "#ffff8800", "duration_ms": 2000 }"##,
        )
        .unwrap();
        insta::assert_json_snapshot!(config, @r###"
        {
          "kind": "gear",
          "duration_ms": 2000,
          "color": "#FFFF8800",
          "gear_count": 6
        }
        "###);
    }

    #[test]
    fn test_serialize_skips_unset() {
        let json = serde_json::to_value(RendererConfig::default_for(RendererKind::Swap)).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "swap" }));
    }

    #[test]
    fn test_common_merge_rules() {
        let mut base = RendererBase::default();
        let common = CommonConfig {
            width: Some(-1.0),
            height: Some(80.0),
            duration_ms: Some(0),
        };
        common.apply_to(&mut base);
        assert_eq!(base.width, 56.0);
        assert_eq!(base.height, 80.0);
        assert_eq!(base.duration, Duration::from_millis(1333));
    }

    #[test]
    fn test_merge_count() {
        let mut count = 5;
        merge_count(&mut count, Some(-3), "ball_count");
        assert_eq!(count, 5);
        merge_count(&mut count, Some(7), "ball_count");
        assert_eq!(count, 7);
        merge_count(&mut count, None, "ball_count");
        assert_eq!(count, 7);
    }
}
