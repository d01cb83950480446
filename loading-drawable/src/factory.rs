//! # Factory 模块
//!
//! 渲染器种类与构造表。
//!
//! 种类 id 固定为 0..16，与宿主属性中使用的整数 id 一一对应；
//! 构造通过显式的 id → 构造函数映射完成。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RendererConfig;
use crate::error::{DrawableError, DrawableResult};
use crate::renderer::{
    BalloonRenderer, CircleBroodRenderer, CollisionRenderer, CoolWaitRenderer, DanceRenderer,
    DayNightRenderer, ElectricFanRenderer, FishRenderer, GearRenderer, GhostsEyeRenderer,
    GuardRenderer, LevelRenderer, LoadingRenderer, MaterialRenderer, SwapRenderer,
    WaterBottleRenderer, WhorlRenderer,
};

/// 渲染器家族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererFamily {
    /// 圆形旋转
    CircleRotate,
    /// 圆形跳跃
    CircleJump,
    /// 风景
    Scenery,
    /// 动物
    Animal,
    /// 物品
    Goods,
    /// 变形
    ShapeChange,
}

/// 渲染器种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    Material,
    Level,
    Whorl,
    Gear,
    Swap,
    Guard,
    Dance,
    Collision,
    DayNight,
    ElectricFan,
    Fish,
    GhostsEye,
    Balloon,
    WaterBottle,
    CircleBrood,
    CoolWait,
}

type Constructor = fn() -> Box<dyn LoadingRenderer>;

fn boxed<R: LoadingRenderer + Default + 'static>() -> Box<dyn LoadingRenderer> {
    Box::new(R::default())
}

/// id → 构造函数
const CONSTRUCTORS: [(RendererKind, Constructor); 16] = [
    // circle rotate
    (RendererKind::Material, boxed::<MaterialRenderer>),
    (RendererKind::Level, boxed::<LevelRenderer>),
    (RendererKind::Whorl, boxed::<WhorlRenderer>),
    (RendererKind::Gear, boxed::<GearRenderer>),
    // circle jump
    (RendererKind::Swap, boxed::<SwapRenderer>),
    (RendererKind::Guard, boxed::<GuardRenderer>),
    (RendererKind::Dance, boxed::<DanceRenderer>),
    (RendererKind::Collision, boxed::<CollisionRenderer>),
    // scenery
    (RendererKind::DayNight, boxed::<DayNightRenderer>),
    (RendererKind::ElectricFan, boxed::<ElectricFanRenderer>),
    // animal
    (RendererKind::Fish, boxed::<FishRenderer>),
    (RendererKind::GhostsEye, boxed::<GhostsEyeRenderer>),
    // goods
    (RendererKind::Balloon, boxed::<BalloonRenderer>),
    (RendererKind::WaterBottle, boxed::<WaterBottleRenderer>),
    // shape change
    (RendererKind::CircleBrood, boxed::<CircleBroodRenderer>),
    (RendererKind::CoolWait, boxed::<CoolWaitRenderer>),
];

impl RendererKind {
    /// 按 id 排列的全部种类
    pub const ALL: [RendererKind; 16] = [
        RendererKind::Material,
        RendererKind::Level,
        RendererKind::Whorl,
        RendererKind::Gear,
        RendererKind::Swap,
        RendererKind::Guard,
        RendererKind::Dance,
        RendererKind::Collision,
        RendererKind::DayNight,
        RendererKind::ElectricFan,
        RendererKind::Fish,
        RendererKind::GhostsEye,
        RendererKind::Balloon,
        RendererKind::WaterBottle,
        RendererKind::CircleBrood,
        RendererKind::CoolWait,
    ];

    /// 整数 id
    pub fn id(self) -> i32 {
        self as i32
    }

    /// 由整数 id 查找种类
    pub fn from_id(id: i32) -> DrawableResult<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or(DrawableError::UnknownRenderer {
                id,
                max: Self::ALL.len(),
            })
    }

    /// snake_case 名称
    pub fn name(self) -> &'static str {
        match self {
            RendererKind::Material => "material",
            RendererKind::Level => "level",
            RendererKind::Whorl => "whorl",
            RendererKind::Gear => "gear",
            RendererKind::Swap => "swap",
            RendererKind::Guard => "guard",
            RendererKind::Dance => "dance",
            RendererKind::Collision => "collision",
            RendererKind::DayNight => "day_night",
            RendererKind::ElectricFan => "electric_fan",
            RendererKind::Fish => "fish",
            RendererKind::GhostsEye => "ghosts_eye",
            RendererKind::Balloon => "balloon",
            RendererKind::WaterBottle => "water_bottle",
            RendererKind::CircleBrood => "circle_brood",
            RendererKind::CoolWait => "cool_wait",
        }
    }

    pub fn family(self) -> RendererFamily {
        match self {
            RendererKind::Material
            | RendererKind::Level
            | RendererKind::Whorl
            | RendererKind::Gear => RendererFamily::CircleRotate,
            RendererKind::Swap
            | RendererKind::Guard
            | RendererKind::Dance
            | RendererKind::Collision => RendererFamily::CircleJump,
            RendererKind::DayNight | RendererKind::ElectricFan => RendererFamily::Scenery,
            RendererKind::Fish | RendererKind::GhostsEye => RendererFamily::Animal,
            RendererKind::Balloon | RendererKind::WaterBottle => RendererFamily::Goods,
            RendererKind::CircleBrood | RendererKind::CoolWait => RendererFamily::ShapeChange,
        }
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RendererKind {
    type Err = DrawableError;

    /// 接受 snake_case 名称或整数 id
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<i32>() {
            return Self::from_id(id);
        }
        let normalized = s.to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| DrawableError::UnknownRendererName {
                name: s.to_string(),
            })
    }
}

/// 以默认参数创建渲染器
pub fn create(kind: RendererKind) -> Box<dyn LoadingRenderer> {
    let (_, constructor) = CONSTRUCTORS[kind.id() as usize];
    debug!(kind = %kind, id = kind.id(), "创建渲染器");
    constructor()
}

/// 按整数 id 创建渲染器
pub fn create_by_id(id: i32) -> DrawableResult<Box<dyn LoadingRenderer>> {
    Ok(create(RendererKind::from_id(id)?))
}

/// 按配置创建渲染器
pub fn create_with(config: &RendererConfig) -> Box<dyn LoadingRenderer> {
    let mut renderer = create(config.kind());
    // 种类来自配置本身，不会失配
    if let Err(e) = renderer.configure(config) {
        tracing::warn!(error = %e, "应用配置失败");
    }
    renderer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_table_matches_ids() {
        for (index, (kind, constructor)) in CONSTRUCTORS.iter().enumerate() {
            assert_eq!(kind.id() as usize, index);
            assert_eq!(constructor().kind(), *kind);
        }
    }

    #[test]
    fn test_from_id() {
        assert_eq!(RendererKind::from_id(0), Ok(RendererKind::Material));
        assert_eq!(RendererKind::from_id(9), Ok(RendererKind::ElectricFan));
        assert_eq!(RendererKind::from_id(15), Ok(RendererKind::CoolWait));
        assert_eq!(
            RendererKind::from_id(16),
            Err(DrawableError::UnknownRenderer { id: 16, max: 16 })
        );
        assert!(RendererKind::from_id(-1).is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("day_night".parse(), Ok(RendererKind::DayNight));
        assert_eq!("Ghosts-Eye".parse(), Ok(RendererKind::GhostsEye));
        assert_eq!("12".parse(), Ok(RendererKind::Balloon));
        assert!(matches!(
            "spinner".parse::<RendererKind>(),
            Err(DrawableError::UnknownRendererName { .. })
        ));
    }

    #[test]
    fn test_names_match_serde() {
        for kind in RendererKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.name());
        }
    }

    #[test]
    fn test_families() {
        assert_eq!(RendererKind::Gear.family(), RendererFamily::CircleRotate);
        assert_eq!(RendererKind::Collision.family(), RendererFamily::CircleJump);
        assert_eq!(RendererKind::WaterBottle.family(), RendererFamily::Goods);
        assert_eq!(RendererKind::CoolWait.family(), RendererFamily::ShapeChange);
    }

    #[test]
    fn test_create_by_id_unknown() {
        assert!(create_by_id(99).is_err());
        assert_eq!(create_by_id(4).unwrap().kind(), RendererKind::Swap);
    }

    #[test]
    fn test_create_with_config() {
        let config = RendererConfig::from_json(r#"{ "kind": "swap", "duration_ms": 1000 }"#).unwrap();
        let renderer = create_with(&config);
        assert_eq!(renderer.kind(), RendererKind::Swap);
        assert_eq!(renderer.duration().as_millis(), 1000);
    }
}
