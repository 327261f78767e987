// ==========================================
// 原木下料优化系统 - 领域类型定义
// ==========================================
// 职责: 目标模式、原木组键等基础类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 目标模式 (Objective Mode)
// ==========================================
// 序列化格式: kebab-case (与命令行/配置文件一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectiveMode {
    MaximizeCount,                // 最大化出板数（无原木组选择）
    MaximizeCountWithSelection,   // 最大化出板数 + 原木组单选
    MaximizeCountWithVolume,      // 最大化出板数 + 原木组单选 + 体积约束
    MinimizeWastageWithSelection, // 最小化材积损耗 + 原木组单选
}

impl ObjectiveMode {
    /// 全部模式（用于多模式对比）
    pub const ALL: [ObjectiveMode; 4] = [
        ObjectiveMode::MaximizeCount,
        ObjectiveMode::MaximizeCountWithSelection,
        ObjectiveMode::MaximizeCountWithVolume,
        ObjectiveMode::MinimizeWastageWithSelection,
    ];

    /// 是否带原木组选择变量
    pub fn uses_selection(&self) -> bool {
        !matches!(self, ObjectiveMode::MaximizeCount)
    }

    /// 是否需要板材截面与原木直径
    pub fn requires_volume_geometry(&self) -> bool {
        matches!(
            self,
            ObjectiveMode::MaximizeCountWithVolume | ObjectiveMode::MinimizeWastageWithSelection
        )
    }

    /// 是否为最小化模式
    pub fn is_minimization(&self) -> bool {
        matches!(self, ObjectiveMode::MinimizeWastageWithSelection)
    }

    /// 模式名称（kebab-case）
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectiveMode::MaximizeCount => "maximize-count",
            ObjectiveMode::MaximizeCountWithSelection => "maximize-count-with-selection",
            ObjectiveMode::MaximizeCountWithVolume => "maximize-count-with-volume",
            ObjectiveMode::MinimizeWastageWithSelection => "minimize-wastage-with-selection",
        }
    }
}

impl fmt::Display for ObjectiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ObjectiveMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 兼容下划线写法
        let normalized = s.trim().to_lowercase().replace('_', "-");
        ObjectiveMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "未知目标模式: {}（可选: {}）",
                    s,
                    ObjectiveMode::ALL
                        .iter()
                        .map(|m| m.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

// ==========================================
// 原木组键 (Set Key)
// ==========================================
// 用途: 输入表 Set 列的取值，非分组输入使用隐式组 "default"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetKey(String);

impl SetKey {
    /// 隐式组键
    pub const IMPLICIT: &'static str = "default";

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// 非分组输入的隐式组
    pub fn implicit() -> Self {
        Self(Self::IMPLICIT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trip_names() {
        for mode in ObjectiveMode::ALL {
            assert_eq!(mode.as_str().parse::<ObjectiveMode>().unwrap(), mode);
        }
        assert_eq!(
            "MINIMIZE_WASTAGE_WITH_SELECTION".parse::<ObjectiveMode>().unwrap(),
            ObjectiveMode::MinimizeWastageWithSelection
        );
        assert!("maximize".parse::<ObjectiveMode>().is_err());
    }

    #[test]
    fn test_mode_capabilities() {
        assert!(!ObjectiveMode::MaximizeCount.uses_selection());
        assert!(ObjectiveMode::MaximizeCountWithSelection.uses_selection());
        assert!(!ObjectiveMode::MaximizeCountWithSelection.requires_volume_geometry());
        assert!(ObjectiveMode::MaximizeCountWithVolume.requires_volume_geometry());
        assert!(ObjectiveMode::MinimizeWastageWithSelection.is_minimization());
        assert!(!ObjectiveMode::MaximizeCountWithVolume.is_minimization());
    }

    #[test]
    fn test_mode_serde_kebab_case() {
        let json = serde_json::to_string(&ObjectiveMode::MaximizeCountWithVolume).unwrap();
        assert_eq!(json, "\"maximize-count-with-volume\"");
    }
}
