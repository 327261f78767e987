// ==========================================
// 原木下料优化系统 - 库存领域模型
// ==========================================
// 职责: 板材需求、原木、原木组的只读快照
// 红线: 加载后不可变,下标即输入行序
// ==========================================

use crate::domain::types::{ObjectiveMode, SetKey};
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::{DataError, DataResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

// ==========================================
// Board - 板材需求行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub index: usize,              // 输入行序（0 起）
    pub length: f64,               // 长度
    pub width: Option<f64>,        // 宽度（体积模式必填）
    pub thickness: Option<f64>,    // 厚度/高度（体积模式必填）
    pub demand: u32,               // 最低需求数量
}

impl Board {
    /// 仅长度的板材（一维模式）
    pub fn new(index: usize, length: f64, demand: u32) -> Self {
        Self {
            index,
            length,
            width: None,
            thickness: None,
            demand,
        }
    }

    /// 带截面的板材（体积模式）
    pub fn with_section(mut self, width: f64, thickness: f64) -> Self {
        self.width = Some(width);
        self.thickness = Some(thickness);
        self
    }

    /// 板材体积 = 长 × 宽 × 厚
    pub fn volume(&self) -> Option<f64> {
        match (self.width, self.thickness) {
            (Some(w), Some(t)) => Some(self.length * w * t),
            _ => None,
        }
    }
}

// ==========================================
// Log - 原木类
// ==========================================
// 一条记录代表 quantity 根可互换的原木
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Log {
    pub index: usize,              // 组内行序（0 起）
    pub length: f64,               // 长度
    pub diameter: Option<f64>,     // 直径（体积模式必填）
    pub quantity: u32,             // 可用根数
}

impl Log {
    pub fn new(index: usize, length: f64, quantity: u32) -> Self {
        Self {
            index,
            length,
            diameter: None,
            quantity,
        }
    }

    pub fn with_diameter(mut self, diameter: f64) -> Self {
        self.diameter = Some(diameter);
        self
    }

    /// 单根圆柱体积 = π·(d/2)²·L
    pub fn cylinder_volume(&self) -> Option<f64> {
        self.diameter.map(|d| PI * (d / 2.0).powi(2) * self.length)
    }

    /// 该类原木总长度
    pub fn total_length(&self) -> f64 {
        self.length * f64::from(self.quantity)
    }

    /// 该类原木总体积
    pub fn total_volume(&self) -> Option<f64> {
        self.cylinder_volume().map(|v| v * f64::from(self.quantity))
    }

    /// 原木描述（用于方案输出）
    pub fn descriptor(&self) -> String {
        match self.diameter {
            Some(d) => format!("长度 {} / 直径 {}", self.length, d),
            None => format!("长度 {}", self.length),
        }
    }
}

// ==========================================
// LogSet - 原木组（互斥的备选货源）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSet {
    pub key: SetKey,
    pub logs: Vec<Log>,
}

impl LogSet {
    pub fn new(key: SetKey, logs: Vec<Log>) -> Self {
        Self { key, logs }
    }

    /// 组内原木总体积（缺直径时为 None）
    pub fn total_volume(&self) -> Option<f64> {
        self.logs.iter().map(Log::total_volume).sum()
    }

    /// 组内原木总长度
    pub fn total_length(&self) -> f64 {
        self.logs.iter().map(Log::total_length).sum()
    }
}

// ==========================================
// Inventory - 建模输入快照
// ==========================================
// log_sets 的顺序即建模时的组枚举顺序（选择变量与约束共用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    boards: Vec<Board>,
    log_sets: Vec<LogSet>,
    grouped: bool,
}

impl Inventory {
    /// 构造分组库存（带校验）
    pub fn new(boards: Vec<Board>, log_sets: Vec<LogSet>) -> DataResult<Self> {
        let inventory = Self {
            boards,
            log_sets,
            grouped: true,
        };
        DqValidator::new().validate_inventory(&inventory)?;
        Ok(inventory)
    }

    /// 构造非分组库存（隐式单组）
    pub fn single_set(boards: Vec<Board>, logs: Vec<Log>) -> DataResult<Self> {
        let inventory = Self {
            boards,
            log_sets: vec![LogSet::new(SetKey::implicit(), logs)],
            grouped: false,
        };
        DqValidator::new().validate_inventory(&inventory)?;
        Ok(inventory)
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn log_sets(&self) -> &[LogSet] {
        &self.log_sets
    }

    /// 是否来自带 Set 列的输入
    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    /// 按键查找原木组下标
    pub fn set_index(&self, key: &SetKey) -> Option<usize> {
        self.log_sets.iter().position(|s| &s.key == key)
    }

    /// 全部原木类数量（跨组）
    pub fn log_count(&self) -> usize {
        self.log_sets.iter().map(|s| s.logs.len()).sum()
    }

    /// 检查目标模式所需的几何字段
    ///
    /// 体积模式要求每块板材有宽/厚、每类原木有直径
    pub fn require_geometry(&self, mode: ObjectiveMode) -> DataResult<()> {
        if !mode.requires_volume_geometry() {
            return Ok(());
        }

        for board in &self.boards {
            if board.width.is_none() {
                return Err(DataError::MissingField {
                    row: board.index + 1,
                    field: "Board_Width".to_string(),
                });
            }
            if board.thickness.is_none() {
                return Err(DataError::MissingField {
                    row: board.index + 1,
                    field: "Board_Thickness".to_string(),
                });
            }
        }

        for set in &self.log_sets {
            for log in &set.logs {
                if log.diameter.is_none() {
                    return Err(DataError::MissingLogGeometry {
                        set: set.key.to_string(),
                        log_index: log.index,
                        field: "Log_Diameter".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

// ==========================================
// 原始行记录（字段映射输出，校验前）
// ==========================================
// 用途: 导入层中间结构,数值均为可选,由 DqValidator 转为领域实体
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBoardRecord {
    pub row_number: usize,         // 数据行号（1 起）
    pub length: Option<f64>,       // Board_Length
    pub width: Option<f64>,        // Board_Width
    pub thickness: Option<f64>,    // Board_Thickness / Board_Height
    pub demand: Option<f64>,       // Demand
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLogRecord {
    pub row_number: usize,         // 数据行号（1 起）
    pub set: Option<String>,       // Set
    pub length: Option<f64>,       // Log_Length
    pub diameter: Option<f64>,     // Log_Diameter
    pub quantity: Option<f64>,     // Quantity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_volume() {
        let board = Board::new(0, 10.0, 1);
        assert_eq!(board.volume(), None);

        let board = board.with_section(2.0, 0.5);
        assert_eq!(board.volume(), Some(10.0));
    }

    #[test]
    fn test_log_cylinder_volume() {
        let log = Log::new(0, 10.0, 3).with_diameter(2.0);
        let expected = PI * 10.0;
        assert!((log.cylinder_volume().unwrap() - expected).abs() < 1e-9);
        assert!((log.total_volume().unwrap() - 3.0 * expected).abs() < 1e-9);
        assert_eq!(log.total_length(), 30.0);
    }

    #[test]
    fn test_single_set_uses_implicit_key() {
        let inventory =
            Inventory::single_set(vec![Board::new(0, 10.0, 2)], vec![Log::new(0, 25.0, 1)])
                .unwrap();

        assert!(!inventory.is_grouped());
        assert_eq!(inventory.log_sets().len(), 1);
        assert_eq!(inventory.log_sets()[0].key, SetKey::implicit());
        assert_eq!(inventory.set_index(&SetKey::implicit()), Some(0));
    }

    #[test]
    fn test_empty_set_rejected() {
        let result = Inventory::new(
            vec![Board::new(0, 10.0, 1)],
            vec![LogSet::new(SetKey::new("A"), vec![])],
        );
        assert!(matches!(result, Err(DataError::EmptyLogSet(key)) if key == "A"));
    }

    #[test]
    fn test_require_geometry() {
        let inventory = Inventory::new(
            vec![Board::new(0, 10.0, 1)],
            vec![LogSet::new(SetKey::new("A"), vec![Log::new(0, 20.0, 1)])],
        )
        .unwrap();

        assert!(inventory
            .require_geometry(ObjectiveMode::MaximizeCountWithSelection)
            .is_ok());
        assert!(matches!(
            inventory.require_geometry(ObjectiveMode::MaximizeCountWithVolume),
            Err(DataError::MissingField { field, .. }) if field == "Board_Width"
        ));
    }

    #[test]
    fn test_set_total_volume_requires_diameters() {
        let set = LogSet::new(
            SetKey::new("A"),
            vec![
                Log::new(0, 10.0, 1).with_diameter(2.0),
                Log::new(1, 10.0, 1),
            ],
        );
        assert_eq!(set.total_volume(), None);
        assert_eq!(set.total_length(), 20.0);
    }
}
