// ==========================================
// 原木下料优化系统 - 数据质量校验器
// ==========================================
// 职责: 原始行 → 领域实体的取值校验 + 库存结构校验
// 红线: 负数/空组/空表一律中止,不做静默修正
// ==========================================

use crate::domain::inventory::{Board, Inventory, Log, RawBoardRecord, RawLogRecord};
use crate::importer::error::{DataError, DataResult};
use serde::{Deserialize, Serialize};

/// 数据质量提示级别（不阻断建模）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Warning, // 大概率导致不可行
    Info,    // 仅提示
}

/// 数据质量提示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqNotice {
    pub level: DqLevel,
    pub field: String,
    pub message: String,
}

pub struct DqValidator;

impl DqValidator {
    pub fn new() -> Self {
        Self
    }

    // ==========================================
    // 行级校验
    // ==========================================

    /// 原始板材行 → Board
    ///
    /// # 参数
    /// - `raw`: 字段映射后的原始行
    /// - `index`: 板材下标（输入行序）
    pub fn validate_board(&self, raw: &RawBoardRecord, index: usize) -> DataResult<Board> {
        let row = raw.row_number;

        let length = raw.length.ok_or_else(|| DataError::MissingField {
            row,
            field: "Board_Length".to_string(),
        })?;
        let length = self.check_non_negative(length, row, "Board_Length")?;
        if length <= 0.0 {
            return Err(DataError::InvalidValue {
                row,
                field: "Board_Length".to_string(),
                message: "板材长度必须大于 0".to_string(),
            });
        }

        let width = raw
            .width
            .map(|w| self.check_non_negative(w, row, "Board_Width"))
            .transpose()?;
        let thickness = raw
            .thickness
            .map(|t| self.check_non_negative(t, row, "Board_Thickness"))
            .transpose()?;

        // 缺省需求为 0
        let demand = match raw.demand {
            Some(d) => self.check_count(d, row, "Demand")?,
            None => 0,
        };

        Ok(Board {
            index,
            length,
            width,
            thickness,
            demand,
        })
    }

    /// 原始原木行 → Log
    ///
    /// # 参数
    /// - `raw`: 字段映射后的原始行
    /// - `index`: 组内下标
    pub fn validate_log(&self, raw: &RawLogRecord, index: usize) -> DataResult<Log> {
        let row = raw.row_number;

        let length = raw.length.ok_or_else(|| DataError::MissingField {
            row,
            field: "Log_Length".to_string(),
        })?;
        let length = self.check_non_negative(length, row, "Log_Length")?;

        let diameter = raw
            .diameter
            .map(|d| self.check_non_negative(d, row, "Log_Diameter"))
            .transpose()?;

        // 非分组原木表无 Quantity 列，按 1 根计
        let quantity = match raw.quantity {
            Some(q) => self.check_count(q, row, "Quantity")?,
            None => 1,
        };

        Ok(Log {
            index,
            length,
            diameter,
            quantity,
        })
    }

    // ==========================================
    // 结构校验
    // ==========================================

    /// 校验库存快照（建模前的最后一道闸）
    pub fn validate_inventory(&self, inventory: &Inventory) -> DataResult<()> {
        if inventory.boards().is_empty() {
            return Err(DataError::EmptyTable("boards".to_string()));
        }
        if inventory.log_sets().is_empty() {
            return Err(DataError::EmptyTable("logs".to_string()));
        }

        for (position, board) in inventory.boards().iter().enumerate() {
            let row = position + 1;
            if board.index != position {
                return Err(DataError::InvalidValue {
                    row,
                    field: "Board_Index".to_string(),
                    message: format!("板材下标 {} 与行序 {} 不一致", board.index, position),
                });
            }
            self.check_non_negative(board.length, row, "Board_Length")?;
            if board.length <= 0.0 {
                return Err(DataError::InvalidValue {
                    row,
                    field: "Board_Length".to_string(),
                    message: "板材长度必须大于 0".to_string(),
                });
            }
            if let Some(w) = board.width {
                self.check_non_negative(w, row, "Board_Width")?;
            }
            if let Some(t) = board.thickness {
                self.check_non_negative(t, row, "Board_Thickness")?;
            }
        }

        for set in inventory.log_sets() {
            if set.logs.is_empty() {
                return Err(DataError::EmptyLogSet(set.key.to_string()));
            }
            for (position, log) in set.logs.iter().enumerate() {
                let row = position + 1;
                if log.index != position {
                    return Err(DataError::InvalidValue {
                        row,
                        field: "Log_Index".to_string(),
                        message: format!(
                            "原木组 {} 的原木下标 {} 与组内序号 {} 不一致",
                            set.key, log.index, position
                        ),
                    });
                }
                self.check_non_negative(log.length, row, "Log_Length")?;
                if let Some(d) = log.diameter {
                    self.check_non_negative(d, row, "Log_Diameter")?;
                }
            }
        }

        Ok(())
    }

    /// 生成不阻断的提示（零需求、零库存、超长板材）
    pub fn collect_notices(&self, inventory: &Inventory) -> Vec<DqNotice> {
        let mut notices = Vec::new();

        let longest_log = inventory
            .log_sets()
            .iter()
            .flat_map(|s| s.logs.iter())
            .filter(|l| l.quantity > 0)
            .map(|l| l.length)
            .fold(0.0_f64, f64::max);

        for board in inventory.boards() {
            if board.demand > 0 && board.length > longest_log {
                notices.push(DqNotice {
                    level: DqLevel::Warning,
                    field: "Board_Length".to_string(),
                    message: format!(
                        "板材 {} 长度 {} 超过最长原木 {}，需求无法满足",
                        board.index, board.length, longest_log
                    ),
                });
            }
            if board.demand == 0 {
                notices.push(DqNotice {
                    level: DqLevel::Info,
                    field: "Demand".to_string(),
                    message: format!("板材 {} 需求为 0", board.index),
                });
            }
        }

        for set in inventory.log_sets() {
            for log in &set.logs {
                if log.quantity == 0 {
                    notices.push(DqNotice {
                        level: DqLevel::Info,
                        field: "Quantity".to_string(),
                        message: format!("原木组 {} 第 {} 类原木数量为 0", set.key, log.index),
                    });
                }
            }
        }

        notices
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn check_non_negative(&self, value: f64, row: usize, field: &str) -> DataResult<f64> {
        if !value.is_finite() {
            return Err(DataError::InvalidValue {
                row,
                field: field.to_string(),
                message: format!("非有限数值: {}", value),
            });
        }
        if value < 0.0 {
            return Err(DataError::NegativeValue {
                row,
                field: field.to_string(),
                value,
            });
        }
        Ok(value)
    }

    /// 计数字段（需求/数量）：非负整数
    fn check_count(&self, value: f64, row: usize, field: &str) -> DataResult<u32> {
        let value = self.check_non_negative(value, row, field)?;
        if value.fract() != 0.0 || value > f64::from(u32::MAX) {
            return Err(DataError::InvalidValue {
                row,
                field: field.to_string(),
                message: format!("应为非负整数: {}", value),
            });
        }
        Ok(value as u32)
    }
}

impl Default for DqValidator {
    fn default() -> Self {
        Self::new()
    }
}
