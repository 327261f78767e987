// ==========================================
// 原木下料优化系统 - 字段映射器实现
// ==========================================
// 职责: 源列 → 标准字段映射 + 类型转换
// ==========================================

use crate::domain::inventory::{RawBoardRecord, RawLogRecord};
use crate::importer::error::{DataError, DataResult};
use crate::importer::file_parser::RawRow;
use crate::importer::importer_trait::FieldMapper as FieldMapperTrait;

// ==========================================
// 标准列名
// ==========================================
pub mod columns {
    pub const BOARD_LENGTH: &str = "Board_Length";
    pub const BOARD_WIDTH: &str = "Board_Width";
    pub const BOARD_THICKNESS: &str = "Board_Thickness";
    pub const DEMAND: &str = "Demand";
    pub const SET: &str = "Set";
    pub const LOG_LENGTH: &str = "Log_Length";
    pub const LOG_DIAMETER: &str = "Log_Diameter";
    pub const QUANTITY: &str = "Quantity";
}

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_to_raw_board(&self, row: &RawRow) -> DataResult<RawBoardRecord> {
        Ok(RawBoardRecord {
            row_number: row.row_number,
            length: self.parse_f64(row, columns::BOARD_LENGTH)?,
            width: self.parse_f64(row, columns::BOARD_WIDTH)?,
            thickness: self.parse_f64(row, columns::BOARD_THICKNESS)?,
            demand: self.parse_f64(row, columns::DEMAND)?,
        })
    }

    fn map_to_raw_log(&self, row: &RawRow) -> DataResult<RawLogRecord> {
        Ok(RawLogRecord {
            row_number: row.row_number,
            set: self.get_string(row, columns::SET),
            length: self.parse_f64(row, columns::LOG_LENGTH)?,
            diameter: self.parse_f64(row, columns::LOG_DIAMETER)?,
            quantity: self.parse_f64(row, columns::QUANTITY)?,
        })
    }
}

impl FieldMapper {
    /// 列名别名表（第一个为标准名）
    pub fn aliases(key: &str) -> Vec<&str> {
        match key {
            columns::BOARD_THICKNESS => vec!["Board_Thickness", "Board_Height"],
            columns::QUANTITY => vec!["Quantity", "Log_Quantity"],
            columns::SET => vec!["Set", "Log_Set"],
            _ => vec![key],
        }
    }

    /// 提取字符串字段（空白视为缺失），支持别名
    fn get_string(&self, row: &RawRow, key: &str) -> Option<String> {
        for alias in Self::aliases(key) {
            if let Some(v) = row.values.get(alias) {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }

    /// 解析浮点数
    fn parse_f64(&self, row: &RawRow, key: &str) -> DataResult<Option<f64>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => value
                .parse::<f64>()
                .map(Some)
                .map_err(|_| DataError::TypeConversionError {
                    row: row.row_number,
                    field: key.to_string(),
                    message: format!("无法解析为数值: {}", value),
                }),
        }
    }
}
