// ==========================================
// 原木下料优化系统 - 导入管道 Trait
// ==========================================
// 职责: 定义导入各阶段接口（不包含实现）
// ==========================================

use crate::domain::inventory::{Inventory, RawBoardRecord, RawLogRecord};
use crate::importer::error::DataResult;
use crate::importer::file_parser::{RawRow, RawTable};
use std::path::Path;

// ==========================================
// InventoryImporter Trait
// ==========================================
// 用途: 库存导入主接口
// 实现者: InventoryImporterImpl
pub trait InventoryImporter {
    /// 导入板材表 + 非分组原木表（Log_Length）
    ///
    /// # 返回
    /// - Ok(Inventory): 隐式单组库存
    /// - Err(DataError): 文件/字段/取值错误
    fn import_with_logs(&self, boards_path: &Path, logs_path: &Path) -> DataResult<Inventory>;

    /// 导入板材表 + 原木组表（Set, Log_Length, [Log_Diameter], Quantity）
    fn import_with_log_sets(
        &self,
        boards_path: &Path,
        log_sets_path: &Path,
    ) -> DataResult<Inventory>;

    /// 根据原木表是否含 Set 列自动选择
    fn import_auto(&self, boards_path: &Path, logs_path: &Path) -> DataResult<Inventory>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser {
    /// 解析文件为原始表格（表头 + 行记录）
    fn parse_to_table(&self, file_path: &Path) -> DataResult<RawTable>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 字段映射接口（阶段 1）
// 实现者: FieldMapper
pub trait FieldMapper {
    /// 原始行 → 板材原始记录
    fn map_to_raw_board(&self, row: &RawRow) -> DataResult<RawBoardRecord>;

    /// 原始行 → 原木原始记录
    fn map_to_raw_log(&self, row: &RawRow) -> DataResult<RawLogRecord>;
}
