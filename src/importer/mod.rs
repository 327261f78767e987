// ==========================================
// 原木下料优化系统 - 导入层
// ==========================================
// 职责: 外部表格 → 库存快照（Inventory）
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod inventory_importer;

// 重导出核心类型
pub use dq_validator::{DqLevel, DqNotice, DqValidator};
pub use error::{DataError, DataResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, RawRow, RawTable, UniversalFileParser};
pub use inventory_importer::InventoryImporterImpl;

// 重导出 Trait 接口
pub use importer_trait::{FieldMapper, FileParser, InventoryImporter};
