// ==========================================
// 原木下料优化系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 数据错误必须在建模前中止
// ==========================================

use thiserror::Error;

/// 输入数据错误（文件、字段、取值、分组）
#[derive(Error, Debug)]
pub enum DataError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 数据映射错误 =====
    #[error("缺少必需列 ({table}): {column}")]
    MissingColumn { table: String, column: String },

    #[error("字段缺失 (行 {row}, 字段 {field})")]
    MissingField { row: usize, field: String },

    #[error("原木字段缺失 (组 {set}, 原木 {log_index}, 字段 {field})")]
    MissingLogGeometry {
        set: String,
        log_index: usize,
        field: String,
    },

    #[error("类型转换失败 (行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    // ===== 数据质量错误 =====
    #[error("数值为负 (行 {row}, 字段 {field}): {value}")]
    NegativeValue { row: usize, field: String, value: f64 },

    #[error("数值非法 (行 {row}, 字段 {field}): {message}")]
    InvalidValue {
        row: usize,
        field: String,
        message: String,
    },

    #[error("数据表为空: {0}")]
    EmptyTable(String),

    #[error("原木组无成员: {0}")]
    EmptyLogSet(String),

    #[error("目标模式 {mode} 不支持多个原木组（当前 {set_count} 组）")]
    SetsNotSupported { mode: String, set_count: usize },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for DataError {
    fn from(err: calamine::Error) -> Self {
        DataError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type DataResult<T> = Result<T, DataError>;
