// ==========================================
// 原木下料优化系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 数据错误 / 模型错误 / 不可行 / 不变量违反
// 红线: 任何错误都不降级为部分方案
// ==========================================

use crate::domain::types::ObjectiveMode;
use crate::importer::error::DataError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 规划流程错误
#[derive(Error, Debug)]
pub enum PlanError {
    // ===== 输入数据 =====
    #[error(transparent)]
    Data(#[from] DataError),

    // ===== 建模 / 求解 =====
    #[error("模型结构错误: {0}")]
    Model(String),

    #[error("无可行方案 (模式 {mode}): {reason}")]
    Infeasible { mode: ObjectiveMode, reason: String },

    #[error("结果不变量违反: {0}")]
    InvariantViolation(String),

    #[error("求解器错误: {0}")]
    Solver(String),

    // ===== 配置 =====
    #[error("配置错误: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type PlanResult<T> = Result<T, PlanError>;

// ==========================================
// ErrorKind - 错误分类（对外可见）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Data,               // 输入数据有误
    Model,              // 建模缺陷
    Infeasible,         // 需求无法满足
    InvariantViolation, // 建模与求解不一致
    Solver,             // 求解器故障
    Config,             // 配置有误
    Other,
}

impl ErrorKind {
    /// 命令行退出码
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorKind::Data => 2,
            ErrorKind::Infeasible => 3,
            ErrorKind::Model | ErrorKind::InvariantViolation => 4,
            ErrorKind::Solver | ErrorKind::Config | ErrorKind::Other => 1,
        }
    }

    /// 是否为系统缺陷（而非用户输入问题）
    pub fn is_internal(&self) -> bool {
        matches!(self, ErrorKind::Model | ErrorKind::InvariantViolation)
    }
}

impl PlanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlanError::Data(_) => ErrorKind::Data,
            PlanError::Model(_) => ErrorKind::Model,
            PlanError::Infeasible { .. } => ErrorKind::Infeasible,
            PlanError::InvariantViolation(_) => ErrorKind::InvariantViolation,
            PlanError::Solver(_) => ErrorKind::Solver,
            PlanError::Config(_) => ErrorKind::Config,
            PlanError::Other(_) => ErrorKind::Other,
        }
    }
}
