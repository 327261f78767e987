// ==========================================
// 原木下料优化系统 - 核心库
// ==========================================
// 问题: 板材下料 (cutting stock) 混合整数规划
// 技术栈: Rust + good_lp (microlp)
// 流程: 库存导入 → 建模 → 求解 → 方案解释 → 输出
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 外部数据
pub mod importer;

// 引擎层 - 建模 / 求解 / 解释
pub mod engine;

// 配置层 - 规划参数
pub mod config;

// 输出层 - 文本 / JSON
pub mod report;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ObjectiveMode, SetKey};

// 领域实体
pub use domain::{
    Board, CuttingPlan, DemandFulfilment, Inventory, Log, LogSet, LogUsage, PlanLine, PlanReport,
};

// 导入
pub use importer::{DataError, InventoryImporter, InventoryImporterImpl};

// 引擎
pub use engine::{
    build_model, interpret, BuildOptions, CuttingPlanner, ErrorKind, GoodLpSolver, MilpModel,
    MilpSolver, ModeComparison, PlanError, SolveStatus, SolverOutcome,
};

// 配置
pub use config::{OutputFormat, PlannerConfig};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "原木下料优化系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
