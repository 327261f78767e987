// ==========================================
// 原木下料优化系统 - 领域模型层
// ==========================================
// 职责: 定义库存实体、目标模式、下料方案
// 红线: 不含文件读取逻辑,不含求解逻辑
// ==========================================

pub mod inventory;
pub mod plan;
pub mod types;

// 重导出核心类型
pub use inventory::{Board, Inventory, Log, LogSet, RawBoardRecord, RawLogRecord};
pub use plan::{CuttingPlan, DemandFulfilment, LogUsage, PlanLine, PlanReport};
pub use types::{ObjectiveMode, SetKey};
