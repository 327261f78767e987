// ==========================================
// 原木下料优化系统 - 引擎层
// ==========================================
// 流程: 建模 (model_builder) → 求解 (solver) → 解释 (interpreter)
// ==========================================
// 职责: MILP 建模与结果解释,求解算法委托外部引擎
// 红线: 建模为纯函数,任何失败都以 PlanError 上抛
// ==========================================

pub mod error;
pub mod interpreter;
pub mod lp_writer;
pub mod model;
pub mod model_builder;
pub mod orchestrator;
pub mod solver;

// 重导出核心类型
pub use error::{ErrorKind, PlanError, PlanResult};
pub use interpreter::{interpret, round_count, DEFAULT_ROUNDING_TOLERANCE};
pub use lp_writer::{export_lp, write_lp};
pub use model::{
    Comparison, Constraint, ConstraintTag, CutKey, LinearExpr, MilpModel, Sense, VarId, VarKey,
    VarKind, Variable,
};
pub use model_builder::{build_model, BuildOptions};
pub use orchestrator::{CuttingPlanner, ModeComparison};
pub use solver::{GoodLpSolver, MilpSolver, SolveStatus, SolverOutcome};
