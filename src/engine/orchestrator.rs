// ==========================================
// 原木下料优化系统 - 规划编排器
// ==========================================
// 用途: 串联 建模 → 求解 → 解释 三个阶段
// 红线: 编排器无跨次状态,同一实例可重复用于多场景
// ==========================================

use crate::config::PlannerConfig;
use crate::domain::inventory::Inventory;
use crate::domain::plan::CuttingPlan;
use crate::domain::types::ObjectiveMode;
use crate::engine::error::{ErrorKind, PlanResult};
use crate::engine::interpreter::{interpret, DEFAULT_ROUNDING_TOLERANCE};
use crate::engine::model::MilpModel;
use crate::engine::model_builder::{build_model, BuildOptions};
use crate::engine::solver::{GoodLpSolver, MilpSolver};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, instrument, warn};

// ==========================================
// ModeComparison - 多模式对比结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeComparison {
    pub mode: ObjectiveMode,
    pub plan: Option<CuttingPlan>,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub elapsed_ms: u64,
}

impl ModeComparison {
    pub fn is_success(&self) -> bool {
        self.plan.is_some()
    }
}

// ==========================================
// CuttingPlanner - 规划编排器
// ==========================================
pub struct CuttingPlanner<S>
where
    S: MilpSolver,
{
    solver: S,
    wastage_volume_cap: bool,
    rounding_tolerance: f64,
}

impl<S> CuttingPlanner<S>
where
    S: MilpSolver,
{
    /// 使用默认参数创建
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            wastage_volume_cap: true,
            rounding_tolerance: DEFAULT_ROUNDING_TOLERANCE,
        }
    }

    /// 按配置创建
    pub fn from_config(solver: S, config: &PlannerConfig) -> Self {
        Self {
            solver,
            wastage_volume_cap: config.wastage_volume_cap,
            rounding_tolerance: config.rounding_tolerance,
        }
    }

    pub fn with_wastage_volume_cap(mut self, enabled: bool) -> Self {
        self.wastage_volume_cap = enabled;
        self
    }

    pub fn with_rounding_tolerance(mut self, tolerance: f64) -> Self {
        self.rounding_tolerance = tolerance;
        self
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn build_options(&self, mode: ObjectiveMode) -> BuildOptions {
        BuildOptions::new(mode).with_wastage_volume_cap(self.wastage_volume_cap)
    }

    /// 仅建模（用于导出 LP）
    pub fn build(&self, inventory: &Inventory, mode: ObjectiveMode) -> PlanResult<MilpModel> {
        build_model(inventory, &self.build_options(mode))
    }

    /// 执行完整规划流程
    #[instrument(skip(self, inventory), fields(solver = self.solver.name()))]
    pub fn plan(&self, inventory: &Inventory, mode: ObjectiveMode) -> PlanResult<CuttingPlan> {
        let start = Instant::now();

        // 1. 建模
        let model = self.build(inventory, mode)?;

        // 2. 求解
        let outcome = self.solver.solve(&model)?;

        // 3. 解释
        let plan = interpret(&model, &outcome, inventory, self.rounding_tolerance)?;

        info!(
            selected_set = ?plan.selected_set.as_ref().map(|k| k.as_str()),
            total_boards_cut = plan.total_boards_cut,
            objective = plan.objective_value,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "规划完成"
        );
        Ok(plan)
    }

    /// 多模式对比（逐个模式独立求解）
    pub fn compare_modes(
        &self,
        inventory: &Inventory,
        modes: &[ObjectiveMode],
    ) -> Vec<ModeComparison> {
        modes
            .iter()
            .map(|&mode| {
                let start = Instant::now();
                let result = self.plan(inventory, mode);
                let elapsed_ms = start.elapsed().as_millis() as u64;

                match result {
                    Ok(plan) => ModeComparison {
                        mode,
                        plan: Some(plan),
                        error: None,
                        error_kind: None,
                        elapsed_ms,
                    },
                    Err(e) => {
                        warn!(mode = %mode, error = %e, "模式求解失败");
                        ModeComparison {
                            mode,
                            plan: None,
                            error: Some(e.to_string()),
                            error_kind: Some(e.kind()),
                            elapsed_ms,
                        }
                    }
                }
            })
            .collect()
    }
}

impl Default for CuttingPlanner<GoodLpSolver> {
    fn default() -> Self {
        Self::new(GoodLpSolver::new())
    }
}
