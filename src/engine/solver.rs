// ==========================================
// 原木下料优化系统 - 求解器适配层
// ==========================================
// 职责: MilpModel → 外部 MILP 引擎 → 变量取值与状态
// 后端: good_lp + microlp（纯 Rust）
// 红线: 非 Optimal 状态不携带取值,由解释器转为错误
// ==========================================

use crate::engine::error::{PlanError, PlanResult};
use crate::engine::model::{Comparison, LinearExpr, MilpModel, Sense, VarKind};
use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable as LpVariable,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

// ==========================================
// 求解状态与结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverOutcome {
    pub status: SolveStatus,
    pub objective: Option<f64>,
    /// 按 VarId 下标排列
    pub values: Vec<f64>,
}

impl SolverOutcome {
    pub fn optimal(objective: f64, values: Vec<f64>) -> Self {
        Self {
            status: SolveStatus::Optimal,
            objective: Some(objective),
            values,
        }
    }

    /// 无解状态（不带取值）
    pub fn without_solution(status: SolveStatus) -> Self {
        Self {
            status,
            objective: None,
            values: Vec::new(),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }
}

// ==========================================
// MilpSolver Trait
// ==========================================
pub trait MilpSolver {
    /// 后端名称
    fn name(&self) -> &str;

    /// 求解模型
    ///
    /// 不可行/无界以状态返回,后端故障以 `PlanError::Solver` 返回
    fn solve(&self, model: &MilpModel) -> PlanResult<SolverOutcome>;
}

// ==========================================
// GoodLpSolver - good_lp 后端
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct GoodLpSolver;

impl GoodLpSolver {
    pub fn new() -> Self {
        Self
    }

    fn to_expression(expr: &LinearExpr, vars: &[LpVariable]) -> PlanResult<Expression> {
        let mut result = Expression::from(expr.constant);
        for (id, coef) in &expr.terms {
            let var = vars
                .get(id.index())
                .ok_or_else(|| PlanError::Model(format!("未声明变量 #{}", id.index())))?;
            result += *coef * *var;
        }
        Ok(result)
    }
}

impl MilpSolver for GoodLpSolver {
    fn name(&self) -> &str {
        "good_lp/microlp"
    }

    #[instrument(skip(self, model), fields(mode = %model.mode(), variables = model.variables().len()))]
    fn solve(&self, model: &MilpModel) -> PlanResult<SolverOutcome> {
        let start = Instant::now();

        let mut problem_vars = ProblemVariables::new();
        let vars: Vec<LpVariable> = model
            .variables()
            .iter()
            .map(|v| {
                let mut def = variable().min(v.lower);
                if let Some(upper) = v.upper {
                    def = def.max(upper);
                }
                let def = match v.kind {
                    VarKind::Continuous => def,
                    VarKind::Integer => def.integer(),
                    VarKind::Binary => def.binary(),
                };
                problem_vars.add(def)
            })
            .collect();

        let objective = Self::to_expression(model.objective(), &vars)?;
        let unsolved = match model.sense() {
            Sense::Maximize => problem_vars.maximise(objective),
            Sense::Minimize => problem_vars.minimise(objective),
        };

        let mut problem = unsolved.using(microlp);
        for c in model.constraints() {
            let lhs = Self::to_expression(&c.expr, &vars)?;
            problem = problem.with(match c.cmp {
                Comparison::LessEq => constraint::leq(lhs, c.rhs),
                Comparison::GreaterEq => constraint::geq(lhs, c.rhs),
                Comparison::Equal => constraint::eq(lhs, c.rhs),
            });
        }

        let outcome = match problem.solve() {
            Ok(solution) => {
                let values: Vec<f64> = vars.iter().map(|v| solution.value(*v)).collect();
                let objective = model.objective().evaluate(&values);
                SolverOutcome::optimal(objective, values)
            }
            Err(ResolutionError::Infeasible) => {
                SolverOutcome::without_solution(SolveStatus::Infeasible)
            }
            Err(ResolutionError::Unbounded) => {
                SolverOutcome::without_solution(SolveStatus::Unbounded)
            }
            Err(e) => {
                warn!(error = %e, "求解器异常");
                return Err(PlanError::Solver(e.to_string()));
            }
        };

        info!(
            status = ?outcome.status,
            objective = ?outcome.objective,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "求解完成"
        );
        debug!(constraints = model.constraints().len(), "求解模型规模");
        Ok(outcome)
    }
}
