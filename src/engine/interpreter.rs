// ==========================================
// 原木下料优化系统 - 方案解释器
// ==========================================
// 职责: 求解取值 + 库存快照 → 下料方案
// 步骤: 状态检查 → 选中组 → 取整 → 方案行 → 汇总
// 红线: 只在容差内取整,超出容差即判为不变量违反
// ==========================================

use crate::domain::inventory::{Inventory, LogSet};
use crate::domain::plan::{CuttingPlan, DemandFulfilment, LogUsage, PlanLine};
use crate::engine::error::{PlanError, PlanResult};
use crate::engine::model::{MilpModel, VarKey};
use crate::engine::solver::{SolveStatus, SolverOutcome};
use tracing::{debug, instrument, warn};

/// 默认取整容差
pub const DEFAULT_ROUNDING_TOLERANCE: f64 = 1e-6;

/// 解释求解结果
///
/// # 错误
/// - 非 Optimal 状态: Infeasible / Model / Solver
/// - 取值非整数、计数为负、选中组数 ≠ 1、未选中组有切割、需求或容量不满足: InvariantViolation
#[instrument(skip_all, fields(mode = %model.mode(), status = ?outcome.status))]
pub fn interpret(
    model: &MilpModel,
    outcome: &SolverOutcome,
    inventory: &Inventory,
    tolerance: f64,
) -> PlanResult<CuttingPlan> {
    let mode = model.mode();
    match outcome.status {
        SolveStatus::Optimal => {}
        SolveStatus::Infeasible => {
            return Err(PlanError::Infeasible {
                mode,
                reason: "没有任何切割组合能在原木容量内满足全部需求".to_string(),
            })
        }
        SolveStatus::Unbounded => {
            return Err(PlanError::Model("求解器报告目标无界".to_string()))
        }
        SolveStatus::TimedOut => {
            return Err(PlanError::Solver("求解超时，未得到最优解".to_string()))
        }
    }

    if outcome.values.len() != model.variables().len() {
        return Err(PlanError::InvariantViolation(format!(
            "取值数量 {} 与变量数量 {} 不一致",
            outcome.values.len(),
            model.variables().len()
        )));
    }

    let active_set = selected_set_index(model, outcome, tolerance)?;
    let set = inventory.log_sets().get(active_set).ok_or_else(|| {
        PlanError::InvariantViolation(format!("选中组下标越界: {}", active_set))
    })?;

    let lines = collect_lines(model, outcome, inventory, active_set, tolerance)?;
    let total_boards_cut: u64 = lines.iter().map(|l| l.count).sum();
    let fulfilment = demand_fulfilment(inventory, &lines)?;
    let log_usage = log_usage(set, &lines, tolerance)?;

    let total_wastage = if mode.requires_volume_geometry() {
        Some(wastage(set, inventory, &lines)?)
    } else {
        None
    };

    let objective_value = outcome
        .objective
        .unwrap_or_else(|| model.objective().evaluate(&outcome.values));

    debug!(
        lines = lines.len(),
        total_boards_cut,
        wastage = ?total_wastage,
        "方案解释完成"
    );

    Ok(CuttingPlan {
        mode,
        selected_set: mode.uses_selection().then(|| set.key.clone()),
        lines,
        total_boards_cut,
        total_wastage,
        objective_value,
        fulfilment,
        log_usage,
    })
}

// ==========================================
// 取整
// ==========================================

/// 浮点取值 → 非负整数
///
/// |v − round(v)| > tol 或 round(v) < 0 → InvariantViolation
pub fn round_count(value: f64, tolerance: f64, label: &str) -> PlanResult<u64> {
    let nearest = value.round();
    if !value.is_finite() || (value - nearest).abs() > tolerance {
        return Err(PlanError::InvariantViolation(format!(
            "{} 取值 {} 不是整数",
            label, value
        )));
    }
    if nearest < 0.0 {
        return Err(PlanError::InvariantViolation(format!(
            "{} 取值 {} 为负",
            label, value
        )));
    }
    Ok(nearest as u64)
}

// ==========================================
// 阶段实现
// ==========================================

/// 选中组下标（非选择模式固定为 0）
fn selected_set_index(
    model: &MilpModel,
    outcome: &SolverOutcome,
    tolerance: f64,
) -> PlanResult<usize> {
    if !model.mode().uses_selection() {
        return Ok(0);
    }

    let mut selected = Vec::new();
    for (set, var) in model.select_vars() {
        let label = VarKey::Select(set).to_string();
        match round_count(outcome.values[var.index()], tolerance, &label)? {
            0 => {}
            1 => selected.push(set),
            other => {
                return Err(PlanError::InvariantViolation(format!(
                    "{} 取值 {} 超出 0-1 范围",
                    label, other
                )))
            }
        }
    }

    match selected.as_slice() {
        [set] => Ok(*set),
        _ => Err(PlanError::InvariantViolation(format!(
            "选中原木组数量为 {}，应恰为 1",
            selected.len()
        ))),
    }
}

fn collect_lines(
    model: &MilpModel,
    outcome: &SolverOutcome,
    inventory: &Inventory,
    active_set: usize,
    tolerance: f64,
) -> PlanResult<Vec<PlanLine>> {
    let mut lines = Vec::new();

    for (key, var) in model.cut_vars() {
        let label = VarKey::Cut(*key).to_string();
        let count = round_count(outcome.values[var.index()], tolerance, &label)?;
        if count == 0 {
            continue;
        }
        if key.set != active_set {
            return Err(PlanError::InvariantViolation(format!(
                "{} = {}，但原木组 {} 未被选中",
                label, count, key.set
            )));
        }

        let (set, board) = inventory
            .log_sets()
            .get(key.set)
            .zip(inventory.boards().get(key.board))
            .ok_or_else(|| PlanError::InvariantViolation(format!("{} 下标越界", label)))?;
        let log = set
            .logs
            .get(key.log)
            .ok_or_else(|| PlanError::InvariantViolation(format!("{} 下标越界", label)))?;

        lines.push(PlanLine {
            board_index: board.index,
            board_length: board.length,
            set_key: set.key.clone(),
            log_index: log.index,
            log_length: log.length,
            log_diameter: log.diameter,
            count,
        });
    }

    Ok(lines)
}

fn demand_fulfilment(inventory: &Inventory, lines: &[PlanLine]) -> PlanResult<Vec<DemandFulfilment>> {
    inventory
        .boards()
        .iter()
        .map(|board| {
            let produced: u64 = lines
                .iter()
                .filter(|l| l.board_index == board.index)
                .map(|l| l.count)
                .sum();
            let demand = u64::from(board.demand);
            if produced < demand {
                return Err(PlanError::InvariantViolation(format!(
                    "板材 {} 产出 {} 低于需求 {}",
                    board.index, produced, demand
                )));
            }
            Ok(DemandFulfilment {
                board_index: board.index,
                demand: board.demand,
                produced,
                surplus: produced - demand,
            })
        })
        .collect()
}

fn log_usage(set: &LogSet, lines: &[PlanLine], tolerance: f64) -> PlanResult<Vec<LogUsage>> {
    set.logs
        .iter()
        .map(|log| {
            let length_used: f64 = lines
                .iter()
                .filter(|l| l.log_index == log.index)
                .map(|l| l.board_length * l.count as f64)
                .sum();
            let length_available = log.total_length();
            if length_used > length_available + tolerance * length_available.max(1.0) {
                return Err(PlanError::InvariantViolation(format!(
                    "原木 {}#{} 使用长度 {} 超出可用长度 {}",
                    set.key, log.index, length_used, length_available
                )));
            }
            let utilisation = if length_available > 0.0 {
                length_used / length_available
            } else {
                0.0
            };
            Ok(LogUsage {
                set_key: set.key.clone(),
                log_index: log.index,
                length_used,
                length_available,
                utilisation,
            })
        })
        .collect()
}

/// 材积损耗 = 选中组原木总体积 − 已切板材总体积
fn wastage(set: &LogSet, inventory: &Inventory, lines: &[PlanLine]) -> PlanResult<f64> {
    let log_volume = set
        .total_volume()
        .ok_or_else(|| PlanError::Model(format!("原木组 {} 缺少直径", set.key)))?;

    let mut board_volume = 0.0;
    for line in lines {
        let volume = inventory
            .boards()
            .get(line.board_index)
            .and_then(|b| b.volume())
            .ok_or_else(|| PlanError::Model(format!("板材 {} 缺少截面尺寸", line.board_index)))?;
        board_volume += volume * line.count as f64;
    }

    let wastage = log_volume - board_volume;
    if wastage < 0.0 {
        warn!(set = %set.key, wastage, "板材总体积超过原木总体积（未启用体积约束）");
    }
    Ok(wastage)
}
