// ==========================================
// 原木下料优化系统 - 模型构建器
// ==========================================
// 职责: 库存快照 + 目标模式 → MILP 模型
// 变量: cut[组, 板材, 原木] ∈ ℤ≥0 ; select[组] ∈ {0,1}（选择模式）
// 约束: 长度容量 / 体积容量 / 需求下限 / 单选
// 红线: 每个 cut 变量都出现在右端为 容量·select[组] 的约束中
// ==========================================

use crate::domain::inventory::{Board, Inventory, Log};
use crate::domain::types::ObjectiveMode;
use crate::engine::error::{PlanError, PlanResult};
use crate::engine::model::{
    Comparison, ConstraintTag, CutKey, LinearExpr, MilpModel, Sense, VarId, VarKey, VarKind,
};
use crate::importer::error::DataError;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

// ==========================================
// BuildOptions - 建模参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    pub mode: ObjectiveMode,
    /// 最小化损耗模式是否附加体积容量约束
    pub wastage_volume_cap: bool,
}

impl BuildOptions {
    pub fn new(mode: ObjectiveMode) -> Self {
        Self {
            mode,
            wastage_volume_cap: true,
        }
    }

    pub fn with_wastage_volume_cap(mut self, enabled: bool) -> Self {
        self.wastage_volume_cap = enabled;
        self
    }

    /// 当前参数下是否生成体积容量约束
    pub fn applies_volume_cap(&self) -> bool {
        match self.mode {
            ObjectiveMode::MaximizeCountWithVolume => true,
            ObjectiveMode::MinimizeWastageWithSelection => self.wastage_volume_cap,
            ObjectiveMode::MaximizeCount | ObjectiveMode::MaximizeCountWithSelection => false,
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::new(ObjectiveMode::MaximizeCount)
    }
}

// ==========================================
// build_model - 构建入口
// ==========================================

/// 由库存构建 MILP 模型（纯函数）
///
/// # 错误
/// - `PlanError::Data`: 体积模式缺几何字段 / 非选择模式输入了多个原木组
/// - `PlanError::Model`: 构建结果未通过结构自检
#[instrument(skip(inventory), fields(mode = %options.mode, sets = inventory.log_sets().len()))]
pub fn build_model(inventory: &Inventory, options: &BuildOptions) -> PlanResult<MilpModel> {
    let mode = options.mode;
    inventory.require_geometry(mode)?;

    if !mode.uses_selection() && inventory.log_sets().len() > 1 {
        return Err(DataError::SetsNotSupported {
            mode: mode.to_string(),
            set_count: inventory.log_sets().len(),
        }
        .into());
    }

    let mut model = MilpModel::new(mode);
    let selects = declare_select_vars(&mut model, inventory, mode);
    declare_cut_vars(&mut model, inventory);

    add_length_capacity(&mut model, inventory, &selects)?;
    if options.applies_volume_cap() {
        add_volume_capacity(&mut model, inventory, &selects)?;
    }
    add_demand(&mut model, inventory);
    if !selects.is_empty() {
        add_single_selection(&mut model, &selects);
    }

    let objective = if mode.is_minimization() {
        wastage_objective(&model, inventory, &selects)?
    } else {
        count_objective(&model)
    };
    let sense = if mode.is_minimization() {
        Sense::Minimize
    } else {
        Sense::Maximize
    };
    model.set_objective(sense, objective);

    model.validate()?;

    debug!(
        variables = model.variables().len(),
        constraints = model.constraints().len(),
        volume_cap = options.applies_volume_cap(),
        "模型构建完成"
    );
    Ok(model)
}

// ==========================================
// 变量声明
// ==========================================

fn declare_select_vars(
    model: &mut MilpModel,
    inventory: &Inventory,
    mode: ObjectiveMode,
) -> Vec<VarId> {
    if !mode.uses_selection() {
        return Vec::new();
    }
    (0..inventory.log_sets().len())
        .map(|s| model.add_variable(VarKey::Select(s), VarKind::Binary, 0.0, Some(1.0)))
        .collect()
}

fn declare_cut_vars(model: &mut MilpModel, inventory: &Inventory) {
    for (s, set) in inventory.log_sets().iter().enumerate() {
        for (b, board) in inventory.boards().iter().enumerate() {
            for (l, log) in set.logs.iter().enumerate() {
                model.add_variable(
                    VarKey::Cut(CutKey::new(s, b, l)),
                    VarKind::Integer,
                    0.0,
                    Some(length_bound(board, log)),
                );
            }
        }
    }
}

/// 上界 ⌊L·q / 板长⌋（长度约束的隐含界）
fn length_bound(board: &Board, log: &Log) -> f64 {
    (log.total_length() / board.length + 1e-9).floor().max(0.0)
}

// ==========================================
// 约束
// ==========================================

/// 容量约束: Σ_b cut·w_b ≤ cap（选择模式: Σ_b cut·w_b − cap·select ≤ 0）
fn add_capacity(
    model: &mut MilpModel,
    tag: ConstraintTag,
    mut expr: LinearExpr,
    capacity: f64,
    select: Option<VarId>,
) {
    match select {
        Some(select) => {
            expr.add_term(select, -capacity);
            model.add_constraint(tag, expr, Comparison::LessEq, 0.0);
        }
        None => model.add_constraint(tag, expr, Comparison::LessEq, capacity),
    }
}

fn cut_expr_for_log<F>(
    model: &MilpModel,
    inventory: &Inventory,
    set: usize,
    log: usize,
    weight: F,
) -> PlanResult<LinearExpr>
where
    F: Fn(&Board) -> PlanResult<f64>,
{
    let mut expr = LinearExpr::new();
    for (b, board) in inventory.boards().iter().enumerate() {
        expr.add_term(cut_var(model, CutKey::new(set, b, log))?, weight(board)?);
    }
    Ok(expr)
}

fn add_length_capacity(
    model: &mut MilpModel,
    inventory: &Inventory,
    selects: &[VarId],
) -> PlanResult<()> {
    for (s, set) in inventory.log_sets().iter().enumerate() {
        for (l, log) in set.logs.iter().enumerate() {
            let expr = cut_expr_for_log(model, inventory, s, l, |board| Ok(board.length))?;
            add_capacity(
                model,
                ConstraintTag::LengthCapacity { set: s, log: l },
                expr,
                log.total_length(),
                selects.get(s).copied(),
            );
        }
    }
    Ok(())
}

fn add_volume_capacity(
    model: &mut MilpModel,
    inventory: &Inventory,
    selects: &[VarId],
) -> PlanResult<()> {
    for (s, set) in inventory.log_sets().iter().enumerate() {
        for (l, log) in set.logs.iter().enumerate() {
            let expr = cut_expr_for_log(model, inventory, s, l, board_volume)?;
            add_capacity(
                model,
                ConstraintTag::VolumeCapacity { set: s, log: l },
                expr,
                log_volume(log)?,
                selects.get(s).copied(),
            );
        }
    }
    Ok(())
}

/// 需求下限: Σ_{组,原木} cut[*, b, *] ≥ demand_b
fn add_demand(model: &mut MilpModel, inventory: &Inventory) {
    for (b, board) in inventory.boards().iter().enumerate() {
        let mut expr = LinearExpr::new();
        for (key, var) in model.cut_vars() {
            if key.board == b {
                expr.add_term(*var, 1.0);
            }
        }
        model.add_constraint(
            ConstraintTag::Demand { board: b },
            expr,
            Comparison::GreaterEq,
            f64::from(board.demand),
        );
    }
}

fn add_single_selection(model: &mut MilpModel, selects: &[VarId]) {
    let expr = selects
        .iter()
        .fold(LinearExpr::new(), |expr, var| expr.with_term(*var, 1.0));
    model.add_constraint(ConstraintTag::SingleSelection, expr, Comparison::Equal, 1.0);
}

// ==========================================
// 目标函数
// ==========================================

fn count_objective(model: &MilpModel) -> LinearExpr {
    model
        .cut_vars()
        .iter()
        .fold(LinearExpr::new(), |expr, (_, var)| expr.with_term(*var, 1.0))
}

/// 损耗目标（线性化）
///
/// Σ_组 (Σ_原木 vol·q)·select[组] − Σ cut·板材体积
/// 未选中组的 cut 已被容量约束压为 0,乘积项可直接展开
fn wastage_objective(
    model: &MilpModel,
    inventory: &Inventory,
    selects: &[VarId],
) -> PlanResult<LinearExpr> {
    let mut expr = LinearExpr::new();

    for (s, set) in inventory.log_sets().iter().enumerate() {
        let select = selects
            .get(s)
            .copied()
            .ok_or_else(|| PlanError::Model(format!("原木组 {} 缺少选择变量", set.key)))?;
        let mut set_volume = 0.0;
        for log in &set.logs {
            set_volume += log_volume(log)?;
        }
        expr.add_term(select, set_volume);
    }

    for (key, var) in model.cut_vars() {
        let board = inventory
            .boards()
            .get(key.board)
            .ok_or_else(|| PlanError::Model(format!("板材下标越界: {}", key.board)))?;
        expr.add_term(*var, -board_volume(board)?);
    }

    Ok(expr)
}

// ==========================================
// 辅助
// ==========================================

fn cut_var(model: &MilpModel, key: CutKey) -> PlanResult<VarId> {
    model
        .cut_var(&key)
        .ok_or_else(|| PlanError::Model(format!("未声明变量 {}", VarKey::Cut(key))))
}

fn board_volume(board: &Board) -> PlanResult<f64> {
    board
        .volume()
        .ok_or_else(|| PlanError::Model(format!("板材 {} 缺少截面尺寸", board.index)))
}

/// 该类原木总体积 vol·q
fn log_volume(log: &Log) -> PlanResult<f64> {
    log.total_volume()
        .ok_or_else(|| PlanError::Model(format!("原木 {} 缺少直径", log.index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inventory::LogSet;
    use crate::domain::types::SetKey;

    fn two_set_inventory() -> Inventory {
        Inventory::new(
            vec![
                Board::new(0, 50.0, 1).with_section(0.2, 0.1),
                Board::new(1, 30.0, 0).with_section(0.1, 0.1),
            ],
            vec![
                LogSet::new(SetKey::new("A"), vec![Log::new(0, 100.0, 1).with_diameter(0.5)]),
                LogSet::new(
                    SetKey::new("B"),
                    vec![
                        Log::new(0, 60.0, 2).with_diameter(0.4),
                        Log::new(1, 80.0, 1).with_diameter(0.4),
                    ],
                ),
            ],
        )
        .unwrap()
    }

    fn count_tagged<F: Fn(&ConstraintTag) -> bool>(model: &MilpModel, pred: F) -> usize {
        model.constraints().iter().filter(|c| pred(&c.tag)).count()
    }

    #[test]
    fn test_max_count_single_set_shape() {
        let inventory = Inventory::single_set(
            vec![Board::new(0, 10.0, 2)],
            vec![Log::new(0, 25.0, 1)],
        )
        .unwrap();

        let model = build_model(&inventory, &BuildOptions::new(ObjectiveMode::MaximizeCount))
            .unwrap();

        assert_eq!(model.variables().len(), 1);
        assert_eq!(model.sense(), Sense::Maximize);
        assert!(model.select_vars().is_empty());

        let cut = model.cut_var(&CutKey::new(0, 0, 0)).unwrap();
        assert_eq!(model.variable(cut).unwrap().upper, Some(2.0));

        let capacity = model
            .constraints_tagged(ConstraintTag::LengthCapacity { set: 0, log: 0 })
            .next()
            .unwrap();
        assert_eq!(capacity.rhs, 25.0);
        assert_eq!(capacity.expr.coefficient_of(cut), 10.0);
    }

    #[test]
    fn test_max_count_rejects_multiple_sets() {
        let result = build_model(
            &two_set_inventory(),
            &BuildOptions::new(ObjectiveMode::MaximizeCount),
        );
        assert!(matches!(
            result,
            Err(PlanError::Data(DataError::SetsNotSupported { set_count: 2, .. }))
        ));
    }

    #[test]
    fn test_selection_gates_every_capacity() {
        let model = build_model(
            &two_set_inventory(),
            &BuildOptions::new(ObjectiveMode::MaximizeCountWithSelection),
        )
        .unwrap();

        // 2 选择变量 + 2 板材 × (1 + 2) 原木
        assert_eq!(model.variables().len(), 2 + 6);
        assert_eq!(
            count_tagged(&model, |t| matches!(t, ConstraintTag::LengthCapacity { .. })),
            3
        );
        assert_eq!(
            count_tagged(&model, |t| matches!(t, ConstraintTag::VolumeCapacity { .. })),
            0
        );

        let select_b = model.select_var(1).unwrap();
        let capacity = model
            .constraints_tagged(ConstraintTag::LengthCapacity { set: 1, log: 0 })
            .next()
            .unwrap();
        assert_eq!(capacity.rhs, 0.0);
        assert_eq!(capacity.expr.coefficient_of(select_b), -120.0);

        let single = model
            .constraints_tagged(ConstraintTag::SingleSelection)
            .next()
            .unwrap();
        assert_eq!(single.cmp, Comparison::Equal);
        assert_eq!(single.expr.terms.len(), 2);
    }

    #[test]
    fn test_volume_mode_adds_volume_capacity() {
        let model = build_model(
            &two_set_inventory(),
            &BuildOptions::new(ObjectiveMode::MaximizeCountWithVolume),
        )
        .unwrap();

        assert_eq!(
            count_tagged(&model, |t| matches!(t, ConstraintTag::VolumeCapacity { .. })),
            3
        );

        let cut = model.cut_var(&CutKey::new(0, 0, 0)).unwrap();
        let volume = model
            .constraints_tagged(ConstraintTag::VolumeCapacity { set: 0, log: 0 })
            .next()
            .unwrap();
        assert!((volume.expr.coefficient_of(cut) - 50.0 * 0.2 * 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_wastage_volume_cap_is_configurable() {
        let inventory = two_set_inventory();
        let with_cap = build_model(
            &inventory,
            &BuildOptions::new(ObjectiveMode::MinimizeWastageWithSelection),
        )
        .unwrap();
        let without_cap = build_model(
            &inventory,
            &BuildOptions::new(ObjectiveMode::MinimizeWastageWithSelection)
                .with_wastage_volume_cap(false),
        )
        .unwrap();

        let volume = |m: &MilpModel| {
            count_tagged(m, |t| matches!(t, ConstraintTag::VolumeCapacity { .. }))
        };
        assert_eq!(volume(&with_cap), 3);
        assert_eq!(volume(&without_cap), 0);
        assert_eq!(without_cap.sense(), Sense::Minimize);
    }

    #[test]
    fn test_wastage_objective_coefficients() {
        let inventory = two_set_inventory();
        let model = build_model(
            &inventory,
            &BuildOptions::new(ObjectiveMode::MinimizeWastageWithSelection),
        )
        .unwrap();

        let select_a = model.select_var(0).unwrap();
        let expected_a = inventory.log_sets()[0].total_volume().unwrap();
        assert!((model.objective().coefficient_of(select_a) - expected_a).abs() < 1e-9);

        let cut = model.cut_var(&CutKey::new(1, 1, 1)).unwrap();
        assert!((model.objective().coefficient_of(cut) + 30.0 * 0.1 * 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_volume_mode_requires_geometry() {
        let inventory = Inventory::new(
            vec![Board::new(0, 10.0, 1)],
            vec![LogSet::new(SetKey::new("A"), vec![Log::new(0, 20.0, 1)])],
        )
        .unwrap();

        let result = build_model(
            &inventory,
            &BuildOptions::new(ObjectiveMode::MaximizeCountWithVolume),
        );
        assert!(matches!(
            result,
            Err(PlanError::Data(DataError::MissingField { .. }))
        ));
    }

    #[test]
    fn test_board_longer_than_log_is_fixed_to_zero() {
        let inventory =
            Inventory::single_set(vec![Board::new(0, 15.0, 1)], vec![Log::new(0, 10.0, 1)])
                .unwrap();
        let model =
            build_model(&inventory, &BuildOptions::new(ObjectiveMode::MaximizeCount)).unwrap();

        let cut = model.cut_var(&CutKey::new(0, 0, 0)).unwrap();
        assert_eq!(model.variable(cut).unwrap().upper, Some(0.0));
    }
}
