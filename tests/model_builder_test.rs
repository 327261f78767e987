// ==========================================
// 模型构建器集成测试
// ==========================================
// 测试目标: 验证模型结构与求解取值满足全部约束
// ==========================================


use sawmill_planner::engine::{
    build_model, interpret, write_lp, BuildOptions, ConstraintTag, CutKey, GoodLpSolver,
    MilpSolver, SolveStatus, VarKind, DEFAULT_ROUNDING_TOLERANCE,
};
use sawmill_planner::{logging, ObjectiveMode};
use test_helpers::*;

#[test]
fn test_solution_satisfies_every_constraint() {
    logging::init_test();

    let inventory = volume_inventory();
    let solver = GoodLpSolver::new();

    for mode in [
        ObjectiveMode::MaximizeCountWithSelection,
        ObjectiveMode::MaximizeCountWithVolume,
        ObjectiveMode::MinimizeWastageWithSelection,
    ] {
        let model = build_model(&inventory, &BuildOptions::new(mode)).unwrap();
        let outcome = solver.solve(&model).unwrap();

        assert_eq!(outcome.status, SolveStatus::Optimal, "模式 {}", mode);
        assert!(
            model.violated_constraints(&outcome.values).is_empty(),
            "模式 {} 存在违反的约束",
            mode
        );
    }
}

#[test]
fn test_unselected_set_cuts_are_zero() {
    logging::init_test();

    let inventory = grouped(
        vec![board(0, 30.0, 1)],
        vec![
            ("A", vec![log(0, 100.0, 1)]),
            ("B", vec![log(0, 60.0, 2)]),
        ],
    );
    let model = build_model(
        &inventory,
        &BuildOptions::new(ObjectiveMode::MaximizeCountWithSelection),
    )
    .unwrap();
    let outcome = GoodLpSolver::new().solve(&model).unwrap();

    let select_a = outcome.values[model.select_var(0).unwrap().index()];
    let select_b = outcome.values[model.select_var(1).unwrap().index()];
    assert!((select_a + select_b - 1.0).abs() < 1e-6);
    assert!(select_b > 0.5);

    let cut_a = outcome.values[model.cut_var(&CutKey::new(0, 0, 0)).unwrap().index()];
    assert!(cut_a.abs() < 1e-6);
}

#[test]
fn test_integrality_of_interpreted_counts() {
    logging::init_test();

    let inventory = single_set(
        vec![board(0, 3.0, 1), board(1, 7.0, 2)],
        vec![log(0, 23.0, 3)],
    );
    let model = build_model(&inventory, &BuildOptions::new(ObjectiveMode::MaximizeCount)).unwrap();
    let outcome = GoodLpSolver::new().solve(&model).unwrap();

    for (key, var) in model.cut_vars() {
        let value = outcome.values[var.index()];
        assert!(
            (value - value.round()).abs() < DEFAULT_ROUNDING_TOLERANCE,
            "{:?} 取值 {} 非整数",
            key,
            value
        );
        assert!(value > -DEFAULT_ROUNDING_TOLERANCE);
    }

    let plan = interpret(&model, &outcome, &inventory, DEFAULT_ROUNDING_TOLERANCE).unwrap();
    // 69 长度: 2 × 7 = 14，剩余 55 / 3 = 18 块
    assert_eq!(plan.total_boards_cut, 20);
}

#[test]
fn test_model_shape_per_mode() {
    logging::init_test();

    let inventory = volume_inventory();
    let count = |mode: ObjectiveMode, cap: bool, pred: fn(&ConstraintTag) -> bool| {
        let options = BuildOptions::new(mode).with_wastage_volume_cap(cap);
        let model = build_model(&inventory, &options).unwrap();
        model.constraints().iter().filter(|c| pred(&c.tag)).count()
    };
    let is_volume: fn(&ConstraintTag) -> bool =
        |t| matches!(t, ConstraintTag::VolumeCapacity { .. });
    let is_single: fn(&ConstraintTag) -> bool = |t| matches!(t, ConstraintTag::SingleSelection);

    assert_eq!(count(ObjectiveMode::MaximizeCountWithSelection, true, is_volume), 0);
    assert_eq!(count(ObjectiveMode::MaximizeCountWithVolume, false, is_volume), 2);
    assert_eq!(count(ObjectiveMode::MinimizeWastageWithSelection, true, is_volume), 2);
    assert_eq!(count(ObjectiveMode::MinimizeWastageWithSelection, false, is_volume), 0);
    assert_eq!(count(ObjectiveMode::MaximizeCountWithVolume, true, is_single), 1);

    let model = build_model(
        &inventory,
        &BuildOptions::new(ObjectiveMode::MaximizeCountWithVolume),
    )
    .unwrap();
    let binaries = model
        .variables()
        .iter()
        .filter(|v| v.kind == VarKind::Binary)
        .count();
    assert_eq!(binaries, 2);
}

#[test]
fn test_lp_export_names_structured_keys() {
    let inventory = volume_inventory();
    let model = build_model(
        &inventory,
        &BuildOptions::new(ObjectiveMode::MinimizeWastageWithSelection),
    )
    .unwrap();

    let lp = write_lp(&model);
    assert!(lp.contains("Minimize"));
    assert!(lp.contains("volume_s1_l0:"));
    assert!(lp.contains("cut_s1_b0_l0"));
    assert!(lp.contains("Binary\n select_s0\n select_s1\n"));
}
