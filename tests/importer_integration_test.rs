// ==========================================
// InventoryImporter 集成测试
// ==========================================
// 测试目标: 验证 CSV 导入 → 规划 的完整流程
// ==========================================


use sawmill_planner::importer::{DataError, InventoryImporter, InventoryImporterImpl};
use sawmill_planner::{logging, ObjectiveMode, SetKey};
use test_helpers::{fixture_path, planner, write_csv};

#[test]
fn test_import_plain_logs_and_plan() {
    logging::init_test();

    let importer = InventoryImporterImpl::default();
    let inventory = importer
        .import_auto(&fixture_path("boards.csv"), &fixture_path("logs.csv"))
        .unwrap();

    assert!(!inventory.is_grouped());
    assert_eq!(inventory.boards().len(), 1);
    assert_eq!(inventory.log_sets()[0].logs[0].quantity, 1);

    let plan = planner()
        .plan(&inventory, ObjectiveMode::MaximizeCount)
        .unwrap();
    assert_eq!(plan.total_boards_cut, 2);
}

#[test]
fn test_import_log_sets_and_select() {
    logging::init_test();

    let importer = InventoryImporterImpl::default();
    let inventory = importer
        .import_with_log_sets(&fixture_path("boards.csv"), &fixture_path("log_sets.csv"))
        .unwrap();

    assert!(inventory.is_grouped());
    assert_eq!(inventory.log_sets().len(), 2);
    assert_eq!(inventory.log_sets()[1].key, SetKey::new("B"));
    assert_eq!(inventory.log_sets()[1].logs[0].quantity, 2);

    // A: 100 / 10 = 10 ; B: 120 / 10 = 12
    let plan = planner()
        .plan(&inventory, ObjectiveMode::MaximizeCountWithSelection)
        .unwrap();
    assert_eq!(plan.selected_set, Some(SetKey::new("B")));
    assert_eq!(plan.total_boards_cut, 12);
}

#[test]
fn test_import_volume_tables_and_minimize_wastage() {
    logging::init_test();

    let importer = InventoryImporterImpl::default();
    let inventory = importer
        .import_auto(
            &fixture_path("boards_volume.csv"),
            &fixture_path("log_sets_volume.csv"),
        )
        .unwrap();

    // Board_Height 作为 Board_Thickness 的别名
    assert_eq!(inventory.boards()[0].thickness, Some(0.5));
    assert_eq!(inventory.log_sets()[0].logs[0].diameter, Some(0.5));

    let plan = planner()
        .plan(&inventory, ObjectiveMode::MinimizeWastageWithSelection)
        .unwrap();
    assert_eq!(plan.selected_set, Some(SetKey::new("A")));
    assert_eq!(plan.total_boards_cut, 7);
}

#[test]
fn test_negative_demand_rejected() {
    logging::init_test();

    let importer = InventoryImporterImpl::default();
    let result = importer.import_auto(
        &fixture_path("boards_negative.csv"),
        &fixture_path("logs.csv"),
    );

    match result {
        Err(DataError::NegativeValue { row, field, value }) => {
            assert_eq!(row, 1);
            assert_eq!(field, "Demand");
            assert_eq!(value, -2.0);
        }
        other => panic!("应为负值错误，实际: {:?}", other),
    }
}

#[test]
fn test_missing_file_and_unsupported_format() {
    logging::init_test();

    let importer = InventoryImporterImpl::default();
    let result = importer.import_auto(
        &fixture_path("does_not_exist.csv"),
        &fixture_path("logs.csv"),
    );
    assert!(matches!(result, Err(DataError::FileNotFound(_))));

    let result = importer.import_auto(
        &fixture_path("boards.csv"),
        &fixture_path("../test_helpers.rs"),
    );
    assert!(matches!(result, Err(DataError::UnsupportedFormat(_))));
}

#[test]
fn test_empty_boards_table_rejected() {
    logging::init_test();

    let boards = write_csv(&["Board_Length,Demand"]);
    let importer = InventoryImporterImpl::default();
    let result = importer.import_with_logs(boards.path(), &fixture_path("logs.csv"));

    assert!(matches!(result, Err(DataError::EmptyTable(table)) if table == "boards"));
}

#[test]
fn test_fractional_quantity_rejected() {
    logging::init_test();

    let sets = write_csv(&["Set,Log_Length,Quantity", "A,100,1.5"]);
    let importer = InventoryImporterImpl::default();
    let result = importer.import_with_log_sets(&fixture_path("boards.csv"), sets.path());

    assert!(matches!(
        result,
        Err(DataError::InvalidValue { field, .. }) if field == "Quantity"
    ));
}
