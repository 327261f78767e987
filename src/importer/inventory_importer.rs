// ==========================================
// 原木下料优化系统 - 库存导入器实现
// ==========================================
// 导入流程（4个阶段）
// 0. 文件读取与解析
// 1. 字段映射与类型转换
// 2. 行级数据质量校验
// 3. 按 Set 分组 + 结构校验 → Inventory
// ==========================================

use crate::domain::inventory::{Board, Inventory, LogSet, RawLogRecord};
use crate::domain::types::SetKey;
use crate::importer::dq_validator::{DqLevel, DqValidator};
use crate::importer::error::{DataError, DataResult};
use crate::importer::field_mapper::{columns, FieldMapper};
use crate::importer::file_parser::{RawTable, UniversalFileParser};
use crate::importer::importer_trait::{
    FieldMapper as FieldMapperTrait, FileParser, InventoryImporter,
};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

// ==========================================
// InventoryImporterImpl - 库存导入器
// ==========================================
pub struct InventoryImporterImpl {
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapperTrait>,
    dq_validator: DqValidator,
}

impl InventoryImporterImpl {
    /// 使用指定组件构造
    pub fn new(
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapperTrait>,
        dq_validator: DqValidator,
    ) -> Self {
        Self {
            file_parser,
            field_mapper,
            dq_validator,
        }
    }

    // ==========================================
    // 阶段实现
    // ==========================================

    /// 阶段 0-2: 板材表
    fn load_boards(&self, path: &Path) -> DataResult<Vec<Board>> {
        let table = self.file_parser.parse_to_table(path)?;
        self.require_column(&table, "boards", columns::BOARD_LENGTH)?;

        let mut boards = Vec::with_capacity(table.rows.len());
        for (index, row) in table.rows.iter().enumerate() {
            let raw = self.field_mapper.map_to_raw_board(row)?;
            boards.push(self.dq_validator.validate_board(&raw, index)?);
        }

        debug!(path = %path.display(), count = boards.len(), "板材表解析完成");
        Ok(boards)
    }

    /// 阶段 0-1: 原木表
    fn load_raw_logs(&self, path: &Path) -> DataResult<(RawTable, Vec<RawLogRecord>)> {
        let table = self.file_parser.parse_to_table(path)?;
        let records = self.map_raw_logs(&table)?;
        debug!(path = %path.display(), count = records.len(), "原木表解析完成");
        Ok((table, records))
    }

    /// 阶段 1: 已解析的原木表 → 原始记录
    fn map_raw_logs(&self, table: &RawTable) -> DataResult<Vec<RawLogRecord>> {
        self.require_column(table, "logs", columns::LOG_LENGTH)?;
        table
            .rows
            .iter()
            .map(|row| self.field_mapper.map_to_raw_log(row))
            .collect()
    }

    /// 阶段 2-3: 非分组原木 → 隐式单组库存
    fn assemble_single_set(
        &self,
        boards: Vec<Board>,
        records: &[RawLogRecord],
    ) -> DataResult<Inventory> {
        let logs = records
            .iter()
            .enumerate()
            .map(|(index, raw)| self.dq_validator.validate_log(raw, index))
            .collect::<DataResult<Vec<_>>>()?;

        let inventory = Inventory::single_set(boards, logs)?;
        self.report_notices(&inventory);

        info!(
            board_count = inventory.boards().len(),
            log_count = inventory.log_count(),
            "库存导入完成（非分组）"
        );
        Ok(inventory)
    }

    /// 阶段 2-3: 原木组表 → 分组库存
    fn assemble_grouped(
        &self,
        boards: Vec<Board>,
        table: &RawTable,
        records: &[RawLogRecord],
    ) -> DataResult<Inventory> {
        self.require_column(table, "log_sets", columns::SET)?;

        let log_sets = self.group_log_sets(records)?;
        let inventory = Inventory::new(boards, log_sets)?;
        self.report_notices(&inventory);

        info!(
            board_count = inventory.boards().len(),
            set_count = inventory.log_sets().len(),
            log_count = inventory.log_count(),
            "库存导入完成（分组）"
        );
        Ok(inventory)
    }

    /// 阶段 3: 按 Set 分组（按首次出现顺序，稳定）
    fn group_log_sets(&self, records: &[RawLogRecord]) -> DataResult<Vec<LogSet>> {
        let mut sets: Vec<LogSet> = Vec::new();

        for raw in records {
            let key = raw.set.clone().ok_or_else(|| DataError::MissingField {
                row: raw.row_number,
                field: columns::SET.to_string(),
            })?;
            let key = SetKey::new(key);

            let position = match sets.iter().position(|s| s.key == key) {
                Some(position) => position,
                None => {
                    sets.push(LogSet::new(key, Vec::new()));
                    sets.len() - 1
                }
            };

            let set = &mut sets[position];
            let log = self.dq_validator.validate_log(raw, set.logs.len())?;
            set.logs.push(log);
        }

        Ok(sets)
    }

    fn require_column(&self, table: &RawTable, table_name: &str, column: &str) -> DataResult<()> {
        if table.has_any_column(&FieldMapper::aliases(column)) {
            Ok(())
        } else {
            Err(DataError::MissingColumn {
                table: table_name.to_string(),
                column: column.to_string(),
            })
        }
    }

    /// 输出数据质量提示
    fn report_notices(&self, inventory: &Inventory) {
        for notice in self.dq_validator.collect_notices(inventory) {
            match notice.level {
                DqLevel::Warning => warn!(field = %notice.field, "{}", notice.message),
                DqLevel::Info => debug!(field = %notice.field, "{}", notice.message),
            }
        }
    }
}

impl Default for InventoryImporterImpl {
    fn default() -> Self {
        Self::new(
            Box::new(UniversalFileParser),
            Box::new(FieldMapper),
            DqValidator::new(),
        )
    }
}

impl InventoryImporter for InventoryImporterImpl {
    #[instrument(skip(self), fields(boards = %boards_path.display(), logs = %logs_path.display()))]
    fn import_with_logs(&self, boards_path: &Path, logs_path: &Path) -> DataResult<Inventory> {
        let boards = self.load_boards(boards_path)?;
        let (_, records) = self.load_raw_logs(logs_path)?;
        self.assemble_single_set(boards, &records)
    }

    #[instrument(skip(self), fields(boards = %boards_path.display(), log_sets = %log_sets_path.display()))]
    fn import_with_log_sets(
        &self,
        boards_path: &Path,
        log_sets_path: &Path,
    ) -> DataResult<Inventory> {
        let boards = self.load_boards(boards_path)?;
        let (table, records) = self.load_raw_logs(log_sets_path)?;
        self.assemble_grouped(boards, &table, &records)
    }

    #[instrument(skip(self), fields(boards = %boards_path.display(), logs = %logs_path.display()))]
    fn import_auto(&self, boards_path: &Path, logs_path: &Path) -> DataResult<Inventory> {
        let boards = self.load_boards(boards_path)?;
        let (table, records) = self.load_raw_logs(logs_path)?;
        if table.has_any_column(&FieldMapper::aliases(columns::SET)) {
            self.assemble_grouped(boards, &table, &records)
        } else {
            self.assemble_single_set(boards, &records)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;
    use std::rc::Rc;
    use tempfile::{Builder, NamedTempFile};

    fn csv_file(lines: &[&str]) -> NamedTempFile {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(temp_file, "{}", line).unwrap();
        }
        temp_file
    }

    #[test]
    fn test_group_log_sets_first_appearance_order() {
        let boards = csv_file(&["Board_Length,Demand", "50,1"]);
        let sets = csv_file(&[
            "Set,Log_Length,Quantity",
            "B,60,2",
            "A,100,1",
            "B,80,1",
        ]);

        let importer = InventoryImporterImpl::default();
        let inventory = importer
            .import_with_log_sets(boards.path(), sets.path())
            .unwrap();

        let keys: Vec<&str> = inventory.log_sets().iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "A"]);
        assert_eq!(inventory.log_sets()[0].logs.len(), 2);
        assert_eq!(inventory.log_sets()[0].logs[1].index, 1);
        assert_eq!(inventory.log_sets()[0].logs[0].quantity, 2);
    }

    #[test]
    fn test_import_auto_detects_plain_logs() {
        let boards = csv_file(&["Board_Length,Demand", "10,2"]);
        let logs = csv_file(&["Log_Length", "25"]);

        let importer = InventoryImporterImpl::default();
        let inventory = importer.import_auto(boards.path(), logs.path()).unwrap();

        assert!(!inventory.is_grouped());
        assert_eq!(inventory.log_sets()[0].logs[0].quantity, 1);
    }

    /// 记录解析次数的文件解析器
    struct CountingParser {
        inner: UniversalFileParser,
        calls: Rc<Cell<usize>>,
    }

    impl FileParser for CountingParser {
        fn parse_to_table(&self, file_path: &Path) -> DataResult<RawTable> {
            self.calls.set(self.calls.get() + 1);
            self.inner.parse_to_table(file_path)
        }
    }

    #[test]
    fn test_import_auto_parses_each_file_once() {
        let boards = csv_file(&["Board_Length,Demand", "50,1"]);
        let plain = csv_file(&["Log_Length", "100"]);
        let sets = csv_file(&["Set,Log_Length,Quantity", "A,100,1", "B,60,2"]);

        for (logs, grouped) in [(&plain, false), (&sets, true)] {
            let calls = Rc::new(Cell::new(0));
            let importer = InventoryImporterImpl::new(
                Box::new(CountingParser {
                    inner: UniversalFileParser,
                    calls: Rc::clone(&calls),
                }),
                Box::new(FieldMapper),
                DqValidator::new(),
            );

            let inventory = importer.import_auto(boards.path(), logs.path()).unwrap();
            assert_eq!(inventory.is_grouped(), grouped);
            assert_eq!(calls.get(), 2);
        }
    }

    #[test]
    fn test_missing_set_value() {
        let boards = csv_file(&["Board_Length,Demand", "10,2"]);
        let sets = csv_file(&["Set,Log_Length,Quantity", ",25,1"]);

        let importer = InventoryImporterImpl::default();
        let result = importer.import_with_log_sets(boards.path(), sets.path());

        assert!(matches!(result, Err(DataError::MissingField { field, .. }) if field == "Set"));
    }

    #[test]
    fn test_missing_board_length_column() {
        let boards = csv_file(&["Length,Demand", "10,2"]);
        let logs = csv_file(&["Log_Length", "25"]);

        let importer = InventoryImporterImpl::default();
        let result = importer.import_with_logs(boards.path(), logs.path());

        assert!(matches!(
            result,
            Err(DataError::MissingColumn { column, .. }) if column == "Board_Length"
        ));
    }
}
