// ==========================================
// 通讯录对账系统 - 通讯录导入器
// ==========================================
// 职责: 原始行 → ImportedRow（指纹/电话/来源单元格）+ 可查询区块
// 流程: 文件解析 → 跳过首列为空的行 → 逐行计算 → 区块汇总
// ==========================================

use crate::domain::contact::{ContactImport, ImportedRow};
use crate::engine::block::collect_blocks;
use crate::engine::fingerprint::generate_fingerprint;
use crate::engine::phone::{extract_phones, MAX_PHONES};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{RawRow, UniversalFileParser};
use chrono::Utc;
use std::path::Path;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// 导入行 id 前缀
pub const ROW_ID_PREFIX: &str = "excel_";

// ==========================================
// ContactImporter - 通讯录导入器
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct ContactImporter;

impl ContactImporter {
    pub fn new() -> Self {
        Self
    }

    /// 从文件导入
    #[instrument(skip(self, file_path), fields(path = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ContactImport> {
        let rows = UniversalFileParser.parse(file_path.as_ref())?;
        Ok(self.import_rows(rows))
    }

    /// 从已解析的数据行导入
    ///
    /// 行 id 按数据行位置编号（含被跳过的行），保证批次内唯一
    pub fn import_rows(&self, raw_rows: Vec<RawRow>) -> ContactImport {
        let total = raw_rows.len();
        let rows: Vec<ImportedRow> = raw_rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, cells)| build_row(index, cells))
            .collect();

        let blocks = collect_blocks(rows.iter().map(|r| r.original_text.as_str()));
        let import = ContactImport {
            import_id: Uuid::new_v4().to_string(),
            skipped_rows: total - rows.len(),
            rows,
            blocks,
            imported_at: Utc::now(),
        };

        info!(
            import_id = %import.import_id,
            rows = import.rows.len(),
            skipped = import.skipped_rows,
            blocks = %import.block_summary(),
            "通讯录导入完成"
        );
        import
    }
}

fn build_row(index: usize, cells: RawRow) -> Option<ImportedRow> {
    let mut cells = cells.into_iter();
    let original_text = cells.next().filter(|text| !text.is_empty())?;

    let row = ImportedRow {
        id: format!("{}{}", ROW_ID_PREFIX, index),
        fingerprint: generate_fingerprint(&original_text),
        phones: extract_phones(&original_text),
        source_cells: cells.take(MAX_PHONES).collect(),
        original_text,
    };
    debug!(id = %row.id, fingerprint = %row.fingerprint, phones = row.phones.len(), "解析导入行");
    Some(row)
}
