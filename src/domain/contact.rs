// ==========================================
// 通讯录对账系统 - 通讯录导入领域模型
// ==========================================
// 职责: 表格导入行（ImportedRow）与单次导入结果
// 生命周期: 每次导入整体替换，不做合并
// ==========================================

use crate::domain::types::Block;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ImportedRow - 通讯录导入行
// ==========================================
// 创建后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedRow {
    pub id: String,                // 批次内唯一（excel_<序号>）
    pub original_text: String,     // 首列原文
    pub fingerprint: String,       // 地址指纹（可能为空）
    pub phones: Vec<String>,       // 从原文提取的电话，最多 3 个
    pub source_cells: Vec<String>, // 第 2-4 列原始电话单元格（仅展示）
}

impl ImportedRow {
    /// 是否具备可自动匹配的指纹
    pub fn has_fingerprint(&self) -> bool {
        !self.fingerprint.is_empty()
    }
}

// ==========================================
// ContactImport - 单次导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactImport {
    pub import_id: String,
    pub rows: Vec<ImportedRow>,
    pub blocks: Vec<Block>,   // 按首次出现顺序去重的可查询区块
    pub skipped_rows: usize,  // 首列为空被跳过的行数
    pub imported_at: DateTime<Utc>,
}

impl ContactImport {
    /// 区块名摘要（用于提示）
    pub fn block_summary(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
