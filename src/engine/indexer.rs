// ==========================================
// 通讯录对账系统 - 导入行指纹索引
// ==========================================
// 职责: 以指纹为键索引导入行，供自动匹配与手动搜索使用
// 约束: 空指纹不进入索引
// ==========================================

use crate::domain::contact::ImportedRow;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ImportIndex {
    rows: Vec<ImportedRow>,
    by_fingerprint: HashMap<String, Vec<usize>>,
}

impl ImportIndex {
    /// 建立索引（保持导入顺序）
    pub fn build(rows: Vec<ImportedRow>) -> Self {
        let mut by_fingerprint: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, row) in rows.iter().enumerate() {
            if row.has_fingerprint() {
                by_fingerprint
                    .entry(row.fingerprint.clone())
                    .or_default()
                    .push(idx);
            }
        }
        Self {
            rows,
            by_fingerprint,
        }
    }

    /// 指纹命中的全部导入行（按导入顺序）
    pub fn lookup(&self, fingerprint: &str) -> Vec<ImportedRow> {
        if fingerprint.is_empty() {
            return Vec::new();
        }
        self.by_fingerprint
            .get(fingerprint)
            .map(|indices| indices.iter().map(|&i| self.rows[i].clone()).collect())
            .unwrap_or_default()
    }

    pub fn rows(&self) -> &[ImportedRow] {
        &self.rows
    }

    pub fn get(&self, row_id: &str) -> Option<&ImportedRow> {
        self.rows.iter().find(|r| r.id == row_id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 不同指纹的数量
    pub fn fingerprint_count(&self) -> usize {
        self.by_fingerprint.len()
    }
}
