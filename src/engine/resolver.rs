// ==========================================
// 通讯录对账系统 - 匹配解析器（工作集）
// ==========================================
// 职责: 持有待核对的标准地址，提供人工选择/撤销/手动搜索
// 状态机:
//   empty ⇄ conflict   (拉取时自动判定)
//   empty|conflict → success (selectMatch)
//   success → empty    (rollback)
// 红线: 冲突永不自动消解；撤销只改工作集，不触达持久层
// ==========================================

use crate::domain::contact::ImportedRow;
use crate::domain::master::{MasterRecord, MatchState};
use crate::domain::types::MatchStatus;
use crate::engine::error::{ResolveError, ResolveResult};
use crate::engine::fingerprint::generate_fingerprint;
use crate::engine::indexer::ImportIndex;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// 各状态计数（对应 待核对 / 匹配成功 两个视图）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub empty: usize,
    pub conflict: usize,
    pub success: usize,
}

impl StatusCounts {
    pub fn pending(&self) -> usize {
        self.empty + self.conflict
    }

    pub fn total(&self) -> usize {
        self.empty + self.conflict + self.success
    }
}

// ==========================================
// WorkingSet - 工作集
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    records: Vec<MasterRecord>,
    index: ImportIndex,
    manual_search_limit: usize,
}

impl WorkingSet {
    pub fn new(records: Vec<MasterRecord>, index: ImportIndex, manual_search_limit: usize) -> Self {
        Self {
            records,
            index,
            manual_search_limit,
        }
    }

    pub fn records(&self) -> &[MasterRecord] {
        &self.records
    }

    pub fn index(&self) -> &ImportIndex {
        &self.index
    }

    pub fn get(&self, master_id: &str) -> Option<&MasterRecord> {
        self.records.iter().find(|m| m.id == master_id)
    }

    fn get_mut(&mut self, master_id: &str) -> ResolveResult<&mut MasterRecord> {
        self.records
            .iter_mut()
            .find(|m| m.id == master_id)
            .ok_or_else(|| ResolveError::RecordNotFound(master_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ==========================================
    // 人工操作
    // ==========================================

    /// 指定匹配行（幂等）
    ///
    /// 状态置为 success，匹配行仅保留该行，清空手动候选
    pub fn select_match(&mut self, master_id: &str, row: ImportedRow) -> ResolveResult<()> {
        let record = self.get_mut(master_id)?;
        debug!(master_id, row_id = %row.id, from = %record.status(), "关联匹配行");
        record.state = MatchState::Success { row };
        record.manual_candidates.clear();
        Ok(())
    }

    /// 撤销已关联记录，回到 empty
    pub fn rollback(&mut self, master_id: &str) -> ResolveResult<()> {
        let record = self.get_mut(master_id)?;
        if record.status() != MatchStatus::Success {
            return Err(ResolveError::InvalidStateTransition {
                from: record.status().to_string(),
                to: MatchStatus::Empty.to_string(),
            });
        }
        record.state = MatchState::Empty;
        debug!(master_id, "已撤销关联");
        Ok(())
    }

    /// 手动搜索并写入候选
    ///
    /// # 返回
    /// - Ok(n): 候选数量，状态不变，需再调用 select_match
    /// - Err(NoCandidates): 无结果，工作集不变
    pub fn manual_search(&mut self, master_id: &str, query: &str) -> ResolveResult<usize> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::EmptyQuery);
        }
        self.get_mut(master_id)?;

        let candidates = self.search_candidates(query);
        if candidates.is_empty() {
            info!(master_id, query, "手动搜索无结果");
            return Err(ResolveError::NoCandidates {
                query: query.to_string(),
            });
        }

        let count = candidates.len();
        self.get_mut(master_id)?.manual_candidates = candidates;
        Ok(count)
    }

    /// 搜索候选（不修改工作集）
    ///
    /// 原文包含命中在前，指纹相等命中在后（排除已由原文命中的行），截断到上限
    pub fn search_candidates(&self, query: &str) -> Vec<ImportedRow> {
        let rows = self.index.rows();

        let text_matches = rows.iter().filter(|row| row.original_text.contains(query));

        let query_fingerprint = generate_fingerprint(query);
        let fingerprint_matches = rows.iter().filter(|row| {
            !query_fingerprint.is_empty()
                && row.fingerprint == query_fingerprint
                && !row.original_text.contains(query)
        });

        text_matches
            .chain(fingerprint_matches)
            .take(self.manual_search_limit)
            .cloned()
            .collect()
    }

    // ==========================================
    // 视图
    // ==========================================

    /// 待核对（非 success）
    pub fn pending(&self) -> Vec<&MasterRecord> {
        self.records
            .iter()
            .filter(|m| m.status() != MatchStatus::Success)
            .collect()
    }

    /// 匹配成功
    pub fn succeeded(&self) -> Vec<&MasterRecord> {
        self.records
            .iter()
            .filter(|m| m.status() == MatchStatus::Success)
            .collect()
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.records
            .iter()
            .fold(StatusCounts::default(), |mut counts, m| {
                match m.status() {
                    MatchStatus::Empty => counts.empty += 1,
                    MatchStatus::Conflict => counts.conflict += 1,
                    MatchStatus::Success => counts.success += 1,
                }
                counts
            })
    }

    /// 移除已提交记录
    pub fn remove_records(&mut self, ids: &HashSet<String>) -> usize {
        let before = self.records.len();
        self.records.retain(|m| !ids.contains(&m.id));
        before - self.records.len()
    }
}
