// ==========================================
// 通讯录对账系统 - 标准地址拉取器
// ==========================================
// 职责: 按检测到的区块范围拉取标准地址 → 按 id 合并 → 计算指纹 → 判定初始状态
// 容错: 单个区块查询失败仅记录日志并跳过，接受部分结果
// ==========================================

use crate::domain::master::{MasterRecord, MasterRecordEntity, MatchState};
use crate::domain::types::Block;
use crate::engine::fingerprint::generate_fingerprint;
use crate::engine::indexer::ImportIndex;
use crate::repository::MasterRecordRepository;
use futures::future::join_all;
use pinyin::ToPinyin;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// 拉取结果
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub records: Vec<MasterRecord>,
    /// 查询失败被跳过的区块
    pub failed_blocks: Vec<Block>,
}

// ==========================================
// MasterFetcher - 标准地址拉取器
// ==========================================
pub struct MasterFetcher<R>
where
    R: MasterRecordRepository,
{
    repo: Arc<R>,
}

impl<R> MasterFetcher<R>
where
    R: MasterRecordRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// 拉取并判定
    ///
    /// 各区块查询相互独立并发发出；结果按区块顺序合并，后到者覆盖先到者
    #[instrument(skip(self, blocks, index), fields(block_count = blocks.len(), row_count = index.len()))]
    pub async fn fetch(&self, blocks: &[Block], index: &ImportIndex) -> FetchOutcome {
        let queries = blocks
            .iter()
            .filter_map(|block| block.address_pattern().map(|pattern| (block, pattern)))
            .map(|(block, pattern)| async move {
                let result = self.repo.find_by_address_pattern(&pattern).await;
                (block, result)
            });

        let mut batches = Vec::new();
        let mut failed_blocks = Vec::new();
        for (block, result) in join_all(queries).await {
            match result {
                Ok(rows) => {
                    debug!(block = %block, count = rows.len(), "区块查询完成");
                    batches.push(rows);
                }
                Err(e) => {
                    warn!(block = %block, error = %e, "区块查询失败，已跳过");
                    failed_blocks.push(block.clone());
                }
            }
        }

        let mut records: Vec<MasterRecord> = merge_by_identity(batches)
            .into_iter()
            .map(|entity| classify(entity, index))
            .collect();
        records.sort_by(|a, b| compare_addresses(&a.address, &b.address).then_with(|| a.id.cmp(&b.id)));

        info!(
            records = records.len(),
            failed_blocks = failed_blocks.len(),
            "标准地址拉取完成"
        );
        FetchOutcome {
            records,
            failed_blocks,
        }
    }
}

/// 按 id 合并多个区块的查询结果（后出现者覆盖），丢弃空 id
pub fn merge_by_identity(batches: Vec<Vec<MasterRecordEntity>>) -> Vec<MasterRecordEntity> {
    batches
        .into_iter()
        .flatten()
        .filter(|entity| !entity.id.is_empty())
        .fold(HashMap::new(), |mut merged, entity| {
            merged.insert(entity.id.clone(), entity);
            merged
        })
        .into_values()
        .collect()
}

/// 计算指纹并按索引命中数判定初始状态
///
/// 0 条 → empty；1 条 → success（自动选中）；多条 → conflict
pub fn classify(entity: MasterRecordEntity, index: &ImportIndex) -> MasterRecord {
    let fingerprint = generate_fingerprint(&entity.address);
    let state = MatchState::from_matches(index.lookup(&fingerprint));
    MasterRecord {
        id: entity.id,
        address: entity.address,
        fingerprint,
        current_phones: entity.phones,
        state,
        manual_candidates: Vec::new(),
    }
}

/// 排序单元：符号 < 数字 < 拉丁字母 < 汉字（按拼音）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CollationUnit {
    Symbol(char),
    Digit(char),
    Letter(char),
    Han(&'static str, char),
}

fn collation_unit(c: char) -> CollationUnit {
    if c.is_numeric() {
        CollationUnit::Digit(c)
    } else if let Some(pinyin) = c.to_pinyin() {
        CollationUnit::Han(pinyin.plain(), c)
    } else if c.is_alphabetic() {
        CollationUnit::Letter(c.to_lowercase().next().unwrap_or(c))
    } else {
        CollationUnit::Symbol(c)
    }
}

/// 地址排序（中文按拼音）
///
/// 排序单元相同时按原文比较，保证全序
pub fn compare_addresses(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(collation_unit)
        .cmp(b.chars().map(collation_unit))
        .then_with(|| a.cmp(b))
}
