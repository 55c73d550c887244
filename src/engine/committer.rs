// ==========================================
// 通讯录对账系统 - 分批提交器
// ==========================================
// 职责: 收集 success 记录 → 按 id 去重 → 分片顺序写入 → 上报进度 → 移除已提交记录
// 红线:
//   - 同一时刻只允许一个提交（忙碌标志）
//   - 分片失败即中止，已写入分片不回滚，工作集保持原样（可整体重试）
//   - 分片之间让出执行权，保持调用方可响应
// ==========================================

use crate::config::ReconcileSettings;
use crate::domain::master::PhoneUpdate;
use crate::engine::error::{CommitError, CommitResult};
use crate::engine::resolver::WorkingSet;
use crate::repository::MasterRecordRepository;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// 单个分片完成后的进度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommitProgress {
    pub chunks_done: usize,
    pub total_chunks: usize,
    pub percent: u8,
    pub records_done: usize,
}

/// 提交结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    pub committed: usize,
    pub chunks: usize,
}

// ==========================================
// BatchCommitter - 分批提交器
// ==========================================
pub struct BatchCommitter<R>
where
    R: MasterRecordRepository,
{
    repo: Arc<R>,
    chunk_size: usize,
    yield_ms: u64,
    busy: AtomicBool,
    progress: AtomicU8,
}

/// 忙碌标志守卫，离开作用域时释放
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<R> BatchCommitter<R>
where
    R: MasterRecordRepository,
{
    pub fn new(repo: Arc<R>, settings: &ReconcileSettings) -> Self {
        Self {
            repo,
            chunk_size: settings.commit_chunk_size.max(1),
            yield_ms: settings.commit_yield_ms,
            busy: AtomicBool::new(false),
            progress: AtomicU8::new(0),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// 最近一次提交的进度百分比（成功完成后归零）
    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::Acquire)
    }

    /// 提交工作集中全部 success 记录
    ///
    /// # 返回
    /// - Ok(CommitReport): 全部分片写入成功，已提交记录从工作集移除
    /// - Err(Busy): 已有提交在进行
    /// - Err(NothingToCommit): 无 success 记录
    /// - Err(ChunkFailed): 某分片失败，工作集不变
    #[instrument(skip(self, working, on_progress), fields(records = working.len()))]
    pub async fn commit<F>(&self, working: &mut WorkingSet, mut on_progress: F) -> CommitResult<CommitReport>
    where
        F: FnMut(CommitProgress) + Send,
    {
        let _guard = BusyGuard::acquire(&self.busy).ok_or(CommitError::Busy)?;

        let updates = build_updates(working);
        if updates.is_empty() {
            info!("没有可提交的数据");
            return Err(CommitError::NothingToCommit);
        }

        let total = updates.len();
        let total_chunks = total.div_ceil(self.chunk_size);
        info!(total, total_chunks, chunk_size = self.chunk_size, "开始分批提交");

        let committed_ids: HashSet<String> = updates.iter().map(|u| u.id.clone()).collect();
        let mut records_done = 0usize;

        for (i, chunk) in updates.chunks(self.chunk_size).enumerate() {
            let chunk_number = i + 1;

            if let Err(e) = self.repo.upsert_phones(chunk.to_vec()).await {
                error!(chunk_number, total_chunks, committed = records_done, error = %e, "分片写入失败，提交中止");
                return Err(CommitError::ChunkFailed {
                    chunk_number,
                    total_chunks,
                    committed: records_done,
                    message: e.to_string(),
                });
            }

            records_done += chunk.len();
            let percent = progress_percent(chunk_number, total_chunks);
            self.progress.store(percent, Ordering::Release);
            on_progress(CommitProgress {
                chunks_done: chunk_number,
                total_chunks,
                percent,
                records_done,
            });
            debug!(chunk_number, total_chunks, percent, "分片写入完成");

            if chunk_number < total_chunks {
                self.pause().await;
            }
        }

        let removed = working.remove_records(&committed_ids);
        self.progress.store(0, Ordering::Release);
        info!(committed = total, removed, "成功写入 {} 条数据", total);

        Ok(CommitReport {
            committed: total,
            chunks: total_chunks,
        })
    }

    async fn pause(&self) {
        if self.yield_ms == 0 {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(Duration::from_millis(self.yield_ms)).await;
        }
    }
}

/// 由工作集 success 记录构造提交载荷
pub fn build_updates(working: &WorkingSet) -> Vec<PhoneUpdate> {
    dedup_last_wins(
        working
            .succeeded()
            .into_iter()
            .filter_map(|record| record.to_phone_update())
            .collect(),
    )
}

/// 按 id 去重，保留最后一次出现的内容和首次出现的位置
pub fn dedup_last_wins(updates: Vec<PhoneUpdate>) -> Vec<PhoneUpdate> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut deduped: Vec<PhoneUpdate> = Vec::with_capacity(updates.len());
    for update in updates {
        match positions.get(&update.id) {
            Some(&pos) => deduped[pos] = update,
            None => {
                positions.insert(update.id.clone(), deduped.len());
                deduped.push(update);
            }
        }
    }
    deduped
}

/// 向上取整的百分比，最后一片恰为 100
fn progress_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((done * 100 + total - 1) / total).min(100) as u8
}
