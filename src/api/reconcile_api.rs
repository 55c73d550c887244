// ==========================================
// 通讯录对账系统 - 对账会话 API
// ==========================================
// 职责: 串联一次完整会话：导入 → 拉取标准地址 → 人工核对 → 分批提交
// 会话状态: 当前导入批次 + 工作集；重新导入时整体替换
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ReconcileSettings};
use crate::db::open_sqlite_connection;
use crate::domain::contact::{ContactImport, ImportedRow};
use crate::domain::master::MasterRecord;
use crate::engine::committer::{BatchCommitter, CommitProgress};
use crate::engine::fetcher::MasterFetcher;
use crate::engine::indexer::ImportIndex;
use crate::engine::resolver::{StatusCounts, WorkingSet};
use crate::importer::{ContactImporter, RawRow};
use crate::repository::{MasterRecordRepository, MasterRecordRepositoryImpl};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

/// 导入并拉取后的摘要
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub import_id: String,
    pub row_count: usize,
    pub skipped_rows: usize,
    pub blocks: Vec<String>,
    pub failed_blocks: Vec<String>,
    pub master_count: usize,
    pub counts: StatusCounts,
    pub message: String,
}

/// 提交摘要
#[derive(Debug, Clone, Serialize)]
pub struct CommitSummary {
    pub committed: usize,
    pub chunks: usize,
    pub message: String,
}

/// 对账会话 API
pub struct ReconcileApi<R>
where
    R: MasterRecordRepository,
{
    repo: Arc<R>,
    importer: ContactImporter,
    fetcher: MasterFetcher<R>,
    committer: BatchCommitter<R>,
    settings: ReconcileSettings,
    current_import: Option<ContactImport>,
    working: WorkingSet,
}

impl ReconcileApi<MasterRecordRepositoryImpl> {
    /// 打开数据库并按库内配置创建会话
    pub async fn open(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::Repository(e.into()))?;
        let conn = Arc::new(Mutex::new(conn));

        let repo = Arc::new(MasterRecordRepositoryImpl::from_connection(conn.clone())?);
        let config = ConfigManager::from_connection(conn)
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let settings = ReconcileSettings::load(&config)
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        info!(db_path, ?settings, "对账会话已打开");
        Ok(Self::new(repo, settings))
    }

    /// 库中已回写电话的标准地址数
    pub fn stored_phone_count(&self) -> ApiResult<usize> {
        Ok(self.repo.count_with_phones()?)
    }
}

impl<R> ReconcileApi<R>
where
    R: MasterRecordRepository,
{
    pub fn new(repo: Arc<R>, settings: ReconcileSettings) -> Self {
        Self {
            importer: ContactImporter::new(),
            fetcher: MasterFetcher::new(repo.clone()),
            committer: BatchCommitter::new(repo.clone(), &settings),
            repo,
            settings,
            current_import: None,
            working: WorkingSet::default(),
        }
    }

    pub fn settings(&self) -> &ReconcileSettings {
        &self.settings
    }

    // ==========================================
    // 导入与拉取
    // ==========================================

    /// 导入通讯录文件并拉取对应区块的标准地址
    ///
    /// 解析失败时保留原有会话状态
    #[instrument(skip(self, file_path), fields(path = %file_path.as_ref().display()))]
    pub async fn import_file<P: AsRef<Path>>(&mut self, file_path: P) -> ApiResult<ImportSummary> {
        let import = self.importer.import_file(file_path)?;
        Ok(self.load_import(import).await)
    }

    /// 从已解析的数据行导入（表头已去除）
    pub async fn import_rows(&mut self, rows: Vec<RawRow>) -> ImportSummary {
        let import = self.importer.import_rows(rows);
        self.load_import(import).await
    }

    async fn load_import(&mut self, import: ContactImport) -> ImportSummary {
        let index = ImportIndex::build(import.rows.clone());
        let outcome = self.fetcher.fetch(&import.blocks, &index).await;

        // 整体替换，不与上一批合并
        self.working = WorkingSet::new(outcome.records, index, self.settings.manual_search_limit);

        let summary = ImportSummary {
            import_id: import.import_id.clone(),
            row_count: import.rows.len(),
            skipped_rows: import.skipped_rows,
            blocks: import.blocks.iter().map(|b| b.name()).collect(),
            failed_blocks: outcome.failed_blocks.iter().map(|b| b.name()).collect(),
            master_count: self.working.len(),
            counts: self.working.status_counts(),
            message: format!("检测到区块: {}", import.block_summary()),
        };
        self.current_import = Some(import);
        summary
    }

    pub fn current_import(&self) -> Option<&ContactImport> {
        self.current_import.as_ref()
    }

    // ==========================================
    // 人工核对
    // ==========================================

    /// 按导入行 id 关联
    pub fn select_match(&mut self, master_id: &str, row_id: &str) -> ApiResult<()> {
        let row = self
            .working
            .index()
            .get(row_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("导入行(id={})不存在", row_id)))?;
        self.working.select_match(master_id, row)?;
        Ok(())
    }

    pub fn rollback(&mut self, master_id: &str) -> ApiResult<()> {
        self.working.rollback(master_id)?;
        Ok(())
    }

    /// 手动搜索，返回写入的候选
    pub fn manual_search(&mut self, master_id: &str, query: &str) -> ApiResult<Vec<ImportedRow>> {
        self.working.manual_search(master_id, query)?;
        let record = self
            .working
            .get(master_id)
            .ok_or_else(|| ApiError::NotFound(master_id.to_string()))?;
        Ok(record.manual_candidates.clone())
    }

    // ==========================================
    // 视图
    // ==========================================

    pub fn pending(&self) -> Vec<&MasterRecord> {
        self.working.pending()
    }

    pub fn succeeded(&self) -> Vec<&MasterRecord> {
        self.working.succeeded()
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.working.status_counts()
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working
    }

    /// 工作集 JSON（供界面渲染）
    pub fn working_set_json(&self) -> ApiResult<String> {
        serde_json::to_string(self.working.records())
            .map_err(|e| ApiError::InternalError(format!("序列化工作集失败: {}", e)))
    }

    // ==========================================
    // 提交
    // ==========================================

    /// 提交全部 success 记录
    pub async fn commit<F>(&mut self, on_progress: F) -> ApiResult<CommitSummary>
    where
        F: FnMut(CommitProgress) + Send,
    {
        let report = self.committer.commit(&mut self.working, on_progress).await?;
        Ok(CommitSummary {
            committed: report.committed,
            chunks: report.chunks,
            message: format!("成功写入 {} 条数据", report.committed),
        })
    }

    pub fn commit_progress(&self) -> u8 {
        self.committer.progress()
    }

    pub fn is_committing(&self) -> bool {
        self.committer.is_busy()
    }
}
