// ==========================================
// 通讯录对账系统 - 对账配置读取 Trait
// ==========================================
// 职责: 定义对账引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

/// 默认分片大小
pub const DEFAULT_COMMIT_CHUNK_SIZE: usize = 50;
/// 默认分片间隔（毫秒）
pub const DEFAULT_COMMIT_YIELD_MS: u64 = 20;
/// 默认手动搜索候选上限
pub const DEFAULT_MANUAL_SEARCH_LIMIT: usize = 10;

// ==========================================
// ReconcileConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ReconcileConfigReader: Send + Sync {
    /// 每个提交分片包含的记录数
    ///
    /// # 默认值
    /// - 50
    async fn get_commit_chunk_size(&self) -> Result<usize, Box<dyn Error>>;

    /// 分片之间让出控制的间隔（毫秒，0 表示仅让出调度）
    ///
    /// # 默认值
    /// - 20
    async fn get_commit_yield_ms(&self) -> Result<u64, Box<dyn Error>>;

    /// 手动搜索候选上限
    ///
    /// # 默认值
    /// - 10
    async fn get_manual_search_limit(&self) -> Result<usize, Box<dyn Error>>;
}

// ==========================================
// ReconcileSettings - 配置快照
// ==========================================
// 用途: 引擎组件只依赖快照，不直接访问数据库
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSettings {
    pub commit_chunk_size: usize,
    pub commit_yield_ms: u64,
    pub manual_search_limit: usize,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            commit_chunk_size: DEFAULT_COMMIT_CHUNK_SIZE,
            commit_yield_ms: DEFAULT_COMMIT_YIELD_MS,
            manual_search_limit: DEFAULT_MANUAL_SEARCH_LIMIT,
        }
    }
}

impl ReconcileSettings {
    /// 从配置读取器加载快照
    pub async fn load<C: ReconcileConfigReader + ?Sized>(
        reader: &C,
    ) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            commit_chunk_size: reader.get_commit_chunk_size().await?,
            commit_yield_ms: reader.get_commit_yield_ms().await?,
            manual_search_limit: reader.get_manual_search_limit().await?,
        })
    }
}
