// ==========================================
// 通讯录对账系统 - 标准地址 Repository Trait
// ==========================================
// 职责: 定义标准地址表的数据访问接口（不包含业务逻辑）
// 红线: Repository 不含匹配规则，只做数据读写
// ==========================================

use crate::domain::master::{MasterRecordEntity, PhoneUpdate};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// MasterRecordRepository Trait
// ==========================================
// 用途: 区块范围查询 + 按 id 分批回写电话
// 实现者: MasterRecordRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait MasterRecordRepository: Send + Sync {
    /// 按地址模式查询标准地址
    ///
    /// # 参数
    /// - pattern: SQL LIKE 模式（如 `%413弄%`）
    async fn find_by_address_pattern(
        &self,
        pattern: &str,
    ) -> RepositoryResult<Vec<MasterRecordEntity>>;

    /// 按 id 插入或覆盖电话字段（单次调用为一个原子分片）
    ///
    /// # 返回
    /// - Ok(usize): 写入记录数
    /// - Err: 分片整体失败，不产生部分写入
    async fn upsert_phones(&self, updates: Vec<PhoneUpdate>) -> RepositoryResult<usize>;
}
