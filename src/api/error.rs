// ==========================================
// 通讯录对账系统 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为面向用户的提示信息
// ==========================================

use crate::engine::error::{CommitError, ResolveError};
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 各层错误
    // ==========================================
    #[error("解析文件失败: {0}")]
    Import(#[from] ImportError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("{0}")]
    Commit(#[from] CommitError),

    #[error("数据库错误: {0}")]
    Repository(#[from] RepositoryError),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 是否为提示类结果（不代表操作失败）
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            ApiError::Resolve(ResolveError::NoCandidates { .. })
                | ApiError::Commit(CommitError::NothingToCommit)
        )
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
