// ==========================================
// 通讯录对账系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 匹配操作错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("标准地址不在工作集中: {0}")]
    RecordNotFound(String),

    #[error("搜索内容不能为空")]
    EmptyQuery,

    /// 手动搜索无结果（可恢复的提示，不改变状态）
    #[error("未找到相关记录: {query}")]
    NoCandidates { query: String },

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },
}

/// 分批提交错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// 已有提交在进行中
    #[error("提交进行中，请稍候")]
    Busy,

    #[error("没有可提交的数据")]
    NothingToCommit,

    /// 某个分片失败；此前分片已落库，不做回滚
    #[error("提交中断 (分片 {chunk_number}/{total_chunks}, 已写入 {committed} 条): {message}")]
    ChunkFailed {
        chunk_number: usize,
        total_chunks: usize,
        committed: usize,
        message: String,
    },
}

pub type ResolveResult<T> = Result<T, ResolveError>;
pub type CommitResult<T> = Result<T, CommitError>;
