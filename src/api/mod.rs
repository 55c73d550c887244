// ==========================================
// 通讯录对账系统 - API 层
// ==========================================
// 职责: 对账会话接口，供命令行及上层界面调用
// ==========================================

pub mod error;
pub mod reconcile_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use reconcile_api::{CommitSummary, ImportSummary, ReconcileApi};
