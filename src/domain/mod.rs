// ==========================================
// 通讯录对账系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod contact;
pub mod master;
pub mod types;

// 重导出核心类型
pub use contact::{ContactImport, ImportedRow};
pub use master::{MasterRecord, MasterRecordEntity, MatchState, PhoneSlots, PhoneUpdate};
pub use types::{markers, Block, MatchStatus};
