// ==========================================
// 通讯录对账系统 - 配置层
// ==========================================
// 职责: 对账参数管理（分片大小、分片间隔、搜索上限）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod reconcile_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use reconcile_config_trait::{ReconcileConfigReader, ReconcileSettings};
