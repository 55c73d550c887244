// ==========================================
// 通讯录对账系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 通讯录地址指纹对账（自动匹配 + 人工核对 + 分批回写）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 指纹与匹配规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 会话接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{Block, ImportedRow, MasterRecord, MatchStatus, PhoneSlots, PhoneUpdate};

// 引擎
pub use engine::{
    detect_block, extract_phones, generate_fingerprint, BatchCommitter, ImportIndex,
    MasterFetcher, WorkingSet,
};

// API
pub use api::{ApiError, ReconcileApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "通讯录对账系统";
