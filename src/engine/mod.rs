// ==========================================
// 通讯录对账系统 - 引擎层
// ==========================================
// 职责: 地址指纹、区块检测、导入索引、匹配解析、标准地址拉取、分批提交
// 红线: Engine 不拼 SQL，数据读写全部经由 Repository
// ==========================================

pub mod block;
pub mod committer;
pub mod error;
pub mod fetcher;
pub mod fingerprint;
pub mod indexer;
pub mod phone;
pub mod resolver;

// 重导出核心引擎
pub use block::{collect_blocks, detect_block};
pub use committer::{BatchCommitter, CommitProgress, CommitReport};
pub use error::{CommitError, CommitResult, ResolveError, ResolveResult};
pub use fetcher::{FetchOutcome, MasterFetcher};
pub use fingerprint::generate_fingerprint;
pub use indexer::ImportIndex;
pub use phone::extract_phones;
pub use resolver::{StatusCounts, WorkingSet};
