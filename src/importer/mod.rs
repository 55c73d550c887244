// ==========================================
// 通讯录对账系统 - 导入层
// ==========================================
// 职责: 通讯录表格导入，生成 ImportedRow 与可查询区块
// 支持: Excel, CSV
// ==========================================

pub mod contact_importer;
pub mod error;
pub mod file_parser;

// 重导出核心类型
pub use contact_importer::ContactImporter;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
