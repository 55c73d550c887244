// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库初始化、标准地址种子数据、通讯录 CSV 文件生成
// ==========================================

use rusqlite::{params, Connection};
use sgcc_reconcile::db::{init_schema, open_sqlite_connection};
use std::error::Error;
use std::io::Write;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 写入标准地址种子数据 (id, address)
pub fn seed_master_records(db_path: &str, records: &[(&str, &str)]) -> Result<(), Box<dyn Error>> {
    let conn = Connection::open(db_path)?;
    for (id, address) in records {
        conn.execute(
            "INSERT INTO master_records (id, address) VALUES (?1, ?2)",
            params![id, address],
        )?;
    }
    Ok(())
}

/// 写入全局配置
#[allow(dead_code)]
pub fn set_config(db_path: &str, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let conn = Connection::open(db_path)?;
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

/// 生成通讯录 CSV（首行为表头）
pub fn write_contact_csv(rows: &[&str]) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
    writeln!(file, "地址,电话1,电话2,电话3")?;
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    file.flush()?;
    Ok(file)
}
