// ==========================================
// 通讯录对账系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::reconcile_config_trait::{
    ReconcileConfigReader, DEFAULT_COMMIT_CHUNK_SIZE, DEFAULT_COMMIT_YIELD_MS,
    DEFAULT_MANUAL_SEARCH_LIMIT,
};
use crate::db::{configure_sqlite_connection, init_schema};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            configure_sqlite_connection(&conn_guard)?;
            init_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取正数配置，缺失或非法时回退默认值
    fn get_positive_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + PartialOrd + Default + Copy,
    {
        let raw = match self.get_config_value(key)? {
            Some(raw) => raw,
            None => return Ok(default),
        };
        match raw.trim().parse::<T>() {
            Ok(v) if v > T::default() => Ok(v),
            _ => {
                warn!(config_key = key, raw_value = %raw, "配置值非法，使用默认值");
                Ok(default)
            }
        }
    }
}

// ==========================================
// ReconcileConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ReconcileConfigReader for ConfigManager {
    async fn get_commit_chunk_size(&self) -> Result<usize, Box<dyn Error>> {
        self.get_positive_or_default(config_keys::COMMIT_CHUNK_SIZE, DEFAULT_COMMIT_CHUNK_SIZE)
    }

    async fn get_commit_yield_ms(&self) -> Result<u64, Box<dyn Error>> {
        // 0 合法：只让出调度不休眠
        let raw = match self.get_config_value(config_keys::COMMIT_YIELD_MS)? {
            Some(raw) => raw,
            None => return Ok(DEFAULT_COMMIT_YIELD_MS),
        };
        match raw.trim().parse::<u64>() {
            Ok(v) => Ok(v),
            Err(_) => {
                warn!(
                    config_key = config_keys::COMMIT_YIELD_MS,
                    raw_value = %raw,
                    "配置值非法，使用默认值"
                );
                Ok(DEFAULT_COMMIT_YIELD_MS)
            }
        }
    }

    async fn get_manual_search_limit(&self) -> Result<usize, Box<dyn Error>> {
        self.get_positive_or_default(
            config_keys::MANUAL_SEARCH_LIMIT,
            DEFAULT_MANUAL_SEARCH_LIMIT,
        )
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 提交分片
    pub const COMMIT_CHUNK_SIZE: &str = "reconcile_commit_chunk_size";
    pub const COMMIT_YIELD_MS: &str = "reconcile_commit_yield_ms";

    // 手动搜索
    pub const MANUAL_SEARCH_LIMIT: &str = "reconcile_manual_search_limit";
}
