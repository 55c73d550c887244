// ==========================================
// 通讯录对账系统 - 标准地址 Repository 实现
// ==========================================
// 职责: 实现标准地址数据访问（使用 rusqlite）
// 约束: 每次 upsert_phones 调用在一个事务内完成
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::master::{MasterRecordEntity, PhoneSlots, PhoneUpdate};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::master_record_repo::MasterRecordRepository;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = "id, address, match_business, match_home, match_mobile";

fn map_entity(row: &Row<'_>) -> rusqlite::Result<MasterRecordEntity> {
    Ok(MasterRecordEntity {
        id: row.get(0)?,
        address: row.get(1)?,
        phones: PhoneSlots {
            match_business: row.get(2)?,
            match_home: row.get(3)?,
            match_mobile: row.get(4)?,
        },
    })
}

// ==========================================
// MasterRecordRepositoryImpl
// ==========================================
pub struct MasterRecordRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl MasterRecordRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建（共享连接场景）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        {
            let conn = repo.get_conn()?;
            init_schema(&conn)?;
        }
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量写入标准地址（INSERT OR REPLACE）
    ///
    /// 标准地址由外部维护，此方法用于初始化与测试数据准备
    pub fn insert_master_records(&self, records: &[MasterRecordEntity]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR REPLACE INTO master_records (
                    id, address, match_business, match_home, match_mobile, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;
            let now = Utc::now().to_rfc3339();
            for record in records {
                stmt.execute(params![
                    record.id,
                    record.address,
                    record.phones.match_business,
                    record.phones.match_home,
                    record.phones.match_mobile,
                    now,
                ])?;
            }
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(records.len())
    }

    /// 按 id 查询
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<MasterRecordEntity>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM master_records WHERE id = ?1", SELECT_COLUMNS);
        let entity = conn.query_row(&sql, params![id], map_entity).optional()?;
        Ok(entity)
    }

    /// 统计已回写任一电话字段的记录数
    pub fn count_with_phones(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM master_records
            WHERE match_business IS NOT NULL
               OR match_home IS NOT NULL
               OR match_mobile IS NOT NULL
            "#,
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[async_trait]
impl MasterRecordRepository for MasterRecordRepositoryImpl {
    async fn find_by_address_pattern(
        &self,
        pattern: &str,
    ) -> RepositoryResult<Vec<MasterRecordEntity>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM master_records WHERE address LIKE ?1",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![pattern], map_entity)?;

        let mut entities = Vec::new();
        for row in rows {
            entities.push(row?);
        }
        Ok(entities)
    }

    async fn upsert_phones(&self, updates: Vec<PhoneUpdate>) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO master_records (
                    id, match_business, match_home, match_mobile, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    match_business = excluded.match_business,
                    match_home = excluded.match_home,
                    match_mobile = excluded.match_mobile,
                    updated_at = excluded.updated_at
                "#,
            )?;
            let now = Utc::now().to_rfc3339();
            for update in &updates {
                stmt.execute(params![
                    update.id,
                    update.phones.match_business,
                    update.phones.match_home,
                    update.phones.match_mobile,
                    now,
                ])?;
                count += 1;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str, address: &str) -> MasterRecordEntity {
        MasterRecordEntity {
            id: id.to_string(),
            address: address.to_string(),
            phones: PhoneSlots::default(),
        }
    }

    fn memory_repo() -> MasterRecordRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        MasterRecordRepositoryImpl::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_find_by_address_pattern() {
        let repo = memory_repo();
        repo.insert_master_records(&[
            entity("m1", "宜川路413弄10号101室"),
            entity("m2", "宜川路414弄1号101室"),
            entity("m3", "甘泉三村5号101室"),
        ])
        .unwrap();

        let lane = repo.find_by_address_pattern("%413弄%").await.unwrap();
        assert_eq!(lane.len(), 1);
        assert_eq!(lane[0].id, "m1");

        let sancun = repo.find_by_address_pattern("甘泉三村%").await.unwrap();
        assert_eq!(sancun.len(), 1);
        assert_eq!(sancun[0].id, "m3");
    }

    #[tokio::test]
    async fn test_upsert_phones_overwrites_by_id() {
        let repo = memory_repo();
        repo.insert_master_records(&[entity("m1", "宜川路413弄10号101室")])
            .unwrap();

        let written = repo
            .upsert_phones(vec![PhoneUpdate {
                id: "m1".to_string(),
                phones: PhoneSlots::from_phones(&["13812345678".to_string()]),
            }])
            .await
            .unwrap();
        assert_eq!(written, 1);

        let stored = repo.find_by_id("m1").unwrap().unwrap();
        assert_eq!(stored.address, "宜川路413弄10号101室");
        assert_eq!(stored.phones.match_business.as_deref(), Some("13812345678"));
        assert_eq!(stored.phones.match_home, None);
        assert_eq!(repo.count_with_phones().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_phones_inserts_unknown_id() {
        let repo = memory_repo();
        repo.upsert_phones(vec![PhoneUpdate {
            id: "new".to_string(),
            phones: PhoneSlots::from_phones(&["021-88776655".to_string()]),
        }])
        .await
        .unwrap();

        let stored = repo.find_by_id("new").unwrap().unwrap();
        assert_eq!(stored.address, "");
        assert_eq!(stored.phones.match_business.as_deref(), Some("021-88776655"));
    }
}
