// ==========================================
// 故障隔离测试
// ==========================================
// 测试目标:
// - 单个区块查询失败只跳过该区块
// - 分片写入失败后工作集不变，重试可完整提交
// ==========================================

use async_trait::async_trait;
use sgcc_reconcile::api::{ApiError, ReconcileApi};
use sgcc_reconcile::config::ReconcileSettings;
use sgcc_reconcile::domain::{MasterRecordEntity, PhoneSlots, PhoneUpdate};
use sgcc_reconcile::engine::CommitError;
use sgcc_reconcile::importer::RawRow;
use sgcc_reconcile::repository::{MasterRecordRepository, RepositoryError, RepositoryResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// 内存 Repository：可指定失败的查询模式与失败的写入调用序号
#[derive(Default)]
struct FlakyRepo {
    masters: Vec<MasterRecordEntity>,
    failing_pattern: Option<String>,
    fail_upsert_call: Option<usize>,
    upsert_calls: AtomicUsize,
    stored: Mutex<HashMap<String, PhoneSlots>>,
}

#[async_trait]
impl MasterRecordRepository for FlakyRepo {
    async fn find_by_address_pattern(
        &self,
        pattern: &str,
    ) -> RepositoryResult<Vec<MasterRecordEntity>> {
        if self.failing_pattern.as_deref() == Some(pattern) {
            return Err(RepositoryError::DatabaseQueryError("连接超时".to_string()));
        }
        let needle = pattern.trim_matches('%');
        Ok(self
            .masters
            .iter()
            .filter(|m| m.address.contains(needle))
            .cloned()
            .collect())
    }

    async fn upsert_phones(&self, updates: Vec<PhoneUpdate>) -> RepositoryResult<usize> {
        let call = self.upsert_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_upsert_call == Some(call) {
            return Err(RepositoryError::DatabaseTransactionError("写入中断".to_string()));
        }
        let n = updates.len();
        let mut stored = self.stored.lock().unwrap();
        for update in updates {
            stored.insert(update.id, update.phones);
        }
        Ok(n)
    }
}

fn master(id: &str, address: &str) -> MasterRecordEntity {
    MasterRecordEntity {
        id: id.to_string(),
        address: address.to_string(),
        phones: PhoneSlots::default(),
    }
}

fn raw(text: &str) -> RawRow {
    vec![text.to_string()]
}

fn settings(chunk: usize) -> ReconcileSettings {
    ReconcileSettings {
        commit_chunk_size: chunk,
        commit_yield_ms: 0,
        manual_search_limit: 10,
    }
}

#[tokio::test]
async fn test_failed_block_is_skipped() {
    let repo = Arc::new(FlakyRepo {
        masters: vec![
            master("m1", "宜川路413弄10号101室"),
            master("g1", "甘泉三村5号201室"),
        ],
        failing_pattern: Some("甘泉三村%".to_string()),
        ..Default::default()
    });
    let mut api = ReconcileApi::new(repo, settings(50));

    let summary = api
        .import_rows(vec![raw("413-10-101"), raw("G3-5-201")])
        .await;

    assert_eq!(summary.failed_blocks, vec!["甘泉三村".to_string()]);
    assert_eq!(summary.master_count, 1);
    assert!(api.working_set().get("m1").is_some());
    assert!(api.working_set().get("g1").is_none());
}

#[tokio::test]
async fn test_chunk_failure_then_retry_commits_everything() {
    let masters: Vec<MasterRecordEntity> = (1..=5)
        .map(|i| master(&format!("m{}", i), &format!("宜川路413弄{}号101室", i)))
        .collect();
    let repo = Arc::new(FlakyRepo {
        masters,
        fail_upsert_call: Some(2),
        ..Default::default()
    });
    let mut api = ReconcileApi::new(repo.clone(), settings(2));

    let rows = (1..=5)
        .map(|i| raw(&format!("413-{}-101 张 1380000000{}", i, i)))
        .collect();
    api.import_rows(rows).await;
    assert_eq!(api.status_counts().success, 5);

    let err = api.commit(|_| {}).await.unwrap_err();
    match err {
        ApiError::Commit(CommitError::ChunkFailed {
            chunk_number,
            committed,
            ..
        }) => {
            assert_eq!(chunk_number, 2);
            assert_eq!(committed, 2);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(repo.stored.lock().unwrap().len(), 2);
    assert_eq!(api.status_counts().success, 5);
    assert!(!api.is_committing());

    // 重试：已写入的记录再次覆盖写入
    let result = api.commit(|_| {}).await.unwrap();
    assert_eq!(result.committed, 5);
    assert_eq!(repo.stored.lock().unwrap().len(), 5);
    assert_eq!(
        repo.stored.lock().unwrap()["m3"].match_business.as_deref(),
        Some("13800000003")
    );
    assert!(api.working_set().is_empty());
}
