// ==========================================
// 对账会话端到端测试
// ==========================================
// 测试目标: CSV 导入 → 区块拉取 → 人工核对 → 分批提交 → SQLite 落库
// ==========================================

mod test_helpers;

use sgcc_reconcile::api::{ApiError, ReconcileApi};
use sgcc_reconcile::config::config_keys;
use sgcc_reconcile::domain::MatchStatus;
use sgcc_reconcile::engine::CommitError;
use sgcc_reconcile::logging;
use sgcc_reconcile::repository::MasterRecordRepositoryImpl;

fn seed_default(db_path: &str) {
    test_helpers::seed_master_records(
        db_path,
        &[
            ("m1", "宜川路413弄10号101室"),
            ("m2", "宜川路413弄10号102室"),
            ("m3", "宜川路413弄10号103室"),
            ("g1", "甘泉三村5号201室"),
            ("x1", "延长路1号"),
        ],
    )
    .unwrap();
}

#[tokio::test]
async fn test_full_session_commits_to_sqlite() {
    logging::init_test();
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    seed_default(&db_path);

    let csv = test_helpers::write_contact_csv(&[
        "413-10-101 张 13812345678,,,",
        "413-10-102 李 13900000001,,,",
        "413-10-102 王 13900000002,,,",
        ",13800000000,,",
        "甘泉三村5号201室,021-55556666,,",
    ])
    .unwrap();

    let mut api = ReconcileApi::open(&db_path).await.unwrap();
    let summary = api.import_file(csv.path()).await.unwrap();

    assert_eq!(summary.message, "检测到区块: 413弄, 甘泉三村");
    assert_eq!(summary.row_count, 4);
    assert_eq!(summary.skipped_rows, 1);
    assert_eq!(summary.master_count, 4);
    assert!(summary.failed_blocks.is_empty());
    assert_eq!(summary.counts.success, 2);
    assert_eq!(summary.counts.conflict, 1);
    assert_eq!(summary.counts.empty, 1);

    // 源单元格保留，不参与匹配
    let g3_row = api.working_set().index().get("excel_4").unwrap();
    assert_eq!(g3_row.source_cells[0], "021-55556666");
    assert!(g3_row.phones.is_empty());

    api.select_match("m2", "excel_2").unwrap();
    api.rollback("g1").unwrap();

    let mut percents = Vec::new();
    let result = api.commit(|p| percents.push(p.percent)).await.unwrap();
    assert_eq!(result.committed, 2);
    assert_eq!(result.message, "成功写入 2 条数据");
    assert_eq!(percents, vec![100]);

    let repo = MasterRecordRepositoryImpl::new(&db_path).unwrap();
    let m1 = repo.find_by_id("m1").unwrap().unwrap();
    assert_eq!(m1.phones.match_business.as_deref(), Some("13812345678"));
    let m2 = repo.find_by_id("m2").unwrap().unwrap();
    assert_eq!(m2.phones.match_business.as_deref(), Some("13900000002"));
    assert_eq!(m2.address, "宜川路413弄10号102室");
    assert_eq!(repo.count_with_phones().unwrap(), 2);
    assert_eq!(api.stored_phone_count().unwrap(), 2);

    let pending: Vec<&str> = api.pending().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(pending.len(), 2);
    assert!(pending.contains(&"m3"));
    assert!(pending.contains(&"g1"));
    assert!(api.succeeded().is_empty());
}

#[tokio::test]
async fn test_commit_chunk_size_from_config() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let masters: Vec<(String, String)> = (1..=5)
        .map(|i| (format!("m{}", i), format!("宜川路413弄{}号101室", i)))
        .collect();
    let refs: Vec<(&str, &str)> = masters
        .iter()
        .map(|(id, addr)| (id.as_str(), addr.as_str()))
        .collect();
    test_helpers::seed_master_records(&db_path, &refs).unwrap();
    test_helpers::set_config(&db_path, config_keys::COMMIT_CHUNK_SIZE, "2").unwrap();
    test_helpers::set_config(&db_path, config_keys::COMMIT_YIELD_MS, "0").unwrap();

    let rows: Vec<String> = (1..=5)
        .map(|i| format!("413-{}-101 张 1380000000{},,,", i, i))
        .collect();
    let row_refs: Vec<&str> = rows.iter().map(|r| r.as_str()).collect();
    let csv = test_helpers::write_contact_csv(&row_refs).unwrap();

    let mut api = ReconcileApi::open(&db_path).await.unwrap();
    assert_eq!(api.settings().commit_chunk_size, 2);

    let summary = api.import_file(csv.path()).await.unwrap();
    assert_eq!(summary.counts.success, 5);

    let mut progress = Vec::new();
    let result = api
        .commit(|p| progress.push((p.chunks_done, p.percent, p.records_done)))
        .await
        .unwrap();

    assert_eq!(result.chunks, 3);
    assert_eq!(progress, vec![(1, 34, 2), (2, 67, 4), (3, 100, 5)]);
    assert_eq!(api.commit_progress(), 0);

    let repo = MasterRecordRepositoryImpl::new(&db_path).unwrap();
    assert_eq!(repo.count_with_phones().unwrap(), 5);
}

#[tokio::test]
async fn test_overlapping_blocks_fetch_each_record_once() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    test_helpers::seed_master_records(
        &db_path,
        &[("z1", "志丹路413弄1号101室"), ("z2", "志丹路100号")],
    )
    .unwrap();

    let csv = test_helpers::write_contact_csv(&["413-1-101,,,", "志丹路100号,,,"]).unwrap();

    let mut api = ReconcileApi::open(&db_path).await.unwrap();
    let summary = api.import_file(csv.path()).await.unwrap();

    assert_eq!(summary.blocks, vec!["413弄".to_string(), "志丹路片区".to_string()]);
    assert_eq!(summary.master_count, 2);
    let z1 = api.working_set().get("z1").unwrap();
    assert_eq!(z1.status(), MatchStatus::Success);
    assert_eq!(z1.selected_row_id(), Some("excel_0"));
}

#[tokio::test]
async fn test_commit_without_success_is_notice() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    seed_default(&db_path);
    let csv = test_helpers::write_contact_csv(&["413-10-109,,,"]).unwrap();

    let mut api = ReconcileApi::open(&db_path).await.unwrap();
    api.import_file(csv.path()).await.unwrap();

    let err = api.commit(|_| {}).await.unwrap_err();
    assert!(matches!(err, ApiError::Commit(CommitError::NothingToCommit)));
    assert!(err.is_notice());
}

#[tokio::test]
async fn test_failed_import_keeps_previous_session() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    seed_default(&db_path);
    let csv = test_helpers::write_contact_csv(&["413-10-101,,,"]).unwrap();

    let mut api = ReconcileApi::open(&db_path).await.unwrap();
    api.import_file(csv.path()).await.unwrap();
    let before = api.status_counts();

    let err = api.import_file("missing_contacts.csv").await.unwrap_err();
    assert!(matches!(err, ApiError::Import(_)));
    assert_eq!(api.status_counts(), before);
}
