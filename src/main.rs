// ==========================================
// 通讯录对账系统 - 命令行入口
// ==========================================
// 用法: sgcc-reconcile <通讯录文件> [数据库路径]
// 流程: 导入 → 拉取标准地址 → 输出状态统计 → 提交全部自动匹配成功的记录
// ==========================================

use anyhow::{bail, Context, Result};
use sgcc_reconcile::api::ReconcileApi;
use sgcc_reconcile::db::get_default_db_path;
use sgcc_reconcile::logging;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let file_path = match args.next() {
        Some(path) => path,
        None => bail!("用法: sgcc-reconcile <通讯录文件> [数据库路径]"),
    };
    let db_path = args.next().unwrap_or_else(get_default_db_path);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", sgcc_reconcile::APP_NAME, sgcc_reconcile::VERSION);
    tracing::info!("使用数据库: {}", db_path);
    tracing::info!("==================================================");

    let mut api = ReconcileApi::open(&db_path)
        .await
        .with_context(|| format!("无法打开数据库: {}", db_path))?;

    let summary = api
        .import_file(&file_path)
        .await
        .with_context(|| format!("导入失败: {}", file_path))?;

    println!("{}", summary.message);
    println!(
        "导入 {} 行（跳过 {} 行），标准地址 {} 条",
        summary.row_count, summary.skipped_rows, summary.master_count
    );
    if !summary.failed_blocks.is_empty() {
        println!("以下区块查询失败，已跳过: {}", summary.failed_blocks.join(", "));
    }
    println!(
        "匹配成功 {} / 冲突 {} / 未匹配 {}",
        summary.counts.success, summary.counts.conflict, summary.counts.empty
    );

    match api
        .commit(|p| println!("提交进度 {}% ({}/{})", p.percent, p.chunks_done, p.total_chunks))
        .await
    {
        Ok(result) => println!("{}", result.message),
        Err(e) if e.is_notice() => println!("{}", e),
        Err(e) => return Err(e).context("提交失败"),
    }

    println!("库中已有电话的标准地址 {} 条", api.stored_phone_count()?);

    let counts = api.status_counts();
    if counts.pending() > 0 {
        println!("仍有 {} 条待人工核对", counts.pending());
    }

    Ok(())
}
