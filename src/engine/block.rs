// ==========================================
// 通讯录对账系统 - 区块分类器
// ==========================================
// 职责: 自由文本 → 粗粒度区块，用于缩小标准地址查询范围
// 说明: 属于查询优化，不影响匹配正确性
// ==========================================

use crate::domain::types::{markers, Block};
use regex::Regex;
use std::collections::HashSet;

lazy_static::lazy_static! {
    static ref LEADING_LANE_RE: Regex = Regex::new(r"^([0-9]+)[-\x{2014}/]").unwrap();
}

/// 判定区块
///
/// # 优先级
/// 1. 专有小区名/简码 → 甘泉三村
/// 2. 命名道路 → 志丹路片区
/// 3. 开头 `<数字><分段符>` → `<数字>弄`
/// 4. 其他
pub fn detect_block(text: &str) -> Block {
    let s = text.trim();

    if s.starts_with(markers::GANQUAN_SANCUN_CODE) || s.contains(markers::GANQUAN_SANCUN) {
        return Block::GanquanSancun;
    }
    if s.contains(markers::ZHIDAN_ROAD) {
        return Block::ZhidanRoad;
    }
    if let Some(caps) = LEADING_LANE_RE.captures(s) {
        return Block::Lane(caps[1].to_string());
    }
    Block::Other
}

/// 汇总一批文本检测到的可查询区块（按首次出现顺序去重，排除 "其他"）
pub fn collect_blocks<'a, I>(texts: I) -> Vec<Block>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    texts
        .into_iter()
        .map(detect_block)
        .filter(|b| !b.is_other() && seen.insert(b.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_sancun() {
        assert_eq!(detect_block("G3-5-101"), Block::GanquanSancun);
        assert_eq!(detect_block("  甘泉三村5号101室"), Block::GanquanSancun);
    }

    #[test]
    fn test_detect_named_road() {
        assert_eq!(detect_block("志丹路150弄3号"), Block::ZhidanRoad);
    }

    #[test]
    fn test_detect_leading_lane() {
        assert_eq!(detect_block("413-10-101"), Block::Lane("413".to_string()));
        assert_eq!(detect_block("413/10"), Block::Lane("413".to_string()));
        assert_eq!(detect_block("413—10"), Block::Lane("413".to_string()));
    }

    #[test]
    fn test_detect_other() {
        assert_eq!(detect_block("宜川路413弄10号101室"), Block::Other);
        assert_eq!(detect_block("413"), Block::Other);
        assert_eq!(detect_block(""), Block::Other);
    }

    #[test]
    fn test_sancun_takes_priority_over_lane() {
        assert_eq!(detect_block("G3-413-101"), Block::GanquanSancun);
    }

    #[test]
    fn test_collect_blocks_distinct_without_other() {
        let blocks = collect_blocks(["413-10-101", "413-11-202", "王先生", "G3-5-101"]);
        assert_eq!(
            blocks,
            vec![Block::Lane("413".to_string()), Block::GanquanSancun]
        );
    }

    #[test]
    fn test_collect_blocks_keeps_first_seen_order() {
        let blocks = collect_blocks(["志丹路100号", "G3-5-101", "414-1-101", "志丹路1号", "413-2"]);
        assert_eq!(
            blocks,
            vec![
                Block::ZhidanRoad,
                Block::GanquanSancun,
                Block::Lane("414".to_string()),
                Block::Lane("413".to_string()),
            ]
        );
    }
}
