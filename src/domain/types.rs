// ==========================================
// 通讯录对账系统 - 领域类型定义
// ==========================================
// 职责: 匹配状态、区块划分等基础类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 区块标记常量
// ==========================================
pub mod markers {
    /// 专有小区名
    pub const GANQUAN_SANCUN: &str = "甘泉三村";
    /// 专有小区简码（地址以此开头）
    pub const GANQUAN_SANCUN_CODE: &str = "G3";
    /// 命名道路
    pub const ZHIDAN_ROAD: &str = "志丹路";
    /// 命名道路对应的区块名
    pub const ZHIDAN_ROAD_BLOCK: &str = "志丹路片区";
    /// 弄号区块后缀
    pub const LANE_SUFFIX: &str = "弄";
    /// 无法归类的区块名
    pub const OTHER_BLOCK: &str = "其他";
}

// ==========================================
// 匹配状态 (Match Status)
// ==========================================
// 序列化格式: lowercase (与前端一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Empty,    // 无数据
    Success,  // 已关联
    Conflict, // 多重冲突
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Empty => write!(f, "empty"),
            MatchStatus::Success => write!(f, "success"),
            MatchStatus::Conflict => write!(f, "conflict"),
        }
    }
}

// ==========================================
// 区块 (Block)
// ==========================================
// 用途: 缩小标准地址的远程查询范围
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Block {
    GanquanSancun,  // 甘泉三村
    ZhidanRoad,     // 志丹路片区
    Lane(String),   // <n>弄
    Other,          // 其他
}

impl Block {
    /// 区块展示名
    pub fn name(&self) -> String {
        match self {
            Block::GanquanSancun => markers::GANQUAN_SANCUN.to_string(),
            Block::ZhidanRoad => markers::ZHIDAN_ROAD_BLOCK.to_string(),
            Block::Lane(lane) => format!("{}{}", lane, markers::LANE_SUFFIX),
            Block::Other => markers::OTHER_BLOCK.to_string(),
        }
    }

    /// 该区块对应的地址 LIKE 模式
    ///
    /// # 返回
    /// - Some(pattern): 可查询区块
    /// - None: "其他" 区块，不发起查询
    pub fn address_pattern(&self) -> Option<String> {
        match self {
            Block::GanquanSancun => Some(format!("{}%", markers::GANQUAN_SANCUN)),
            Block::ZhidanRoad => Some(format!("{}%", markers::ZHIDAN_ROAD)),
            Block::Lane(lane) => Some(format!("%{}{}%", lane, markers::LANE_SUFFIX)),
            Block::Other => None,
        }
    }

    pub fn is_other(&self) -> bool {
        matches!(self, Block::Other)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
