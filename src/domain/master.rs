// ==========================================
// 通讯录对账系统 - 标准地址领域模型
// ==========================================
// 职责: MasterRecord 及其匹配状态机
// 状态: empty ⇄ conflict (拉取时) / empty|conflict → success / success → empty
// ==========================================

use crate::domain::contact::ImportedRow;
use crate::domain::types::MatchStatus;
use serde::{Deserialize, Serialize, Serializer};

// ==========================================
// PhoneSlots - 三个固定电话字段
// ==========================================
// 对齐: master_records 表 match_business / match_home / match_mobile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneSlots {
    pub match_business: Option<String>,
    pub match_home: Option<String>,
    pub match_mobile: Option<String>,
}

impl PhoneSlots {
    /// 按顺序把前三个电话填入三个字段，缺失为 None
    pub fn from_phones(phones: &[String]) -> Self {
        Self {
            match_business: phones.first().cloned(),
            match_home: phones.get(1).cloned(),
            match_mobile: phones.get(2).cloned(),
        }
    }
}

// ==========================================
// PhoneUpdate - 提交载荷
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneUpdate {
    pub id: String,
    #[serde(flatten)]
    pub phones: PhoneSlots,
}

// ==========================================
// MasterRecordEntity - 持久层标准地址行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterRecordEntity {
    pub id: String,
    pub address: String,
    #[serde(flatten)]
    pub phones: PhoneSlots,
}

// ==========================================
// MatchState - 匹配状态机
// ==========================================
// success 恰好持有一条被选中的行；conflict 至少两条且无选中
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MatchState {
    Empty,
    Success { row: ImportedRow },
    Conflict { rows: Vec<ImportedRow> },
}

impl MatchState {
    /// 根据指纹命中行数判定初始状态
    pub fn from_matches(mut rows: Vec<ImportedRow>) -> Self {
        match rows.len() {
            0 => MatchState::Empty,
            1 => MatchState::Success { row: rows.remove(0) },
            _ => MatchState::Conflict { rows },
        }
    }

    pub fn status(&self) -> MatchStatus {
        match self {
            MatchState::Empty => MatchStatus::Empty,
            MatchState::Success { .. } => MatchStatus::Success,
            MatchState::Conflict { .. } => MatchStatus::Conflict,
        }
    }

    pub fn matched_rows(&self) -> &[ImportedRow] {
        match self {
            MatchState::Empty => &[],
            MatchState::Success { row } => std::slice::from_ref(row),
            MatchState::Conflict { rows } => rows,
        }
    }

    pub fn selected_row(&self) -> Option<&ImportedRow> {
        match self {
            MatchState::Success { row } => Some(row),
            _ => None,
        }
    }
}

// ==========================================
// MasterRecord - 工作集中的标准地址
// ==========================================
// 序列化: 展开为 status / matched_rows / selected_row_id（界面渲染格式）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterRecord {
    pub id: String,
    pub address: String,
    pub fingerprint: String,
    pub current_phones: PhoneSlots, // 库中现有电话（展示用）
    pub state: MatchState,
    pub manual_candidates: Vec<ImportedRow>, // 手动搜索候选，自动匹配时清空
}

impl MasterRecord {
    pub fn status(&self) -> MatchStatus {
        self.state.status()
    }

    pub fn matched_rows(&self) -> &[ImportedRow] {
        self.state.matched_rows()
    }

    pub fn selected_row_id(&self) -> Option<&str> {
        self.state.selected_row().map(|r| r.id.as_str())
    }

    /// 展示列表：有手动候选时展示候选，否则展示匹配行
    pub fn display_rows(&self) -> &[ImportedRow] {
        if self.manual_candidates.is_empty() {
            self.matched_rows()
        } else {
            &self.manual_candidates
        }
    }

    /// 选中行对应的提交载荷
    pub fn to_phone_update(&self) -> Option<PhoneUpdate> {
        self.state.selected_row().map(|row| PhoneUpdate {
            id: self.id.clone(),
            phones: PhoneSlots::from_phones(&row.phones),
        })
    }
}

#[derive(Serialize)]
struct MasterRecordView<'a> {
    id: &'a str,
    address: &'a str,
    fingerprint: &'a str,
    current_phones: &'a PhoneSlots,
    status: MatchStatus,
    matched_rows: &'a [ImportedRow],
    selected_row_id: Option<&'a str>,
    manual_candidates: &'a [ImportedRow],
}

impl Serialize for MasterRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        MasterRecordView {
            id: &self.id,
            address: &self.address,
            fingerprint: &self.fingerprint,
            current_phones: &self.current_phones,
            status: self.status(),
            matched_rows: self.matched_rows(),
            selected_row_id: self.selected_row_id(),
            manual_candidates: &self.manual_candidates,
        }
        .serialize(serializer)
    }
}
