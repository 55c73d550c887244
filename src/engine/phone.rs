// ==========================================
// 通讯录对账系统 - 电话提取器
// ==========================================
// 职责: 自由文本 → 有序去重的候选电话（最多 3 个）
// 形态: 11 位连续数字 / 3-4 位区号-7-8 位号码
// 红线: 不校验号段真实性
// ==========================================

use regex::Regex;

/// 每行最多保留的电话数（对应三个固定回写字段）
pub const MAX_PHONES: usize = 3;

lazy_static::lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"[0-9]{11}|[0-9]{3,4}-[0-9]{7,8}").unwrap();
}

/// 提取电话
///
/// 保持首次出现顺序，按字符串精确去重，截断为前 3 个
pub fn extract_phones(text: &str) -> Vec<String> {
    let mut phones: Vec<String> = Vec::with_capacity(MAX_PHONES);
    for m in PHONE_RE.find_iter(text) {
        if phones.iter().any(|p| p == m.as_str()) {
            continue;
        }
        phones.push(m.as_str().to_string());
        if phones.len() == MAX_PHONES {
            break;
        }
    }
    phones
}
