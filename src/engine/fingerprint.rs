// ==========================================
// 通讯录对账系统 - 地址指纹生成器
// ==========================================
// 职责: 自由文本地址 → 规范指纹 `<弄>-<号>-<室><后缀>`
// 输入: 任意文本（可为空）
// 输出: 指纹字符串；无法提取结构时返回空串
// 红线: 纯函数，无副作用；指纹相等是唯一的自动匹配依据
// ==========================================

use crate::domain::types::markers;
use regex::Regex;

lazy_static::lazy_static! {
    /// 专有小区单元号：简码或 "三村" 之后的第一段数字
    static ref SANCUN_UNIT_RE: Regex = Regex::new(r"(?:G3|三村)[^0-9]*([0-9]+)").unwrap();
    /// 专有小区余量中的装饰词
    static ref SANCUN_DECOR_RE: Regex = Regex::new(r"号|-|室|层|座").unwrap();
    /// 专有小区余量必须整体是 <数字><字母/甲乙>
    static ref SANCUN_ROOM_RE: Regex = Regex::new(r"^([0-9]*)([A-Z甲乙]*)$").unwrap();

    static ref LANE_RE: Regex = Regex::new(r"([0-9]+)弄").unwrap();
    static ref NUMBER_RE: Regex = Regex::new(r"([0-9]+)号").unwrap();
    /// 分段符: `-` / `—` / `/`
    static ref SEGMENT_RE: Regex = Regex::new(r"[-\x{2014}/]").unwrap();
    /// 室号余量中的装饰词（含备注类词如 房东/托/中介）
    static ref ROOM_DECOR_RE: Regex = Regex::new(r"室|层|座|房东|托|中介").unwrap();
    static ref ROOM_RE: Regex = Regex::new(r"^([0-9]*)([A-Z甲乙]*)").unwrap();
}

/// 生成地址指纹
///
/// # 规则
/// 1. 去首尾空白、去全部空白、转大写
/// 2. 含专有小区名或以其简码开头 → `G3-<单元>-<室><后缀>`
/// 3. 其他 → `<弄>-<号>-<室><后缀>`，弄与号缺一则返回空串
///
/// # 示例
/// ```
/// use sgcc_reconcile::engine::fingerprint::generate_fingerprint;
/// assert_eq!(generate_fingerprint("宜川路413弄10号101室"), "413-10-101");
/// ```
pub fn generate_fingerprint(raw: &str) -> String {
    let s: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if s.is_empty() {
        return String::new();
    }

    if s.contains(markers::GANQUAN_SANCUN) || s.starts_with(markers::GANQUAN_SANCUN_CODE) {
        return sancun_fingerprint(&s);
    }

    lane_fingerprint(&s)
}

/// 专有小区分支
fn sancun_fingerprint(s: &str) -> String {
    let unit = match SANCUN_UNIT_RE.captures(s).and_then(|caps| caps.get(1)) {
        Some(m) => m,
        // 没有单元号则无法构成结构化指纹
        None => return String::new(),
    };

    let remain = SANCUN_DECOR_RE.replace_all(&s[unit.end()..], "");
    let (room, suffix) = match SANCUN_ROOM_RE.captures(&remain) {
        Some(caps) => (caps[1].to_string(), caps[2].to_string()),
        None => (String::new(), String::new()),
    };

    let key = format!(
        "{}-{}-{}{}",
        markers::GANQUAN_SANCUN_CODE,
        unit.as_str(),
        room,
        suffix
    );
    match key.strip_suffix('-') {
        Some(trimmed) => trimmed.to_string(),
        None => key,
    }
}

/// 普通弄号分支
fn lane_fingerprint(s: &str) -> String {
    let segments: Vec<&str> = SEGMENT_RE.split(s).collect();

    let lane = LANE_RE
        .captures(s)
        .map(|caps| caps[1].to_string())
        .or_else(|| {
            (segments.len() >= 2 && is_ascii_digits(segments[0])).then(|| segments[0].to_string())
        });

    let number = match NUMBER_RE.captures(s) {
        Some(caps) => Some(caps[1].to_string()),
        None if !s.contains('号') && lane.is_some() && segments.len() >= 2 => {
            Some(segments[1].to_string()).filter(|n| !n.is_empty())
        }
        None => None,
    };

    let (lane, number) = match (lane, number) {
        (Some(lane), Some(number)) => (lane, number),
        _ => return String::new(),
    };

    let (room, suffix) = split_room(&room_remainder(s, &segments));
    format!("{}-{}-{}{}", lane, number, room, suffix)
}

/// 取室号余量
///
/// 有 室/层/号 标记时取最后一个 "号" 之后的部分，否则取第三段起的全部分段
fn room_remainder(s: &str, segments: &[&str]) -> String {
    if s.contains('室') || s.contains('层') || s.contains('号') {
        s.rfind('号')
            .map(|idx| s[idx + '号'.len_utf8()..].to_string())
            .unwrap_or_default()
    } else if segments.len() >= 3 {
        segments[2..].concat()
    } else {
        String::new()
    }
}

/// 余量 → (前导数字, 字母/甲乙后缀)
fn split_room(remainder: &str) -> (String, String) {
    let cleaned = ROOM_DECOR_RE.replace_all(remainder, "");
    match ROOM_RE.captures(&cleaned) {
        Some(caps) => (caps[1].to_string(), caps[2].to_string()),
        None => (String::new(), String::new()),
    }
}

fn is_ascii_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
