pub mod clock;
pub mod url_validator;

use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::{LinkstatError, Result};

/// 短码最大长度
pub const MAX_SHORT_CODE_LEN: usize = 128;

/// 短码只允许字母、数字和连字符
#[inline]
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_SHORT_CODE_LEN
        && code.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// 规范化用户输入的短码：去掉首尾空白和一个 `/`
pub fn normalize_short_code(raw: &str) -> String {
    raw.trim().replacen('/', "", 1)
}

/// 解析时间，支持 RFC3339 和 YYYY-MM-DD（按 UTC 零点）
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| LinkstatError::date_parse(format!("Invalid date: {}", s)))
}
