//! 访问记录
//!
//! 单次访问对统计记录的状态变更：总访问数、按日点击数、按 IP 访问数，
//! 以及首次出现的 IP 计入独立访客。

use chrono::{DateTime, NaiveDate, Utc};
use tracing::trace;

use super::record::{AnalyticsRecord, LinkStats};

/// 无法确定来源地址时使用的占位 IP
pub const UNKNOWN_IP: &str = "unknown";

/// 时间戳对应的日期键（UTC）
///
/// 写入 `daily_clicks` 和聚合读取都必须使用同一约定。
#[inline]
pub fn day_key(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// 单次访问的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitKind {
    /// 该 IP 第一次访问此记录
    FirstVisit,
    Repeat,
}

pub struct VisitRecorder;

impl VisitRecorder {
    /// 记录一次访问
    ///
    /// 只修改传入的记录，持久化由调用方负责。
    pub fn record(record: &mut AnalyticsRecord, source_ip: &str, now: DateTime<Utc>) -> VisitKind {
        let ip = normalize_ip(source_ip);

        record.total_visits += 1;
        *record.daily_clicks.entry(day_key(now)).or_insert(0) += 1;

        let kind = match record.visits_by_ip.get_mut(ip) {
            Some(count) => {
                *count += 1;
                VisitKind::Repeat
            }
            None => {
                record.visits_by_ip.insert(ip.to_string(), 1);
                record.unique_visitors += 1;
                VisitKind::FirstVisit
            }
        };

        trace!(
            "VisitRecorder: {} visit from {} to {}",
            if kind == VisitKind::FirstVisit { "first" } else { "repeat" },
            ip,
            record.target_url
        );
        kind
    }

    /// 在统计文档上记录一次访问
    ///
    /// 文档级 `visits` 总会增加；只有存在与 `target_url` 匹配的记录时才会更新
    /// 记录级计数器，此时返回 `Some`。
    pub fn record_on(
        stats: &mut LinkStats,
        target_url: &str,
        source_ip: &str,
        now: DateTime<Utc>,
    ) -> Option<VisitKind> {
        stats.visits += 1;
        let record = stats.active_record_mut(target_url)?;
        Some(Self::record(record, source_ip, now))
    }
}

#[inline]
fn normalize_ip(source_ip: &str) -> &str {
    let ip = source_ip.trim();
    if ip.is_empty() { UNKNOWN_IP } else { ip }
}
