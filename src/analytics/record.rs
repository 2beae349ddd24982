//! 访问统计数据模型
//!
//! 每个短链接对应一个 `LinkStats` 文档，文档中按创建顺序保存该短链接的
//! 全部 `AnalyticsRecord`（同一短码被重新创建时追加新记录）。

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 单次短链接创建对应的统计记录
///
/// 序列化字段名与旧版 JSON 文件兼容：`url` / `created` / `visits` /
/// `uniques` / `ips` 在读取时作为别名接受。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRecord {
    #[serde(alias = "url")]
    pub target_url: String,
    #[serde(alias = "created")]
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "visits")]
    pub total_visits: u64,
    #[serde(default, alias = "uniques")]
    pub unique_visitors: u64,
    #[serde(default, rename = "visitsByIP", alias = "ips")]
    pub visits_by_ip: BTreeMap<String, u64>,
    /// 稀疏的按日点击数，缺失的日期视为 0
    #[serde(default)]
    pub daily_clicks: BTreeMap<NaiveDate, u64>,
}

impl AnalyticsRecord {
    /// 创建计数器归零的新记录
    pub fn new(target_url: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            target_url: target_url.into(),
            created_at,
            total_visits: 0,
            unique_visitors: 0,
            visits_by_ip: BTreeMap::new(),
            daily_clicks: BTreeMap::new(),
        }
    }

    /// `[start, end)` 区间内的点击总数
    pub fn clicks_between(&self, start: NaiveDate, end: NaiveDate) -> u64 {
        if start >= end {
            return 0;
        }
        self.daily_clicks.range(start..end).map(|(_, c)| *c).sum()
    }

    /// 所有按日点击数之和
    pub fn daily_clicks_total(&self) -> u64 {
        self.daily_clicks.values().sum()
    }

    /// `total_visits - Σ daily_clicks`
    ///
    /// Both counters are kept. `total_visits` feeds the summary table and
    /// `daily_clicks` feeds the chart, so a non-zero drift means the two views
    /// disagree (legacy data, or a write that only partially landed).
    pub fn click_drift(&self) -> i64 {
        self.total_visits as i64 - self.daily_clicks_total() as i64
    }

    /// `unique_visitors` 是否与 IP 表的键数量一致
    pub fn uniques_consistent(&self) -> bool {
        self.unique_visitors == self.visits_by_ip.len() as u64
    }
}

/// 单个短码的统计文档
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    /// 该短码所有记录的累计访问数
    #[serde(default)]
    pub visits: u64,
    /// 按创建时间排序的记录，最早的在前
    #[serde(default)]
    pub shorturls: Vec<AnalyticsRecord>,
}

impl LinkStats {
    pub fn with_record(record: AnalyticsRecord) -> Self {
        Self {
            visits: 0,
            shorturls: vec![record],
        }
    }

    pub fn push_record(&mut self, record: AnalyticsRecord) {
        self.shorturls.push(record);
    }

    /// 最近一次创建的记录
    pub fn current(&self) -> Option<&AnalyticsRecord> {
        self.shorturls.last()
    }

    /// 查找与当前目标地址匹配的最新记录
    pub fn active_record_mut(&mut self, target_url: &str) -> Option<&mut AnalyticsRecord> {
        self.shorturls
            .iter_mut()
            .rev()
            .find(|record| record.target_url == target_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_serialized_field_names() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut record = AnalyticsRecord::new("https://example.com", created);
        record.visits_by_ip.insert("1.1.1.1".into(), 2);
        record.daily_clicks.insert(date(2024, 1, 1), 2);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["targetUrl"], "https://example.com");
        assert_eq!(value["createdAt"], "2024-01-01T00:00:00Z");
        assert_eq!(value["visitsByIP"]["1.1.1.1"], 2);
        assert_eq!(value["dailyClicks"]["2024-01-01"], 2);
        assert_eq!(value["totalVisits"], 0);
        assert_eq!(value["uniqueVisitors"], 0);
    }

    #[test]
    fn test_legacy_document_is_accepted() {
        let raw = r#"{
            "visits": 3,
            "shorturls": [{
                "url": "https://example.com",
                "created": "2024-03-01T10:20:30.000Z",
                "visits": 3,
                "uniques": 1,
                "ips": { "unknown": 3 },
                "dailyClicks": {}
            }]
        }"#;
        let stats: LinkStats = serde_json::from_str(raw).unwrap();
        let record = stats.current().unwrap();
        assert_eq!(record.target_url, "https://example.com");
        assert_eq!(record.total_visits, 3);
        assert_eq!(record.visits_by_ip.get("unknown"), Some(&3));
        assert_eq!(record.click_drift(), 3);
        assert!(record.uniques_consistent());
    }

    #[test]
    fn test_active_record_prefers_latest_match() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut stats = LinkStats::with_record(AnalyticsRecord::new("https://a.example", created));
        stats.push_record(AnalyticsRecord::new("https://b.example", created));
        stats.push_record(AnalyticsRecord::new("https://a.example", created));

        stats.active_record_mut("https://a.example").unwrap().total_visits = 7;
        assert_eq!(stats.shorturls[0].total_visits, 0);
        assert_eq!(stats.shorturls[2].total_visits, 7);
        assert!(stats.active_record_mut("https://c.example").is_none());
    }

    #[test]
    fn test_clicks_between_is_half_open() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut record = AnalyticsRecord::new("https://example.com", created);
        record.daily_clicks.insert(date(2024, 1, 1), 1);
        record.daily_clicks.insert(date(2024, 1, 7), 2);
        record.daily_clicks.insert(date(2024, 1, 8), 4);

        assert_eq!(record.clicks_between(date(2024, 1, 1), date(2024, 1, 8)), 3);
        assert_eq!(record.clicks_between(date(2024, 1, 8), date(2024, 1, 1)), 0);
        assert_eq!(record.daily_clicks_total(), 7);
    }
}
