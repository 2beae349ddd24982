//! Stats service layer
//!
//! Owns the analytics read-modify-write cycle and the chart query:
//! - every mutation of a `LinkStats` document runs under a per-short-code lock
//! - stats queries select a granularity per record and aggregate its buckets

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::analytics::{
    AggregatedBucket, AnalyticsRecord, Granularity, GranularityThresholds, LinkStats, VisitKind,
    VisitRecorder, aggregate,
};
use crate::errors::Result;
use crate::storage::{KeyLocks, RecordStore};

/// 一次访问写入统计后的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    Recorded(VisitKind),
    /// 文档中没有与当前目标匹配的记录，只累计了文档级访问数
    Unmatched,
    /// 没有统计文档，未写入
    NoDocument,
}

/// 单条记录的统计报告
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordReport {
    pub target_url: String,
    pub created_at: DateTime<Utc>,
    pub total_visits: u64,
    pub unique_visitors: u64,
    #[serde(rename = "visitsByIP")]
    pub visits_by_ip: BTreeMap<String, u64>,
    pub granularity: Granularity,
    pub buckets: Vec<AggregatedBucket>,
    /// `total_visits - Σ daily_clicks`
    pub click_drift: i64,
}

/// 短码的统计报告
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub short_code: String,
    pub visits: u64,
    pub records: Vec<RecordReport>,
}

impl RecordReport {
    fn build(
        record: &AnalyticsRecord,
        thresholds: &GranularityThresholds,
        now: DateTime<Utc>,
        forced: Option<Granularity>,
    ) -> Self {
        let granularity = forced.unwrap_or_else(|| thresholds.select(record.created_at, now));
        let click_drift = record.click_drift();
        if click_drift != 0 {
            warn!(
                "Stats for {} drift from daily clicks by {} (total {}, daily {})",
                record.target_url,
                click_drift,
                record.total_visits,
                record.daily_clicks_total()
            );
        }
        if !record.uniques_consistent() {
            warn!(
                "Stats for {} report {} unique visitors but {} distinct IPs",
                record.target_url,
                record.unique_visitors,
                record.visits_by_ip.len()
            );
        }

        Self {
            target_url: record.target_url.clone(),
            created_at: record.created_at,
            total_visits: record.total_visits,
            unique_visitors: record.unique_visitors,
            visits_by_ip: record.visits_by_ip.clone(),
            granularity,
            buckets: aggregate(record, granularity, now).collect(),
            click_drift,
        }
    }
}

pub struct StatsService {
    records: Arc<dyn RecordStore>,
    locks: KeyLocks,
    thresholds: GranularityThresholds,
}

impl StatsService {
    pub fn new(records: Arc<dyn RecordStore>, thresholds: GranularityThresholds) -> Self {
        Self {
            records,
            locks: KeyLocks::new(),
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &GranularityThresholds {
        &self.thresholds
    }

    /// 为新建（或重建）的短链接追加一条归零的记录
    pub async fn start_record(
        &self,
        short_code: &str,
        target_url: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let _guard = self.locks.acquire(short_code).await;

        let record = AnalyticsRecord::new(target_url, now);
        let stats = match self.records.get(short_code).await? {
            Some(mut stats) => {
                stats.push_record(record);
                stats
            }
            None => LinkStats::with_record(record),
        };
        debug!(
            "StatsService: {} now has {} record(s)",
            short_code,
            stats.shorturls.len()
        );
        self.records.put(short_code, stats).await
    }

    /// 记录一次访问（读取 → 修改 → 写回，同一短码串行）
    pub async fn record_visit(
        &self,
        short_code: &str,
        target_url: &str,
        source_ip: &str,
        now: DateTime<Utc>,
    ) -> Result<VisitOutcome> {
        let _guard = self.locks.acquire(short_code).await;

        let Some(mut stats) = self.records.get(short_code).await? else {
            return Ok(VisitOutcome::NoDocument);
        };

        let outcome = match VisitRecorder::record_on(&mut stats, target_url, source_ip, now) {
            Some(kind) => VisitOutcome::Recorded(kind),
            None => VisitOutcome::Unmatched,
        };
        self.records.put(short_code, stats).await?;
        Ok(outcome)
    }

    /// 生成统计报告，没有文档时返回 `None`
    ///
    /// `forced` 为空时按记录年龄自动选择粒度。
    pub async fn report(
        &self,
        short_code: &str,
        now: DateTime<Utc>,
        forced: Option<Granularity>,
    ) -> Result<Option<StatsReport>> {
        let Some(stats) = self.records.get(short_code).await? else {
            return Ok(None);
        };

        let records = stats
            .shorturls
            .iter()
            .map(|record| RecordReport::build(record, &self.thresholds, now, forced))
            .collect();

        Ok(Some(StatsReport {
            short_code: short_code.to_string(),
            visits: stats.visits,
            records,
        }))
    }
}
