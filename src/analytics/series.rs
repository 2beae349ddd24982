//! 点击序列聚合
//!
//! 把稀疏的按日点击数展开为连续的时间桶序列：从记录创建所在的周期开始，
//! 到 `now` 所在的周期结束，每个周期恰好一个桶，没有点击的周期计为 0。
//!
//! `Series` 是惰性迭代器，可以 `clone()` 后重新遍历，长度在创建时即可确定。

use std::collections::BTreeMap;
use std::iter::FusedIterator;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::Serialize;

use super::granularity::Granularity;
use super::record::AnalyticsRecord;
use super::recorder::day_key;

/// 一个聚合周期
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedBucket {
    /// 周期起点：daily / weekly 为 `YYYY-MM-DD`，monthly 为 `YYYY-MM`
    pub label: String,
    pub count: u64,
}

impl Granularity {
    /// 包含 `date` 的周期的起始日
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => date,
            Self::Weekly => date - Days::new(date.weekday().num_days_from_monday() as u64),
            Self::Monthly => date - Days::new(date.day0() as u64),
        }
    }

    /// 下一个周期的起始日，超出日期范围时返回 `None`
    fn next_period_start(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Daily => start.checked_add_days(Days::new(1)),
            Self::Weekly => start.checked_add_days(Days::new(7)),
            Self::Monthly => start.checked_add_months(Months::new(1)),
        }
    }

    /// `first` 到 `last` 两个周期起点之间（含两端）的周期数
    fn periods_between(&self, first: NaiveDate, last: NaiveDate) -> usize {
        if last < first {
            return 0;
        }
        match self {
            Self::Daily => (last - first).num_days() as usize + 1,
            Self::Weekly => (last - first).num_days() as usize / 7 + 1,
            Self::Monthly => {
                let months = (last.year() - first.year()) * 12 + last.month0() as i32
                    - first.month0() as i32;
                months as usize + 1
            }
        }
    }

    fn label(&self, start: NaiveDate) -> String {
        match self {
            Self::Daily | Self::Weekly => start.format("%Y-%m-%d").to_string(),
            Self::Monthly => start.format("%Y-%m").to_string(),
        }
    }
}

/// 惰性的桶序列
#[derive(Debug, Clone)]
pub struct Series<'a> {
    clicks: &'a BTreeMap<NaiveDate, u64>,
    granularity: Granularity,
    cursor: NaiveDate,
    remaining: usize,
}

impl<'a> Series<'a> {
    /// 在 `[from, to]` 上构建序列
    ///
    /// `to` 早于 `from` 时只输出 `from` 所在的一个周期，序列永不为空。
    pub fn new(
        clicks: &'a BTreeMap<NaiveDate, u64>,
        granularity: Granularity,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Self {
        let first = granularity.period_start(day_key(from));
        let last = granularity.period_start(day_key(to)).max(first);
        Self {
            clicks,
            granularity,
            cursor: first,
            remaining: granularity.periods_between(first, last),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }
}

impl Iterator for Series<'_> {
    type Item = AggregatedBucket;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let start = self.cursor;
        let end = self.granularity.next_period_start(start);
        let count = match end {
            Some(end) => self.clicks.range(start..end).map(|(_, c)| *c).sum(),
            None => self.clicks.range(start..).map(|(_, c)| *c).sum(),
        };

        self.remaining -= 1;
        match end {
            Some(end) => self.cursor = end,
            None => self.remaining = 0,
        }

        Some(AggregatedBucket {
            label: self.granularity.label(start),
            count,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Series<'_> {}

impl FusedIterator for Series<'_> {}

/// 按给定粒度聚合记录，从创建时间到 `now`
pub fn aggregate(
    record: &AnalyticsRecord,
    granularity: Granularity,
    now: DateTime<Utc>,
) -> Series<'_> {
    Series::new(&record.daily_clicks, granularity, record.created_at, now)
}
