//! 图表粒度选择
//!
//! 按记录的存在时长选择按日、按周或按月聚合。

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// 聚合粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            _ => Err(format!(
                "Invalid granularity: '{}'. Valid: daily, weekly, monthly",
                s
            )),
        }
    }
}

/// 粒度切换阈值（单位：天，均为闭区间上界）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GranularityThresholds {
    #[serde(default = "default_daily_max_days")]
    pub daily_max_days: f64,
    #[serde(default = "default_weekly_max_days")]
    pub weekly_max_days: f64,
}

fn default_daily_max_days() -> f64 {
    30.0
}

fn default_weekly_max_days() -> f64 {
    730.0
}

impl Default for GranularityThresholds {
    fn default() -> Self {
        Self {
            daily_max_days: default_daily_max_days(),
            weekly_max_days: default_weekly_max_days(),
        }
    }
}

impl GranularityThresholds {
    /// 按记录年龄选择粒度
    ///
    /// `age <= daily_max_days` → daily，`age <= weekly_max_days` → weekly，
    /// 其余为 monthly。时钟回拨导致的负年龄按 daily 处理。
    pub fn select(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> Granularity {
        let age = age_in_days(created_at, now);
        if age <= self.daily_max_days {
            Granularity::Daily
        } else if age <= self.weekly_max_days {
            Granularity::Weekly
        } else {
            Granularity::Monthly
        }
    }
}

/// 使用默认阈值选择粒度
pub fn select_granularity(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Granularity {
    GranularityThresholds::default().select(created_at, now)
}

/// 两个时间点之间的天数（允许小数）
pub fn age_in_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - created_at).num_milliseconds() as f64 / MILLIS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 6, 15, 8, 0, 0).unwrap()
    }

    /// 0.0001 天 = 8640 毫秒
    fn days_plus_tenth_millionth(days: i64) -> Duration {
        Duration::days(days) + Duration::milliseconds(8_640)
    }

    #[test]
    fn test_threshold_boundaries() {
        let c = created();
        assert_eq!(select_granularity(c, c), Granularity::Daily);
        assert_eq!(select_granularity(c, c + Duration::days(30)), Granularity::Daily);
        assert_eq!(
            select_granularity(c, c + days_plus_tenth_millionth(30)),
            Granularity::Weekly
        );
        assert_eq!(select_granularity(c, c + Duration::days(730)), Granularity::Weekly);
        assert_eq!(
            select_granularity(c, c + days_plus_tenth_millionth(730)),
            Granularity::Monthly
        );
    }

    #[test]
    fn test_negative_age_is_daily() {
        let c = created();
        assert_eq!(select_granularity(c, c - Duration::days(400)), Granularity::Daily);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = GranularityThresholds {
            daily_max_days: 7.0,
            weekly_max_days: 90.0,
        };
        let c = created();
        assert_eq!(thresholds.select(c, c + Duration::days(8)), Granularity::Weekly);
        assert_eq!(thresholds.select(c, c + Duration::days(91)), Granularity::Monthly);
    }

    #[test]
    fn test_parse_granularity() {
        assert_eq!("Weekly".parse::<Granularity>(), Ok(Granularity::Weekly));
        assert_eq!("month".parse::<Granularity>(), Ok(Granularity::Monthly));
        assert!("hourly".parse::<Granularity>().is_err());
    }
}
