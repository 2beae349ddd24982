//! Visit analytics
//!
//! - `record`: per-link analytics documents and their serialized form
//! - `recorder`: the visit state transition (counters, unique IPs, daily clicks)
//! - `granularity`: daily / weekly / monthly selection by record age
//! - `series`: gap-free, lazily aggregated click buckets for charting

pub mod granularity;
pub mod record;
pub mod recorder;
pub mod series;

pub use granularity::{Granularity, GranularityThresholds, age_in_days, select_granularity};
pub use record::{AnalyticsRecord, LinkStats};
pub use recorder::{UNKNOWN_IP, VisitKind, VisitRecorder, day_key};
pub use series::{AggregatedBucket, Series, aggregate};
