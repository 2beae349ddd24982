//! 序列聚合性能基准测试

use std::hint::black_box;

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use linkstat::analytics::{AnalyticsRecord, Granularity, aggregate, select_granularity};

/// 每隔 `step` 天有一次点击，共覆盖 `days` 天
fn record_spanning(days: i64, step: usize) -> (AnalyticsRecord, DateTime<Utc>) {
    let created = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let mut record = AnalyticsRecord::new("https://example.com", created);
    for offset in (0..days).step_by(step) {
        let day = (created + Duration::days(offset)).date_naive();
        record.daily_clicks.insert(day, (offset % 17 + 1) as u64);
    }
    (record, created + Duration::days(days))
}

// ============== aggregate 基准测试 ==============

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("series/aggregate");

    for days in [30_i64, 365, 730, 3650] {
        let (record, now) = record_spanning(days, 1);
        for granularity in [Granularity::Daily, Granularity::Weekly, Granularity::Monthly] {
            group.throughput(Throughput::Elements(days as u64));
            group.bench_with_input(
                BenchmarkId::new(granularity.as_str(), days),
                &(record.clone(), now),
                |b, (record, now)| {
                    b.iter(|| {
                        let total: u64 = aggregate(record, granularity, *now)
                            .map(|bucket| bucket.count)
                            .sum();
                        black_box(total)
                    });
                },
            );
        }
    }

    group.finish();
}

// 稀疏数据：长时间跨度、点击很少
fn bench_aggregate_sparse(c: &mut Criterion) {
    let (record, now) = record_spanning(3650, 97);

    c.bench_function("series/sparse_daily_10y", |b| {
        b.iter(|| black_box(aggregate(&record, Granularity::Daily, now).count()));
    });
}

// ============== select_granularity 基准测试 ==============

fn bench_select_granularity(c: &mut Criterion) {
    let created = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let now = created + Duration::days(400);

    c.bench_function("series/select_granularity", |b| {
        b.iter(|| black_box(select_granularity(black_box(created), black_box(now))));
    });
}

criterion_group!(
    benches,
    bench_aggregate,
    bench_aggregate_sparse,
    bench_select_granularity,
);
criterion_main!(benches);
