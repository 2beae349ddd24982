//! Stats command
//!
//! 表格输出访问概况，柱状图输出聚合后的点击序列。

use colored::Colorize;

use crate::analytics::{AggregatedBucket, Granularity};
use crate::errors::LinkstatError;
use crate::interfaces::cli::CliError;
use crate::services::{RecordReport, StatsReport};
use crate::system::AppContext;

/// 柱状图最长宽度（字符）
const BAR_WIDTH: usize = 40;

pub async fn show_stats(
    ctx: &AppContext,
    short_code: &str,
    password: &str,
    granularity: Option<Granularity>,
    json: bool,
) -> Result<(), CliError> {
    let report = ctx
        .links
        .stats(short_code, password, granularity)
        .await?
        .ok_or_else(|| {
            LinkstatError::not_found(format!("No stats found for short link: {}", short_code))
        })?;

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::CommandError(format!("Failed to encode stats: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &StatsReport) {
    println!(
        "{} {} {}",
        "Stats for".bold().green(),
        report.short_code.cyan(),
        format!("(total visits: {})", report.visits).dimmed()
    );

    // 最新的记录在前
    for record in report.records.iter().rev() {
        println!();
        print_record(record);
    }
}

fn print_record(record: &RecordReport) {
    println!(
        "  {} {}",
        "Target:".bold(),
        record.target_url.blue().underline()
    );
    println!(
        "  {} {}",
        "Created:".bold(),
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  {} {}   {} {}",
        "Visits:".bold(),
        record.total_visits.to_string().green(),
        "Unique:".bold(),
        record.unique_visitors.to_string().green()
    );
    if record.click_drift != 0 {
        println!(
            "  {} chart differs from total visits by {}",
            "⚠".bold().yellow(),
            record.click_drift
        );
    }

    if !record.visits_by_ip.is_empty() {
        println!("  {}", "Visitors:".bold());
        let mut by_ip: Vec<_> = record.visits_by_ip.iter().collect();
        by_ip.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (ip, count) in by_ip {
            println!("    {:<40} {}", ip, count.to_string().cyan());
        }
    }

    println!(
        "  {} {}",
        "Clicks".bold(),
        format!("({})", record.granularity).dimmed()
    );
    for line in render_chart(&record.buckets) {
        println!("    {}", line);
    }
}

/// 把桶序列渲染成文本柱状图，每个桶一行
pub fn render_chart(buckets: &[AggregatedBucket]) -> Vec<String> {
    let max = buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let label_width = buckets.iter().map(|b| b.label.len()).max().unwrap_or(0);

    buckets
        .iter()
        .map(|bucket| {
            let len = bar_len(bucket.count, max);
            format!(
                "{:<width$} {} {}",
                bucket.label,
                "█".repeat(len),
                bucket.count,
                width = label_width
            )
        })
        .collect()
}

fn bar_len(count: u64, max: u64) -> usize {
    if count == 0 {
        return 0;
    }
    // 非零桶至少画一格
    ((count as u128 * BAR_WIDTH as u128).div_ceil(max as u128) as usize).clamp(1, BAR_WIDTH)
}
