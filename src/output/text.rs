//! Plain-text rendering of a report for the terminal.

use crate::aggregator::TrimmedMean;
use crate::parser::schema::Report;

/// Render the summary table, stage waterfall and distribution as text
///
/// **Public** - used by `report --summary`
pub fn render_text_summary(report: &Report) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Source:      {}", report.source));
    lines.push(format!("Selection:   {}", report.selection));
    lines.push(format!("Points:      {}", report.total_points));
    lines.push(format!(
        "Calls:       {} ok / {} failed over {}s",
        report.successful_calls(),
        report.failed_calls(),
        report.throughput.len()
    ));

    lines.push("".to_string());
    lines.push("Targets:".to_string());
    lines.push(format!(
        "  {:>4}  {:<32} {:>8} {:>8} {:>8} {:>10} {:>10}",
        "id", "url", "ok", "failed", "mean", "median", "trimmed"
    ));
    for row in &report.summary {
        let trimmed = match row.trimmed_mean {
            Some(TrimmedMean::Mean(v)) => v.to_string(),
            Some(TrimmedMean::FullyTrimmed) | None => "-".to_string(),
        };
        lines.push(format!(
            "  {:>4}  {:<32} {:>8} {:>8} {:>8} {:>10} {:>10}",
            row.id,
            truncate(row.url.as_deref().unwrap_or("-"), 32),
            row.count,
            row.count_error,
            row.mean.map_or("-".to_string(), |v| v.to_string()),
            row.median.map_or("-".to_string(), |v| format!("{:.1}", v)),
            trimmed
        ));
    }

    lines.push("".to_string());
    lines.push("Stages (ms):".to_string());
    for bar in &report.stages.stages {
        lines.push(format!(
            "  {:<16} offset {:>6}  mean {:>6}  [{} calls]",
            bar.name, bar.offset_ms, bar.mean_ms, bar.count
        ));
    }

    if !report.distribution.is_empty() {
        lines.push("".to_string());
        lines.push("Response time distribution (ms):".to_string());
        for (series, counts) in &report.distribution.counts {
            lines.push(format!("  {}", series));
            for (label, count) in report.distribution.bucket_labels.iter().zip(counts) {
                lines.push(format!("    {:<24} {}", label, count));
            }
        }
    }

    lines.join("\n")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
