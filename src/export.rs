use crate::error::Result;
use crate::model::{History, MetricSet, TOTAL_KEY};
use console::style;
use std::fs;
use std::path::Path;
use tracing::info;

pub const JSON_FILE: &str = "loc_history.json";
pub const CSV_FILE: &str = "loc_history.csv";

/// Metric columns of the CSV export, in their fixed order.
const CSV_METRICS: &[&str] = &["lines", "additions", "deletions", "modifications", "repos"];

/// Write the JSON and CSV exports into `output_dir`, creating it if needed.
pub fn write_reports(history: &History, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)?;

    let json_path = output_dir.join(JSON_FILE);
    fs::write(&json_path, serde_json::to_string_pretty(history)?)?;
    info!("exported JSON history to {}", json_path.display());

    let csv_path = output_dir.join(CSV_FILE);
    write_csv(history, &csv_path)?;
    info!("exported CSV history to {}", csv_path.display());

    Ok(())
}

/// One row per month, one column per extension-metric pair. Extensions are
/// sorted lexicographically; `total` is excluded from the columns.
fn write_csv(history: &History, path: &Path) -> Result<()> {
    let extensions = history.extensions();
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["Month".to_string()];
    for ext in &extensions {
        for metric in CSV_METRICS {
            header.push(format!("{ext} {metric}"));
        }
    }
    writer.write_record(&header)?;

    for (month, stats) in &history.months {
        let mut row = vec![month.clone()];
        for ext in &extensions {
            let metrics = stats.get(ext).copied().unwrap_or_default();
            row.push(metrics.lines.to_string());
            row.push(metrics.additions.to_string());
            row.push(metrics.deletions.to_string());
            row.push(metrics.modifications.to_string());
            row.push(metrics.repos.to_string());
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Human-readable run summary: overall totals, the most productive month,
/// per-language breakdown, and the month-by-month line counts.
pub fn format_summary(history: &History) -> String {
    if history.is_empty() {
        return "No data to display".to_string();
    }

    let mut out = Vec::new();
    out.push(format!("{}", style("Monthly Lines of Code Contribution").bold()));
    out.push("─".repeat(50));

    let mut overall = MetricSet::default();
    for month in history.months.keys() {
        overall.add(&history.month_total(month));
    }

    let (best_month, best_lines) = history
        .months
        .keys()
        .map(|m| (m.clone(), history.month_total(m).lines))
        .max_by_key(|(_, lines)| *lines)
        .unwrap_or_else(|| ("N/A".to_string(), 0));

    out.push("Total statistics:".to_string());
    out.push(format!("  Lines of code: {}", style(overall.lines).cyan()));
    out.push(format!("  Additions: {}", style(overall.additions).green()));
    out.push(format!("  Deletions: {}", style(overall.deletions).red()));
    out.push(format!("  File modifications: {}", overall.modifications));
    out.push(format!("Most productive month: {best_month} ({best_lines} lines)"));
    out.push(format!("Months analyzed: {}", history.months.len()));
    out.push(String::new());

    out.push("Language breakdown:".to_string());
    out.push("─".repeat(50));
    let mut languages: Vec<(String, MetricSet)> = Vec::new();
    for ext in history.extensions() {
        let mut sum = MetricSet::default();
        for stats in history.months.values() {
            if let Some(metrics) = stats.get(&ext) {
                sum.add(metrics);
            }
        }
        languages.push((ext, sum));
    }
    languages.sort_by(|a, b| b.1.lines.cmp(&a.1.lines));

    for (ext, sum) in &languages {
        let percentage = if overall.lines > 0 {
            sum.lines as f64 / overall.lines as f64 * 100.0
        } else {
            0.0
        };
        out.push(format!("{ext}:"));
        out.push(format!("  Lines: {} ({percentage:.1}%)", sum.lines));
        out.push(format!("  Files: {}", sum.files));
        out.push(format!("  Additions: {}", sum.additions));
        out.push(format!("  Deletions: {}", sum.deletions));
        out.push(format!("  Modifications: {}", sum.modifications));
        out.push(format!("  Repositories: {}", sum.repos));
        out.push(String::new());
    }

    out.push("Monthly breakdown:".to_string());
    out.push("─".repeat(20));
    for month in history.months.keys() {
        let total = history.month_total(month);
        let percentage = if overall.lines > 0 {
            total.lines as f64 / overall.lines as f64 * 100.0
        } else {
            0.0
        };
        out.push(format!("{month}: {} lines ({percentage:.1}%)", total.lines));
    }

    out.join("\n")
}
