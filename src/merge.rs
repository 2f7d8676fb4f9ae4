use crate::model::History;
use anyhow::Context;
use console::style;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Combine histories into a fresh accumulator, summing each (month,
/// extension) MetricSet componentwise. Inputs are never mutated; the
/// operation is commutative and associative, and `merge([])` is empty.
pub fn merge<'a, I>(histories: I) -> History
where
    I: IntoIterator<Item = &'a History>,
{
    let mut merged = History::default();
    for history in histories {
        for (month, extensions) in &history.months {
            let month_entry = merged.months.entry(month.clone()).or_default();
            for (ext, metrics) in extensions {
                month_entry.entry(ext.clone()).or_default().add(metrics);
            }
        }
    }
    merged
}

/// `merge` subcommand: load previously exported history files, merge them,
/// write the combined document. All inputs are parsed before anything is
/// written, so a bad input produces no output file.
pub fn exec(files: Vec<PathBuf>, output: PathBuf) -> anyhow::Result<()> {
    let histories = files
        .iter()
        .map(|path| load_history(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let merged = merge(histories.iter());

    let json = serde_json::to_string_pretty(&merged)?;
    fs::write(&output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(files = files.len(), months = merged.months.len(), "merged histories");

    println!(
        "Merged {} files into {}",
        style(files.len()).cyan(),
        style(output.display()).green()
    );
    Ok(())
}

fn load_history(path: &Path) -> anyhow::Result<History> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid history document {}", path.display()))
}
