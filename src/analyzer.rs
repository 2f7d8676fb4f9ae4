use crate::dispatch::Analyzer;
use crate::error::{LocmapError, Result};
use crate::model::{History, MetricSet, TOTAL_KEY};
use crate::util::{extension_key, month_key};
use chrono::{TimeZone, Utc};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

const COMMIT_SEP: char = '\u{1}';
const FIELD_SEP: char = '\u{2}';

/// Extensions counted as text contributions; everything else is skipped.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "rs", "py", "js", "ts", "jsx", "tsx",
    "html", "css", "scss", "json", "yaml", "yml", "toml",
    "c", "cpp", "h", "hpp", "java", "go", "rb", "php",
];

/// Commit analyzer backed by `git log --numstat`.
///
/// Attributes commits whose `"{author} <{email}>"` string matches any of
/// the supplied patterns (all commits when the pattern list is empty) and
/// buckets line changes by month and file extension. Each month carries a
/// `total` entry equal to the sum of its extension entries, and every
/// touched (month, extension) pair reports `repos = 1` so that merging
/// across repositories counts contributing repos.
pub struct GitLogAnalyzer;

impl Analyzer for GitLogAnalyzer {
    fn analyze(&self, repo_path: &Path, patterns: &[String]) -> Result<History> {
        let matchers = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let output = std::process::Command::new("git")
            .arg("-C")
            .arg(repo_path)
            .arg("log")
            .arg("--numstat")
            .arg("--no-renames")
            .arg("--diff-merges=first-parent")
            .arg(format!("--pretty=format:{COMMIT_SEP}%an{FIELD_SEP}%ae{FIELD_SEP}%at"))
            .output()?;

        if !output.status.success() {
            return Err(LocmapError::Analyzer(format!(
                "git log in {}: {}",
                repo_path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let log = String::from_utf8_lossy(&output.stdout);
        let history = build_history(collect_stats(&log, &matchers));
        debug!(path = %repo_path.display(), months = history.months.len(), "analyzed repository");
        Ok(history)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Accum {
    additions: u64,
    deletions: u64,
    modifications: u64,
    files: u64,
}

/// Walk the marker-delimited log, newest commit first, accumulating per
/// (month, extension) changes for matching commits. Header fields are
/// author name, email, and the unix author timestamp, which is bucketed
/// into a UTC `YYYY-MM` key. A file counts toward `files` only the first
/// time its path is seen, attributing it to the most recent matching
/// commit that touched it.
fn collect_stats(log: &str, matchers: &[Regex]) -> HashMap<String, HashMap<String, Accum>> {
    let mut stats: HashMap<String, HashMap<String, Accum>> = HashMap::new();
    let mut seen_paths: HashSet<String> = HashSet::new();
    let mut matched = false;
    let mut month = String::new();

    for line in log.lines() {
        if let Some(header) = line.strip_prefix(COMMIT_SEP) {
            let mut fields = header.split(FIELD_SEP);
            let name = fields.next().unwrap_or("");
            let email = fields.next().unwrap_or("");
            month = fields
                .next()
                .and_then(|t| t.trim().parse::<i64>().ok())
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                .map(|ts| month_key(&ts))
                .unwrap_or_default();
            let author = format!("{name} <{email}>");
            matched = !month.is_empty()
                && (matchers.is_empty() || matchers.iter().any(|m| m.is_match(&author)));
            continue;
        }
        if !matched || line.is_empty() {
            continue;
        }

        let mut cols = line.splitn(3, '\t');
        let (Some(added), Some(deleted), Some(path)) = (cols.next(), cols.next(), cols.next())
        else {
            continue;
        };
        // Binary files report "-" for both counts.
        let (Ok(added), Ok(deleted)) = (added.parse::<u64>(), deleted.parse::<u64>()) else {
            continue;
        };
        let Some(ext) = extension_key(path).filter(|e| TEXT_EXTENSIONS.contains(&e.as_str()))
        else {
            continue;
        };

        let entry = stats.entry(month.clone()).or_default().entry(ext).or_default();
        entry.additions += added;
        entry.deletions += deleted;
        entry.modifications += 1;
        if seen_paths.insert(path.to_string()) {
            entry.files += 1;
        }
    }

    stats
}

fn build_history(stats: HashMap<String, HashMap<String, Accum>>) -> History {
    let mut history = History::default();
    for (month, extensions) in stats {
        let month_entry = history.months.entry(month).or_default();
        let mut total = MetricSet::default();
        for (ext, accum) in extensions {
            let metrics = MetricSet {
                lines: accum.additions.saturating_sub(accum.deletions),
                files: accum.files,
                additions: accum.additions,
                deletions: accum.deletions,
                modifications: accum.modifications,
                repos: 1,
            };
            total.add(&metrics);
            month_entry.insert(ext, metrics);
        }
        month_entry.insert(TOTAL_KEY.to_string(), total);
    }
    history
}
