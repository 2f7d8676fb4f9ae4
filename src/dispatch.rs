use crate::error::Result;
use crate::model::History;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Upper bound on analysis worker threads.
pub const MAX_WORKERS: usize = 8;

/// Analyzer collaborator seam: a pure function of (repository path, plain
/// pattern strings) to a single-repository history.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, repo_path: &Path, patterns: &[String]) -> Result<History>;
}

/// Run the analyzer over every path on a fixed pool of worker threads.
///
/// Workers pull from a shared queue; results are consumed in completion
/// order over a channel, so no ordering may be assumed downstream. Patterns
/// cross the worker boundary as plain strings only. A failing job is logged
/// and contributes an empty history; it never stops the pool.
pub fn dispatch(
    analyzer: Arc<dyn Analyzer>,
    paths: Vec<PathBuf>,
    patterns: Vec<String>,
    workers: Option<usize>,
    show_progress: bool,
) -> Vec<History> {
    if paths.is_empty() {
        return Vec::new();
    }

    let total = paths.len();
    let workers = workers.unwrap_or(MAX_WORKERS).clamp(1, MAX_WORKERS).min(total);
    let queue = Arc::new(Mutex::new(VecDeque::from(paths)));
    let patterns = Arc::new(patterns);
    let (tx, rx) = mpsc::channel::<(PathBuf, Result<History>)>();
    let progress = analysis_progress(total, show_progress);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let queue = Arc::clone(&queue);
            let patterns = Arc::clone(&patterns);
            let analyzer = Arc::clone(&analyzer);
            let tx = tx.clone();
            scope.spawn(move || {
                while let Some(path) = next_job(&queue) {
                    let result = analyzer.analyze(&path, &patterns);
                    if tx.send((path, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let mut histories = Vec::with_capacity(total);
        let mut completed = 0usize;
        for (path, result) in rx {
            completed += 1;
            progress.inc(1);
            debug!(completed, total, path = %path.display(), "analysis job finished");
            match result {
                Ok(history) => histories.push(history),
                Err(err) => {
                    warn!("failed to analyze {}: {err}", path.display());
                    histories.push(History::default());
                }
            }
        }
        progress.finish_and_clear();
        histories
    })
}

fn next_job(queue: &Mutex<VecDeque<PathBuf>>) -> Option<PathBuf> {
    queue.lock().ok()?.pop_front()
}

fn analysis_progress(total: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} Analyzing repositories")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LocmapError;
    use crate::merge::merge;
    use crate::model::MetricSet;
    use std::sync::Mutex as StdMutex;

    /// Emits one fixed entry per repository and records the pattern strings
    /// it was handed.
    struct StubAnalyzer {
        seen_patterns: StdMutex<Vec<Vec<String>>>,
    }

    impl StubAnalyzer {
        fn new() -> Self {
            Self { seen_patterns: StdMutex::new(Vec::new()) }
        }
    }

    impl Analyzer for StubAnalyzer {
        fn analyze(&self, repo_path: &Path, patterns: &[String]) -> Result<History> {
            self.seen_patterns.lock().unwrap().push(patterns.to_vec());
            let mut history = History::default();
            history
                .months
                .entry("2024-01".to_string())
                .or_default()
                .insert(
                    repo_path.file_name().unwrap().to_string_lossy().to_string(),
                    MetricSet { lines: 1, files: 1, additions: 1, deletions: 0, modifications: 1, repos: 1 },
                );
            Ok(history)
        }
    }

    struct FailingAnalyzer;

    impl Analyzer for FailingAnalyzer {
        fn analyze(&self, repo_path: &Path, _patterns: &[String]) -> Result<History> {
            if repo_path.ends_with("bad") {
                Err(LocmapError::Analyzer("corrupt repository".to_string()))
            } else {
                Ok(History::default())
            }
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn empty_input_dispatches_nothing() {
        let out = dispatch(Arc::new(StubAnalyzer::new()), Vec::new(), Vec::new(), None, false);
        assert!(out.is_empty());
    }

    #[test]
    fn every_path_produces_one_history() {
        let analyzer = Arc::new(StubAnalyzer::new());
        let out = dispatch(
            analyzer.clone(),
            paths(&["a", "b", "c", "d", "e"]),
            vec!["(?i)x".to_string()],
            Some(3),
            false,
        );
        assert_eq!(out.len(), 5);

        // Collection order is unspecified; the merged result must not
        // depend on it.
        let merged = merge(out.iter());
        assert_eq!(merged.months["2024-01"].len(), 5);

        let seen = analyzer.seen_patterns.lock().unwrap();
        assert!(seen.iter().all(|p| p == &vec!["(?i)x".to_string()]));
    }

    #[test]
    fn failed_job_becomes_an_empty_history() {
        let out = dispatch(
            Arc::new(FailingAnalyzer),
            paths(&["good", "bad", "also-good"]),
            Vec::new(),
            Some(2),
            false,
        );
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|h| h.is_empty()));
    }

    #[test]
    fn worker_count_is_capped_by_path_count() {
        // Smoke test: requesting more workers than paths still completes.
        let out = dispatch(Arc::new(StubAnalyzer::new()), paths(&["solo"]), Vec::new(), Some(8), false);
        assert_eq!(out.len(), 1);
    }
}
