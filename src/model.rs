use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Reserved extension key holding the all-extensions sum for a month.
pub const TOTAL_KEY: &str = "total";

/// The authenticated user's profile, as returned by the GitHub API.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// One unit of acquisition work: a remote repository to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoDescriptor {
    pub owner: String,
    pub name: String,
    pub clone_url: String,
}

impl RepoDescriptor {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Result of one clone attempt, paired with its originating descriptor.
#[derive(Debug, Clone)]
pub struct CloneOutcome {
    pub repo: RepoDescriptor,
    pub path: PathBuf,
    pub succeeded: bool,
}

/// Six-counter unit of contribution measurement.
///
/// No serde defaults: a history document missing any field fails to parse,
/// which is the required behavior for merge inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSet {
    pub lines: u64,
    pub files: u64,
    pub additions: u64,
    pub deletions: u64,
    pub modifications: u64,
    pub repos: u64,
}

impl MetricSet {
    pub fn add(&mut self, other: &MetricSet) {
        self.lines += other.lines;
        self.files += other.files;
        self.additions += other.additions;
        self.deletions += other.deletions;
        self.modifications += other.modifications;
        self.repos += other.repos;
    }
}

/// Per-extension metrics for one month, keyed by bare lowercase extension
/// (plus the reserved `total` key).
pub type ExtensionStats = BTreeMap<String, MetricSet>;

/// Month-keyed (`YYYY-MM`) contribution history.
///
/// Serializes transparently, so the JSON document's top level is the
/// month -> extension -> MetricSet mapping itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    pub months: BTreeMap<String, ExtensionStats>,
}

impl History {
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// All extension keys appearing anywhere in the history, `total` excluded.
    pub fn extensions(&self) -> Vec<String> {
        let mut exts: Vec<String> = self
            .months
            .values()
            .flat_map(|stats| stats.keys())
            .filter(|k| *k != TOTAL_KEY)
            .cloned()
            .collect();
        exts.sort();
        exts.dedup();
        exts
    }

    /// The `total` entry for a month, or the zero set when absent.
    pub fn month_total(&self, month: &str) -> MetricSet {
        self.months
            .get(month)
            .and_then(|stats| stats.get(TOTAL_KEY))
            .copied()
            .unwrap_or_default()
    }
}
