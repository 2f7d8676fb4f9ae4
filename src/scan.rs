use crate::acquire::{acquire, Cloner, GitCloner};
use crate::analyzer::GitLogAnalyzer;
use crate::dispatch::{dispatch, Analyzer};
use crate::error::{LocmapError, Result};
use crate::export;
use crate::github::GitHubClient;
use crate::identity::IdentityMatcher;
use crate::merge::merge;
use crate::model::{History, Profile, RepoDescriptor};
use crate::workspace::Workspace;
use anyhow::{bail, Context};
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// `scan` subcommand: authenticate, list candidates, then run the pipeline
/// with the production collaborators and export the result.
pub async fn exec(
    token: String,
    single_repo: Option<String>,
    output: PathBuf,
    clone_jobs: usize,
    workers: Option<usize>,
) -> anyhow::Result<()> {
    let client = GitHubClient::new(&token).context("Failed to build GitHub client")?;
    let profile = client
        .authenticated_user()
        .await
        .context("Failed to authenticate with GitHub")?;
    info!("authenticated as {}", profile.login);

    let matcher = IdentityMatcher::from_profile(&profile)
        .context("Failed to build identity patterns")?;

    let candidates = list_candidates(&client, &profile, single_repo.as_deref(), clone_jobs).await?;
    if candidates.is_empty() {
        bail!("no repositories found to analyze");
    }
    info!("found {} repositories to analyze", candidates.len());

    let aggregate = run_pipeline(
        Arc::new(GitCloner),
        Arc::new(GitLogAnalyzer),
        candidates,
        matcher.pattern_strings(),
        clone_jobs,
        workers,
        true,
    )
    .await?;
    if aggregate.is_empty() {
        bail!("no contribution data collected");
    }

    export::write_reports(&aggregate, &output).context("Failed to export reports")?;
    println!("\n{}", export::format_summary(&aggregate));
    Ok(())
}

/// Acquire, analyze, and merge. Owns the temporary workspace for the run;
/// it is dropped on every exit path, so clones never outlive the call.
/// Zero successful clones is fatal and nothing is ever dispatched.
pub async fn run_pipeline(
    cloner: Arc<dyn Cloner>,
    analyzer: Arc<dyn Analyzer>,
    candidates: Vec<RepoDescriptor>,
    patterns: Vec<String>,
    clone_jobs: usize,
    workers: Option<usize>,
    show_progress: bool,
) -> Result<History> {
    let workspace = Workspace::new()?;

    let outcomes = acquire(cloner, candidates, &workspace, clone_jobs, show_progress).await;
    let cloned: Vec<PathBuf> = outcomes
        .iter()
        .filter(|o| o.succeeded)
        .map(|o| o.path.clone())
        .collect();
    if cloned.is_empty() {
        return Err(LocmapError::NoRepositories);
    }
    info!("successfully cloned {} of {} repositories", cloned.len(), outcomes.len());

    let histories = tokio::task::spawn_blocking(move || {
        dispatch(analyzer, cloned, patterns, workers, show_progress)
    })
    .await
    .map_err(|err| LocmapError::Analyzer(format!("analysis dispatcher panicked: {err}")))?;

    let aggregate = merge(histories.iter());
    workspace.close()?;
    Ok(aggregate)
}

/// Either the one named repository or the full listing pruned to those the
/// user has actually committed to. Pruning failures exclude the repository
/// but never abort the run.
async fn list_candidates(
    client: &GitHubClient,
    profile: &Profile,
    single_repo: Option<&str>,
    concurrency: usize,
) -> anyhow::Result<Vec<RepoDescriptor>> {
    if let Some(selector) = single_repo {
        let (owner, name) = selector
            .split_once('/')
            .ok_or_else(|| LocmapError::Parse(format!("expected owner/name, got {selector}")))?;
        let repo = client
            .get_repo(owner, name)
            .await
            .with_context(|| format!("Failed to look up repository {selector}"))?;
        return Ok(vec![repo]);
    }

    let repos = client
        .list_repos()
        .await
        .context("Failed to list repositories")?;

    let login = profile.login.clone();
    let contributed: Vec<RepoDescriptor> = stream::iter(repos)
        .map(|repo| {
            let login = login.clone();
            async move {
                match client.has_commits_by(&repo, &login).await {
                    Ok(true) => Some(repo),
                    Ok(false) => None,
                    Err(err) => {
                        warn!("failed to check {}: {err}", repo.full_name());
                        None
                    }
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .filter_map(|repo| async move { repo })
        .collect()
        .await;

    Ok(contributed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MetricSet;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn candidates(n: usize) -> Vec<RepoDescriptor> {
        (0..n)
            .map(|i| RepoDescriptor {
                owner: "owner".to_string(),
                name: format!("repo{i}"),
                clone_url: format!("https://example.com/owner/repo{i}.git"),
            })
            .collect()
    }

    struct RefusingCloner;

    #[async_trait]
    impl Cloner for RefusingCloner {
        async fn clone_repo(&self, repo: &RepoDescriptor, _dest: &Path) -> Result<()> {
            Err(LocmapError::Clone(format!("{} unreachable", repo.full_name())))
        }
    }

    struct AcceptingCloner;

    #[async_trait]
    impl Cloner for AcceptingCloner {
        async fn clone_repo(&self, _repo: &RepoDescriptor, dest: &Path) -> Result<()> {
            std::fs::create_dir_all(dest)?;
            Ok(())
        }
    }

    /// Counts invocations; returns one fixed entry per repository.
    struct CountingAnalyzer {
        calls: AtomicUsize,
    }

    impl CountingAnalyzer {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0) }
        }
    }

    impl Analyzer for CountingAnalyzer {
        fn analyze(&self, _repo_path: &Path, _patterns: &[String]) -> Result<History> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut history = History::default();
            history
                .months
                .entry("2024-01".to_string())
                .or_default()
                .insert(
                    "rs".to_string(),
                    MetricSet { lines: 1, files: 1, additions: 1, deletions: 0, modifications: 1, repos: 1 },
                );
            Ok(history)
        }
    }

    #[tokio::test]
    async fn total_acquisition_failure_aborts_before_any_dispatch() {
        let analyzer = Arc::new(CountingAnalyzer::new());
        let result = run_pipeline(
            Arc::new(RefusingCloner),
            analyzer.clone(),
            candidates(3),
            Vec::new(),
            2,
            None,
            false,
        )
        .await;

        assert!(matches!(result, Err(LocmapError::NoRepositories)));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0, "nothing may be analyzed");
    }

    #[tokio::test]
    async fn pipeline_merges_one_history_per_cloned_repository() {
        let analyzer = Arc::new(CountingAnalyzer::new());
        let aggregate = run_pipeline(
            Arc::new(AcceptingCloner),
            analyzer.clone(),
            candidates(4),
            Vec::new(),
            2,
            Some(2),
            false,
        )
        .await
        .unwrap();

        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 4);
        assert_eq!(aggregate.months["2024-01"]["rs"].repos, 4);
        assert_eq!(aggregate.months["2024-01"]["rs"].lines, 4);
    }
}
