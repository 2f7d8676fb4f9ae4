use crate::error::{LocmapError, Result};
use crate::model::{CloneOutcome, RepoDescriptor};
use crate::workspace::Workspace;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, warn};

/// Default cap on simultaneously running clone operations.
pub const DEFAULT_CLONE_JOBS: usize = 5;

/// Clone collaborator seam. The production implementation shells out to
/// `git clone`; tests substitute instrumented fakes.
#[async_trait]
pub trait Cloner: Send + Sync + 'static {
    async fn clone_repo(&self, repo: &RepoDescriptor, dest: &Path) -> Result<()>;
}

pub struct GitCloner;

#[async_trait]
impl Cloner for GitCloner {
    async fn clone_repo(&self, repo: &RepoDescriptor, dest: &Path) -> Result<()> {
        let output = tokio::process::Command::new("git")
            .arg("clone")
            .arg("--quiet")
            .arg(&repo.clone_url)
            .arg(dest)
            .output()
            .await?;

        if !output.status.success() {
            return Err(LocmapError::Clone(format!(
                "{}: {}",
                repo.full_name(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// Clone every candidate into its own workspace subdirectory, at most
/// `limit` at a time. Every candidate yields exactly one outcome; a failed
/// clone is recorded, never propagated, and never cancels its siblings.
/// Completion order is unspecified, so each outcome carries its descriptor.
pub async fn acquire(
    cloner: Arc<dyn Cloner>,
    candidates: Vec<RepoDescriptor>,
    workspace: &Workspace,
    limit: usize,
    show_progress: bool,
) -> Vec<CloneOutcome> {
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let progress = clone_progress(candidates.len(), show_progress);

    let mut tasks = JoinSet::new();
    for repo in candidates {
        let dest = workspace.repo_dir(&repo);
        let semaphore = Arc::clone(&semaphore);
        let cloner = Arc::clone(&cloner);
        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return CloneOutcome { repo, path: dest, succeeded: false };
            };
            match cloner.clone_repo(&repo, &dest).await {
                Ok(()) => CloneOutcome { repo, path: dest, succeeded: true },
                Err(err) => {
                    warn!("failed to clone {}: {err}", repo.full_name());
                    CloneOutcome { repo, path: dest, succeeded: false }
                }
            }
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        progress.inc(1);
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => error!("clone task panicked: {err}"),
        }
    }
    progress.finish_and_clear();
    outcomes
}

fn clone_progress(total: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} Cloning repositories")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}
