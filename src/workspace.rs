use crate::error::Result;
use crate::model::RepoDescriptor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Scratch directory holding cloned repositories for one run.
///
/// Removal is tied to `Drop`, so every exit path of the pipeline, including
/// early fatal aborts, cleans up the clones. `close` surfaces removal errors
/// on the success path.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("locmap-").tempdir()?;
        debug!(path = %dir.path().display(), "created workspace");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Exclusive clone destination for one repository. Owner is part of the
    /// name so same-named repos from different owners cannot collide.
    pub fn repo_dir(&self, repo: &RepoDescriptor) -> PathBuf {
        self.dir.path().join(format!("{}__{}", repo.owner, repo.name))
    }

    pub fn close(self) -> Result<()> {
        self.dir.close().map_err(Into::into)
    }
}
