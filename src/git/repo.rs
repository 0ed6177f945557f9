//! Repository probe: locating the work tree and checking for dirty state.

use std::path::{Path, PathBuf};

use super::runner::{run_git, run_git_checked, run_git_differs};
use crate::error::{CheckpointError, Result};

/// A git work tree the checkpoint engine operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    root: PathBuf,
    git_dir: PathBuf,
    common_dir: PathBuf,
}

impl Repository {
    /// Locate the work tree containing `path`.
    ///
    /// Fails with `NotARepository` unless `path` lies inside a non-bare work tree.
    pub fn discover(path: &Path) -> Result<Self> {
        if !is_repository(path) {
            return Err(CheckpointError::NotARepository(path.display().to_string()));
        }

        let root = PathBuf::from(run_git_checked(&["rev-parse", "--show-toplevel"], path)?);
        let git_dir = absolute(
            &root,
            &run_git_checked(&["rev-parse", "--git-dir"], &root)?,
        );
        let common_dir = absolute(
            &root,
            &run_git_checked(&["rev-parse", "--git-common-dir"], &root)?,
        );

        Ok(Self {
            root,
            git_dir,
            common_dir,
        })
    }

    /// Locate the work tree containing the current directory.
    pub fn discover_cwd() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::discover(&cwd)
    }

    /// Top-level directory of the work tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Per-worktree git directory (holds the index).
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Git directory shared by all linked worktrees (holds refs and config).
    pub fn common_dir(&self) -> &Path {
        &self.common_dir
    }

    /// Path of the real index file.
    pub fn index_path(&self) -> PathBuf {
        self.git_dir.join("index")
    }

    /// Commit id of HEAD, or None on an unborn branch.
    pub fn head(&self) -> Option<String> {
        let output = run_git(&["rev-parse", "--verify", "-q", "HEAD^{commit}"], &self.root).ok()?;
        if !output.status.success() {
            return None;
        }
        let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!sha.is_empty()).then_some(sha)
    }

    /// True iff anything is staged, modified, or untracked (and not ignored).
    pub fn has_changes(&self) -> bool {
        has_changes(&self.root)
    }
}

fn absolute(root: &Path, reported: &str) -> PathBuf {
    let path = PathBuf::from(reported);
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

/// True iff `path` is inside a git work tree.
pub fn is_repository(path: &Path) -> bool {
    run_git(&["rev-parse", "--is-inside-work-tree"], path)
        .map(|output| {
            output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true"
        })
        .unwrap_or(false)
}

/// True iff any of staged, unstaged, or untracked changes exist.
///
/// Each condition is checked independently; a failing git command counts as
/// "no change" for that condition.
pub fn has_changes(repo_root: &Path) -> bool {
    has_staged_changes(repo_root)
        || has_unstaged_changes(repo_root)
        || !untracked_files(repo_root).is_empty()
}

pub fn has_staged_changes(repo_root: &Path) -> bool {
    run_git_differs(&["diff", "--cached", "--quiet"], repo_root)
}

pub fn has_unstaged_changes(repo_root: &Path) -> bool {
    run_git_differs(&["diff", "--quiet"], repo_root)
}

/// Untracked files that are not ignored.
pub fn untracked_files(repo_root: &Path) -> Vec<String> {
    match run_git(&["ls-files", "--others", "--exclude-standard"], repo_root) {
        Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}
