//! Advisory locking for checkpoint mutations
//!
//! Scheduled `auto` runs and manual commands are separate processes that
//! share one reference namespace. Every operation that reads-then-writes
//! checkpoint references holds an exclusive `fs2` lock on a file in the
//! repository's common git directory, so such operations serialize.
//!
//! Advisory locks are cooperative - all participants must take this lock
//! for it to be effective.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CheckpointError, Result};

/// Name of the lock file inside the git common directory.
pub const LOCK_FILE_NAME: &str = "checkpoint.lock";

/// Held exclusive lock; released when dropped.
#[derive(Debug)]
pub struct RepoLock {
    file: File,
    path: PathBuf,
}

impl RepoLock {
    /// Block until the exclusive lock for the repository at `common_dir` is held.
    pub fn acquire(common_dir: &Path) -> Result<Self> {
        let path = common_dir.join(LOCK_FILE_NAME);
        let file = open_lock_file(&path)?;
        file.lock_exclusive().map_err(|source| CheckpointError::Lock {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "acquired checkpoint lock");
        Ok(Self { file, path })
    }

    /// Take the lock only if no other process holds it.
    pub fn try_acquire(common_dir: &Path) -> Result<Option<Self>> {
        let path = common_dir.join(LOCK_FILE_NAME);
        let file = open_lock_file(&path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { file, path })),
            Err(_) => Ok(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!(path = %self.path.display(), "released checkpoint lock");
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    #[allow(clippy::suspicious_open_options)]
    OpenOptions::new()
        .write(true)
        .create(true)
        .open(path)
        .map_err(|source| CheckpointError::Lock {
            path: path.display().to_string(),
            source,
        })
}
