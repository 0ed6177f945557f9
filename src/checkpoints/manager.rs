//! Checkpoint lifecycle: create, list, load, delete, auto.
//!
//! One `CheckpointManager` serves one invocation. It holds the configuration
//! loaded at startup and the injected capabilities (confirmation, notification),
//! and returns outcomes for the command layer to print. Reference-mutating
//! operations run under the repository lock.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::diff::differs_from_last;
use super::retention::{plan_prune, PruneReason, RetentionPolicy};
use super::types::{auto_name, resolve_manual_name, sanitize_name, Checkpoint};
use crate::config::Config;
use crate::error::{CheckpointError, Result};
use crate::fs::RepoLock;
use crate::git::{
    apply_snapshot, create_snapshot_object, delete_snapshot, find_snapshot, list_snapshots,
    push_ref, snapshot_exists, tag_snapshot, ApplyOutcome, RemoteStatus, Repository,
};
use crate::notify::{checkpoint_created_message, NotificationSink};
use crate::prompt::Confirm;

/// Name accepted by `delete` to remove every checkpoint.
pub const DELETE_ALL: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedCheckpoint {
    pub name: String,
    pub remote: RemoteStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrunedCheckpoint {
    pub name: String,
    pub reasons: Vec<PruneReason>,
    pub remote: RemoteStatus,
}

/// A checkpoint that was just created, with its side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedCheckpoint {
    pub checkpoint: Checkpoint,
    pub remote: RemoteStatus,
    /// Automatic checkpoints removed by retention afterwards.
    pub pruned: Vec<PrunedCheckpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(CreatedCheckpoint),
    /// The tree was clean when checked.
    NoChanges,
    /// Changes vanished between the dirty check and building the snapshot.
    NothingCaptured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoOutcome {
    Created(CreatedCheckpoint),
    NoChanges,
    /// Dirty state matches the most recent checkpoint.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied {
        checkpoint: Checkpoint,
        files: Vec<String>,
    },
    NothingToApply {
        checkpoint: Checkpoint,
    },
}

type Clock<'a> = Box<dyn Fn() -> DateTime<Utc> + 'a>;

pub struct CheckpointManager<'a> {
    repo: Repository,
    config: Config,
    confirm: &'a dyn Confirm,
    notifier: &'a dyn NotificationSink,
    clock: Clock<'a>,
}

impl<'a> CheckpointManager<'a> {
    pub fn new(
        repo: Repository,
        config: Config,
        confirm: &'a dyn Confirm,
        notifier: &'a dyn NotificationSink,
    ) -> Self {
        Self {
            repo,
            config,
            confirm,
            notifier,
            clock: Box::new(Utc::now),
        }
    }

    /// Replace the wall clock used for automatic names and retention ages.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 'a) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn lock(&self) -> Result<RepoLock> {
        RepoLock::acquire(self.repo.common_dir())
    }

    /// Create a checkpoint named `name`, or an automatic one when `name` is
    /// absent or blank.
    pub fn create(&self, name: Option<&str>) -> Result<CreateOutcome> {
        let _lock = self.lock()?;
        self.create_locked(name)
    }

    fn create_locked(&self, name: Option<&str>) -> Result<CreateOutcome> {
        if !self.repo.has_changes() {
            info!("no changes to checkpoint");
            return Ok(CreateOutcome::NoChanges);
        }

        let now = (self.clock)();
        let name = match name.filter(|n| !n.trim().is_empty()) {
            Some(raw) => resolve_manual_name(raw)?,
            None => auto_name(now),
        };

        if snapshot_exists(&self.repo, &name) {
            return Err(CheckpointError::DuplicateName(name));
        }

        let message = format!("checkpoint: {name}");
        let Some(object) = create_snapshot_object(&self.repo, &message, now)? else {
            info!(%name, "nothing to capture");
            return Ok(CreateOutcome::NothingCaptured);
        };

        tag_snapshot(&self.repo, &name, &object)?;

        let remote = push_ref(self.repo.root(), &name);
        if let RemoteStatus::Failed { remote, reason } = &remote {
            warn!(%name, %remote, %reason, "checkpoint kept locally; push failed");
        }

        let checkpoint = find_snapshot(&self.repo, &name)?
            .unwrap_or_else(|| Checkpoint::new(name.clone(), object.clone(), now));

        if self.config.notify {
            let (title, body) = checkpoint_created_message(&name, &remote);
            self.notifier.notify(&title, &body);
        }

        let pruned = if checkpoint.is_auto() {
            self.prune_locked(now)?
        } else {
            Vec::new()
        };

        info!(%name, %object, "checkpoint created");
        Ok(CreateOutcome::Created(CreatedCheckpoint {
            checkpoint,
            remote,
            pruned,
        }))
    }

    /// All checkpoints, newest first.
    pub fn list(&self) -> Result<Vec<Checkpoint>> {
        list_snapshots(&self.repo)
    }

    /// Apply a checkpoint's changes to the work tree after confirmation.
    ///
    /// The checkpoint is kept whatever the result.
    pub fn load(&self, name: &str) -> Result<LoadOutcome> {
        let name = sanitize_name(name.trim());
        let checkpoint = find_snapshot(&self.repo, &name)?
            .ok_or_else(|| CheckpointError::NoSuchCheckpoint(name.clone()))?;

        let question = format!("Apply checkpoint '{name}' to the current working tree?");
        if !self.confirm.confirm(&question)? {
            return Err(CheckpointError::Declined);
        }

        match apply_snapshot(&self.repo, &checkpoint)? {
            ApplyOutcome::Applied { files } => Ok(LoadOutcome::Applied { checkpoint, files }),
            ApplyOutcome::NothingToApply => Ok(LoadOutcome::NothingToApply { checkpoint }),
            ApplyOutcome::Conflict { files } => {
                Err(CheckpointError::ApplyConflict { name, files })
            }
        }
    }

    /// Delete one checkpoint, or all of them when `target` is `*` (after confirmation).
    pub fn delete(&self, target: &str) -> Result<Vec<DeletedCheckpoint>> {
        let target = target.trim();
        if target == DELETE_ALL {
            return self.delete_all();
        }

        let name = sanitize_name(target);
        let _lock = self.lock()?;
        Ok(vec![self.delete_one(&name)?])
    }

    fn delete_all(&self) -> Result<Vec<DeletedCheckpoint>> {
        let count = self.list()?.len();
        if count == 0 {
            return Ok(Vec::new());
        }

        let question = format!("Delete all {count} checkpoint(s)?");
        if !self.confirm.confirm(&question)? {
            return Err(CheckpointError::Declined);
        }

        let _lock = self.lock()?;
        self.list()?
            .iter()
            .map(|cp| self.delete_one(&cp.name))
            .collect()
    }

    fn delete_one(&self, name: &str) -> Result<DeletedCheckpoint> {
        let remote = delete_snapshot(&self.repo, name)?;
        Ok(DeletedCheckpoint {
            name: name.to_string(),
            remote,
        })
    }

    fn prune_locked(&self, now: DateTime<Utc>) -> Result<Vec<PrunedCheckpoint>> {
        let policy = RetentionPolicy::from(&self.config);
        let plan = plan_prune(&self.list()?, &policy, now);

        let mut pruned = Vec::with_capacity(plan.len());
        for candidate in plan {
            match self.delete_one(&candidate.name) {
                Ok(deleted) => {
                    info!(name = %deleted.name, reasons = ?candidate.reasons, "pruned automatic checkpoint");
                    pruned.push(PrunedCheckpoint {
                        name: deleted.name,
                        reasons: candidate.reasons,
                        remote: deleted.remote,
                    });
                }
                Err(e) => warn!(name = %candidate.name, "failed to prune checkpoint: {e}"),
            }
        }
        Ok(pruned)
    }

    /// Create an automatic checkpoint only if the dirty state is new.
    pub fn auto(&self) -> Result<AutoOutcome> {
        let _lock = self.lock()?;

        if !self.repo.has_changes() {
            return Ok(AutoOutcome::NoChanges);
        }
        if !differs_from_last(&self.repo)? {
            info!("no new changes since the last checkpoint");
            return Ok(AutoOutcome::Unchanged);
        }

        Ok(match self.create_locked(None)? {
            CreateOutcome::Created(created) => AutoOutcome::Created(created),
            CreateOutcome::NoChanges => AutoOutcome::NoChanges,
            CreateOutcome::NothingCaptured => AutoOutcome::Unchanged,
        })
    }
}
