//! Snapshot store: detached snapshot commits bound to `checkpoint/<name>` refs.
//!
//! Snapshots are built against a throwaway copy of the index, so neither the
//! real index nor the work tree is modified. Like `git stash create`, the
//! snapshot commit has HEAD as first parent and a commit of the index as
//! second parent; its own tree is the full work-tree state. It is kept
//! reachable solely by its checkpoint reference.

use anyhow::{anyhow, Context};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use std::path::Path;
use tracing::{debug, info, warn};

use super::remote::{delete_remote_ref, RemoteStatus};
use super::repo::Repository;
use super::runner::{
    checked_stdout, run_git, run_git_bool, run_git_checked, run_git_env, run_git_with_input,
};
use crate::checkpoints::types::{reference_for, Checkpoint, REF_PREFIX};
use crate::error::{CheckpointError, Result};

/// Identity used for snapshot commits when the user has none configured
/// (e.g. when run from cron on a fresh machine).
const FALLBACK_IDENT_NAME: &str = "git-checkpoint";
const FALLBACK_IDENT_EMAIL: &str = "git-checkpoint@localhost";

/// Message trailer carrying the sub-second creation time of a snapshot.
pub const CREATED_TRAILER: &str = "Checkpoint-Created";

/// Outcome of re-applying a checkpoint to the work tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Changes applied cleanly; lists the paths touched.
    Applied { files: Vec<String> },
    /// The snapshot holds no changes relative to its base.
    NothingToApply,
    /// Some paths were left with conflict markers.
    Conflict { files: Vec<String> },
}

/// Tree objects describing the current dirty state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedState {
    /// Staged, unstaged and untracked content together.
    pub tree: String,
    /// The index alone.
    pub index: String,
}

/// Write the dirty state as tree objects.
///
/// Returns `None` when both the work-tree state and the index match HEAD,
/// i.e. there is nothing to capture.
pub fn capture_state(repo: &Repository) -> Result<Option<CapturedState>> {
    let scratch = tempfile::Builder::new()
        .prefix("checkpoint-index-")
        .tempdir_in(repo.git_dir())
        .context("Failed to create scratch directory for snapshot index")?;
    let scratch_index = scratch.path().join("index");

    let real_index = repo.index_path();
    if real_index.exists() {
        std::fs::copy(&real_index, &scratch_index)
            .with_context(|| format!("Failed to copy index {}", real_index.display()))?;
    }

    let envs = [("GIT_INDEX_FILE", scratch_index.as_os_str())];

    // Unmerged entries cannot be written as a tree; the work-tree state
    // then stands in for the index.
    let output = run_git_env(&["write-tree"], &envs, repo.root())?;
    let index = if output.status.success() {
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        debug!("index has unmerged entries");
        None
    };

    let args = ["add", "-A"];
    checked_stdout(&args, run_git_env(&args, &envs, repo.root())?)?;

    let args = ["write-tree"];
    let tree = checked_stdout(&args, run_git_env(&args, &envs, repo.root())?)?;
    let index = index.unwrap_or_else(|| tree.clone());

    let base = base_tree(repo)?;
    if tree == base && index == base {
        debug!(%tree, "snapshot matches HEAD, nothing to capture");
        return Ok(None);
    }

    Ok(Some(CapturedState { tree, index }))
}

/// Build a detached snapshot commit of the current dirty state.
///
/// `created_at` is recorded in a message trailer so snapshots made within the
/// same second still order correctly. Returns `None` when there is nothing to
/// capture; that is not an error.
pub fn create_snapshot_object(
    repo: &Repository,
    message: &str,
    created_at: DateTime<Utc>,
) -> Result<Option<String>> {
    let Some(state) = capture_state(repo)? else {
        return Ok(None);
    };

    let envs = identity_env(repo.root());
    let mut parents = Vec::new();
    if let Some(head) = repo.head() {
        let index_message = format!("{message} (index)");
        let index_commit = commit_tree(repo, &state.index, &[head.clone()], &index_message, &envs)?;
        parents.push(head);
        parents.push(index_commit);
    }

    let stamp = created_at.to_rfc3339_opts(SecondsFormat::Nanos, true);
    let message = format!("{message}\n\n{CREATED_TRAILER}: {stamp}\n");
    let object = commit_tree(repo, &state.tree, &parents, &message, &envs)?;
    debug!(%object, tree = %state.tree, index = %state.index, "created snapshot commit");
    Ok(Some(object))
}

fn commit_tree(
    repo: &Repository,
    tree: &str,
    parents: &[String],
    message: &str,
    envs: &[(&str, &str)],
) -> Result<String> {
    let mut args = vec!["commit-tree", tree];
    for parent in parents {
        args.extend(["-p", parent.as_str()]);
    }
    args.extend(["-m", message]);
    Ok(checked_stdout(&args, run_git_env(&args, envs, repo.root())?)?)
}

fn identity_env(repo_root: &Path) -> Vec<(&'static str, &'static str)> {
    if has_identity(repo_root) {
        return Vec::new();
    }
    vec![
        ("GIT_AUTHOR_NAME", FALLBACK_IDENT_NAME),
        ("GIT_AUTHOR_EMAIL", FALLBACK_IDENT_EMAIL),
        ("GIT_COMMITTER_NAME", FALLBACK_IDENT_NAME),
        ("GIT_COMMITTER_EMAIL", FALLBACK_IDENT_EMAIL),
    ]
}

fn has_identity(repo_root: &Path) -> bool {
    run_git_bool(&["var", "GIT_COMMITTER_IDENT"], repo_root)
        && run_git_bool(&["var", "GIT_AUTHOR_IDENT"], repo_root)
}

/// Tree of HEAD, or the empty tree on an unborn branch.
fn base_tree(repo: &Repository) -> Result<String> {
    match repo.head() {
        Some(head) => Ok(run_git_checked(
            &["rev-parse", &format!("{head}^{{tree}}")],
            repo.root(),
        )?),
        None => empty_tree(repo.root()),
    }
}

/// Id of the empty tree in this repository's object format.
pub fn empty_tree(repo_root: &Path) -> Result<String> {
    let args = ["hash-object", "-t", "tree", "--stdin"];
    Ok(checked_stdout(
        &args,
        run_git_with_input(&args, b"", repo_root)?,
    )?)
}

/// Tree of the index recorded in a snapshot, if it has one.
pub fn snapshot_index_tree(repo: &Repository, object: &str) -> Option<String> {
    let output = run_git(
        &["rev-parse", "--verify", "-q", &format!("{object}^2^{{tree}}")],
        repo.root(),
    )
    .ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

pub fn snapshot_exists(repo: &Repository, name: &str) -> bool {
    run_git_bool(
        &["rev-parse", "--verify", "-q", &reference_for(name)],
        repo.root(),
    )
}

/// Bind `checkpoint/<name>` to `object`.
///
/// The existence check is explicit; `update-ref` with an empty old value
/// additionally refuses to overwrite a ref created concurrently.
pub fn tag_snapshot(repo: &Repository, name: &str, object: &str) -> Result<()> {
    if snapshot_exists(repo, name) {
        return Err(CheckpointError::DuplicateName(name.to_string()));
    }

    let reference = reference_for(name);
    let message = format!("checkpoint: create {name}");
    let output = run_git(
        &["update-ref", "-m", &message, &reference, object, ""],
        repo.root(),
    )?;
    if !output.status.success() {
        if snapshot_exists(repo, name) {
            return Err(CheckpointError::DuplicateName(name.to_string()));
        }
        return Err(git_failure("update-ref", &output.stderr));
    }

    info!(%name, %object, "bound checkpoint reference");
    Ok(())
}

/// All checkpoints, most recent first.
///
/// Ordering is by creation time; names only break ties.
pub fn list_snapshots(repo: &Repository) -> Result<Vec<Checkpoint>> {
    let stdout = run_git_checked(
        &[
            "for-each-ref",
            "--format=%(refname)%1f%(objectname)%1f%(creatordate:unix)%1f%(contents:body)%1e",
            REF_PREFIX,
        ],
        repo.root(),
    )?;

    let mut checkpoints = parse_ref_listing(&stdout);
    checkpoints.sort_by(Checkpoint::newest_first);
    Ok(checkpoints)
}

pub fn find_snapshot(repo: &Repository, name: &str) -> Result<Option<Checkpoint>> {
    Ok(list_snapshots(repo)?.into_iter().find(|cp| cp.name == name))
}

/// Most recent checkpoint by creation time.
pub fn latest_snapshot(repo: &Repository) -> Result<Option<Checkpoint>> {
    Ok(list_snapshots(repo)?.into_iter().next())
}

/// Parse `for-each-ref` records: fields split by 0x1f, records ended by 0x1e.
///
/// The creation trailer wins over the committer date when present.
fn parse_ref_listing(output: &str) -> Vec<Checkpoint> {
    output
        .split('\x1e')
        .filter_map(|record| {
            let mut fields = record.trim_start_matches('\n').splitn(4, '\x1f');
            let name = fields.next()?.strip_prefix(REF_PREFIX)?;
            let object = fields.next()?;
            let committed = parse_unix(fields.next()?)?;
            let created_at = fields
                .next()
                .and_then(parse_created_trailer)
                .unwrap_or(committed);
            Some(Checkpoint::new(name, object, created_at))
        })
        .collect()
}

fn parse_unix(raw: &str) -> Option<DateTime<Utc>> {
    let secs = raw.trim().parse::<i64>().ok()?;
    Utc.timestamp_opt(secs, 0).single()
}

fn parse_created_trailer(body: &str) -> Option<DateTime<Utc>> {
    body.lines().find_map(|line| {
        let value = line.strip_prefix(CREATED_TRAILER)?.strip_prefix(':')?;
        DateTime::parse_from_rfc3339(value.trim())
            .ok()
            .map(|at| at.with_timezone(&Utc))
    })
}

/// Remove the local `checkpoint/<name>` reference.
pub fn delete_local_ref(repo: &Repository, name: &str) -> Result<()> {
    if !snapshot_exists(repo, name) {
        return Err(CheckpointError::NoSuchCheckpoint(name.to_string()));
    }
    run_git_checked(&["update-ref", "-d", &reference_for(name)], repo.root())?;
    info!(%name, "deleted checkpoint reference");
    Ok(())
}

/// Delete a checkpoint locally, then best-effort on the remote.
pub fn delete_snapshot(repo: &Repository, name: &str) -> Result<RemoteStatus> {
    delete_local_ref(repo, name)?;
    let remote = delete_remote_ref(repo.root(), name);
    if let RemoteStatus::Failed { remote, reason } = &remote {
        warn!(%name, %remote, %reason, "remote checkpoint reference not deleted");
    }
    Ok(remote)
}

/// Merge the checkpoint's changes into the current index and work tree.
///
/// When the work-tree state equals the snapshot's base but the index did not,
/// only the staged changes are restored, to the index. The checkpoint itself
/// is left untouched. Conflicts are reported as an outcome; the conflicted
/// state is left in place for the user.
pub fn apply_snapshot(repo: &Repository, checkpoint: &Checkpoint) -> Result<ApplyOutcome> {
    let base = snapshot_base(repo, &checkpoint.object)?;

    let files = changed_files(repo, &base, &checkpoint.object)?;
    if files.is_empty() {
        return apply_staged_only(repo, checkpoint, &base);
    }

    let diff = binary_diff(repo, &base, &checkpoint.object)?;
    let output = run_git_with_input(&["apply", "--3way"], &diff, repo.root())?;
    if output.status.success() {
        info!(name = %checkpoint.name, files = files.len(), "applied checkpoint");
        return Ok(ApplyOutcome::Applied { files });
    }

    let conflicts = conflicting_files(repo.root());
    if !conflicts.is_empty() {
        info!(name = %checkpoint.name, conflicts = conflicts.len(), "checkpoint applied with conflicts");
        return Ok(ApplyOutcome::Conflict { files: conflicts });
    }

    Err(git_failure("apply", &output.stderr))
}

fn apply_staged_only(repo: &Repository, checkpoint: &Checkpoint, base: &str) -> Result<ApplyOutcome> {
    let Some(index) = snapshot_index_tree(repo, &checkpoint.object) else {
        return Ok(ApplyOutcome::NothingToApply);
    };
    let files = changed_files(repo, base, &index)?;
    if files.is_empty() {
        return Ok(ApplyOutcome::NothingToApply);
    }

    let diff = binary_diff(repo, base, &index)?;
    let output = run_git_with_input(&["apply", "--cached"], &diff, repo.root())?;
    if !output.status.success() {
        return Err(git_failure("apply", &output.stderr));
    }
    info!(name = %checkpoint.name, files = files.len(), "restored staged changes");
    Ok(ApplyOutcome::Applied { files })
}

fn changed_files(repo: &Repository, from: &str, to: &str) -> Result<Vec<String>> {
    let changed = run_git_checked(&["diff", "--name-only", from, to], repo.root())?;
    Ok(changed.lines().map(String::from).collect())
}

fn binary_diff(repo: &Repository, from: &str, to: &str) -> Result<Vec<u8>> {
    let output = run_git(&["diff", "--binary", "--full-index", from, to], repo.root())?;
    if !output.status.success() {
        return Err(git_failure("diff", &output.stderr));
    }
    Ok(output.stdout)
}

fn git_failure(cmd: &str, stderr: &[u8]) -> CheckpointError {
    let stderr = String::from_utf8_lossy(stderr);
    anyhow!("git {cmd} failed: {}", stderr.trim()).into()
}

/// Parent commit of a snapshot, or the empty tree for a root snapshot.
fn snapshot_base(repo: &Repository, object: &str) -> Result<String> {
    let parent = run_git(
        &["rev-parse", "--verify", "-q", &format!("{object}^1")],
        repo.root(),
    )?;
    if parent.status.success() {
        return Ok(String::from_utf8_lossy(&parent.stdout).trim().to_string());
    }
    empty_tree(repo.root())
}

/// Paths with unmerged index entries.
pub fn conflicting_files(repo_root: &Path) -> Vec<String> {
    run_git_checked(&["diff", "--name-only", "--diff-filter=U"], repo_root)
        .map(|stdout| {
            stdout
                .lines()
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
