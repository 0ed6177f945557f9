//! Best-effort synchronisation of checkpoint references with a remote.
//!
//! Nothing here returns an error for a failed push or delete: those become
//! `RemoteStatus::Failed` and are reported as warnings by the caller.

use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

use super::runner::{run_git, run_git_env};
use crate::checkpoints::types::reference_for;
use crate::error::CheckpointError;

/// Result of mirroring a local reference change to the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemoteStatus {
    /// No remote is configured; the change is local only.
    NoRemote,
    Synced { remote: String },
    Failed { remote: String, reason: String },
}

impl RemoteStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, RemoteStatus::Failed { .. })
    }

    /// The warning-level error describing a failure, if any.
    pub fn as_error(&self) -> Option<CheckpointError> {
        match self {
            RemoteStatus::Failed { remote, reason } => {
                Some(CheckpointError::RemoteOperationFailed {
                    remote: remote.clone(),
                    reason: reason.clone(),
                })
            }
            _ => None,
        }
    }
}

/// The remote checkpoints are mirrored to: `origin` if present, else the first listed.
pub fn default_remote(repo_root: &Path) -> Option<String> {
    let output = run_git(&["remote"], repo_root).ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    pick_remote(stdout.lines())
}

fn pick_remote<'a>(remotes: impl Iterator<Item = &'a str>) -> Option<String> {
    let remotes: Vec<&str> = remotes.map(str::trim).filter(|r| !r.is_empty()).collect();
    remotes
        .iter()
        .find(|r| **r == "origin")
        .or_else(|| remotes.first())
        .map(|r| r.to_string())
}

/// Push `checkpoint/<name>` to the default remote.
pub fn push_ref(repo_root: &Path, name: &str) -> RemoteStatus {
    let reference = reference_for(name);
    let refspec = format!("{reference}:{reference}");
    sync(repo_root, &["push", "--quiet", "--no-verify"], &refspec)
}

/// Delete `checkpoint/<name>` on the default remote.
pub fn delete_remote_ref(repo_root: &Path, name: &str) -> RemoteStatus {
    let refspec = format!(":{}", reference_for(name));
    sync(repo_root, &["push", "--quiet", "--no-verify"], &refspec)
}

fn sync(repo_root: &Path, base_args: &[&str], refspec: &str) -> RemoteStatus {
    let Some(remote) = default_remote(repo_root) else {
        return RemoteStatus::NoRemote;
    };

    let mut args = base_args.to_vec();
    args.push(remote.as_str());
    args.push(refspec);

    // Never block on a credential prompt; scheduled runs have no terminal.
    let envs = [("GIT_TERMINAL_PROMPT", "0")];
    let reason = match run_git_env(&args, &envs, repo_root) {
        Ok(output) if output.status.success() => {
            debug!(%remote, %refspec, "remote reference updated");
            return RemoteStatus::Synced { remote };
        }
        Ok(output) => String::from_utf8_lossy(&output.stderr).trim().to_string(),
        Err(e) => e.to_string(),
    };

    warn!(%remote, %refspec, %reason, "remote reference update failed");
    RemoteStatus::Failed { remote, reason }
}
