//! Differencing oracle: would a new snapshot differ from the last one?
//!
//! Used by `auto` to avoid piling up identical automatic checkpoints. The
//! check writes transient tree objects but no reference, and never touches
//! the index or the work tree.

use tracing::debug;

use crate::error::Result;
use crate::git::runner::run_git_differs;
use crate::git::{capture_state, latest_snapshot, snapshot_index_tree, Repository};

/// True iff the current dirty state differs from the most recent checkpoint.
///
/// - no checkpoint yet: true
/// - nothing to capture: false
/// - otherwise: whether the work-tree state or the index differ
pub fn differs_from_last(repo: &Repository) -> Result<bool> {
    let Some(latest) = latest_snapshot(repo)? else {
        debug!("no previous checkpoint; treating state as new");
        return Ok(true);
    };

    let Some(candidate) = capture_state(repo)? else {
        debug!("nothing to capture");
        return Ok(false);
    };

    let previous = format!("{}^{{tree}}", latest.object);
    let mut differs = trees_differ(repo, &previous, &candidate.tree);
    if !differs {
        // Snapshots without a recorded index only compare the work-tree state.
        if let Some(previous_index) = snapshot_index_tree(repo, &latest.object) {
            differs = trees_differ(repo, &previous_index, &candidate.index);
        }
    }

    debug!(latest = %latest.name, differs, "compared against last checkpoint");
    Ok(differs)
}

fn trees_differ(repo: &Repository, a: &str, b: &str) -> bool {
    run_git_differs(&["diff", "--quiet", "--no-ext-diff", a, b], repo.root())
}
