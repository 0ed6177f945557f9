//! Git plumbing for checkpoints
//!
//! This module provides:
//! - A command runner shared by every git invocation
//! - Repository discovery and dirty-state probing
//! - Snapshot object creation, reference binding, listing and apply
//! - Best-effort mirroring of checkpoint references to a remote

pub mod remote;
pub mod repo;
pub mod runner;
pub mod snapshot;

pub use remote::{default_remote, delete_remote_ref, push_ref, RemoteStatus};
pub use repo::{has_changes, is_repository, Repository};
pub use snapshot::{
    apply_snapshot, capture_state, create_snapshot_object, delete_local_ref, delete_snapshot,
    find_snapshot, latest_snapshot, list_snapshots, snapshot_exists, snapshot_index_tree,
    tag_snapshot, ApplyOutcome, CapturedState,
};
