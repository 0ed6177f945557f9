//! Checkpoint engine
//!
//! This module provides:
//! - Checkpoint types and naming rules
//! - The differencing oracle used by automatic checkpoints
//! - The retention policy for automatic checkpoints
//! - The lifecycle manager tying it all together

pub mod diff;
pub mod manager;
pub mod retention;
pub mod types;

pub use diff::differs_from_last;
pub use manager::{
    AutoOutcome, CheckpointManager, CreateOutcome, CreatedCheckpoint, DeletedCheckpoint,
    LoadOutcome, PrunedCheckpoint, DELETE_ALL,
};
pub use retention::{plan_prune, PruneCandidate, PruneReason, RetentionPolicy};
pub use types::{auto_name, is_auto_name, sanitize_name, Checkpoint, Origin};
