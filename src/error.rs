//! Error taxonomy for checkpoint operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Not a git repository (or any of the parent directories): {0}")]
    NotARepository(String),

    #[error("Checkpoint '{0}' already exists")]
    DuplicateName(String),

    #[error("Checkpoint '{0}' not found")]
    NoSuchCheckpoint(String),

    /// Informational: reported to the user, never returned as a failure.
    #[error("No changes to checkpoint")]
    NoChangesToCapture,

    #[error(
        "Applying checkpoint '{name}' produced conflicts in {} file(s); resolve them manually",
        files.len()
    )]
    ApplyConflict { name: String, files: Vec<String> },

    /// Remote failures are downgraded to warnings; this renders them.
    #[error("Remote operation on '{remote}' failed: {reason}")]
    RemoteOperationFailed { remote: String, reason: String },

    #[error("Invalid checkpoint name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Unknown config key '{0}' (expected one of: interval, notify, max_auto, auto_age_days)")]
    UnknownConfigKey(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidConfig {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Aborted")]
    Declined,

    #[error("Failed to acquire checkpoint lock at {path}: {source}")]
    Lock {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Git(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CheckpointError {
    /// Whether this error reflects the user declining a prompt rather than a failure.
    pub fn is_declined(&self) -> bool {
        matches!(self, CheckpointError::Declined)
    }
}

pub type Result<T> = std::result::Result<T, CheckpointError>;
