//! Checkpoint types and naming rules

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{CheckpointError, Result};

/// Namespace under which checkpoint references live.
pub const REF_PREFIX: &str = "refs/tags/checkpoint/";

/// Prefix of automatically generated checkpoint names.
pub const AUTO_PREFIX: &str = "auto_";

/// strftime pattern for the timestamp part of automatic names.
const AUTO_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

fn auto_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^auto_\d{8}_\d{6}$").expect("static regex is valid"))
}

/// How a checkpoint came to exist. Inferred from its name, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Auto,
    Manual,
}

impl Origin {
    pub fn of(name: &str) -> Self {
        if is_auto_name(name) {
            Origin::Auto
        } else {
            Origin::Manual
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Auto => write!(f, "auto"),
            Origin::Manual => write!(f, "manual"),
        }
    }
}

/// A named, immutable snapshot of working-tree state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub name: String,
    /// Snapshot commit id.
    pub object: String,
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(name: impl Into<String>, object: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            object: object.into(),
            created_at,
        }
    }

    pub fn origin(&self) -> Origin {
        Origin::of(&self.name)
    }

    pub fn is_auto(&self) -> bool {
        self.origin() == Origin::Auto
    }

    /// Full git reference, e.g. `refs/tags/checkpoint/wip`.
    pub fn reference(&self) -> String {
        reference_for(&self.name)
    }

    /// Ordering for "most recent first": creation time, then name.
    ///
    /// Names only matter for equal timestamps, which sub-second creation
    /// stamps make rare.
    pub fn newest_first(a: &Checkpoint, b: &Checkpoint) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.name.cmp(&a.name))
    }

    /// Short display form, e.g. `checkpoint/wip`.
    pub fn short_reference(&self) -> String {
        format!("checkpoint/{}", self.name)
    }
}

/// Full git reference for a checkpoint name.
pub fn reference_for(name: &str) -> String {
    format!("{REF_PREFIX}{name}")
}

/// Replace every character outside `[a-zA-Z0-9._-]` with `_`.
pub fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Sanitize a user-supplied name and check it is usable as a manual checkpoint name.
pub fn resolve_manual_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CheckpointError::InvalidName {
            name: raw.to_string(),
            reason: "name cannot be empty".to_string(),
        });
    }

    let name = sanitize_name(trimmed);

    // git refuses ref components that start with '.' or end with ".lock",
    // and ".." anywhere in a ref.
    if name.starts_with('.') || name.ends_with(".lock") || name.contains("..") {
        return Err(CheckpointError::InvalidName {
            name,
            reason: "not a valid git reference component".to_string(),
        });
    }

    if is_auto_name(&name) {
        return Err(CheckpointError::InvalidName {
            name,
            reason: "names of the form auto_YYYYmmdd_HHMMSS are reserved for automatic checkpoints"
                .to_string(),
        });
    }

    Ok(name)
}

/// Name for an automatic checkpoint taken at `at`.
pub fn auto_name(at: DateTime<Utc>) -> String {
    format!("{AUTO_PREFIX}{}", at.format(AUTO_TIMESTAMP_FORMAT))
}

pub fn is_auto_name(name: &str) -> bool {
    auto_name_pattern().is_match(name)
}
