//! Retention policy for automatic checkpoints
//!
//! Two independent rules, both applied: keep at most `max_auto` automatic
//! checkpoints, and drop automatic checkpoints older than `auto_age_days`.
//! Manual checkpoints are never considered.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::types::Checkpoint;
use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// 0 disables the count rule.
    pub max_auto: u32,
    /// 0 disables the age rule.
    pub auto_age_days: u32,
}

impl From<&Config> for RetentionPolicy {
    fn from(config: &Config) -> Self {
        Self {
            max_auto: config.max_auto,
            auto_age_days: config.auto_age_days,
        }
    }
}

/// Why a checkpoint was selected for pruning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PruneReason {
    OverCount,
    TooOld,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneCandidate {
    pub name: String,
    pub reasons: Vec<PruneReason>,
}

/// Decide which automatic checkpoints to delete.
///
/// `checkpoints` may be in any order. The result is ordered oldest first.
pub fn plan_prune(
    checkpoints: &[Checkpoint],
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> Vec<PruneCandidate> {
    let mut autos: Vec<&Checkpoint> = checkpoints.iter().filter(|cp| cp.is_auto()).collect();
    autos.sort_by(|a, b| Checkpoint::newest_first(a, b));

    let over_count: &[&Checkpoint] = if policy.max_auto > 0 {
        autos.get(policy.max_auto as usize..).unwrap_or(&[])
    } else {
        &[]
    };

    // A cutoff before the earliest representable time selects nothing.
    let cutoff = (policy.auto_age_days > 0)
        .then(|| now.checked_sub_signed(Duration::days(i64::from(policy.auto_age_days))))
        .flatten();

    autos
        .iter()
        .rev()
        .filter_map(|cp| {
            let mut reasons = Vec::new();
            if over_count.iter().any(|o| o.name == cp.name) {
                reasons.push(PruneReason::OverCount);
            }
            if cutoff.is_some_and(|cutoff| cp.created_at < cutoff) {
                reasons.push(PruneReason::TooOld);
            }
            (!reasons.is_empty()).then(|| PruneCandidate {
                name: cp.name.clone(),
                reasons,
            })
        })
        .collect()
}
