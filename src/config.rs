//! Per-repository checkpoint settings
//!
//! Settings live in the repository's local git config under the `checkpoint`
//! section. They are read once per invocation into a [`Config`] value that is
//! passed to the lifecycle manager; nothing reads git config mid-operation.

use anyhow::Context;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

use crate::error::{CheckpointError, Result};
use crate::git::runner::{run_git, run_git_checked};

/// Git config section holding all settings.
pub const SECTION: &str = "checkpoint";

pub const DEFAULT_INTERVAL_SECS: u64 = 5 * 60;
pub const DEFAULT_MAX_AUTO: u32 = 10;
pub const DEFAULT_AUTO_AGE_DAYS: u32 = 30;

/// Time between automatic checkpoint attempts.
///
/// Parsed from a bare integer (minutes) or an integer with an `s`/`m` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    seconds: u64,
}

impl Interval {
    pub fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    pub fn as_secs(&self) -> u64 {
        self.seconds
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::from_secs(DEFAULT_INTERVAL_SECS)
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let (digits, multiplier) = if let Some(d) = s.strip_suffix('s') {
            (d, 1)
        } else if let Some(d) = s.strip_suffix('m') {
            (d, 60)
        } else {
            (s.as_str(), 60)
        };

        let value: u64 = digits
            .trim()
            .parse()
            .map_err(|_| "expected minutes (e.g. 5) or seconds (e.g. 30s)".to_string())?;
        if value == 0 {
            return Err("interval must be greater than zero".to_string());
        }
        value
            .checked_mul(multiplier)
            .map(Self::from_secs)
            .ok_or_else(|| "interval is too large".to_string())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seconds % 60 == 0 {
            write!(f, "{}", self.seconds / 60)
        } else {
            write!(f, "{}s", self.seconds)
        }
    }
}

/// User-settable configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Interval,
    Notify,
    MaxAuto,
    AutoAgeDays,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 4] = [
        ConfigKey::Interval,
        ConfigKey::Notify,
        ConfigKey::MaxAuto,
        ConfigKey::AutoAgeDays,
    ];

    /// Name shown to and typed by the user.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Interval => "interval",
            ConfigKey::Notify => "notify",
            ConfigKey::MaxAuto => "max_auto",
            ConfigKey::AutoAgeDays => "auto_age_days",
        }
    }

    /// Fully qualified git config variable. Git forbids `_` in variable names.
    pub fn git_key(&self) -> String {
        let variable = match self {
            ConfigKey::Interval => "interval",
            ConfigKey::Notify => "notify",
            ConfigKey::MaxAuto => "max-auto",
            ConfigKey::AutoAgeDays => "auto-age-days",
        };
        format!("{SECTION}.{variable}")
    }

    /// Validate and normalise a value for this key.
    pub fn normalize(&self, value: &str) -> Result<String> {
        let invalid = |reason: String| CheckpointError::InvalidConfig {
            key: self.as_str().to_string(),
            value: value.to_string(),
            reason,
        };

        match self {
            ConfigKey::Interval => value.parse::<Interval>().map(|i| i.to_string()).map_err(invalid),
            ConfigKey::Notify => parse_bool(value)
                .map(|b| b.to_string())
                .ok_or_else(|| invalid("expected true or false".to_string())),
            ConfigKey::MaxAuto | ConfigKey::AutoAgeDays => value
                .trim()
                .parse::<u32>()
                .map(|n| n.to_string())
                .map_err(|_| invalid("expected a non-negative integer (0 disables)".to_string())),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = CheckpointError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "interval" => Ok(ConfigKey::Interval),
            "notify" => Ok(ConfigKey::Notify),
            "max_auto" => Ok(ConfigKey::MaxAuto),
            "auto_age_days" => Ok(ConfigKey::AutoAgeDays),
            _ => Err(CheckpointError::UnknownConfigKey(s.to_string())),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PAUSED_KEY: &str = "checkpoint.paused";

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub interval: Interval,
    pub notify: bool,
    /// Maximum automatic checkpoints to keep; 0 disables count pruning.
    pub max_auto: u32,
    /// Maximum age of automatic checkpoints in days; 0 disables age pruning.
    pub auto_age_days: u32,
    pub paused: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: Interval::default(),
            notify: false,
            max_auto: DEFAULT_MAX_AUTO,
            auto_age_days: DEFAULT_AUTO_AGE_DAYS,
            paused: false,
        }
    }
}

impl Config {
    /// Read settings from the repository's local git config.
    ///
    /// Unparseable stored values fall back to their defaults with a warning.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let output = run_git(
            &["config", "--local", "--get-regexp", r"^checkpoint\."],
            repo_root,
        )?;
        // Exit 1 means no matching keys.
        let stdout = if output.status.success() {
            String::from_utf8_lossy(&output.stdout).to_string()
        } else {
            String::new()
        };
        Ok(Self::from_entries(&stdout))
    }

    fn from_entries(listing: &str) -> Self {
        let mut config = Config::default();

        for line in listing.lines() {
            let Some((key, value)) = line.split_once(' ') else {
                continue;
            };
            let key = key.to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "checkpoint.interval" => match value.parse::<Interval>() {
                    Ok(interval) => config.interval = interval,
                    Err(reason) => warn_invalid(&key, value, &reason),
                },
                "checkpoint.notify" => match parse_bool(value) {
                    Some(b) => config.notify = b,
                    None => warn_invalid(&key, value, "expected true or false"),
                },
                "checkpoint.max-auto" => match value.parse() {
                    Ok(n) => config.max_auto = n,
                    Err(_) => warn_invalid(&key, value, "expected a non-negative integer"),
                },
                "checkpoint.auto-age-days" => match value.parse() {
                    Ok(n) => config.auto_age_days = n,
                    Err(_) => warn_invalid(&key, value, "expected a non-negative integer"),
                },
                "checkpoint.paused" => config.paused = parse_bool(value).unwrap_or(false),
                _ => {}
            }
        }

        config
    }

    /// Effective value of a user key, formatted the way `config set` accepts it.
    pub fn get(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::Interval => self.interval.to_string(),
            ConfigKey::Notify => self.notify.to_string(),
            ConfigKey::MaxAuto => self.max_auto.to_string(),
            ConfigKey::AutoAgeDays => self.auto_age_days.to_string(),
        }
    }
}

fn warn_invalid(key: &str, value: &str, reason: &str) {
    warn!(%key, %value, %reason, "ignoring invalid checkpoint setting, using default");
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Validate `value` and persist it in local git config. Returns the stored value.
pub fn set_value(repo_root: &Path, key: ConfigKey, value: &str) -> Result<String> {
    let normalized = key.normalize(value)?;
    run_git_checked(
        &["config", "--local", &key.git_key(), &normalized],
        repo_root,
    )?;
    Ok(normalized)
}

/// Persist whether scheduled checkpointing is paused.
pub fn set_paused(repo_root: &Path, paused: bool) -> Result<()> {
    run_git_checked(
        &["config", "--local", PAUSED_KEY, if paused { "true" } else { "false" }],
        repo_root,
    )?;
    Ok(())
}

/// Remove the whole `checkpoint` section from local (or global) config.
///
/// Returns false when there was nothing to remove.
pub fn remove_section(repo_root: &Path, global: bool) -> Result<bool> {
    let scope = if global { "--global" } else { "--local" };
    let output = run_git(&["config", scope, "--remove-section", SECTION], repo_root)
        .context("Failed to remove checkpoint config section")?;
    Ok(output.status.success())
}
