//! Scheduler adapter for periodic automatic checkpoints
//!
//! Translates the configured interval into a cron-style registration that
//! runs `git-checkpoint auto` in the repository. Registrations live outside
//! the tool's own state (the user's crontab); the only state kept here is the
//! `paused` flag in local git config.

pub mod crontab;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{self, Config};
use crate::error::Result;

pub use crontab::CrontabRegistrar;

/// How a single scheduler tick is expanded for sub-minute intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepeatLoop {
    /// Number of `auto` runs inside one tick.
    pub runs: u64,
    /// Seconds slept between runs.
    pub sleep_secs: u64,
}

/// A periodic-execution expression for a given interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    /// Five-field cron expression.
    pub expression: String,
    /// Set when the interval is finer than the scheduler's one-minute granularity.
    pub repeat: Option<RepeatLoop>,
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repeat {
            Some(repeat) => write!(
                f,
                "{} ({} runs every {}s)",
                self.expression, repeat.runs, repeat.sleep_secs
            ),
            None => f.write_str(&self.expression),
        }
    }
}

/// Map an interval to the coarsest cron expression that represents it.
///
/// - under a minute: every minute, with a loop of runs inside the tick
/// - under an hour: every N minutes
/// - under a day: every N hours
/// - otherwise: daily at midnight
pub fn compute_schedule(interval_secs: u64) -> Schedule {
    let secs = interval_secs.max(1);

    if secs < 60 {
        Schedule {
            expression: "* * * * *".to_string(),
            repeat: Some(RepeatLoop {
                runs: (60 / secs).max(1),
                sleep_secs: secs,
            }),
        }
    } else if secs < 3600 {
        Schedule {
            expression: format!("*/{} * * * *", secs / 60),
            repeat: None,
        }
    } else if secs < 86_400 {
        Schedule {
            expression: format!("0 */{} * * *", secs / 3600),
            repeat: None,
        }
    } else {
        Schedule {
            expression: "0 0 * * *".to_string(),
            repeat: None,
        }
    }
}

/// Everything needed to register periodic `auto` runs for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub repo_root: PathBuf,
    pub executable: PathBuf,
    pub schedule: Schedule,
}

/// External periodic-task registry.
pub trait ScheduleRegistrar {
    /// Add a registration. Callers remove any previous one first.
    fn install(&self, entry: &ScheduleEntry) -> Result<()>;

    /// Remove the registration for `repo_root`; false if there was none.
    fn remove(&self, repo_root: &Path) -> Result<bool>;

    /// Remove every registration made by this tool; returns how many.
    fn remove_all(&self) -> Result<usize>;

    /// The installed registration for `repo_root`, as text.
    fn describe(&self, repo_root: &Path) -> Result<Option<String>>;

    fn is_registered(&self, repo_root: &Path) -> Result<bool> {
        Ok(self.describe(repo_root)?.is_some())
    }
}

/// Used when no scheduler is available; registrations silently do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRegistrar;

impl ScheduleRegistrar for NoopRegistrar {
    fn install(&self, entry: &ScheduleEntry) -> Result<()> {
        warn!(
            repo = %entry.repo_root.display(),
            "no scheduler available; automatic checkpoints not registered"
        );
        Ok(())
    }

    fn remove(&self, _repo_root: &Path) -> Result<bool> {
        Ok(false)
    }

    fn remove_all(&self) -> Result<usize> {
        Ok(0)
    }

    fn describe(&self, _repo_root: &Path) -> Result<Option<String>> {
        Ok(None)
    }
}

/// The crontab registrar if `crontab` is installed, otherwise a no-op.
///
/// The boolean is false when falling back, so callers can warn the user.
pub fn system_registrar() -> (Box<dyn ScheduleRegistrar>, bool) {
    match CrontabRegistrar::detect() {
        Some(registrar) => (Box::new(registrar), true),
        None => (Box::new(NoopRegistrar), false),
    }
}

/// State of scheduled checkpointing for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScheduleStatus {
    Paused,
    Active { registration: String },
    /// Not paused, yet no registration exists. `resume` repairs this.
    Missing,
}

/// Replace any registration for the repository with a fresh one and clear `paused`.
pub fn resume(
    repo_root: &Path,
    config: &Config,
    registrar: &dyn ScheduleRegistrar,
    executable: &Path,
) -> Result<Schedule> {
    let schedule = compute_schedule(config.interval.as_secs());
    registrar.remove(repo_root)?;
    registrar.install(&ScheduleEntry {
        repo_root: repo_root.to_path_buf(),
        executable: executable.to_path_buf(),
        schedule: schedule.clone(),
    })?;
    config::set_paused(repo_root, false)?;
    info!(repo = %repo_root.display(), %schedule, "automatic checkpoints resumed");
    Ok(schedule)
}

/// Remove the registration (if any) and mark the repository paused.
pub fn pause(repo_root: &Path, registrar: &dyn ScheduleRegistrar) -> Result<bool> {
    let removed = registrar.remove(repo_root)?;
    config::set_paused(repo_root, true)?;
    info!(repo = %repo_root.display(), removed, "automatic checkpoints paused");
    Ok(removed)
}

pub fn status(
    repo_root: &Path,
    config: &Config,
    registrar: &dyn ScheduleRegistrar,
) -> Result<ScheduleStatus> {
    if config.paused {
        return Ok(ScheduleStatus::Paused);
    }
    Ok(match registrar.describe(repo_root)? {
        Some(registration) => ScheduleStatus::Active { registration },
        None => ScheduleStatus::Missing,
    })
}
