//! Shared setup and output helpers for command implementations.

use anyhow::Result;
use colored::Colorize;

use crate::checkpoints::CheckpointManager;
use crate::config::Config;
use crate::error::CheckpointError;
use crate::git::{RemoteStatus, Repository};
use crate::notify::{DesktopNotifier, NoopNotifier, NotificationSink};
use crate::prompt::{Confirm, FixedAnswer, StdinConfirm};

/// Everything one invocation needs: the repository, its settings loaded once,
/// and the capabilities handed to the lifecycle manager.
pub struct Session {
    pub repo: Repository,
    pub config: Config,
    confirm: Box<dyn Confirm>,
    notifier: Box<dyn NotificationSink>,
}

impl Session {
    /// Discover the repository containing the working directory.
    pub fn open(assume_yes: bool) -> Result<Self> {
        let repo = Repository::discover_cwd()?;
        let config = Config::load(repo.root())?;

        let confirm: Box<dyn Confirm> = if assume_yes {
            Box::new(FixedAnswer::YES)
        } else {
            Box::new(StdinConfirm)
        };

        let notifier: Box<dyn NotificationSink> = if !config.notify {
            Box::new(NoopNotifier)
        } else {
            match DesktopNotifier::detect() {
                Some(notifier) => Box::new(notifier),
                None => {
                    warn("notifications are enabled but neither notify-send nor osascript is installed");
                    Box::new(NoopNotifier)
                }
            }
        };

        Ok(Self {
            repo,
            config,
            confirm,
            notifier,
        })
    }

    pub fn manager(&self) -> CheckpointManager<'_> {
        CheckpointManager::new(
            self.repo.clone(),
            self.config.clone(),
            self.confirm.as_ref(),
            self.notifier.as_ref(),
        )
    }
}

/// Print a warning to stderr.
pub fn warn(message: &str) {
    eprintln!("{} {message}", "warning:".yellow().bold());
}

/// Print where a reference change was mirrored, warning on failure.
pub fn report_remote(status: &RemoteStatus, action: &str) {
    match status {
        RemoteStatus::NoRemote => {}
        RemoteStatus::Synced { remote } => {
            println!("  {}", format!("{action} {remote}").dimmed());
        }
        RemoteStatus::Failed { .. } => {
            if let Some(err) = status.as_error() {
                warn(&err.to_string());
            }
        }
    }
}

/// Informational line for a clean working tree.
pub fn report_no_changes() {
    println!("{}.", CheckpointError::NoChangesToCapture);
}
