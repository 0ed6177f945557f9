//! Uninstall commands
//! Usage: git-checkpoint local-uninstall | uninstall

use anyhow::{Context, Result};
use colored::Colorize;

use super::common::{warn, Session};
use crate::config::remove_section;
use crate::error::CheckpointError;
use crate::prompt::{Confirm, FixedAnswer, StdinConfirm};
use crate::schedule::system_registrar;

/// Remove this repository's schedule entry and local settings.
/// Existing checkpoints are kept.
pub fn local() -> Result<()> {
    let session = Session::open(false)?;
    let (registrar, available) = system_registrar();
    if !available {
        warn("crontab not found; no schedule entry to remove");
    }

    let root = session.repo.root();
    let unscheduled = registrar.remove(root)?;
    let unconfigured = remove_section(root, false)?;

    if unscheduled || unconfigured {
        println!(
            "{} Removed git-checkpoint from {}",
            "✓".green().bold(),
            root.display()
        );
    } else {
        println!("git-checkpoint is not set up in {}", root.display());
    }
    println!("  {}", "Checkpoints were kept.".dimmed());
    Ok(())
}

/// Remove every schedule entry and the global settings section.
pub fn global(assume_yes: bool) -> Result<()> {
    let confirm: Box<dyn Confirm> = if assume_yes {
        Box::new(FixedAnswer::YES)
    } else {
        Box::new(StdinConfirm)
    };
    if !confirm.confirm("Remove git-checkpoint schedules from every repository?")? {
        return Err(CheckpointError::Declined.into());
    }

    let (registrar, available) = system_registrar();
    if !available {
        warn("crontab not found; no schedule entries to remove");
    }
    let removed = registrar.remove_all()?;

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let unconfigured = remove_section(&cwd, true)?;

    println!(
        "{} Removed {} schedule entr{}{}",
        "✓".green().bold(),
        removed,
        if removed == 1 { "y" } else { "ies" },
        if unconfigured { " and global settings" } else { "" }
    );
    println!(
        "  {}",
        "Checkpoints and per-repository settings were kept; run `local-uninstall` inside a repository to clear them."
            .dimmed()
    );
    Ok(())
}
