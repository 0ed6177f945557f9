//! Scheduler control
//! Usage: git-checkpoint pause | resume | status

use anyhow::{Context, Result};
use colored::Colorize;

use super::common::{warn, Session};
use crate::schedule::{self, system_registrar, ScheduleRegistrar, ScheduleStatus};

fn registrar() -> Box<dyn ScheduleRegistrar> {
    let (registrar, available) = system_registrar();
    if !available {
        warn("crontab not found; automatic checkpoints cannot be scheduled");
    }
    registrar
}

pub fn resume() -> Result<()> {
    let session = Session::open(false)?;
    let executable = std::env::current_exe().context("Failed to locate the git-checkpoint executable")?;
    let schedule = schedule::resume(
        session.repo.root(),
        &session.config,
        registrar().as_ref(),
        &executable,
    )?;

    println!(
        "{} Automatic checkpoints resumed (every {}, {})",
        "✓".green().bold(),
        describe_interval(&session.config.interval.to_string()),
        schedule.to_string().dimmed()
    );
    Ok(())
}

pub fn pause() -> Result<()> {
    let session = Session::open(false)?;
    let removed = schedule::pause(session.repo.root(), registrar().as_ref())?;

    if removed {
        println!("{} Automatic checkpoints paused", "✓".green().bold());
    } else {
        println!(
            "{} Automatic checkpoints paused {}",
            "✓".green().bold(),
            "(no schedule was registered)".dimmed()
        );
    }
    Ok(())
}

pub fn status() -> Result<()> {
    let session = Session::open(false)?;
    let status = schedule::status(session.repo.root(), &session.config, registrar().as_ref())?;

    println!("{} {}", "Repository:".bold(), session.repo.root().display());
    println!(
        "{} {}",
        "Interval:".bold(),
        describe_interval(&session.config.interval.to_string())
    );
    match status {
        ScheduleStatus::Paused => println!("{} {}", "Status:".bold(), "paused".yellow()),
        ScheduleStatus::Active { registration } => {
            println!("{} {}", "Status:".bold(), "active".green());
            println!("{} {}", "Schedule:".bold(), registration.dimmed());
        }
        ScheduleStatus::Missing => {
            println!("{} {}", "Status:".bold(), "not scheduled".red());
            println!("  Run {} to register it.", "git checkpoint resume".cyan());
        }
    }
    Ok(())
}

/// `5` -> `5 min`, `30s` -> `30s`.
fn describe_interval(value: &str) -> String {
    if value.ends_with('s') {
        value.to_string()
    } else {
        format!("{value} min")
    }
}
