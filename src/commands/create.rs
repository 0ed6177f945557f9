//! Create command
//! Usage: git-checkpoint create [name]

use anyhow::Result;
use colored::Colorize;

use super::common::{report_no_changes, report_remote, Session};
use crate::checkpoints::{CreateOutcome, CreatedCheckpoint, PruneReason};

pub fn execute(name: Option<String>, assume_yes: bool) -> Result<()> {
    let session = Session::open(assume_yes)?;
    match session.manager().create(name.as_deref())? {
        CreateOutcome::Created(created) => print_created(&created),
        CreateOutcome::NoChanges => report_no_changes(),
        CreateOutcome::NothingCaptured => {
            println!("Nothing to capture: changes were reverted while checkpointing.")
        }
    }
    Ok(())
}

/// Shared with `auto`.
pub fn print_created(created: &CreatedCheckpoint) {
    println!(
        "{} Created checkpoint {}",
        "✓".green().bold(),
        created.checkpoint.short_reference().bold()
    );
    report_remote(&created.remote, "pushed to");

    for pruned in &created.pruned {
        let reasons: Vec<&str> = pruned
            .reasons
            .iter()
            .map(|r| match r {
                PruneReason::OverCount => "over limit",
                PruneReason::TooOld => "too old",
            })
            .collect();
        println!(
            "  {} pruned {} ({})",
            "-".dimmed(),
            pruned.name,
            reasons.join(", ").dimmed()
        );
        report_remote(&pruned.remote, "removed from");
    }
}
