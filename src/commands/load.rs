//! Load command: re-apply a checkpoint's changes to the work tree.
//! Usage: git-checkpoint load <name>

use anyhow::Result;
use colored::Colorize;

use super::common::Session;
use crate::checkpoints::LoadOutcome;
use crate::error::CheckpointError;

pub fn execute(name: String, assume_yes: bool) -> Result<()> {
    let session = Session::open(assume_yes)?;

    let outcome = session.manager().load(&name);
    match outcome {
        Ok(LoadOutcome::Applied { checkpoint, files }) => {
            println!(
                "{} Applied checkpoint {} ({} file(s))",
                "✓".green().bold(),
                checkpoint.short_reference().bold(),
                files.len()
            );
            for file in &files {
                println!("  {}", file.dimmed());
            }
            Ok(())
        }
        Ok(LoadOutcome::NothingToApply { checkpoint }) => {
            println!(
                "Checkpoint {} contains no changes relative to its base.",
                checkpoint.short_reference()
            );
            Ok(())
        }
        Err(CheckpointError::ApplyConflict { name, files }) => {
            eprintln!("{}", "Conflicted files:".yellow().bold());
            for file in &files {
                eprintln!("  {}", file.yellow());
            }
            Err(CheckpointError::ApplyConflict { name, files }.into())
        }
        Err(e) => Err(e.into()),
    }
}
