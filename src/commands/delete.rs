//! Delete command
//! Usage: git-checkpoint delete <name|*>

use anyhow::Result;
use colored::Colorize;

use super::common::{report_remote, Session};
use crate::checkpoints::DELETE_ALL;

pub fn execute(target: String, assume_yes: bool) -> Result<()> {
    let session = Session::open(assume_yes)?;
    let deleted = session.manager().delete(&target)?;

    if deleted.is_empty() && target.trim() == DELETE_ALL {
        println!("No checkpoints to delete.");
        return Ok(());
    }

    for entry in &deleted {
        println!(
            "{} Deleted checkpoint {}",
            "✓".green().bold(),
            format!("checkpoint/{}", entry.name).bold()
        );
        report_remote(&entry.remote, "removed from");
    }
    Ok(())
}
