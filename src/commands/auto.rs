//! Auto command, run by the scheduler.
//! Usage: git-checkpoint auto

use anyhow::Result;

use super::common::{report_no_changes, Session};
use super::create::print_created;
use crate::checkpoints::AutoOutcome;

pub fn execute() -> Result<()> {
    // Scheduled runs have no terminal to answer prompts.
    let session = Session::open(true)?;
    match session.manager().auto()? {
        AutoOutcome::Created(created) => print_created(&created),
        AutoOutcome::NoChanges => report_no_changes(),
        AutoOutcome::Unchanged => println!("No new changes since the last checkpoint."),
    }
    Ok(())
}
