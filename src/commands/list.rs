//! List command
//! Usage: git-checkpoint list [--json]

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use super::common::Session;
use crate::checkpoints::{Checkpoint, Origin};
use crate::utils::{format_age, short_id};

#[derive(Serialize)]
struct ListEntry<'a> {
    #[serde(flatten)]
    checkpoint: &'a Checkpoint,
    reference: String,
    origin: Origin,
}

pub fn execute(json: bool) -> Result<()> {
    let session = Session::open(false)?;
    let checkpoints = session.manager().list()?;

    if json {
        println!("{}", render_json(&checkpoints)?);
        return Ok(());
    }

    if checkpoints.is_empty() {
        println!("No checkpoints.");
        return Ok(());
    }

    let now = Utc::now();
    println!("{}", "Checkpoints".bold());
    println!("{}", "─".repeat(60).dimmed());
    for checkpoint in &checkpoints {
        println!("{}", render_line(checkpoint, now));
    }
    Ok(())
}

fn render_json(checkpoints: &[Checkpoint]) -> Result<String> {
    let entries: Vec<ListEntry> = checkpoints
        .iter()
        .map(|checkpoint| ListEntry {
            checkpoint,
            reference: checkpoint.reference(),
            origin: checkpoint.origin(),
        })
        .collect();
    serde_json::to_string_pretty(&entries).context("Failed to serialize checkpoint list")
}

fn render_line(checkpoint: &Checkpoint, now: DateTime<Utc>) -> String {
    let origin = match checkpoint.origin() {
        Origin::Auto => "auto  ".dimmed(),
        Origin::Manual => "manual".cyan(),
    };
    // Names are padded, never cut, so they can be passed back to load/delete.
    format!(
        "  {:<32} {} {} {}",
        checkpoint.name,
        origin,
        short_id(&checkpoint.object, 7).yellow(),
        format_age(checkpoint.created_at, now).dimmed()
    )
}
