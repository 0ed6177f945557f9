//! Config command
//! Usage: git-checkpoint config get [key] | set <key> <value>

use anyhow::Result;
use colored::Colorize;

use super::common::Session;
use crate::config::{self, ConfigKey};

pub fn get(key: Option<String>) -> Result<()> {
    let session = Session::open(false)?;

    match key {
        Some(key) => {
            let key: ConfigKey = key.parse()?;
            println!("{}", session.config.get(key));
        }
        None => {
            for key in ConfigKey::ALL {
                println!("{} = {}", key.as_str().bold(), session.config.get(key));
            }
        }
    }
    Ok(())
}

pub fn set(key: String, value: String) -> Result<()> {
    let session = Session::open(false)?;
    let key: ConfigKey = key.parse()?;
    let stored = config::set_value(session.repo.root(), key, &value)?;

    println!("{} {} = {}", "✓".green().bold(), key.as_str().bold(), stored);
    if key == ConfigKey::Interval && !session.config.paused {
        println!(
            "  {}",
            "Run `git checkpoint resume` to apply the new interval to the schedule.".dimmed()
        );
    }
    Ok(())
}
