//! crontab-backed schedule registrar
//!
//! Each registration is one crontab line ending in a marker comment that
//! names the repository, so entries can be found and removed without
//! touching the user's other jobs.

use anyhow::{anyhow, Context};
use shell_escape::escape;
use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use super::{ScheduleEntry, ScheduleRegistrar};
use crate::error::Result;

/// Prefix of the marker comment appended to every line this tool installs.
pub const MARKER_PREFIX: &str = "# git-checkpoint:";

#[derive(Debug, Clone)]
pub struct CrontabRegistrar {
    program: PathBuf,
}

impl CrontabRegistrar {
    pub fn detect() -> Option<Self> {
        which::which("crontab").ok().map(|program| Self { program })
    }

    fn read(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("-l")
            .output()
            .context("Failed to execute: crontab -l")?;

        // `crontab -l` fails when the user has no crontab yet.
        if !output.status.success() {
            debug!("crontab -l returned no table");
            return Ok(String::new());
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn write(&self, table: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to execute: crontab -")?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(table.as_bytes())
                .context("Failed to write crontab")?;
        }

        let output = child.wait_with_output().context("Failed to wait for crontab")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("crontab failed: {}", stderr.trim()).into());
        }
        Ok(())
    }
}

impl ScheduleRegistrar for CrontabRegistrar {
    fn install(&self, entry: &ScheduleEntry) -> Result<()> {
        let table = self.read()?;
        let updated = append_line(&table, &render_line(entry));
        self.write(&updated)
    }

    fn remove(&self, repo_root: &Path) -> Result<bool> {
        let table = self.read()?;
        let marker = marker_for(repo_root);
        let (updated, removed) = strip_lines(&table, |line| line.ends_with(&marker));
        if removed > 0 {
            self.write(&updated)?;
        }
        Ok(removed > 0)
    }

    fn remove_all(&self) -> Result<usize> {
        let table = self.read()?;
        let (updated, removed) = strip_lines(&table, |line| line.contains(MARKER_PREFIX));
        if removed > 0 {
            self.write(&updated)?;
        }
        Ok(removed)
    }

    fn describe(&self, repo_root: &Path) -> Result<Option<String>> {
        let table = self.read()?;
        Ok(find_line(&table, repo_root))
    }
}

pub fn marker_for(repo_root: &Path) -> String {
    format!("{MARKER_PREFIX}{}", repo_root.display())
}

fn quote(path: &Path) -> Cow<'_, str> {
    escape(path.to_string_lossy())
}

/// The crontab line for `entry`.
///
/// Sub-minute schedules run several times inside one tick, sleeping between runs.
pub fn render_line(entry: &ScheduleEntry) -> String {
    let run = format!("{} auto >/dev/null 2>&1", quote(&entry.executable));
    let command = match entry.schedule.repeat {
        None => run,
        Some(repeat) => format!(
            "i=0; while [ $i -lt {runs} ]; do [ $i -gt 0 ] && sleep {sleep}; {run}; i=$((i+1)); done",
            runs = repeat.runs,
            sleep = repeat.sleep_secs,
        ),
    };

    format!(
        "{} cd {} && {} {}",
        entry.schedule.expression,
        quote(&entry.repo_root),
        command,
        marker_for(&entry.repo_root)
    )
}

fn find_line(table: &str, repo_root: &Path) -> Option<String> {
    let marker = marker_for(repo_root);
    table
        .lines()
        .find(|line| line.ends_with(&marker))
        .map(String::from)
}

fn append_line(table: &str, line: &str) -> String {
    let mut updated = table.to_string();
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(line);
    updated.push('\n');
    updated
}

fn strip_lines(table: &str, matches: impl Fn(&str) -> bool) -> (String, usize) {
    let mut removed = 0;
    let mut kept = String::new();
    for line in table.lines() {
        if matches(line) {
            removed += 1;
        } else {
            kept.push_str(line);
            kept.push('\n');
        }
    }
    (kept, removed)
}
