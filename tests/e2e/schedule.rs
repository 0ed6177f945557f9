//! Pause / resume / status against an in-memory registrar

use anyhow::Result;
use git_checkpoint::config::{Config, Interval};
use git_checkpoint::error::Result as CheckpointResult;
use git_checkpoint::schedule::crontab::render_line;
use git_checkpoint::schedule::{self, ScheduleEntry, ScheduleRegistrar, ScheduleStatus};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::helpers::*;

/// Keeps one rendered line per repository, like a crontab would.
#[derive(Default)]
struct MemoryRegistrar {
    lines: RefCell<BTreeMap<PathBuf, String>>,
}

impl ScheduleRegistrar for MemoryRegistrar {
    fn install(&self, entry: &ScheduleEntry) -> CheckpointResult<()> {
        self.lines
            .borrow_mut()
            .insert(entry.repo_root.clone(), render_line(entry));
        Ok(())
    }

    fn remove(&self, repo_root: &Path) -> CheckpointResult<bool> {
        Ok(self.lines.borrow_mut().remove(repo_root).is_some())
    }

    fn remove_all(&self) -> CheckpointResult<usize> {
        let mut lines = self.lines.borrow_mut();
        let count = lines.len();
        lines.clear();
        Ok(count)
    }

    fn describe(&self, repo_root: &Path) -> CheckpointResult<Option<String>> {
        Ok(self.lines.borrow().get(repo_root).cloned())
    }
}

#[test]
fn test_resume_pause_status_cycle() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let repo = open_repo(temp.path())?;
    let root = repo.root();
    let registrar = MemoryRegistrar::default();
    let exe = Path::new("/usr/local/bin/git-checkpoint");

    let config = Config::load(root)?;
    assert_eq!(
        schedule::status(root, &config, &registrar)?,
        ScheduleStatus::Missing
    );

    let scheduled = schedule::resume(root, &config, &registrar, exe)?;
    assert_eq!(scheduled.expression, "*/5 * * * *");
    let config = Config::load(root)?;
    assert!(!config.paused);
    let ScheduleStatus::Active { registration } = schedule::status(root, &config, &registrar)? else {
        panic!("expected an active schedule");
    };
    assert!(registration.contains("git-checkpoint auto"));
    assert!(registrar.is_registered(root)?);

    assert!(schedule::pause(root, &registrar)?);
    let config = Config::load(root)?;
    assert!(config.paused);
    assert_eq!(
        schedule::status(root, &config, &registrar)?,
        ScheduleStatus::Paused
    );

    assert!(!registrar.is_registered(root)?);

    // Pausing twice is fine.
    assert!(!schedule::pause(root, &registrar)?);
    Ok(())
}

#[test]
fn test_resume_replaces_previous_registration() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let repo = open_repo(temp.path())?;
    let root = repo.root();
    let registrar = MemoryRegistrar::default();
    let exe = Path::new("/usr/local/bin/git-checkpoint");

    schedule::resume(root, &Config::default(), &registrar, exe)?;

    let config = Config {
        interval: Interval::from_secs(30),
        ..Config::default()
    };
    let scheduled = schedule::resume(root, &config, &registrar, exe)?;
    assert_eq!(scheduled.expression, "* * * * *");

    assert_eq!(registrar.lines.borrow().len(), 1);
    let line = registrar.describe(root)?.unwrap_or_default();
    assert!(line.contains("sleep 30"));
    Ok(())
}
