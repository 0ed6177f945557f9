//! Retention of automatic checkpoints

use anyhow::Result;
use chrono::{Duration, Utc};
use git_checkpoint::checkpoints::{AutoOutcome, CreateOutcome, Origin, PruneReason};
use git_checkpoint::config::{set_value, Config, ConfigKey};
use git_checkpoint::prompt::FixedAnswer;

use super::helpers::*;

#[test]
fn test_count_limit_prunes_oldest_automatic_checkpoints() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();
    let now = Utc::now();

    let mut prior = Vec::new();
    for hours in 1..=5 {
        prior.push(backdated_auto_checkpoint(dir, now - Duration::hours(hours))?);
    }
    write_file(dir, "manual.txt", "m\n")?;
    let config = Config {
        max_auto: 3,
        ..Config::default()
    };
    manager(dir, config.clone(), &FixedAnswer::YES)?.create(Some("manual-keep"))?;

    write_file(dir, "a.txt", "new work\n")?;
    let mgr = manager(dir, config, &FixedAnswer::YES)?;
    let AutoOutcome::Created(created) = mgr.auto()? else {
        panic!("expected an automatic checkpoint");
    };

    // Newest first: prior[0] is one hour old, prior[4] five hours old.
    let pruned: Vec<&str> = created.pruned.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(pruned, vec![prior[4].as_str(), prior[3].as_str(), prior[2].as_str()]);
    assert!(created
        .pruned
        .iter()
        .all(|p| p.reasons == vec![PruneReason::OverCount]));

    let remaining = mgr.list()?;
    let autos: Vec<&str> = remaining
        .iter()
        .filter(|cp| cp.origin() == Origin::Auto)
        .map(|cp| cp.name.as_str())
        .collect();
    assert_eq!(
        autos,
        vec![
            created.checkpoint.name.as_str(),
            prior[0].as_str(),
            prior[1].as_str()
        ]
    );
    assert!(remaining.iter().any(|cp| cp.name == "manual-keep"));
    Ok(())
}

#[test]
fn test_age_limit_prunes_stale_automatic_checkpoints() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();
    let now = Utc::now();

    let stale = backdated_auto_checkpoint(dir, now - Duration::days(2))?;
    let fresh = backdated_auto_checkpoint(dir, now - Duration::hours(2))?;

    write_file(dir, "a.txt", "new work\n")?;
    let config = Config {
        auto_age_days: 1,
        ..Config::default()
    };
    let mgr = manager(dir, config, &FixedAnswer::YES)?;
    let AutoOutcome::Created(created) = mgr.auto()? else {
        panic!("expected an automatic checkpoint");
    };

    assert_eq!(created.pruned.len(), 1);
    assert_eq!(created.pruned[0].name, stale);
    assert_eq!(created.pruned[0].reasons, vec![PruneReason::TooOld]);

    let names: Vec<String> = mgr.list()?.into_iter().map(|cp| cp.name).collect();
    assert!(names.contains(&fresh));
    assert!(!names.contains(&stale));
    Ok(())
}

#[test]
fn test_manual_creation_never_prunes() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();
    let now = Utc::now();
    for hours in 1..=3 {
        backdated_auto_checkpoint(dir, now - Duration::hours(hours))?;
    }

    write_file(dir, "a.txt", "x\n")?;
    let config = Config {
        max_auto: 1,
        ..Config::default()
    };
    let mgr = manager(dir, config, &FixedAnswer::YES)?;
    let CreateOutcome::Created(created) = mgr.create(Some("manual"))? else {
        panic!("expected a checkpoint to be created");
    };
    assert!(created.pruned.is_empty());
    assert_eq!(mgr.list()?.len(), 4);
    Ok(())
}

#[test]
fn test_zero_limits_disable_pruning() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();
    let now = Utc::now();
    for days in 1..=4 {
        backdated_auto_checkpoint(dir, now - Duration::days(days * 100))?;
    }

    write_file(dir, "a.txt", "x\n")?;
    let config = Config {
        max_auto: 0,
        auto_age_days: 0,
        ..Config::default()
    };
    let mgr = manager(dir, config, &FixedAnswer::YES)?;
    let AutoOutcome::Created(created) = mgr.auto()? else {
        panic!("expected an automatic checkpoint");
    };
    assert!(created.pruned.is_empty());
    assert_eq!(mgr.list()?.len(), 5);
    Ok(())
}

#[test]
fn test_huge_age_limit_keeps_everything() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();
    let old = backdated_auto_checkpoint(dir, Utc::now() - Duration::days(400))?;

    set_value(dir, ConfigKey::AutoAgeDays, "100000000")?;
    let config = Config::load(dir)?;
    assert_eq!(config.auto_age_days, 100_000_000);

    write_file(dir, "a.txt", "x\n")?;
    let mgr = manager(dir, config, &FixedAnswer::YES)?;
    let AutoOutcome::Created(created) = mgr.auto()? else {
        panic!("expected an automatic checkpoint");
    };
    assert!(created.pruned.is_empty());
    assert!(mgr.list()?.iter().any(|cp| cp.name == old));
    Ok(())
}
