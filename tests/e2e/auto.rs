//! Automatic checkpoints and the differencing oracle

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use git_checkpoint::checkpoints::{differs_from_last, AutoOutcome, CreateOutcome, Origin};
use git_checkpoint::config::Config;
use git_checkpoint::prompt::FixedAnswer;

use super::helpers::*;

#[test]
fn test_auto_is_idempotent() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();
    make_mixed_changes(dir)?;
    let mgr = manager(dir, Config::default(), &FixedAnswer::YES)?;

    let AutoOutcome::Created(created) = mgr.auto()? else {
        panic!("expected an automatic checkpoint");
    };
    assert_eq!(created.checkpoint.origin(), Origin::Auto);

    assert_eq!(mgr.auto()?, AutoOutcome::Unchanged);
    assert_eq!(mgr.list()?.len(), 1);
    Ok(())
}

#[test]
fn test_auto_on_clean_tree() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let mgr = manager(temp.path(), Config::default(), &FixedAnswer::YES)?;

    assert_eq!(mgr.auto()?, AutoOutcome::NoChanges);
    assert!(mgr.list()?.is_empty());
    Ok(())
}

#[test]
fn test_auto_after_new_edits_creates_another() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();
    write_file(dir, "a.txt", "first\n")?;

    let first_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let mgr = manager(dir, Config::default(), &FixedAnswer::YES)?.with_clock(move || first_at);
    assert!(matches!(mgr.auto()?, AutoOutcome::Created(_)));

    write_file(dir, "a.txt", "second\n")?;
    let second_at = first_at + Duration::minutes(5);
    let mgr = manager(dir, Config::default(), &FixedAnswer::YES)?.with_clock(move || second_at);
    let AutoOutcome::Created(created) = mgr.auto()? else {
        panic!("expected a second automatic checkpoint");
    };
    assert_eq!(created.checkpoint.name, "auto_20240601_120500");
    assert_eq!(mgr.list()?.len(), 2);
    Ok(())
}

#[test]
fn test_auto_compares_against_newest_checkpoint_not_name_order() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();
    let mgr = manager(dir, Config::default(), &FixedAnswer::YES)?;

    write_file(dir, "a.txt", "old state\n")?;
    mgr.create(Some("zzz-old"))?;
    // Ensure the second checkpoint is strictly newer.
    std::thread::sleep(std::time::Duration::from_millis(1100));
    write_file(dir, "a.txt", "current state\n")?;
    mgr.create(Some("aaa-new"))?;

    // "zzz-old" sorts last by name but is older; state matches "aaa-new".
    let repo = open_repo(dir)?;
    assert!(!differs_from_last(&repo)?);
    assert_eq!(mgr.auto()?, AutoOutcome::Unchanged);
    Ok(())
}

#[test]
fn test_auto_finds_newest_checkpoint_made_within_the_same_second() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();
    let mgr = manager(dir, Config::default(), &FixedAnswer::YES)?;

    write_file(dir, "a.txt", "first\n")?;
    mgr.create(Some("zeta"))?;
    write_file(dir, "a.txt", "second\n")?;
    mgr.create(Some("alpha"))?;

    assert_eq!(mgr.list()?[0].name, "alpha");
    assert_eq!(mgr.auto()?, AutoOutcome::Unchanged);
    assert_eq!(mgr.list()?.len(), 2);
    Ok(())
}

#[test]
fn test_oracle_notices_staging_of_already_captured_content() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();
    write_file(dir, "a.txt", "x\n")?;
    let mgr = manager(dir, Config::default(), &FixedAnswer::YES)?;
    assert!(matches!(mgr.auto()?, AutoOutcome::Created(_)));

    git(dir, &["add", "a.txt"])?;
    assert!(differs_from_last(&open_repo(dir)?)?);
    Ok(())
}

#[test]
fn test_oracle_with_no_checkpoints_is_true() -> Result<()> {
    let temp = create_temp_git_repo()?;
    write_file(temp.path(), "a.txt", "x\n")?;
    let repo = open_repo(temp.path())?;

    assert!(differs_from_last(&repo)?);
    Ok(())
}

#[test]
fn test_oracle_does_not_write_refs_or_touch_state() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();
    make_mixed_changes(dir)?;
    let mgr = manager(dir, Config::default(), &FixedAnswer::YES)?;
    let CreateOutcome::Created(_) = mgr.create(Some("base"))? else {
        panic!("expected a checkpoint to be created");
    };
    write_file(dir, "README.md", "changed again\n")?;

    let before = state_hash(dir)?;
    let refs_before = checkpoint_refs(dir)?;
    assert!(differs_from_last(&open_repo(dir)?)?);
    assert_eq!(state_hash(dir)?, before);
    assert_eq!(checkpoint_refs(dir)?, refs_before);
    Ok(())
}
