//! Command layer, run from inside the repository like the binary would be

use anyhow::Result;
use git_checkpoint::commands::{auto, config, create, delete, list, load};
use git_checkpoint::config::Config;
use git_checkpoint::error::CheckpointError;
use serial_test::serial;
use std::path::Path;

use super::helpers::*;

/// Run `f` with the process working directory set to `dir`.
fn in_dir<T>(dir: &Path, f: impl FnOnce() -> T) -> T {
    let original_dir = std::env::current_dir().expect("Should get current dir");
    std::env::set_current_dir(dir).expect("Should change directory");
    let result = f();
    std::env::set_current_dir(original_dir).expect("Should restore directory");
    result
}

#[test]
#[serial]
fn test_create_list_delete_commands() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();
    write_file(dir, "a.txt", "x\n")?;

    in_dir(dir, || create::execute(Some("mvp".to_string()), false))?;
    assert_eq!(checkpoint_refs(dir)?, vec!["mvp".to_string()]);

    in_dir(dir, || list::execute(false))?;
    in_dir(dir, || list::execute(true))?;

    in_dir(dir, || delete::execute("mvp".to_string(), false))?;
    assert!(checkpoint_refs(dir)?.is_empty());
    Ok(())
}

#[test]
#[serial]
fn test_commands_fail_outside_repository() -> Result<()> {
    let temp = tempfile::TempDir::new()?;
    let err = in_dir(temp.path(), || create::execute(None, false)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CheckpointError>(),
        Some(CheckpointError::NotARepository(_))
    ));
    Ok(())
}

#[test]
#[serial]
fn test_load_and_delete_all_with_yes() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();
    write_file(dir, "a.txt", "saved\n")?;
    in_dir(dir, || create::execute(Some("wip".to_string()), false))?;
    discard_changes(dir)?;

    in_dir(dir, || load::execute("wip".to_string(), true))?;
    assert_eq!(read_file(dir, "a.txt")?, "saved\n");

    in_dir(dir, || delete::execute("*".to_string(), true))?;
    assert!(checkpoint_refs(dir)?.is_empty());
    Ok(())
}

#[test]
#[serial]
fn test_load_command_restores_and_reports_missing() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();
    make_mixed_changes(dir)?;
    in_dir(dir, || create::execute(Some("mixed".to_string()), false))?;
    discard_changes(dir)?;

    in_dir(dir, || load::execute("mixed".to_string(), true))?;
    assert_eq!(read_file(dir, "staged.txt")?, "staged content\n");
    assert_eq!(read_file(dir, "notes/untracked.txt")?, "untracked content\n");

    let err = in_dir(dir, || load::execute("missing".to_string(), true)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CheckpointError>(),
        Some(CheckpointError::NoSuchCheckpoint(name)) if name == "missing"
    ));
    Ok(())
}

#[test]
#[serial]
fn test_auto_command_is_idempotent() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();
    write_file(dir, "a.txt", "x\n")?;

    in_dir(dir, auto::execute)?;
    in_dir(dir, auto::execute)?;
    assert_eq!(checkpoint_refs(dir)?.len(), 1);
    Ok(())
}

#[test]
#[serial]
fn test_config_set_and_get() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();

    in_dir(dir, || config::set("max_auto".to_string(), "3".to_string()))?;
    in_dir(dir, || config::set("interval".to_string(), "30s".to_string()))?;
    in_dir(dir, || config::set("notify".to_string(), "yes".to_string()))?;
    in_dir(dir, || config::get(None))?;
    in_dir(dir, || config::get(Some("max_auto".to_string())))?;

    let loaded = Config::load(dir)?;
    assert_eq!(loaded.max_auto, 3);
    assert_eq!(loaded.interval.as_secs(), 30);
    assert!(loaded.notify);
    assert_eq!(git(dir, &["config", "--local", "checkpoint.max-auto"])?, "3");
    assert_eq!(git(dir, &["config", "--local", "checkpoint.notify"])?, "true");
    Ok(())
}

#[test]
#[serial]
fn test_config_rejects_unknown_keys_and_bad_values() -> Result<()> {
    let temp = create_temp_git_repo()?;
    let dir = temp.path();

    let err = in_dir(dir, || config::set("colour".to_string(), "red".to_string())).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CheckpointError>(),
        Some(CheckpointError::UnknownConfigKey(_))
    ));

    let err = in_dir(dir, || config::set("interval".to_string(), "0".to_string())).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CheckpointError>(),
        Some(CheckpointError::InvalidConfig { .. })
    ));

    let err = in_dir(dir, || config::get(Some("colour".to_string()))).unwrap_err();
    assert!(err.to_string().contains("Unknown config key"));

    assert_eq!(Config::load(dir)?, Config::default());
    Ok(())
}
