//! Test helper functions for E2E tests

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use git_checkpoint::checkpoints::{auto_name, CheckpointManager};
use git_checkpoint::config::Config;
use git_checkpoint::git::Repository;
use git_checkpoint::notify::NoopNotifier;
use git_checkpoint::prompt::Confirm;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Creates a temporary git repository with initial commit
///
/// Returns a TempDir that must be kept in scope for the lifetime of the test
pub fn create_temp_git_repo() -> Result<TempDir> {
    let temp = TempDir::new().context("Failed to create temp directory")?;

    git(temp.path(), &["init", "-q"])?;
    git(temp.path(), &["config", "user.email", "test@test.com"])?;
    git(temp.path(), &["config", "user.name", "Test User"])?;
    git(temp.path(), &["config", "commit.gpgsign", "false"])?;

    std::fs::write(temp.path().join("README.md"), "# Test Repository\n")
        .context("Failed to write README.md")?;
    std::fs::write(temp.path().join(".gitignore"), "*.log\n")
        .context("Failed to write .gitignore")?;

    git(temp.path(), &["add", "."])?;
    git(temp.path(), &["commit", "-q", "-m", "Initial commit"])?;

    Ok(temp)
}

/// Runs git in `dir` and returns trimmed stdout, failing on a non-zero exit.
pub fn git(dir: &Path, args: &[&str]) -> Result<String> {
    git_with_env(dir, args, &[])
}

pub fn git_with_env(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .envs(envs.iter().copied())
        .current_dir(dir)
        .output()
        .with_context(|| format!("Failed to run git {}", args.join(" ")))?;

    if !output.status.success() {
        bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

pub fn write_file(dir: &Path, relative: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content).with_context(|| format!("Failed to write {relative}"))?;
    Ok(path)
}

pub fn read_file(dir: &Path, relative: &str) -> Result<String> {
    std::fs::read_to_string(dir.join(relative)).with_context(|| format!("Failed to read {relative}"))
}

/// Leaves the repository with one staged, one unstaged and one untracked change.
pub fn make_mixed_changes(dir: &Path) -> Result<()> {
    write_file(dir, "staged.txt", "staged content\n")?;
    git(dir, &["add", "staged.txt"])?;
    write_file(dir, "README.md", "# Test Repository\n\nunstaged edit\n")?;
    write_file(dir, "notes/untracked.txt", "untracked content\n")?;
    Ok(())
}

/// Throw away every uncommitted change, including untracked files.
pub fn discard_changes(dir: &Path) -> Result<()> {
    git(dir, &["reset", "-q", "--hard"])?;
    git(dir, &["clean", "-q", "-fd"])?;
    Ok(())
}

/// SHA-256 over the index file and every work tree file outside `.git`.
pub fn state_hash(dir: &Path) -> Result<String> {
    let mut hasher = Sha256::new();

    let index = std::fs::read(dir.join(".git").join("index")).context("Failed to read index")?;
    hasher.update(&index);

    let mut files = Vec::new();
    collect_files(dir, dir, &mut files)?;
    files.sort();
    for relative in files {
        hasher.update(relative.as_bytes());
        hasher.update(std::fs::read(dir.join(&relative))?);
    }

    Ok(hex::encode(hasher.finalize()))
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.file_name().is_some_and(|n| n == ".git") {
            continue;
        }
        if path.is_dir() {
            collect_files(root, &path, out)?;
        } else {
            let relative = path.strip_prefix(root)?.to_string_lossy().to_string();
            out.push(relative);
        }
    }
    Ok(())
}

pub fn open_repo(dir: &Path) -> Result<Repository> {
    Ok(Repository::discover(dir)?)
}

pub fn manager<'a>(dir: &Path, config: Config, confirm: &'a dyn Confirm) -> Result<CheckpointManager<'a>> {
    Ok(CheckpointManager::new(
        open_repo(dir)?,
        config,
        confirm,
        &NoopNotifier,
    ))
}

/// Paths stored in a checkpoint's snapshot tree.
pub fn snapshot_paths(dir: &Path, name: &str) -> Result<Vec<String>> {
    let listing = git(
        dir,
        &["ls-tree", "-r", "--name-only", &format!("refs/tags/checkpoint/{name}")],
    )?;
    Ok(listing.lines().map(String::from).collect())
}

/// Content of `path` as stored in a checkpoint.
pub fn snapshot_file(dir: &Path, name: &str, path: &str) -> Result<String> {
    git(dir, &["show", &format!("refs/tags/checkpoint/{name}:{path}")])
}

/// Binds an automatic checkpoint created at `at` without going through the
/// manager, so retention can be exercised against old timestamps.
pub fn backdated_auto_checkpoint(dir: &Path, at: DateTime<Utc>) -> Result<String> {
    let name = auto_name(at);
    let date = format!("{} +0000", at.timestamp());
    let envs = [("GIT_COMMITTER_DATE", date.as_str()), ("GIT_AUTHOR_DATE", date.as_str())];

    let object = git_with_env(
        dir,
        &["commit-tree", "HEAD^{tree}", "-p", "HEAD", "-m", &format!("checkpoint: {name}")],
        &envs,
    )?;
    git(dir, &["update-ref", &format!("refs/tags/checkpoint/{name}"), &object])?;
    Ok(name)
}

pub fn checkpoint_refs(dir: &Path) -> Result<Vec<String>> {
    let listing = git(
        dir,
        &["for-each-ref", "--format=%(refname:strip=3)", "refs/tags/checkpoint/"],
    )?;
    Ok(listing.lines().map(String::from).collect())
}
