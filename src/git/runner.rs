//! Git command runner
//!
//! Every git invocation in the crate goes through these helpers so that
//! error context and debug logging stay consistent.

use anyhow::{bail, Context, Result};
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tracing::debug;

fn git_command(args: &[&str], repo_root: &Path) -> Command {
    debug!(cwd = %repo_root.display(), "git {}", args.join(" "));
    let mut cmd = Command::new("git");
    cmd.args(args).current_dir(repo_root);
    cmd
}

/// Run a git command and return the raw Output.
///
/// Use this when you need both stdout and stderr, or the exact exit code.
pub fn run_git(args: &[&str], repo_root: &Path) -> Result<Output> {
    git_command(args, repo_root)
        .output()
        .with_context(|| format!("Failed to execute: git {}", args.join(" ")))
}

/// Run a git command with extra environment variables set.
pub fn run_git_env<K, V>(args: &[&str], envs: &[(K, V)], repo_root: &Path) -> Result<Output>
where
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = git_command(args, repo_root);
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output()
        .with_context(|| format!("Failed to execute: git {}", args.join(" ")))
}

/// Run a git command feeding `input` on stdin.
pub fn run_git_with_input(args: &[&str], input: &[u8], repo_root: &Path) -> Result<Output> {
    let mut child = git_command(args, repo_root)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to execute: git {}", args.join(" ")))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input)
            .with_context(|| format!("Failed to write stdin of: git {}", args.join(" ")))?;
    }

    child
        .wait_with_output()
        .with_context(|| format!("Failed to wait for: git {}", args.join(" ")))
}

/// Turn a finished git Output into trimmed stdout, bailing with stderr on failure.
pub fn checked_stdout(args: &[&str], output: Output) -> Result<String> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let cmd = args.first().unwrap_or(&"");
        bail!("git {cmd} failed: {}", stderr.trim());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Run a git command, check for success, and return stdout as a trimmed String.
pub fn run_git_checked(args: &[&str], repo_root: &Path) -> Result<String> {
    let output = run_git(args, repo_root)?;
    checked_stdout(args, output)
}

/// Run a git command and return true if exit code is 0.
///
/// Silently swallows errors (both spawn failures and non-zero exits).
pub fn run_git_bool(args: &[&str], repo_root: &Path) -> bool {
    run_git(args, repo_root)
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Run a `--quiet` style git command and report whether it signalled a difference.
///
/// `git diff --quiet` exits 1 when there are differences and 128 on error;
/// only an exit code of exactly 1 counts as a difference.
pub fn run_git_differs(args: &[&str], repo_root: &Path) -> bool {
    run_git(args, repo_root)
        .map(|output| output.status.code() == Some(1))
        .unwrap_or(false)
}
