//! Desktop notification support for checkpoint events.
//!
//! Sends desktop notifications using notify-send on Linux and osascript on
//! macOS. When neither tool is available a no-op sink is used instead.

use std::process::Command;
use tracing::{debug, warn};

use crate::git::RemoteStatus;

/// Receiver of user-facing notifications. Delivery is always best-effort.
pub trait NotificationSink {
    fn notify(&self, title: &str, body: &str);
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl NotificationSink for NoopNotifier {
    fn notify(&self, title: &str, _body: &str) {
        debug!(%title, "notification skipped (no sink)");
    }
}

/// Platform notification tool backing a [`DesktopNotifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    NotifySend,
    Osascript,
}

/// Sends notifications through the platform's notification tool.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    backend: Backend,
}

impl DesktopNotifier {
    /// Detect an available notification tool.
    pub fn detect() -> Option<Self> {
        let backend = if cfg!(target_os = "macos") {
            Backend::Osascript
        } else {
            Backend::NotifySend
        };
        let program = match backend {
            Backend::NotifySend => "notify-send",
            Backend::Osascript => "osascript",
        };
        which::which(program).ok().map(|_| Self { backend })
    }
}

impl NotificationSink for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        let result = match self.backend {
            Backend::NotifySend => send_linux_notification(title, body),
            Backend::Osascript => send_macos_notification(title, body),
        };

        if let Err(e) = result {
            warn!("Desktop notification failed: {e}");
        }
    }
}

fn send_linux_notification(title: &str, body: &str) -> Result<(), String> {
    Command::new("notify-send")
        .arg("--app-name=git-checkpoint")
        .arg(title)
        .arg(body)
        .output()
        .map_err(|e| format!("notify-send failed: {e}"))
        .and_then(|output| {
            if output.status.success() {
                Ok(())
            } else {
                Err(format!("notify-send exited with: {}", output.status))
            }
        })
}

fn send_macos_notification(title: &str, body: &str) -> Result<(), String> {
    let script = format!(
        r#"display notification "{}" with title "{}""#,
        escape_applescript(body),
        escape_applescript(title)
    );

    Command::new("osascript")
        .arg("-e")
        .arg(&script)
        .output()
        .map_err(|e| format!("osascript failed: {e}"))
        .and_then(|output| {
            if output.status.success() {
                Ok(())
            } else {
                Err(format!("osascript exited with: {}", output.status))
            }
        })
}

fn escape_applescript(s: &str) -> String {
    s.replace('\\', r"\\").replace('"', r#"\""#)
}

/// Title and body announcing a newly created checkpoint.
///
/// The body differs depending on whether the reference reached the remote.
pub fn checkpoint_created_message(name: &str, remote: &RemoteStatus) -> (String, String) {
    let title = format!("Checkpoint '{name}' created");
    let body = match remote {
        RemoteStatus::NoRemote => "Saved locally.".to_string(),
        RemoteStatus::Synced { remote } => format!("Saved locally and pushed to {remote}."),
        RemoteStatus::Failed { remote, .. } => {
            format!("Saved locally, but pushing to {remote} failed.")
        }
    };
    (title, body)
}
