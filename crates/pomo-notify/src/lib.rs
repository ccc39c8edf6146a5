//! pomo-notify - Segment-end alerts
//!
//! Sends a desktop notification through whichever backend the platform
//! offers (terminal-notifier/osascript on macOS, notify-send/kdialog on
//! Linux, PowerShell toasts under WSL) and plays a short chime.

mod backend;
mod chime;

pub use backend::{Backend, Notification, Urgency};
pub use chime::{Chime, SoundPlayer};

use anyhow::Result;

/// Default notification title
pub const DEFAULT_TITLE: &str = "pomo";

/// Send a notification with the detected backend
pub fn send(notification: &Notification) -> Result<()> {
    let backend = Backend::detect();
    tracing::debug!(backend = backend.name(), title = %notification.title, "sending notification");
    backend.send(notification)
}

/// Notify and chime; failures are logged, never returned
pub fn alert(notification: &Notification) {
    if let Err(err) = send(notification) {
        tracing::warn!(error = %err, "desktop notification failed");
    }
    if notification.sound {
        Chime::detect().play();
    }
}
