//! Notification backends for different platforms

use anyhow::{bail, Context, Result};
use std::io::{self, Write};
use std::process::Command;

/// Notification urgency levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::Critical => "critical",
        }
    }
}

/// A notification to display
#[derive(Debug, Clone, Default)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub urgency: Urgency,
    /// Auto-dismiss timeout in seconds
    pub timeout: Option<u32>,
    /// Whether to play a sound alongside the notification
    pub sound: bool,
}

impl Notification {
    /// Create a new notification with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: crate::DEFAULT_TITLE.to_string(),
            message: message.into(),
            sound: true,
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn with_timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Disable sound
    pub fn silent(mut self) -> Self {
        self.sound = false;
        self
    }
}

/// Available notification backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// macOS terminal-notifier
    TerminalNotifier,
    /// macOS osascript
    Osascript,
    /// Linux notify-send
    NotifySend,
    /// KDE kdialog
    Kdialog,
    /// WSL PowerShell toast
    Wsl,
    /// Print to stdout
    Echo,
}

impl Backend {
    /// Detect the best available backend for the current platform
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            if command_exists("terminal-notifier") {
                Self::TerminalNotifier
            } else {
                Self::Osascript
            }
        } else if cfg!(target_os = "linux") {
            if std::env::var_os("WSL_DISTRO_NAME").is_some() {
                Self::Wsl
            } else if command_exists("notify-send") {
                Self::NotifySend
            } else if command_exists("kdialog") {
                Self::Kdialog
            } else {
                Self::Echo
            }
        } else {
            Self::Echo
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TerminalNotifier => "terminal-notifier",
            Self::Osascript => "osascript",
            Self::NotifySend => "notify-send",
            Self::Kdialog => "kdialog",
            Self::Wsl => "wsl",
            Self::Echo => "echo",
        }
    }

    /// Build the command that displays `notification`, or `None` for echo
    pub fn command(&self, notification: &Notification) -> Option<Command> {
        let title = notification.title.as_str();
        let message = notification.message.as_str();

        let cmd = match self {
            Self::TerminalNotifier => {
                let mut cmd = Command::new("terminal-notifier");
                cmd.args(["-title", title, "-message", message, "-group", "pomo"]);
                if notification.sound {
                    cmd.args(["-sound", "Glass"]);
                }
                cmd
            }
            Self::Osascript => {
                let mut script = format!(
                    r#"display notification "{}" with title "{}""#,
                    message.replace('"', r#"\""#),
                    title.replace('"', r#"\""#)
                );
                if notification.sound {
                    script.push_str(r#" sound name "Glass""#);
                }
                let mut cmd = Command::new("osascript");
                cmd.args(["-e", &script]);
                cmd
            }
            Self::NotifySend => {
                let mut cmd = Command::new("notify-send");
                cmd.args(["--app-name", "pomo", "--urgency", notification.urgency.as_str()]);
                if let Some(timeout) = notification.timeout {
                    cmd.args(["--expire-time", &(timeout * 1000).to_string()]);
                }
                cmd.args([title, message]);
                cmd
            }
            Self::Kdialog => {
                let timeout = notification.timeout.unwrap_or(5).to_string();
                let mut cmd = Command::new("kdialog");
                cmd.args(["--passivepopup", message, &timeout, "--title", title]);
                cmd
            }
            Self::Wsl => {
                let script = format!(
                    "[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] | Out-Null; \
                     $t = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastText02); \
                     $t.GetElementsByTagName('text')[0].AppendChild($t.CreateTextNode('{}')) | Out-Null; \
                     $t.GetElementsByTagName('text')[1].AppendChild($t.CreateTextNode('{}')) | Out-Null; \
                     [Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier('pomo').Show([Windows.UI.Notifications.ToastNotification]::new($t))",
                    title.replace('\'', "''"),
                    message.replace('\'', "''")
                );
                let mut cmd = Command::new("powershell.exe");
                cmd.args(["-Command", &script]);
                cmd
            }
            Self::Echo => return None,
        };

        Some(cmd)
    }

    /// Send a notification using this backend
    pub fn send(&self, notification: &Notification) -> Result<()> {
        let Some(mut cmd) = self.command(notification) else {
            echo(notification);
            return Ok(());
        };

        let status = cmd
            .status()
            .with_context(|| format!("Failed to run {}", self.name()))?;

        if !status.success() {
            // PowerShell toasts fail for many environmental reasons
            if *self == Self::Wsl {
                echo(notification);
                return Ok(());
            }
            bail!("{} failed with status: {}", self.name(), status);
        }
        Ok(())
    }
}

/// Terminal fallback text; `\r\n` keeps the line intact in raw mode
fn echo_line(notification: &Notification) -> String {
    format!("\r\n[{}] {}\r\n", notification.title, notification.message)
}

fn echo(notification: &Notification) {
    let mut stdout = io::stdout().lock();
    let _ = stdout.write_all(echo_line(notification).as_bytes());
    let _ = stdout.flush();
}

/// Check if a command exists on PATH
pub(crate) fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_notification_builder() {
        let n = Notification::new("Focus complete")
            .with_title("Break time")
            .with_urgency(Urgency::Critical)
            .with_timeout(10)
            .silent();

        assert_eq!(n.title, "Break time");
        assert_eq!(n.message, "Focus complete");
        assert_eq!(n.urgency, Urgency::Critical);
        assert_eq!(n.timeout, Some(10));
        assert!(!n.sound);
    }

    #[test]
    fn test_default_title_and_sound() {
        let n = Notification::new("hello");
        assert_eq!(n.title, crate::DEFAULT_TITLE);
        assert!(n.sound);
    }

    #[test]
    fn test_echo_line_returns_to_column_zero() {
        let line = echo_line(&Notification::new("Back to focus").with_title("Break over"));
        assert_eq!(line, "\r\n[Break over] Back to focus\r\n");
        assert!(!line.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_notify_send_command() {
        let n = Notification::new("Take a break").with_timeout(3);
        let cmd = Backend::NotifySend.command(&n).unwrap();
        assert_eq!(cmd.get_program(), "notify-send");
        let args = args(&cmd);
        assert!(args.contains(&"3000".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("Take a break"));
    }

    #[test]
    fn test_osascript_escapes_quotes() {
        let n = Notification::new(r#"say "hi""#).silent();
        let cmd = Backend::Osascript.command(&n).unwrap();
        let script = args(&cmd).pop().unwrap();
        assert!(script.contains(r#"say \"hi\""#));
        assert!(!script.contains("sound name"));
    }

    #[test]
    fn test_echo_has_no_command() {
        assert!(Backend::Echo.command(&Notification::new("x")).is_none());
        assert!(Backend::Echo.send(&Notification::new("x")).is_ok());
    }
}
