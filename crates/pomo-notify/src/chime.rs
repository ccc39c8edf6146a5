//! Audible chime played when a segment ends

use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

/// Sound files tried in order on macOS
const MACOS_SOUNDS: &[&str] = &[
    "/System/Library/Sounds/Glass.aiff",
    "/System/Library/Sounds/Ping.aiff",
];

/// Players tried in order on macOS
const MACOS_PLAYERS: &[SoundPlayer] = &[SoundPlayer::Afplay];

/// Players tried in order on Linux
const LINUX_PLAYERS: &[SoundPlayer] = &[SoundPlayer::Paplay, SoundPlayer::Aplay];

/// Sound files tried in order on Linux
const LINUX_SOUNDS: &[&str] = &[
    "/usr/share/sounds/freedesktop/stereo/complete.oga",
    "/usr/share/sounds/freedesktop/stereo/bell.oga",
    "/usr/share/sounds/sound-icons/bell.wav",
    "/usr/share/sounds/alsa/Front_Center.wav",
];

/// External program able to play a sound file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundPlayer {
    Afplay,
    Paplay,
    Aplay,
}

impl SoundPlayer {
    pub fn program(&self) -> &'static str {
        match self {
            Self::Afplay => "afplay",
            Self::Paplay => "paplay",
            Self::Aplay => "aplay",
        }
    }
}

/// A chime: a player plus the sound file it will play
///
/// With no player (or no sound file) the terminal bell is rung instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chime {
    pub player: Option<SoundPlayer>,
    pub sound: Option<String>,
}

impl Chime {
    /// The terminal bell only
    pub fn bell() -> Self {
        Self {
            player: None,
            sound: None,
        }
    }

    /// Pick a player and sound file for the current platform
    pub fn detect() -> Self {
        let (candidates, players) = if cfg!(target_os = "macos") {
            (MACOS_SOUNDS, MACOS_PLAYERS)
        } else if cfg!(target_os = "linux") {
            (LINUX_SOUNDS, LINUX_PLAYERS)
        } else {
            return Self::bell();
        };

        let player = players
            .iter()
            .copied()
            .find(|p| crate::backend::command_exists(p.program()));
        let sound = candidates
            .iter()
            .find(|path| std::path::Path::new(path).exists())
            .map(|path| path.to_string());

        match (player, sound) {
            (Some(player), Some(sound)) => Self {
                player: Some(player),
                sound: Some(sound),
            },
            _ => Self::bell(),
        }
    }

    /// Start playback without waiting for it to finish
    pub fn play(&self) {
        if let (Some(player), Some(sound)) = (self.player, self.sound.as_deref()) {
            let mut cmd = Command::new(player.program());
            cmd.arg(sound).stdout(Stdio::null()).stderr(Stdio::null());
            match spawn_reaped(cmd) {
                Ok(_) => return,
                Err(err) => {
                    let program = player.program();
                    tracing::warn!(program, error = %err, "chime player failed, ringing bell");
                }
            }
        }

        // Locked so the bell never lands inside another writer's escape sequence
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(b"\x07");
        let _ = stdout.flush();
    }
}

/// Spawn `cmd` and wait for it on a detached thread so it never lingers as a zombie
fn spawn_reaped(mut cmd: Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = cmd.spawn()?;
    Ok(thread::spawn(move || child.wait()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bell_has_no_player() {
        let chime = Chime::bell();
        assert!(chime.player.is_none());
        assert!(chime.sound.is_none());
    }

    #[test]
    fn test_detect_is_consistent() {
        // Either a full player/sound pair or the bell, never half of each
        let chime = Chime::detect();
        assert_eq!(chime.player.is_some(), chime.sound.is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_spawned_player_is_reaped() {
        let waiter = spawn_reaped(Command::new("true")).unwrap();
        let status = waiter.join().unwrap().unwrap();
        assert!(status.success());
    }

    #[test]
    fn test_missing_player_reports_error() {
        assert!(spawn_reaped(Command::new("pomo-no-such-player")).is_err());
    }

    #[test]
    fn test_player_programs() {
        assert_eq!(SoundPlayer::Afplay.program(), "afplay");
        assert_eq!(SoundPlayer::Paplay.program(), "paplay");
        assert_eq!(SoundPlayer::Aplay.program(), "aplay");
    }
}
