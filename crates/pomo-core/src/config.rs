//! Configuration management for pomo

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// User configuration
///
/// Every field has a default, so a partial (or missing) file is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Duration adjustment increment, also the minimum duration (seconds)
    #[serde(default = "default_step_seconds")]
    pub step_seconds: u64,

    /// Number of focus completions between long breaks
    #[serde(default = "default_long_break_every")]
    pub long_break_every: u64,

    /// Focus duration used until the user changes it (seconds)
    #[serde(default = "default_focus_seconds")]
    pub focus_seconds: u64,

    /// Short break duration used until the user changes it (seconds)
    #[serde(default = "default_short_break_seconds")]
    pub short_break_seconds: u64,

    /// Long break duration used until the user changes it (seconds)
    #[serde(default = "default_long_break_seconds")]
    pub long_break_seconds: u64,
}

fn default_step_seconds() -> u64 {
    60
}

fn default_long_break_every() -> u64 {
    4
}

fn default_focus_seconds() -> u64 {
    25 * 60
}

fn default_short_break_seconds() -> u64 {
    5 * 60
}

fn default_long_break_seconds() -> u64 {
    15 * 60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            step_seconds: default_step_seconds(),
            long_break_every: default_long_break_every(),
            focus_seconds: default_focus_seconds(),
            short_break_seconds: default_short_break_seconds(),
            long_break_seconds: default_long_break_seconds(),
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        Ok(config.sanitized())
    }

    /// Replace values that would stall or break the timer
    pub fn sanitized(mut self) -> Self {
        self.step_seconds = self.step_seconds.max(1);
        self.long_break_every = self.long_break_every.max(1);
        self.focus_seconds = self.focus_seconds.max(self.step_seconds);
        self.short_break_seconds = self.short_break_seconds.max(self.step_seconds);
        self.long_break_seconds = self.long_break_seconds.max(self.step_seconds);
        self
    }
}
