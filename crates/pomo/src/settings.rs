//! Persisted settings: segment durations, completed count, notifications
//!
//! Typed, fail-soft access on top of a [`KeyValueStore`]. Every read has a
//! documented default and every duration write is clamped to one step.

use pomo_core::Config;

use crate::segment::Segment;
use crate::store::KeyValueStore;

/// Key of the completed focus segment counter
pub const COMPLETED_KEY: &str = "completed_intervals";

/// Key of the notification preference
pub const NOTIFICATIONS_KEY: &str = "notifications_enabled";

/// Direction of a duration adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Built-in durations and the adjustment step, all in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Defaults {
    pub focus: u64,
    pub short_break: u64,
    pub long_break: u64,
    /// Adjustment increment and the smallest allowed duration
    pub step: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            focus: 25 * 60,
            short_break: 5 * 60,
            long_break: 15 * 60,
            step: 60,
        }
    }
}

impl Defaults {
    pub fn duration(&self, segment: Segment) -> u64 {
        match segment {
            Segment::Focus => self.focus,
            Segment::ShortBreak => self.short_break,
            Segment::LongBreak => self.long_break,
        }
    }
}

impl From<&Config> for Defaults {
    fn from(config: &Config) -> Self {
        Self {
            focus: config.focus_seconds,
            short_break: config.short_break_seconds,
            long_break: config.long_break_seconds,
            step: config.step_seconds.max(1),
        }
    }
}

/// Settings adapter over a key-value store
#[derive(Debug)]
pub struct Settings<S> {
    store: S,
    defaults: Defaults,
}

impl<S: KeyValueStore> Settings<S> {
    pub fn new(store: S, defaults: Defaults) -> Self {
        Self { store, defaults }
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn step(&self) -> u64 {
        self.defaults.step.max(1)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Configured duration for `segment`, never below one step
    pub fn duration(&self, segment: Segment) -> u64 {
        let stored = self
            .read_u64(segment.storage_key())
            .unwrap_or_else(|| self.defaults.duration(segment));
        stored.max(self.step())
    }

    /// Store a duration, clamped to at least one step; returns what was stored
    pub fn set_duration(&mut self, segment: Segment, seconds: u64) -> u64 {
        let seconds = seconds.max(self.step());
        self.store.set(segment.storage_key(), seconds.to_string());
        tracing::debug!(segment = segment.as_str(), seconds, "duration updated");
        seconds
    }

    /// Move a duration one step up or down
    pub fn adjust_duration(&mut self, segment: Segment, direction: Direction) -> u64 {
        let current = self.duration(segment);
        let next = match direction {
            Direction::Up => current.saturating_add(self.step()),
            Direction::Down => current.saturating_sub(self.step()),
        };
        self.set_duration(segment, next)
    }

    pub fn completed_count(&self) -> u64 {
        self.read_u64(COMPLETED_KEY).unwrap_or(0)
    }

    /// Increment the completed counter and return the new value
    pub fn increment_completed_count(&mut self) -> u64 {
        let count = self.completed_count().saturating_add(1);
        self.store.set(COMPLETED_KEY, count.to_string());
        count
    }

    pub fn reset_completed_count(&mut self) {
        self.store.set(COMPLETED_KEY, "0".to_string());
    }

    pub fn notifications_enabled(&self) -> bool {
        self.store
            .get(NOTIFICATIONS_KEY)
            .and_then(|value| parse_bool(&value))
            .unwrap_or(true)
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.store.set(NOTIFICATIONS_KEY, enabled.to_string());
    }

    fn read_u64(&self, key: &str) -> Option<u64> {
        let raw = self.store.get(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(key, value = %raw, "ignoring non-numeric setting");
                None
            }
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}
