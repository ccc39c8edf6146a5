//! Segment and timer state types
//!
//! A Pomodoro day is a sequence of segments: focus, then a short break,
//! and every few focus segments a long break instead.

use serde::{Deserialize, Serialize};

/// One timed phase of the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Focus, Segment::ShortBreak, Segment::LongBreak];

    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            Segment::Focus => "Focus",
            Segment::ShortBreak => "Short Break",
            Segment::LongBreak => "Long Break",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Focus => "focus",
            Segment::ShortBreak => "short_break",
            Segment::LongBreak => "long_break",
        }
    }

    /// Key under which this segment's duration is persisted
    pub fn storage_key(&self) -> &'static str {
        match self {
            Segment::Focus => "focus_seconds",
            Segment::ShortBreak => "short_break_seconds",
            Segment::LongBreak => "long_break_seconds",
        }
    }

    /// Parse user input; accepts `focus`, `short`, `short-break`, `Long Break`, ...
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();

        match normalized.as_str() {
            "focus" | "work" | "f" => Some(Segment::Focus),
            "short" | "shortbreak" | "break" | "s" => Some(Segment::ShortBreak),
            "long" | "longbreak" | "l" => Some(Segment::LongBreak),
            _ => None,
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, Segment::Focus)
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Run status of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    NotStarted,
    Running,
    Paused,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::NotStarted => "not started",
            Status::Running => "running",
            Status::Paused => "paused",
        }
    }
}

/// Snapshot of the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub remaining_seconds: u64,
    pub segment: Segment,
    pub status: Status,
}

impl TimerState {
    /// Fresh state at process start: an unstarted focus segment
    pub fn new(remaining_seconds: u64) -> Self {
        Self {
            remaining_seconds,
            segment: Segment::Focus,
            status: Status::NotStarted,
        }
    }
}
