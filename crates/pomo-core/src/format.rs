//! Formatting utilities

use chrono::{DateTime, Local};

/// Format seconds as a countdown clock, `MM:SS`
///
/// Hours roll into the minutes field, so 90 minutes prints as `90:00`.
pub fn clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Format a duration in human-readable form
pub fn duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        let mins = seconds / 60;
        let secs = seconds % 60;
        if secs == 0 {
            format!("{}m", mins)
        } else {
            format!("{}m {}s", mins, secs)
        }
    } else {
        let hours = seconds / 3600;
        let mins = (seconds % 3600) / 60;
        format!("{}h {}m", hours, mins)
    }
}

/// Format a timestamp as HH:MM
pub fn time(dt: DateTime<Local>) -> String {
    dt.format("%H:%M").to_string()
}
