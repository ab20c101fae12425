//! Time utilities: capture timestamps, countdown formatting.

use chrono::{DateTime, Local, TimeZone, Utc};

/// Wall-clock capture time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// `HH:MM:SS`, hours not wrapped at 24, negative values clamped to zero.
pub fn format_countdown(total_seconds: i64) -> String {
    let s = total_seconds.max(0);
    format!("{:02}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
}

/// Render a capture timestamp in local time, or the raw number if it is out
/// of range.
pub fn format_millis(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}

/// Short "how long ago" string used by the pending list.
pub fn age_since(millis: i64, now: DateTime<Utc>) -> String {
    let secs = (now.timestamp_millis() - millis).max(0) / 1000;
    match secs {
        0..=59 => format!("{}s ago", secs),
        60..=3599 => format!("{}m ago", secs / 60),
        _ => format!("{}h {:02}m ago", secs / 3600, (secs % 3600) / 60),
    }
}
