/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";

/// Attendance status color:
/// PRESENT → green
/// LATE → yellow
/// ABSENT → red
/// not marked → grey
pub fn color_for_status(status: Option<&str>) -> &'static str {
    match status {
        Some("PRESENT") => GREEN,
        Some("LATE") => YELLOW,
        Some("ABSENT") => RED,
        _ => GREY,
    }
}

pub fn color_for_severity(severity: &str) -> &'static str {
    match severity {
        "HIGH" => RED,
        "MEDIUM" => YELLOW,
        _ => BLUE,
    }
}

/// Wrap `value` in `color`, or in grey when it is empty or a dash.
pub fn colorize_optional(value: &str, color: &str) -> String {
    if value.trim().is_empty() || value.trim() == "-" {
        format!("{GREY}{value}{RESET}")
    } else {
        format!("{color}{value}{RESET}")
    }
}
