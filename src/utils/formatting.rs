//! Formatting utilities used for CLI outputs.

use textwrap::Options;

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

pub fn percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Wrap a free-text description under a list item, keeping the indent.
pub fn wrap_indented(text: &str, width: usize, indent: &str) -> String {
    let opts = Options::new(width)
        .initial_indent(indent)
        .subsequent_indent(indent);
    textwrap::fill(text, opts)
}

/// `None` → "general", used for incidents not tied to a student.
pub fn student_or_general(student_id: Option<&str>) -> String {
    match student_id {
        Some(s) if !s.is_empty() => format!("student {}", s),
        _ => "general".to_string(),
    }
}
