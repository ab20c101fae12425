//! Path utilities: expand ~, derive default output file names.

use std::path::PathBuf;

pub fn expand_tilde(path: &str) -> PathBuf {
    if path.starts_with("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(path.trim_start_matches("~/"));
    }
    PathBuf::from(path)
}

/// `<studentId>_barcode.png`, the name the server suggests for downloads.
pub fn default_barcode_file(student_id: &str) -> PathBuf {
    let safe: String = student_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    PathBuf::from(format!("{}_barcode.png", safe))
}
