//! Unified application error type.
//! All modules (db, core, api, cli) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Local storage
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Local storage is full: {0}")]
    StorageFull(String),

    #[error("Corrupted offline data: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Remote API
    // ---------------------------
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Not logged in. Run `invigilator login <username> <password>` first")]
    NotLoggedIn,

    #[error("No roster available for exam {0}. Run `invigilator students {0}` while online")]
    NoRoster(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid attendance status: {0} (use PRESENT, ABSENT or LATE)")]
    InvalidStatus(String),

    #[error("Invalid marking method: {0} (use MANUAL or SCAN)")]
    InvalidMethod(String),

    #[error("Invalid incident category: {0}")]
    InvalidCategory(String),

    #[error("Invalid incident severity: {0} (use LOW, MEDIUM or HIGH)")]
    InvalidSeverity(String),

    #[error("Invalid reconcile mode: {0} (use per-record or all-or-nothing)")]
    InvalidReconcileMode(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    #[error("Invalid configuration file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// True when the failure means the write could not reach the server:
    /// transport problems or a non-2xx answer.
    pub fn is_remote_failure(&self) -> bool {
        matches!(self, AppError::Http(_) | AppError::Remote { .. })
    }
}

pub type AppResult<T> = Result<T, AppError>;
