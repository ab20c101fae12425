//! Wiring shared by the command handlers: storage, buffer, API client and
//! the reachability probe, all built from the loaded configuration.

use crate::api::http::HttpApi;
use crate::api::session::{ExamCache, RosterCache, Session};
use crate::config::Config;
use crate::core::buffer::LocalWriteBuffer;
use crate::core::connectivity::Reachability;
use crate::core::submission::OfflineReason;
use crate::db::log::ttlog_soft;
use crate::db::storage::{LocalStorage, SqliteStorage};
use crate::errors::{AppError, AppResult};
use crate::models::exam::Exam;
use crate::models::student::Student;
use crate::ui::messages::warning;
use rusqlite::Connection;

pub type Buffer = LocalWriteBuffer<SqliteStorage>;

pub fn open_storage(cfg: &Config) -> AppResult<SqliteStorage> {
    SqliteStorage::open(&cfg.database, cfg.storage_quota_bytes)
}

pub fn open_buffer(cfg: &Config) -> AppResult<Buffer> {
    Ok(LocalWriteBuffer::new(open_storage(cfg)?))
}

/// API client carrying the stored session token, if any.
pub fn http_api(cfg: &Config, storage: &dyn LocalStorage) -> AppResult<HttpApi> {
    let token = Session::token(storage)?;
    HttpApi::new(&cfg.api_base_url, cfg.request_timeout_ms, token)
}

/// Roster saved by the last online `students <exam>` or `scan`.
pub fn cached_roster(storage: &dyn LocalStorage, exam_id: &str) -> AppResult<Vec<Student>> {
    RosterCache::load(storage, exam_id)?.ok_or_else(|| AppError::NoRoster(exam_id.to_string()))
}

/// Keep a freshly fetched roster for offline use. The cache shares the
/// storage quota with the write buffer, so a failure only warns.
pub fn cache_roster(storage: &mut dyn LocalStorage, exam_id: &str, roster: &[Student]) -> bool {
    match RosterCache::store(storage, exam_id, roster) {
        Ok(()) => true,
        Err(e) => {
            warning(format!("Roster for exam {} not cached for offline use: {}", exam_id, e));
            false
        }
    }
}

/// Exam as listed by the last online `exams`.
pub fn cached_exam(storage: &dyn LocalStorage, exam_id: &str) -> AppResult<Exam> {
    ExamCache::find(storage, exam_id)?.ok_or_else(|| {
        AppError::Other(format!(
            "Exam {} is not cached. Run `invigilator exams` while online",
            exam_id
        ))
    })
}

/// Librarian writes go straight to the server and are never buffered.
pub fn require_server(cfg: &Config, what: &str) -> AppResult<()> {
    if cfg.force_offline {
        return Err(AppError::Other(format!(
            "{} needs the server and is not saved offline",
            what
        )));
    }
    Ok(())
}

/// Platform reachability: the HTTP probe, unless `--offline` pinned it.
pub struct Probe<'a> {
    api: &'a HttpApi,
    forced_offline: bool,
}

impl<'a> Probe<'a> {
    pub fn new(cfg: &Config, api: &'a HttpApi) -> Self {
        Self {
            api,
            forced_offline: cfg.force_offline,
        }
    }
}

impl Reachability for Probe<'_> {
    fn is_online(&self) -> bool {
        !self.forced_offline && self.api.is_online()
    }
}

/// One-line notice for a write that went to the buffer.
pub fn offline_notice(what: &str, reason: &OfflineReason) -> String {
    match reason {
        OfflineReason::Offline => format!("{} saved offline - will sync when online", what),
        OfflineReason::RemoteFailed(why) => format!(
            "{} saved offline - server did not accept it ({}), will sync when online",
            what, why
        ),
    }
}

/// Record a refused buffer write in the audit log before the error
/// reaches `main`.
pub fn audit_failure(conn: &Connection, target: &str, err: &AppError) {
    if let AppError::StorageFull(msg) = err {
        ttlog_soft(conn, "storage_full", target, msg);
    }
}
