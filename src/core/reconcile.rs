//! Reconciliation driver: replays the buffered writes once the server is
//! reachable again and shrinks the buffer to what is still unconfirmed.
//!
//! There is no backoff, retry limit or dead-letter queue. A record the
//! server keeps rejecting stays buffered and is replayed on every pass.

use crate::api::RemoteApi;
use crate::core::buffer::{ConfirmedRecords, WriteBuffer};
use crate::core::connectivity::Transition;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

/// What to remove from the buffer after a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconcileMode {
    /// Remove each record the server accepted, keep the failures.
    #[default]
    PerRecord,
    /// Clear everything only when every replay succeeded, otherwise keep
    /// everything. Accepted records are then replayed again next pass.
    AllOrNothing,
}

impl FromStr for ReconcileMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per-record" | "per_record" => Ok(ReconcileMode::PerRecord),
            "all-or-nothing" | "all_or_nothing" => Ok(ReconcileMode::AllOrNothing),
            other => Err(AppError::InvalidReconcileMode(other.to_string())),
        }
    }
}

impl fmt::Display for ReconcileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileMode::PerRecord => write!(f, "per-record"),
            ReconcileMode::AllOrNothing => write!(f, "all-or-nothing"),
        }
    }
}

/// A replay the server did not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayFailure {
    pub exam_id: String,
    pub what: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub attendance_replayed: usize,
    pub incidents_replayed: usize,
    pub failures: Vec<ReplayFailure>,
    /// Records dropped from the buffer by this pass.
    pub removed: usize,
    /// The whole buffer was wiped.
    pub cleared: bool,
}

impl ReconcileReport {
    pub fn attempted(&self) -> usize {
        self.attendance_replayed + self.incidents_replayed + self.failures.len()
    }

    pub fn succeeded(&self) -> usize {
        self.attendance_replayed + self.incidents_replayed
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    NothingToSync,
    /// Another pass is still running; this trigger was dropped.
    AlreadyRunning,
    Completed(ReconcileReport),
}

/// Marks a pass as running until dropped.
pub struct PassGuard<'a> {
    flag: &'a Cell<bool>,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

#[derive(Debug, Default)]
pub struct ReconciliationDriver {
    mode: ReconcileMode,
    in_progress: Cell<bool>,
}

impl ReconciliationDriver {
    pub fn new(mode: ReconcileMode) -> Self {
        Self {
            mode,
            in_progress: Cell::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_progress.get()
    }

    /// Claim the in-progress flag, or `None` if a pass already holds it.
    pub fn try_begin(&self) -> Option<PassGuard<'_>> {
        if self.in_progress.replace(true) {
            return None;
        }
        Some(PassGuard {
            flag: &self.in_progress,
        })
    }

    /// React to a connectivity edge: only `CameOnline` starts a pass.
    pub fn on_transition(
        &self,
        transition: Transition,
        buffer: &mut dyn WriteBuffer,
        api: &dyn RemoteApi,
    ) -> AppResult<Option<ReconcileOutcome>> {
        match transition {
            Transition::WentOffline => Ok(None),
            Transition::CameOnline => self.reconcile(buffer, api).map(Some),
        }
    }

    /// Run one full pass over a snapshot of the buffer.
    pub fn reconcile(
        &self,
        buffer: &mut dyn WriteBuffer,
        api: &dyn RemoteApi,
    ) -> AppResult<ReconcileOutcome> {
        let Some(_guard) = self.try_begin() else {
            return Ok(ReconcileOutcome::AlreadyRunning);
        };

        if !buffer.has_unsynced_data()? {
            return Ok(ReconcileOutcome::NothingToSync);
        }

        let snapshot = buffer.get_offline_data()?;
        let mut report = ReconcileReport::default();
        let mut confirmed = ConfirmedRecords::default();

        for record in snapshot.attendance_records() {
            match api.mark_attendance(&record.to_request()) {
                Ok(_) => {
                    report.attendance_replayed += 1;
                    confirmed.attendance.push(record);
                }
                Err(e) => report.failures.push(ReplayFailure {
                    exam_id: record.exam_id.clone(),
                    what: format!("attendance {} {}", record.student_id, record.status.as_str()),
                    reason: e.to_string(),
                }),
            }
        }

        for record in &snapshot.incidents {
            match api.report_incident(&record.to_request()) {
                Ok(_) => {
                    report.incidents_replayed += 1;
                    confirmed.incidents.push(record.clone());
                }
                Err(e) => report.failures.push(ReplayFailure {
                    exam_id: record.exam_id.clone(),
                    what: format!("incident {}", record.category.as_str()),
                    reason: e.to_string(),
                }),
            }
        }

        match self.mode {
            ReconcileMode::PerRecord => {
                report.removed = buffer.remove_confirmed(&confirmed)?;
                report.cleared = !buffer.has_unsynced_data()?;
            }
            ReconcileMode::AllOrNothing => {
                if report.is_complete() {
                    buffer.clear_synced_data()?;
                    report.removed = snapshot.total_count();
                    report.cleared = true;
                }
            }
        }

        Ok(ReconcileOutcome::Completed(report))
    }
}
