//! Submission façade: the one call site used to record attendance or an
//! incident. Online it writes through to the server; offline, or when the
//! server write fails, it parks the write in the local buffer and reports a
//! degraded success instead of an error.

use crate::api::RemoteApi;
use crate::core::buffer::WriteBuffer;
use crate::core::connectivity::Reachability;
use crate::errors::AppResult;
use crate::models::attendance::{AttendanceRequest, AttendanceStatus, AttendanceView, MarkMethod};
use crate::models::incident::{Incident, IncidentRequest, IncidentView};

/// Why a write ended up in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfflineReason {
    /// Reachability said offline; the server was not tried.
    Offline,
    /// The server was tried and did not accept the write.
    RemoteFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Accepted by the server; `status` is the server's.
    Confirmed {
        status: AttendanceStatus,
        record: AttendanceView,
    },
    /// Saved offline, will sync.
    SavedOffline(OfflineReason),
}

impl SubmitOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SubmitOutcome::Confirmed { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IncidentOutcome {
    Reported(IncidentView),
    SavedOffline(OfflineReason),
}

pub struct SubmissionFacade<'a> {
    buffer: &'a mut dyn WriteBuffer,
    api: &'a dyn RemoteApi,
    reachability: &'a dyn Reachability,
    offline_enabled: bool,
}

impl<'a> SubmissionFacade<'a> {
    pub fn new(
        buffer: &'a mut dyn WriteBuffer,
        api: &'a dyn RemoteApi,
        reachability: &'a dyn Reachability,
    ) -> Self {
        Self {
            buffer,
            api,
            reachability,
            offline_enabled: true,
        }
    }

    /// With offline mode disabled nothing is buffered: offline is an error
    /// and server failures propagate.
    pub fn offline_enabled(mut self, enabled: bool) -> Self {
        self.offline_enabled = enabled;
        self
    }

    pub fn submit(
        &mut self,
        exam_id: &str,
        student_id: &str,
        status: AttendanceStatus,
        method: MarkMethod,
    ) -> AppResult<SubmitOutcome> {
        let reason = if self.reachability.is_online() || !self.offline_enabled {
            let req = AttendanceRequest {
                exam_id: exam_id.to_string(),
                student_id: student_id.to_string(),
                status,
                method,
            };
            match self.api.mark_attendance(&req) {
                Ok(record) => {
                    // an older buffered mark for this key must not replay over it
                    self.buffer.discard(exam_id, student_id)?;
                    return Ok(SubmitOutcome::Confirmed {
                        status: record.status,
                        record,
                    });
                }
                Err(e) if e.is_remote_failure() && self.offline_enabled => {
                    OfflineReason::RemoteFailed(e.to_string())
                }
                Err(e) => return Err(e),
            }
        } else {
            OfflineReason::Offline
        };

        // StorageFull propagates to the caller
        self.buffer.save(exam_id, student_id, status, method)?;
        Ok(SubmitOutcome::SavedOffline(reason))
    }

    pub fn report_incident(
        &mut self,
        exam_id: &str,
        incident: &Incident,
    ) -> AppResult<IncidentOutcome> {
        let reason = if self.reachability.is_online() || !self.offline_enabled {
            match self.api.report_incident(&IncidentRequest::new(exam_id, incident)) {
                Ok(view) => return Ok(IncidentOutcome::Reported(view)),
                Err(e) if e.is_remote_failure() && self.offline_enabled => {
                    OfflineReason::RemoteFailed(e.to_string())
                }
                Err(e) => return Err(e),
            }
        } else {
            OfflineReason::Offline
        };

        self.buffer.save_incident(exam_id, incident)?;
        Ok(IncidentOutcome::SavedOffline(reason))
    }
}
