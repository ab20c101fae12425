//! Remote exam API: the trait the offline core talks to, and the HTTP
//! client implementing it.

pub mod http;
pub mod session;

use crate::errors::AppResult;
use crate::models::attendance::{AttendanceRequest, AttendanceView};
use crate::models::incident::{IncidentRequest, IncidentView};

/// The two writes that can be buffered and replayed.
///
/// Any `Err` counts as "not accepted": transport failures and non-2xx
/// answers alike.
pub trait RemoteApi {
    fn mark_attendance(&self, req: &AttendanceRequest) -> AppResult<AttendanceView>;

    fn report_incident(&self, req: &IncidentRequest) -> AppResult<IncidentView>;
}
