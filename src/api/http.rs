use crate::api::RemoteApi;
use crate::core::connectivity::Reachability;
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceRequest, AttendanceSummary, AttendanceView};
use crate::models::exam::Exam;
use crate::models::incident::{IncidentRequest, IncidentView};
use crate::models::student::{NewStudent, Student};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reachability probes give up quickly; a slow network counts as offline.
const PROBE_TIMEOUT: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Answer to a student registration; the server also generates the barcode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Registration {
    pub student: Student,
    #[serde(default)]
    pub message: Option<String>,
}

/// Answer to a bulk barcode generation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BarcodeBatch {
    #[serde(default)]
    pub total: Option<u64>,
    pub generated: u64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Blocking client for the exam REST API. The bearer token, when present,
/// is attached to every request except login.
pub struct HttpApi {
    base: String,
    client: Client,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(base: &str, timeout_ms: u64, token: Option<String>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;

        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            client,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn authorized(&self, req: RequestBuilder) -> AppResult<RequestBuilder> {
        match &self.token {
            Some(token) => Ok(req.bearer_auth(token)),
            None => Err(AppError::NotLoggedIn),
        }
    }

    /// Turn a non-2xx answer into `AppError::Remote` carrying the body text.
    fn check(resp: Response) -> AppResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        Err(AppError::Remote {
            status: status.as_u16(),
            body: if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                body
            },
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let req = self.authorized(self.client.get(self.url(path)))?;
        let resp = Self::check(req.send()?)?;
        Ok(resp.json::<T>()?)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> AppResult<T> {
        let req = self.authorized(self.client.post(self.url(path)))?;
        let resp = Self::check(req.json(body).send()?)?;
        Ok(resp.json::<T>()?)
    }

    // ============ AUTH ============

    pub fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { username, password })
            .send()?;
        Ok(Self::check(resp)?.json::<LoginResponse>()?)
    }

    /// Tell the server we are leaving. Best effort: callers drop the local
    /// token whatever this returns.
    pub fn logout(&self) -> AppResult<()> {
        let req = self.authorized(self.client.post(self.url("/auth/logout")))?;
        Self::check(req.send()?)?;
        Ok(())
    }

    // ============ EXAMS ============

    pub fn my_exams(&self) -> AppResult<Vec<Exam>> {
        self.get_json("/exams")
    }

    pub fn exam(&self, exam_id: &str) -> AppResult<Exam> {
        self.get_json(&format!("/exams/{}", exam_id))
    }

    pub fn students_for_exam(&self, exam_id: &str) -> AppResult<Vec<Student>> {
        self.get_json(&format!("/exams/{}/students", exam_id))
    }

    // ============ ATTENDANCE ============

    pub fn attendance_for_exam(&self, exam_id: &str) -> AppResult<Vec<AttendanceView>> {
        self.get_json(&format!("/attendance/exam/{}", exam_id))
    }

    pub fn attendance_summary(&self, exam_id: &str) -> AppResult<AttendanceSummary> {
        self.get_json(&format!("/attendance/exam/{}/summary", exam_id))
    }

    // ============ INCIDENTS ============

    pub fn incidents_for_exam(&self, exam_id: &str) -> AppResult<Vec<IncidentView>> {
        self.get_json(&format!("/incidents/exam/{}", exam_id))
    }

    /// The server answers either a bare number or `{"count": n}`.
    pub fn incident_count(&self, exam_id: &str) -> AppResult<u64> {
        let value: serde_json::Value = self.get_json(&format!("/incidents/exam/{}/count", exam_id))?;
        Ok(parse_count(&value))
    }

    // ============ STUDENTS / BARCODES ============

    pub fn all_students(&self) -> AppResult<Vec<Student>> {
        self.get_json("/students")
    }

    pub fn search_student(&self, student_id: &str) -> AppResult<Student> {
        let req = self.authorized(self.client.get(self.url("/students/search")))?;
        let resp = Self::check(req.query(&[("studentId", student_id)]).send()?)?;
        Ok(resp.json::<Student>()?)
    }

    /// A duplicate student id is refused with a 400.
    pub fn register_student(&self, student: &NewStudent) -> AppResult<Registration> {
        self.post_json("/students", student)
    }

    pub fn generate_all_barcodes(&self) -> AppResult<BarcodeBatch> {
        let req = self.authorized(self.client.post(self.url("/barcode/generate-all")))?;
        let resp = Self::check(req.send()?)?;
        Ok(resp.json::<BarcodeBatch>()?)
    }

    /// PNG bytes of the student's ID-card barcode.
    pub fn download_barcode(&self, student_id: &str) -> AppResult<Vec<u8>> {
        let req = self.authorized(
            self.client
                .get(self.url(&format!("/barcode/download/{}", student_id))),
        )?;
        let resp = Self::check(req.send()?)?;
        Ok(resp.bytes()?.to_vec())
    }

    /// Any HTTP answer, even an error status, means the server is reachable.
    pub fn ping(&self) -> bool {
        self.client
            .get(self.url("/exams"))
            .timeout(PROBE_TIMEOUT)
            .send()
            .is_ok()
    }
}

pub fn parse_count(value: &serde_json::Value) -> u64 {
    value
        .as_u64()
        .or_else(|| value.get("count").and_then(serde_json::Value::as_u64))
        .unwrap_or(0)
}

impl RemoteApi for HttpApi {
    fn mark_attendance(&self, req: &AttendanceRequest) -> AppResult<AttendanceView> {
        self.post_json("/attendance", req)
    }

    fn report_incident(&self, req: &IncidentRequest) -> AppResult<IncidentView> {
        self.post_json("/incidents", req)
    }
}

impl Reachability for HttpApi {
    fn is_online(&self) -> bool {
        self.ping()
    }
}
