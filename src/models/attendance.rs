use serde::{Deserialize, Serialize};

use super::student::Student;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::Absent => "ABSENT",
            AttendanceStatus::Late => "LATE",
        }
    }

    /// Helper: convert input code from CLI (lowercase or uppercase, P/A/L accepted)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "PRESENT" | "P" => Some(AttendanceStatus::Present),
            "ABSENT" | "A" => Some(AttendanceStatus::Absent),
            "LATE" | "L" => Some(AttendanceStatus::Late),
            _ => None,
        }
    }
}

/// How the attendance was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MarkMethod {
    #[default]
    #[serde(rename = "MANUAL")]
    Manual,
    #[serde(rename = "SCAN", alias = "SCANNED")]
    Scan,
}

impl MarkMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkMethod::Manual => "MANUAL",
            MarkMethod::Scan => "SCAN",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "MANUAL" | "M" => Some(MarkMethod::Manual),
            "SCAN" | "SCANNED" | "S" => Some(MarkMethod::Scan),
            _ => None,
        }
    }
}

/// One buffered attendance write, as stored under its exam in the offline
/// document: `{studentId, status, method, timestamp, synced}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub student_id: String,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub method: MarkMethod,
    #[serde(rename = "timestamp")]
    pub captured_at_millis: i64,
    #[serde(default)]
    pub synced: bool,
}

/// Flattened view of a buffered attendance write, exam included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub exam_id: String,
    pub student_id: String,
    pub status: AttendanceStatus,
    pub method: MarkMethod,
    pub captured_at_millis: i64,
    pub synced: bool,
}

impl AttendanceRecord {
    pub fn from_entry(exam_id: &str, entry: &AttendanceEntry) -> Self {
        Self {
            exam_id: exam_id.to_string(),
            student_id: entry.student_id.clone(),
            status: entry.status,
            method: entry.method,
            captured_at_millis: entry.captured_at_millis,
            synced: entry.synced,
        }
    }

    /// True when `entry` is the exact write this record was taken from.
    pub fn matches(&self, entry: &AttendanceEntry) -> bool {
        self.student_id == entry.student_id
            && self.status == entry.status
            && self.method == entry.method
            && self.captured_at_millis == entry.captured_at_millis
    }

    pub fn to_request(&self) -> AttendanceRequest {
        AttendanceRequest {
            exam_id: self.exam_id.clone(),
            student_id: self.student_id.clone(),
            status: self.status,
            method: self.method,
        }
    }
}

/// Body of `POST /attendance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRequest {
    pub exam_id: String,
    pub student_id: String,
    pub status: AttendanceStatus,
    pub method: MarkMethod,
}

/// Attendance row as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceView {
    #[serde(default)]
    pub id: Option<i64>,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub method: Option<MarkMethod>,
    #[serde(default)]
    pub marked_at: Option<String>,
    #[serde(default)]
    pub marked_by: Option<String>,
    #[serde(default)]
    pub student: Option<Student>,
}

/// Server-side statistics for one exam.
/// Attended = present + late.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub exam_id: i64,
    #[serde(default)]
    pub course_code: String,
    #[serde(default)]
    pub course_name: String,
    pub total_students: u32,
    pub present_count: u32,
    pub absent_count: u32,
    pub late_count: u32,
    #[serde(default)]
    pub attendance_percentage: f64,
}

impl AttendanceSummary {
    pub fn computed_percentage(&self) -> f64 {
        if self.total_students == 0 {
            return 0.0;
        }
        f64::from(self.present_count + self.late_count) / f64::from(self.total_students) * 100.0
    }

    pub fn not_marked(&self) -> u32 {
        self.total_students
            .saturating_sub(self.present_count + self.absent_count + self.late_count)
    }
}
