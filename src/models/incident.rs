use serde::{Deserialize, Serialize};

use super::student::Student;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentCategory {
    Cheating,
    HealthEmergency,
    Disruption,
    Other,
}

impl IncidentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentCategory::Cheating => "CHEATING",
            IncidentCategory::HealthEmergency => "HEALTH_EMERGENCY",
            IncidentCategory::Disruption => "DISRUPTION",
            IncidentCategory::Other => "OTHER",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().replace('-', "_").as_str() {
            "CHEATING" => Some(IncidentCategory::Cheating),
            "HEALTH_EMERGENCY" | "HEALTH" => Some(IncidentCategory::HealthEmergency),
            "DISRUPTION" => Some(IncidentCategory::Disruption),
            "OTHER" => Some(IncidentCategory::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
}

impl IncidentSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentSeverity::Low => "LOW",
            IncidentSeverity::Medium => "MEDIUM",
            IncidentSeverity::High => "HIGH",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "LOW" | "L" => Some(IncidentSeverity::Low),
            "MEDIUM" | "M" => Some(IncidentSeverity::Medium),
            "HIGH" | "H" => Some(IncidentSeverity::High),
            _ => None,
        }
    }
}

/// What the invigilator reports. `student_id = None` is a general incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incident {
    pub student_id: Option<String>,
    pub category: IncidentCategory,
    pub severity: IncidentSeverity,
    pub description: String,
}

/// A buffered incident as stored in the offline document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    pub exam_id: String,
    pub student_id: Option<String>,
    pub category: IncidentCategory,
    pub severity: IncidentSeverity,
    pub description: String,
    #[serde(rename = "timestamp")]
    pub captured_at_millis: i64,
    #[serde(default)]
    pub synced: bool,
}

impl IncidentRecord {
    pub fn new(exam_id: &str, incident: &Incident, captured_at_millis: i64) -> Self {
        Self {
            exam_id: exam_id.to_string(),
            student_id: incident.student_id.clone(),
            category: incident.category,
            severity: incident.severity,
            description: incident.description.clone(),
            captured_at_millis,
            synced: false,
        }
    }

    pub fn to_request(&self) -> IncidentRequest {
        IncidentRequest {
            exam_id: self.exam_id.clone(),
            student_id: self.student_id.clone(),
            category: self.category,
            severity: self.severity,
            description: self.description.clone(),
        }
    }
}

/// Body of `POST /incidents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRequest {
    pub exam_id: String,
    pub student_id: Option<String>,
    pub category: IncidentCategory,
    pub severity: IncidentSeverity,
    pub description: String,
}

impl IncidentRequest {
    pub fn new(exam_id: &str, incident: &Incident) -> Self {
        Self {
            exam_id: exam_id.to_string(),
            student_id: incident.student_id.clone(),
            category: incident.category,
            severity: incident.severity,
            description: incident.description.clone(),
        }
    }
}

/// Incident as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentView {
    #[serde(default)]
    pub id: Option<i64>,
    pub category: IncidentCategory,
    pub severity: IncidentSeverity,
    pub description: String,
    #[serde(default)]
    pub reported_at: Option<String>,
    #[serde(default)]
    pub reported_by: Option<String>,
    #[serde(default)]
    pub student: Option<Student>,
}
