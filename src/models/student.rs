use serde::{Deserialize, Serialize};

/// A student as known by the server. `student_id` is the value printed on
/// the ID-card barcode, `id` is the server key used when marking attendance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub student_id: String,
    pub full_name: String,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
}

impl Student {
    pub fn program_or_dash(&self) -> &str {
        self.program.as_deref().unwrap_or("-")
    }
}

/// Body of a student registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub student_id: String,
    pub full_name: String,
    pub program: String,
}

impl NewStudent {
    pub fn new(student_id: &str, full_name: &str, program: &str) -> Self {
        Self {
            student_id: student_id.trim().to_string(),
            full_name: full_name.trim().to_string(),
            program: program.trim().to_string(),
        }
    }
}
