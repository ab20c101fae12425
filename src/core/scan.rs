//! Barcode attendance scanning. Codes arrive already decoded (a USB scanner
//! types them like a keyboard); this module only decides what each code
//! means for the exam roster.

use crate::core::submission::{SubmissionFacade, SubmitOutcome};
use crate::errors::AppResult;
use crate::models::attendance::{AttendanceStatus, MarkMethod};
use crate::models::student::Student;
use std::collections::HashSet;

pub const DEFAULT_COOLDOWN_MS: i64 = 2000;

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Marked {
        student: Student,
        outcome: SubmitOutcome,
    },
    /// No roster entry carries this barcode.
    UnknownStudent(String),
    /// Already marked in this session.
    AlreadyScanned(Student),
    /// Inside the cooldown window after the previous mark.
    CoolingDown,
    /// Empty line.
    Ignored,
}

pub struct ScanSession {
    exam_id: String,
    roster: Vec<Student>,
    cooldown_ms: i64,
    scanned: HashSet<String>,
    cooldown_until: Option<i64>,
}

impl ScanSession {
    pub fn new(exam_id: &str, roster: Vec<Student>, cooldown_ms: i64) -> Self {
        Self {
            exam_id: exam_id.to_string(),
            roster,
            cooldown_ms: cooldown_ms.max(0),
            scanned: HashSet::new(),
            cooldown_until: None,
        }
    }

    pub fn exam_id(&self) -> &str {
        &self.exam_id
    }

    pub fn scanned_count(&self) -> usize {
        self.scanned.len()
    }

    pub fn roster_len(&self) -> usize {
        self.roster.len()
    }

    /// Roster entries not scanned yet, roster order.
    pub fn remaining(&self) -> Vec<&Student> {
        self.roster
            .iter()
            .filter(|s| !self.scanned.contains(&s.student_id))
            .collect()
    }

    /// Handle one decoded barcode captured at `now_ms`.
    ///
    /// Only a successful mark starts the cooldown; rejected codes do not.
    pub fn handle_code(
        &mut self,
        code: &str,
        now_ms: i64,
        facade: &mut SubmissionFacade<'_>,
    ) -> AppResult<ScanOutcome> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(ScanOutcome::Ignored);
        }

        if let Some(until) = self.cooldown_until
            && now_ms < until
        {
            return Ok(ScanOutcome::CoolingDown);
        }

        let Some(student) = self.roster.iter().find(|s| s.student_id == code).cloned() else {
            return Ok(ScanOutcome::UnknownStudent(code.to_string()));
        };

        if self.scanned.contains(&student.student_id) {
            return Ok(ScanOutcome::AlreadyScanned(student));
        }

        let outcome = facade.submit(
            &self.exam_id,
            &student.id.to_string(),
            AttendanceStatus::Present,
            MarkMethod::Scan,
        )?;

        self.scanned.insert(student.student_id.clone());
        self.cooldown_until = Some(now_ms + self.cooldown_ms);

        Ok(ScanOutcome::Marked { student, outcome })
    }
}
