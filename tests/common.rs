#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use invigilator::api::RemoteApi;
use invigilator::errors::{AppError, AppResult};
use invigilator::models::attendance::{AttendanceRequest, AttendanceView};
use invigilator::models::incident::{IncidentRequest, IncidentView};
use invigilator::models::student::Student;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn inv() -> Command {
    cargo_bin_cmd!("invigilator")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_invigilator.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary file path inside tempdir and ensure it's removed
pub fn temp_file(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_invigilator.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// `--test init` on a fresh database
pub fn init_db(db_path: &str) {
    inv()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

pub fn student(id: i64, code: &str, name: &str) -> Student {
    Student {
        id,
        student_id: code.to_string(),
        full_name: name.to_string(),
        program: Some("Computer Science".to_string()),
        email: None,
        verified: Some(true),
    }
}

/// In-process stand-in for the exam server. Every call is recorded, and
/// failures can be switched on per student or for everything at once.
#[derive(Default)]
pub struct FakeApi {
    pub down: Cell<bool>,
    pub logged_out: Cell<bool>,
    pub reject_incidents: Cell<bool>,
    pub rejected_students: RefCell<HashSet<String>>,
    pub attendance_calls: RefCell<Vec<AttendanceRequest>>,
    pub incident_calls: RefCell<Vec<IncidentRequest>>,
    next_id: Cell<i64>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        let api = Self::default();
        api.down.set(true);
        api
    }

    pub fn reject_student(&self, student_id: &str) {
        self.rejected_students
            .borrow_mut()
            .insert(student_id.to_string());
    }

    pub fn accept_all(&self) {
        self.rejected_students.borrow_mut().clear();
        self.reject_incidents.set(false);
        self.down.set(false);
    }

    pub fn attendance_count(&self) -> usize {
        self.attendance_calls.borrow().len()
    }

    pub fn incident_count(&self) -> usize {
        self.incident_calls.borrow().len()
    }

    pub fn total_calls(&self) -> usize {
        self.attendance_count() + self.incident_count()
    }

    /// Student ids of the attendance writes received, in order.
    pub fn attendance_students(&self) -> Vec<String> {
        self.attendance_calls
            .borrow()
            .iter()
            .map(|r| r.student_id.clone())
            .collect()
    }

    fn id(&self) -> i64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn gate(&self) -> AppResult<()> {
        if self.logged_out.get() {
            return Err(AppError::NotLoggedIn);
        }
        if self.down.get() {
            return Err(AppError::Remote {
                status: 503,
                body: "Service Unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl RemoteApi for FakeApi {
    fn mark_attendance(&self, req: &AttendanceRequest) -> AppResult<AttendanceView> {
        self.attendance_calls.borrow_mut().push(req.clone());
        self.gate()?;

        if self.rejected_students.borrow().contains(&req.student_id) {
            return Err(AppError::Remote {
                status: 400,
                body: "Student is not registered for this exam".to_string(),
            });
        }

        Ok(AttendanceView {
            id: Some(self.id()),
            status: req.status,
            method: Some(req.method),
            marked_at: None,
            marked_by: Some("invigilator1".to_string()),
            student: None,
        })
    }

    fn report_incident(&self, req: &IncidentRequest) -> AppResult<IncidentView> {
        self.incident_calls.borrow_mut().push(req.clone());
        self.gate()?;

        if self.reject_incidents.get() {
            return Err(AppError::Remote {
                status: 400,
                body: "Invalid incident".to_string(),
            });
        }

        Ok(IncidentView {
            id: Some(self.id()),
            category: req.category,
            severity: req.severity,
            description: req.description.clone(),
            reported_at: None,
            reported_by: Some("invigilator1".to_string()),
            student: None,
        })
    }
}
