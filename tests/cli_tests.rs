use chrono::{NaiveDate, NaiveTime};
use invigilator::api::http::LoginResponse;
use invigilator::api::session::{ExamCache, RosterCache, Session};
use invigilator::db::storage::{DEFAULT_QUOTA_BYTES, SqliteStorage};
use invigilator::models::exam::Exam;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{init_db, inv, setup_test_db, student, temp_file};

/// Nothing listens on the discard port, so the reachability probe fails fast.
const DEAD_API: &str = "http://127.0.0.1:9/api";

#[test]
fn init_creates_the_database() {
    let db_path = setup_test_db("cli_init");

    inv()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    inv()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("migration_applied"))
        .stdout(contains("init"));
}

#[test]
fn offline_mark_then_status() {
    let db_path = setup_test_db("cli_offline_mark");
    init_db(&db_path);

    inv()
        .args(["--db", &db_path, "--offline", "mark", "7", "42", "ABSENT"])
        .assert()
        .success()
        .stdout(contains("saved offline"));

    inv()
        .args(["--db", &db_path, "--offline", "status"])
        .assert()
        .success()
        .stdout(contains("Offline"))
        .stdout(contains("1 record(s) waiting to be synced"))
        .stdout(contains("Exam 7"))
        .stdout(contains("ABSENT"));
}

#[test]
fn second_offline_mark_overwrites_the_first() {
    let db_path = setup_test_db("cli_overwrite");
    init_db(&db_path);

    for status in ["A", "P"] {
        inv()
            .args(["--db", &db_path, "--offline", "mark", "7", "42", status])
            .assert()
            .success();
    }

    inv()
        .args(["--db", &db_path, "--offline", "status"])
        .assert()
        .success()
        .stdout(contains("1 record(s) waiting to be synced"))
        .stdout(contains("PRESENT"))
        .stdout(contains("ABSENT").not());
}

#[test]
fn unreachable_server_buffers_the_mark() {
    let db_path = setup_test_db("cli_dead_api");
    init_db(&db_path);

    inv()
        .args(["--db", &db_path, "--api", DEAD_API, "mark", "7", "42", "LATE"])
        .assert()
        .success()
        .stdout(contains("saved offline"));

    inv()
        .args(["--db", &db_path, "--api", DEAD_API, "sync"])
        .assert()
        .success()
        .stdout(contains("Server unreachable"))
        .stdout(contains("1 record(s) stay saved offline"));
}

#[test]
fn invalid_status_is_rejected() {
    let db_path = setup_test_db("cli_invalid_status");
    init_db(&db_path);

    inv()
        .args(["--db", &db_path, "--offline", "mark", "7", "42", "MAYBE"])
        .assert()
        .failure()
        .stderr(contains("Invalid attendance status"));

    inv()
        .args(["--db", &db_path, "--offline", "status"])
        .assert()
        .success()
        .stdout(contains("No records waiting to be synced"));
}

#[test]
fn offline_incident_is_listed_as_pending() {
    let db_path = setup_test_db("cli_offline_incident");
    init_db(&db_path);

    inv()
        .args([
            "--db",
            &db_path,
            "--offline",
            "incident",
            "7",
            "--category",
            "cheating",
            "--severity",
            "high",
            "-d",
            "Phone found under the desk",
            "--student",
            "42",
        ])
        .assert()
        .success()
        .stdout(contains("Incident HIGH CHEATING saved offline"));

    inv()
        .args(["--db", &db_path, "--offline", "incidents", "7"])
        .assert()
        .success()
        .stdout(contains("Waiting to sync (1)"))
        .stdout(contains("student 42"))
        .stdout(contains("Phone found under the desk"));
}

#[test]
fn invalid_category_is_rejected() {
    let db_path = setup_test_db("cli_invalid_category");
    init_db(&db_path);

    inv()
        .args([
            "--db", &db_path, "--offline", "incident", "7", "--category", "theft", "-d", "x",
        ])
        .assert()
        .failure()
        .stderr(contains("Invalid incident category"));
}

#[test]
fn sync_with_empty_buffer() {
    let db_path = setup_test_db("cli_sync_empty");
    init_db(&db_path);

    inv()
        .args(["--db", &db_path, "--offline", "sync"])
        .assert()
        .success()
        .stdout(contains("Nothing to sync"));
}

#[test]
fn sync_while_offline_keeps_records() {
    let db_path = setup_test_db("cli_sync_offline");
    init_db(&db_path);

    inv()
        .args(["--db", &db_path, "--offline", "mark", "7", "42", "P"])
        .assert()
        .success();

    inv()
        .args(["--db", &db_path, "--offline", "sync"])
        .assert()
        .success()
        .stdout(contains("Server unreachable"));

    inv()
        .args(["--db", &db_path, "--offline", "status"])
        .assert()
        .success()
        .stdout(contains("1 record(s) waiting to be synced"));
}

#[test]
fn scan_offline_with_cached_roster() {
    let db_path = setup_test_db("cli_scan");
    init_db(&db_path);

    {
        let mut storage = SqliteStorage::open(&db_path, DEFAULT_QUOTA_BYTES).unwrap();
        RosterCache::store(
            &mut storage,
            "7",
            &[
                student(101, "S001", "Ada Lovelace"),
                student(102, "S002", "Alan Turing"),
            ],
        )
        .unwrap();
    }

    let input = temp_file("cli_scan_codes", "txt");
    fs::write(&input, "S001\nS001\nZZZ\n\nS002\n").unwrap();

    inv()
        .args([
            "--db",
            &db_path,
            "--offline",
            "scan",
            "7",
            "--input",
            &input,
            "--cooldown-ms",
            "0",
        ])
        .assert()
        .success()
        .stdout(contains("Ada Lovelace (S001) saved offline"))
        .stdout(contains("Ada Lovelace already scanned"))
        .stdout(contains("Student not found for barcode ZZZ"))
        .stdout(contains("2/2 scanned, 0 remaining"));

    inv()
        .args(["--db", &db_path, "--offline", "status"])
        .assert()
        .success()
        .stdout(contains("2 record(s) waiting to be synced"))
        .stdout(contains("SCAN"));
}

#[test]
fn scan_without_roster_fails() {
    let db_path = setup_test_db("cli_scan_no_roster");
    init_db(&db_path);

    let input = temp_file("cli_scan_no_roster_codes", "txt");
    fs::write(&input, "S001\n").unwrap();

    inv()
        .args(["--db", &db_path, "--offline", "scan", "7", "--input", &input])
        .assert()
        .failure()
        .stderr(contains("No roster available for exam 7"));
}

#[test]
fn timer_uses_cached_exam_offline() {
    let db_path = setup_test_db("cli_timer");
    init_db(&db_path);

    {
        let mut storage = SqliteStorage::open(&db_path, DEFAULT_QUOTA_BYTES).unwrap();
        let exam = Exam {
            id: 7,
            course_code: "CS101".to_string(),
            course_name: "Introduction to Programming".to_string(),
            venue: "Hall A".to_string(),
            exam_date: NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            duration: 120,
        };
        ExamCache::store(&mut storage, &[exam]).unwrap();
    }

    inv()
        .args(["--db", &db_path, "--offline", "timer", "7"])
        .assert()
        .success()
        .stdout(contains("CS101 - Introduction to Programming"))
        .stdout(contains("00:00:00"))
        .stdout(contains("Time expired"));

    inv()
        .args(["--db", &db_path, "--offline", "timer", "8"])
        .assert()
        .failure()
        .stderr(contains("Exam 8 is not cached"));
}

#[test]
fn watch_stops_after_max_polls() {
    let db_path = setup_test_db("cli_watch");
    init_db(&db_path);

    inv()
        .args([
            "--db",
            &db_path,
            "--offline",
            "watch",
            "--interval",
            "0",
            "--max-polls",
            "2",
        ])
        .assert()
        .success()
        .stdout(contains("currently Offline"))
        .stdout(contains("Stopped after 2 probe(s)"));
}

#[test]
fn server_commands_need_a_login() {
    let db_path = setup_test_db("cli_not_logged_in");
    init_db(&db_path);

    inv()
        .args(["--db", &db_path, "--api", DEAD_API, "exams"])
        .assert()
        .failure()
        .stderr(contains("Not logged in"));

    inv()
        .args(["--db", &db_path, "logout"])
        .assert()
        .success()
        .stdout(contains("Not logged in."));
}

fn log_in(db_path: &str) {
    let mut storage = SqliteStorage::open(db_path, DEFAULT_QUOTA_BYTES).unwrap();
    let login = LoginResponse {
        token: "t0k3n".to_string(),
        username: "lib1".to_string(),
        full_name: Some("Library Desk".to_string()),
        role: Some("LIBRARIAN".to_string()),
    };
    Session::store(&mut storage, &login).unwrap();
}

#[test]
fn register_student_needs_the_server() {
    let db_path = setup_test_db("cli_register");
    init_db(&db_path);
    let register = [
        "students",
        "--register",
        "BCS25165344",
        "--name",
        "John Doe",
        "--program",
        "Computer Science",
    ];

    inv()
        .args(["--db", &db_path, "--offline"])
        .args(register)
        .assert()
        .failure()
        .stderr(contains("Registering a student needs the server"));

    inv()
        .args(["--db", &db_path, "--api", DEAD_API])
        .args(register)
        .assert()
        .failure()
        .stderr(contains("Not logged in"));

    log_in(&db_path);
    inv()
        .args(["--db", &db_path, "--api", DEAD_API])
        .args(register)
        .assert()
        .failure()
        .stderr(contains("Network error"));

    inv()
        .args(["--db", &db_path, "log", "--print", "--op", "register"])
        .assert()
        .success()
        .stdout(contains("BCS25165344").not());
}

#[test]
fn register_student_requires_name_and_program() {
    let db_path = setup_test_db("cli_register_args");

    inv()
        .args([
            "--db", &db_path, "students", "--register", "BCS1", "--name", "John Doe",
        ])
        .assert()
        .failure()
        .stderr(contains("--program"));

    inv()
        .args(["--db", &db_path, "students", "7", "--register", "BCS1"])
        .assert()
        .failure();
}

#[test]
fn generate_all_barcodes_needs_the_server() {
    let db_path = setup_test_db("cli_generate_all");
    init_db(&db_path);

    inv()
        .args(["--db", &db_path, "--offline", "barcode", "--generate-all"])
        .assert()
        .failure()
        .stderr(contains("Generating barcodes needs the server"));

    inv()
        .args(["--db", &db_path, "--api", DEAD_API, "barcode", "--generate-all"])
        .assert()
        .failure()
        .stderr(contains("Not logged in"));

    log_in(&db_path);
    inv()
        .args(["--db", &db_path, "--api", DEAD_API, "barcode", "--generate-all"])
        .assert()
        .failure()
        .stderr(contains("Network error"));
}

#[test]
fn barcode_needs_a_student_or_generate_all() {
    let db_path = setup_test_db("cli_barcode_args");
    init_db(&db_path);

    inv()
        .args(["--db", &db_path, "--offline", "barcode"])
        .assert()
        .failure()
        .stderr(contains("Give a student id or --generate-all"));

    inv()
        .args(["--db", &db_path, "barcode", "S001", "--generate-all"])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}

#[test]
fn db_info_reports_pending_records() {
    let db_path = setup_test_db("cli_db_info");
    init_db(&db_path);

    inv()
        .args(["--db", &db_path, "--offline", "mark", "7", "42", "P"])
        .assert()
        .success();

    inv()
        .args(["--db", &db_path, "db", "--info", "--check"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed"))
        .stdout(contains("Waiting to sync"))
        .stdout(contains("1 attendance, 0 incidents"));
}

#[test]
fn log_filters_by_operation() {
    let db_path = setup_test_db("cli_log_filter");
    init_db(&db_path);

    inv()
        .args(["--db", &db_path, "--offline", "mark", "7", "42", "P"])
        .assert()
        .success();

    inv()
        .args(["--db", &db_path, "log", "--print", "--op", "mark_offline"])
        .assert()
        .success()
        .stdout(contains("exam 7 student 42"))
        .stdout(contains("migration_applied").not());
}
