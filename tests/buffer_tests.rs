use invigilator::core::buffer::{ConfirmedRecords, LocalWriteBuffer, OFFLINE_KEY, WriteBuffer};
use invigilator::db::pool::DbPool;
use invigilator::db::storage::{DEFAULT_QUOTA_BYTES, LocalStorage, MemoryStorage, SqliteStorage};
use invigilator::errors::AppError;
use invigilator::models::attendance::{AttendanceStatus, MarkMethod};
use invigilator::models::incident::{Incident, IncidentCategory, IncidentSeverity};

mod common;
use common::setup_test_db;

fn buffer() -> LocalWriteBuffer<MemoryStorage> {
    LocalWriteBuffer::new(MemoryStorage::new())
}

fn phone_incident(student: Option<&str>) -> Incident {
    Incident {
        student_id: student.map(str::to_string),
        category: IncidentCategory::Cheating,
        severity: IncidentSeverity::High,
        description: "Phone on the desk".to_string(),
    }
}

#[test]
fn fresh_buffer_has_nothing_to_sync() {
    let buf = buffer();

    assert!(!buf.has_unsynced_data().unwrap());
    assert!(buf.get_offline_data().unwrap().is_empty());
    assert!(buf.storage().get_item(OFFLINE_KEY).unwrap().is_none());
}

#[test]
fn saved_record_reads_back_unsynced() {
    let mut buf = buffer();
    buf.save("7", "42", AttendanceStatus::Absent, MarkMethod::Manual)
        .unwrap();

    assert!(buf.has_unsynced_data().unwrap());

    let data = buf.get_offline_data().unwrap();
    let entries = data.attendance_for("7");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].student_id, "42");
    assert_eq!(entries[0].status, AttendanceStatus::Absent);
    assert_eq!(entries[0].method, MarkMethod::Manual);
    assert!(!entries[0].synced);
    assert!(entries[0].captured_at_millis > 0);
}

#[test]
fn second_save_for_same_key_overwrites() {
    let mut buf = buffer();
    buf.save("7", "42", AttendanceStatus::Absent, MarkMethod::Manual)
        .unwrap();
    buf.save("7", "42", AttendanceStatus::Present, MarkMethod::Scan)
        .unwrap();

    let data = buf.get_offline_data().unwrap();
    assert_eq!(data.attendance_count(), 1);
    assert_eq!(data.attendance_for("7")[0].status, AttendanceStatus::Present);
    assert_eq!(data.attendance_for("7")[0].method, MarkMethod::Scan);
}

#[test]
fn overwrite_keeps_insertion_position() {
    let mut buf = buffer();
    for s in ["1", "2", "3"] {
        buf.save("7", s, AttendanceStatus::Present, MarkMethod::Manual)
            .unwrap();
    }
    buf.save("7", "1", AttendanceStatus::Late, MarkMethod::Manual)
        .unwrap();

    let data = buf.get_offline_data().unwrap();
    let order: Vec<&str> = data
        .attendance_for("7")
        .iter()
        .map(|e| e.student_id.as_str())
        .collect();
    assert_eq!(order, ["1", "2", "3"]);
    assert_eq!(data.attendance_for("7")[0].status, AttendanceStatus::Late);
}

#[test]
fn same_student_in_two_exams_is_two_records() {
    let mut buf = buffer();
    buf.save("7", "42", AttendanceStatus::Present, MarkMethod::Manual)
        .unwrap();
    buf.save("8", "42", AttendanceStatus::Absent, MarkMethod::Manual)
        .unwrap();

    let data = buf.get_offline_data().unwrap();
    assert_eq!(data.attendance_count(), 2);
    assert_eq!(data.attendance_records().len(), 2);
}

#[test]
fn incidents_are_appended_even_when_identical() {
    let mut buf = buffer();
    buf.save_incident("7", &phone_incident(Some("42"))).unwrap();
    buf.save_incident("7", &phone_incident(Some("42"))).unwrap();
    buf.save_incident("8", &phone_incident(None)).unwrap();

    let data = buf.get_offline_data().unwrap();
    assert_eq!(data.incidents.len(), 3);
    assert_eq!(data.incidents_for("7").count(), 2);
    assert!(data.incidents.iter().all(|i| !i.synced));
    assert!(buf.has_unsynced_data().unwrap());
}

#[test]
fn persisted_document_layout() {
    let mut buf = buffer();
    buf.save("7", "42", AttendanceStatus::Late, MarkMethod::Scan)
        .unwrap();
    buf.save_incident("7", &phone_incident(None)).unwrap();

    let raw = buf.storage().get_item(OFFLINE_KEY).unwrap().unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();

    let rec = &doc["attendance"]["7"][0];
    assert_eq!(rec["studentId"], "42");
    assert_eq!(rec["status"], "LATE");
    assert_eq!(rec["method"], "SCAN");
    assert_eq!(rec["synced"], false);
    assert!(rec["timestamp"].is_i64());

    let inc = &doc["incidents"][0];
    assert_eq!(inc["examId"], "7");
    assert!(inc["studentId"].is_null());
    assert_eq!(inc["category"], "CHEATING");
    assert_eq!(inc["severity"], "HIGH");
    assert_eq!(inc["description"], "Phone on the desk");
}

#[test]
fn documents_without_method_load_as_manual() {
    let mut storage = MemoryStorage::new();
    storage
        .set_item(
            OFFLINE_KEY,
            r#"{"attendance":{"3":[
                {"studentId":"9","status":"PRESENT","timestamp":1700000000000,"synced":false},
                {"studentId":"10","status":"ABSENT","method":"SCANNED","timestamp":1700000000001,"synced":false}
            ]},"incidents":[]}"#,
        )
        .unwrap();

    let buf = LocalWriteBuffer::new(storage);
    let data = buf.get_offline_data().unwrap();
    assert_eq!(data.attendance_for("3")[0].method, MarkMethod::Manual);
    assert_eq!(data.attendance_for("3")[1].method, MarkMethod::Scan);
}

#[test]
fn corrupted_document_is_an_error() {
    let mut storage = MemoryStorage::new();
    storage.set_item(OFFLINE_KEY, "{not json").unwrap();

    let buf = LocalWriteBuffer::new(storage);
    assert!(matches!(buf.get_offline_data(), Err(AppError::Json(_))));
}

#[test]
fn discard_forgets_one_key() {
    let mut buf = buffer();
    buf.save("7", "41", AttendanceStatus::Present, MarkMethod::Manual).unwrap();
    buf.save("7", "42", AttendanceStatus::Late, MarkMethod::Manual).unwrap();
    buf.save("8", "42", AttendanceStatus::Absent, MarkMethod::Manual).unwrap();

    assert!(buf.discard("7", "42").unwrap());
    assert!(!buf.discard("7", "42").unwrap());
    assert!(!buf.discard("9", "42").unwrap());

    let data = buf.get_offline_data().unwrap();
    assert_eq!(data.attendance_for("7").len(), 1);
    assert_eq!(data.attendance_for("8").len(), 1);

    assert!(buf.discard("8", "42").unwrap());
    let data = buf.get_offline_data().unwrap();
    assert!(!data.attendance.contains_key("8"));
}

#[test]
fn clear_drops_the_whole_buffer() {
    let mut buf = buffer();
    buf.save("7", "42", AttendanceStatus::Present, MarkMethod::Manual)
        .unwrap();
    buf.save_incident("7", &phone_incident(None)).unwrap();

    buf.clear_synced_data().unwrap();

    assert!(!buf.has_unsynced_data().unwrap());
    assert!(buf.storage().get_item(OFFLINE_KEY).unwrap().is_none());
}

#[test]
fn remove_confirmed_keeps_records_rewritten_after_snapshot() {
    let mut buf = buffer();
    buf.save("7", "1", AttendanceStatus::Present, MarkMethod::Manual)
        .unwrap();
    buf.save("7", "2", AttendanceStatus::Present, MarkMethod::Manual)
        .unwrap();

    let snapshot = buf.get_offline_data().unwrap();

    // student 2 corrected while the snapshot was being replayed
    buf.save("7", "2", AttendanceStatus::Absent, MarkMethod::Manual)
        .unwrap();

    let confirmed = ConfirmedRecords {
        attendance: snapshot.attendance_records(),
        incidents: Vec::new(),
    };
    let removed = buf.remove_confirmed(&confirmed).unwrap();

    assert_eq!(removed, 1);
    let data = buf.get_offline_data().unwrap();
    assert_eq!(data.attendance_count(), 1);
    assert_eq!(data.attendance_for("7")[0].student_id, "2");
    assert_eq!(data.attendance_for("7")[0].status, AttendanceStatus::Absent);
}

#[test]
fn removing_everything_deletes_the_key() {
    let mut buf = buffer();
    buf.save("7", "1", AttendanceStatus::Present, MarkMethod::Manual)
        .unwrap();
    buf.save_incident("7", &phone_incident(Some("1"))).unwrap();

    let snapshot = buf.get_offline_data().unwrap();
    let confirmed = ConfirmedRecords {
        attendance: snapshot.attendance_records(),
        incidents: snapshot.incidents.clone(),
    };
    assert_eq!(confirmed.len(), 2);
    assert_eq!(buf.remove_confirmed(&confirmed).unwrap(), 2);

    assert!(buf.storage().get_item(OFFLINE_KEY).unwrap().is_none());
}

#[test]
fn quota_exceeded_is_storage_full_and_keeps_previous_content() {
    let mut buf = LocalWriteBuffer::new(MemoryStorage::with_quota(200));
    buf.save("7", "1", AttendanceStatus::Present, MarkMethod::Manual)
        .unwrap();
    let before = buf.get_offline_data().unwrap();

    let mut full = None;
    for i in 2..50 {
        if let Err(e) = buf.save("7", &i.to_string(), AttendanceStatus::Present, MarkMethod::Manual) {
            full = Some(e);
            break;
        }
    }

    assert!(matches!(full, Some(AppError::StorageFull(_))));
    let after = buf.get_offline_data().unwrap();
    assert!(after.attendance_count() >= before.attendance_count());
    assert_eq!(after.attendance_for("7")[0], before.attendance_for("7")[0]);
}

#[test]
fn sqlite_storage_round_trip() {
    let pool = DbPool::in_memory().unwrap();
    let storage = SqliteStorage::from_pool(pool, DEFAULT_QUOTA_BYTES).unwrap();
    let mut buf = LocalWriteBuffer::new(storage);

    buf.save("7", "42", AttendanceStatus::Late, MarkMethod::Manual)
        .unwrap();
    buf.save_incident("7", &phone_incident(Some("42"))).unwrap();

    let data = buf.get_offline_data().unwrap();
    assert_eq!(data.attendance_for("7")[0].status, AttendanceStatus::Late);
    assert_eq!(data.incidents.len(), 1);
    assert!(buf.storage().used_bytes().unwrap() > 0);
}

#[test]
fn sqlite_buffer_survives_reopen() {
    let db_path = setup_test_db("buffer_reopen");

    {
        let storage = SqliteStorage::open(&db_path, DEFAULT_QUOTA_BYTES).unwrap();
        let mut buf = LocalWriteBuffer::new(storage);
        buf.save("7", "42", AttendanceStatus::Absent, MarkMethod::Manual)
            .unwrap();
    }

    let storage = SqliteStorage::open(&db_path, DEFAULT_QUOTA_BYTES).unwrap();
    let buf = LocalWriteBuffer::new(storage);
    assert!(buf.has_unsynced_data().unwrap());
    assert_eq!(
        buf.get_offline_data().unwrap().attendance_for("7")[0].status,
        AttendanceStatus::Absent
    );
}

#[test]
fn sqlite_quota_is_enforced() {
    let pool = DbPool::in_memory().unwrap();
    let mut storage = SqliteStorage::from_pool(pool, 32).unwrap();

    storage.set_item("k", "small").unwrap();
    let err = storage.set_item("k", &"x".repeat(64)).unwrap_err();
    assert!(matches!(err, AppError::StorageFull(_)));

    // the failed write left the old value in place
    assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("small"));
}
