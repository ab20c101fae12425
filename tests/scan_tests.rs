use invigilator::core::buffer::{LocalWriteBuffer, WriteBuffer};
use invigilator::core::connectivity::FixedReachability;
use invigilator::core::scan::{DEFAULT_COOLDOWN_MS, ScanOutcome, ScanSession};
use invigilator::core::submission::{OfflineReason, SubmissionFacade, SubmitOutcome};
use invigilator::db::storage::MemoryStorage;
use invigilator::models::attendance::{AttendanceStatus, MarkMethod};

mod common;
use common::{FakeApi, student};

fn session() -> ScanSession {
    ScanSession::new(
        "7",
        vec![
            student(101, "S001", "Ada Lovelace"),
            student(102, "S002", "Alan Turing"),
            student(103, "S003", "Grace Hopper"),
        ],
        DEFAULT_COOLDOWN_MS,
    )
}

#[test]
fn successful_scan_marks_present_by_server_id() {
    let mut buf = LocalWriteBuffer::new(MemoryStorage::new());
    let api = FakeApi::new();
    let online = FixedReachability(true);
    let mut scan = session();

    {
        let mut facade = SubmissionFacade::new(&mut buf, &api, &online);
        let outcome = scan.handle_code("S002\n", 0, &mut facade).unwrap();

        match outcome {
            ScanOutcome::Marked { student, outcome } => {
                assert_eq!(student.full_name, "Alan Turing");
                assert!(outcome.is_confirmed());
            }
            other => panic!("expected Marked, got {:?}", other),
        }
    }

    let calls = api.attendance_calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].exam_id, "7");
    assert_eq!(calls[0].student_id, "102");
    assert_eq!(calls[0].status, AttendanceStatus::Present);
    assert_eq!(calls[0].method, MarkMethod::Scan);
    assert_eq!(scan.scanned_count(), 1);
}

#[test]
fn offline_scan_lands_in_the_buffer() {
    let mut buf = LocalWriteBuffer::new(MemoryStorage::new());
    let api = FakeApi::new();
    let offline = FixedReachability(false);
    let mut scan = session();

    {
        let mut facade = SubmissionFacade::new(&mut buf, &api, &offline);
        let outcome = scan.handle_code("S001", 0, &mut facade).unwrap();
        assert!(matches!(
            outcome,
            ScanOutcome::Marked {
                outcome: SubmitOutcome::SavedOffline(OfflineReason::Offline),
                ..
            }
        ));
    }

    let data = buf.get_offline_data().unwrap();
    let entry = &data.attendance_for("7")[0];
    assert_eq!(entry.student_id, "101");
    assert_eq!(entry.method, MarkMethod::Scan);
    assert_eq!(api.total_calls(), 0);
}

#[test]
fn cooldown_duplicates_and_unknown_codes() {
    let mut buf = LocalWriteBuffer::new(MemoryStorage::new());
    let api = FakeApi::new();
    let online = FixedReachability(true);
    let mut facade = SubmissionFacade::new(&mut buf, &api, &online);
    let mut scan = session();

    assert!(matches!(
        scan.handle_code("S001", 1_000, &mut facade).unwrap(),
        ScanOutcome::Marked { .. }
    ));

    // inside the window after a mark
    assert_eq!(
        scan.handle_code("S002", 2_999, &mut facade).unwrap(),
        ScanOutcome::CoolingDown
    );

    // window over
    assert!(matches!(
        scan.handle_code("S002", 3_000, &mut facade).unwrap(),
        ScanOutcome::Marked { .. }
    ));

    match scan.handle_code("S001", 10_000, &mut facade).unwrap() {
        ScanOutcome::AlreadyScanned(s) => assert_eq!(s.student_id, "S001"),
        other => panic!("expected AlreadyScanned, got {:?}", other),
    }

    assert_eq!(
        scan.handle_code("X999", 10_001, &mut facade).unwrap(),
        ScanOutcome::UnknownStudent("X999".to_string())
    );

    // rejected codes did not start a cooldown
    assert!(matches!(
        scan.handle_code("S003", 10_002, &mut facade).unwrap(),
        ScanOutcome::Marked { .. }
    ));

    assert_eq!(scan.scanned_count(), 3);
    assert!(scan.remaining().is_empty());
}

#[test]
fn blank_lines_are_ignored() {
    let mut buf = LocalWriteBuffer::new(MemoryStorage::new());
    let api = FakeApi::new();
    let online = FixedReachability(true);
    let mut facade = SubmissionFacade::new(&mut buf, &api, &online);
    let mut scan = session();

    assert_eq!(
        scan.handle_code("   ", 0, &mut facade).unwrap(),
        ScanOutcome::Ignored
    );
    assert_eq!(scan.scanned_count(), 0);
    assert_eq!(scan.remaining().len(), 3);
    assert_eq!(scan.roster_len(), 3);
}

#[test]
fn zero_cooldown_accepts_back_to_back_scans() {
    let mut buf = LocalWriteBuffer::new(MemoryStorage::new());
    let api = FakeApi::new();
    let online = FixedReachability(true);
    let mut facade = SubmissionFacade::new(&mut buf, &api, &online);
    let mut scan = ScanSession::new("7", vec![student(1, "A", "A"), student(2, "B", "B")], 0);

    for code in ["A", "B"] {
        assert!(matches!(
            scan.handle_code(code, 5, &mut facade).unwrap(),
            ScanOutcome::Marked { .. }
        ));
    }
    assert_eq!(scan.exam_id(), "7");
}
