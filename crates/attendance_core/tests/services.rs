use attendance_core::{
    AttendanceService, AttendanceStatus, DailyAttendancePolicy, DayRange, InMemoryStore,
    MarkAttendanceRequest, NewStudent, ServiceError, ServiceErrorKind, SqliteAttendanceStore,
    StudentService,
};
use attendance_core::AttendanceStore;
use chrono::{Local, NaiveDate, TimeZone};
use uuid::Uuid;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn add_student_trims_and_rejects_blank_input() {
    let store = InMemoryStore::new();
    let service = StudentService::new(&store);

    let alice = service
        .add_student(&NewStudent::new(" Alice ", " R001 "))
        .unwrap();
    assert_eq!(alice.name, "Alice");
    assert_eq!(alice.roll_number, "R001");

    let err = service
        .add_student(&NewStudent::new("", "R002"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidStudent(_)));
    assert_eq!(err.kind(), ServiceErrorKind::InvalidInput);
    assert_eq!(service.list_students().unwrap().len(), 1);
}

#[test]
fn search_matches_name_or_roll_number() {
    let store = InMemoryStore::new();
    let service = StudentService::new(&store);
    service.add_student(&NewStudent::new("Alice Smith", "R001")).unwrap();
    service.add_student(&NewStudent::new("Bob Jones", "X042")).unwrap();

    let by_name = service.search_students("SMITH").unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Alice Smith");

    let by_roll = service.search_students("x04").unwrap();
    assert_eq!(by_roll.len(), 1);
    assert_eq!(by_roll[0].roll_number, "X042");

    assert_eq!(service.search_students("").unwrap().len(), 2);
}

#[test]
fn delete_student_parses_string_ids() {
    let store = InMemoryStore::new();
    let service = StudentService::new(&store);
    let alice = service.add_student(&NewStudent::new("Alice", "R001")).unwrap();

    let err = service.delete_student("not-a-uuid").unwrap_err();
    assert!(matches!(err, ServiceError::InvalidId(ref value) if value == "not-a-uuid"));

    assert!(!service.delete_student(&Uuid::new_v4().to_string()).unwrap());
    assert!(service.delete_student(&alice.id.to_string()).unwrap());
    assert!(service.get_student(&alice.id.to_string()).unwrap().is_none());
}

#[test]
fn mark_attendance_accepts_text_and_structured_dates() {
    let store = SqliteAttendanceStore::open_in_memory().unwrap();
    let students = StudentService::new(&store);
    let attendance = AttendanceService::new(&store);
    let bob = students.add_student(&NewStudent::new("Bob", "R002")).unwrap();

    let from_text = attendance
        .mark_attendance(&MarkAttendanceRequest::new(
            bob.id.to_string(),
            "2024-01-05",
            AttendanceStatus::Absent,
        ))
        .unwrap();
    let afternoon = Local
        .from_local_datetime(&day(2024, 1, 5).and_hms_opt(14, 0, 0).unwrap())
        .unwrap();
    let from_value = attendance
        .mark_attendance(&MarkAttendanceRequest::new(
            bob.id.to_string(),
            afternoon,
            AttendanceStatus::Absent,
        ))
        .unwrap();

    assert_ne!(from_text.id, from_value.id);
    assert_eq!(from_value.date, afternoon.fixed_offset());

    let absentees = attendance.absentees_on("2024-01-05").unwrap();
    assert_eq!(absentees.len(), 2);
    assert!(absentees.iter().all(|row| row.roll_number == "R002"));
}

#[test]
fn mark_attendance_rejects_bad_input() {
    let store = InMemoryStore::new();
    let students = StudentService::new(&store);
    let attendance = AttendanceService::new(&store);
    let bob = students.add_student(&NewStudent::new("Bob", "R002")).unwrap();

    let bad_id = attendance
        .mark_attendance(&MarkAttendanceRequest::new(
            "42",
            "2024-01-05",
            AttendanceStatus::Absent,
        ))
        .unwrap_err();
    assert!(matches!(bad_id, ServiceError::InvalidId(_)));

    let bad_date = attendance
        .mark_attendance(&MarkAttendanceRequest::new(
            bob.id.to_string(),
            "05/01/2024",
            AttendanceStatus::Absent,
        ))
        .unwrap_err();
    assert!(matches!(bad_date, ServiceError::InvalidDate(_)));

    let unknown = Uuid::new_v4();
    let missing = attendance
        .mark_attendance(&MarkAttendanceRequest::new(
            unknown.to_string(),
            "2024-01-05",
            AttendanceStatus::Absent,
        ))
        .unwrap_err();
    assert!(matches!(missing, ServiceError::StudentNotFound(id) if id == unknown));
    assert_eq!(missing.kind(), ServiceErrorKind::InvalidInput);

    assert_eq!(store.attendance_count(), 0);
}

#[test]
fn append_policy_keeps_every_daily_record() {
    let store = InMemoryStore::new();
    let students = StudentService::new(&store);
    let attendance = AttendanceService::new(&store);
    assert_eq!(attendance.policy(), DailyAttendancePolicy::Append);
    let bob = students.add_student(&NewStudent::new("Bob", "R002")).unwrap();

    for _ in 0..2 {
        attendance
            .mark_attendance(&MarkAttendanceRequest::new(
                bob.id.to_string(),
                "2024-01-05T09:00:00",
                AttendanceStatus::Absent,
            ))
            .unwrap();
    }

    assert_eq!(attendance.absentees_on(day(2024, 1, 5)).unwrap().len(), 2);
}

#[test]
fn replace_policy_keeps_one_record_per_student_and_day() {
    let store = SqliteAttendanceStore::open_in_memory().unwrap();
    let students = StudentService::new(&store);
    let attendance = AttendanceService::with_policy(&store, DailyAttendancePolicy::ReplaceExisting);
    let bob = students.add_student(&NewStudent::new("Bob", "R002")).unwrap();
    let alice = students.add_student(&NewStudent::new("Alice", "R001")).unwrap();

    let mark = |id: &Uuid, date: &str, status| {
        attendance
            .mark_attendance(&MarkAttendanceRequest::new(id.to_string(), date, status))
            .unwrap()
    };

    mark(&bob.id, "2024-01-05T08:00:00", AttendanceStatus::Absent);
    mark(&alice.id, "2024-01-05T08:00:00", AttendanceStatus::Absent);
    mark(&bob.id, "2024-01-06T08:00:00", AttendanceStatus::Absent);
    let latest = mark(&bob.id, "2024-01-05T11:00:00", AttendanceStatus::Present);

    let range = DayRange::local(day(2024, 1, 5));
    let bob_day = store.attendance_for_student(bob.id, &range).unwrap();
    assert_eq!(bob_day, vec![latest]);

    let absentees = attendance.absentees_on("2024-01-05").unwrap();
    assert_eq!(absentees.len(), 1);
    assert_eq!(absentees[0].student_id, alice.id);

    assert_eq!(attendance.absentees_on("2024-01-06").unwrap().len(), 1);
}

#[test]
fn absentees_on_rejects_unparseable_day() {
    let store = InMemoryStore::new();
    let attendance = AttendanceService::new(&store);

    let err = attendance.absentees_on("yesterday").unwrap_err();
    assert!(matches!(err, ServiceError::InvalidDate(_)));
}

#[test]
fn absentees_on_reduces_timestamps_to_their_local_day() {
    let store = InMemoryStore::new();
    let students = StudentService::new(&store);
    let attendance = AttendanceService::new(&store);
    let bob = students.add_student(&NewStudent::new("Bob", "R002")).unwrap();
    attendance
        .mark_attendance(&MarkAttendanceRequest::new(
            bob.id.to_string(),
            "2024-01-05T07:45:00",
            AttendanceStatus::Absent,
        ))
        .unwrap();

    let evening = Local
        .from_local_datetime(&day(2024, 1, 5).and_hms_opt(21, 0, 0).unwrap())
        .unwrap();
    assert_eq!(attendance.absentees_on(evening).unwrap().len(), 1);
    assert_eq!(attendance.absentees_on("2024-01-05T21:00:00").unwrap().len(), 1);
}
