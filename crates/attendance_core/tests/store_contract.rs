//! Identical scenarios run against every backend.

mod common;

use attendance_core::model::student::compare_names;
use attendance_core::{
    Attendance, AttendanceStatus, AttendanceStore, DateInput, DayRange, InMemoryStore,
    NewAttendance, Student,
};
use chrono::NaiveDate;
use common::{add, all_backends};
use uuid::Uuid;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn mark(store: &dyn AttendanceStore, student_id: Uuid, date: &str, status: AttendanceStatus) {
    store
        .create_attendance(&NewAttendance {
            student_id,
            date: DateInput::from(date).to_timestamp().unwrap(),
            status,
        })
        .unwrap();
}

#[test]
fn add_then_list_includes_new_student_in_name_order() {
    for (backend, store) in &all_backends().stores {
        let store = &**store;
        let carol = add(store, "carol", "R003");
        let alice = add(store, "Alice", "R001");
        let bob = add(store, "Bob", "R002");

        assert!(!alice.id.is_nil(), "{backend}");
        let listed = store.list_students().unwrap();
        let ids: Vec<_> = listed.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![alice.id, bob.id, carol.id], "{backend}");
        assert!(
            listed
                .windows(2)
                .all(|pair| compare_names(&pair[0].name, &pair[1].name).is_le()),
            "{backend}"
        );
    }
}

#[test]
fn duplicate_roll_numbers_are_accepted() {
    for (backend, store) in &all_backends().stores {
        let store = &**store;
        let first = add(store, "Alice", "R001");
        let second = add(store, "Alicia", "R001");
        assert_ne!(first.id, second.id, "{backend}");
        assert_eq!(store.list_students().unwrap().len(), 2, "{backend}");
    }
}

#[test]
fn repeated_list_calls_are_equal() {
    for (backend, store) in &all_backends().stores {
        let store = &**store;
        add(store, "Bob", "R002");
        add(store, "Alice", "R001");
        assert_eq!(
            store.list_students().unwrap(),
            store.list_students().unwrap(),
            "{backend}"
        );
    }
}

#[test]
fn delete_unknown_id_returns_false_and_changes_nothing() {
    for (backend, store) in &all_backends().stores {
        let store = &**store;
        add(store, "Alice", "R001");
        let before = store.list_students().unwrap();

        assert!(!store.delete_student(Uuid::new_v4()).unwrap(), "{backend}");
        assert_eq!(store.list_students().unwrap(), before, "{backend}");
    }
}

#[test]
fn delete_known_id_removes_exactly_that_student() {
    for (backend, store) in &all_backends().stores {
        let store = &**store;
        let alice = add(store, "Alice", "R001");
        let bob = add(store, "Bob", "R002");

        assert!(store.delete_student(alice.id).unwrap(), "{backend}");
        assert_eq!(store.list_students().unwrap(), vec![bob], "{backend}");
        assert!(store.get_student(alice.id).unwrap().is_none(), "{backend}");
        assert!(!store.delete_student(alice.id).unwrap(), "{backend}");
    }
}

#[test]
fn create_attendance_assigns_identity_and_keeps_date() {
    for (backend, store) in &all_backends().stores {
        let store = &**store;
        let alice = add(store, "Alice", "R001");
        let date = DateInput::from("2024-01-05T09:30:15.125+01:00")
            .to_timestamp()
            .unwrap();

        let record = store
            .create_attendance(&NewAttendance {
                student_id: alice.id,
                date,
                status: AttendanceStatus::Absent,
            })
            .unwrap();

        assert!(!record.id.is_nil(), "{backend}");
        assert_eq!(record.date, date, "{backend}");

        let range = DayRange::local(attendance_core::model::day::local_day_of(&date));
        let stored = store.attendance_for_student(alice.id, &range).unwrap();
        assert_eq!(stored, vec![record], "{backend}");
    }
}

#[test]
fn alice_present_bob_absent_yields_only_bob() {
    for (backend, store) in &all_backends().stores {
        let store = &**store;
        let alice = add(store, "Alice", "R001");
        let bob = add(store, "Bob", "R002");
        mark(store, bob.id, "2024-01-05", AttendanceStatus::Absent);
        mark(store, alice.id, "2024-01-05", AttendanceStatus::Present);

        let absentees = store.query_absentees(day(2024, 1, 5)).unwrap();
        assert_eq!(absentees.len(), 1, "{backend}");
        assert_eq!(absentees[0].student_id, bob.id, "{backend}");
        assert_eq!(absentees[0].student_name, "Bob", "{backend}");
        assert_eq!(absentees[0].roll_number, "R002", "{backend}");
        assert_eq!(absentees[0].status, AttendanceStatus::Absent, "{backend}");
    }
}

#[test]
fn absentee_window_is_inclusive_local_day() {
    for (backend, store) in &all_backends().stores {
        let store = &**store;
        let alice = add(store, "Alice", "R001");
        mark(store, alice.id, "2024-01-05T00:00:00", AttendanceStatus::Absent);
        mark(store, alice.id, "2024-01-05T23:59:59.999", AttendanceStatus::Absent);
        mark(store, alice.id, "2024-01-04T23:59:59.999", AttendanceStatus::Absent);
        mark(store, alice.id, "2024-01-06T00:00:00", AttendanceStatus::Absent);

        let absentees = store.query_absentees(day(2024, 1, 5)).unwrap();
        assert_eq!(absentees.len(), 2, "{backend}");
        assert!(absentees[0].date < absentees[1].date, "{backend}");
    }
}

#[test]
fn duplicate_daily_records_all_appear() {
    for (backend, store) in &all_backends().stores {
        let store = &**store;
        let alice = add(store, "Alice", "R001");
        mark(store, alice.id, "2024-01-05T08:00:00", AttendanceStatus::Absent);
        mark(store, alice.id, "2024-01-05T13:00:00", AttendanceStatus::Absent);
        mark(store, alice.id, "2024-01-05T15:00:00", AttendanceStatus::Present);

        assert_eq!(
            store.query_absentees(day(2024, 1, 5)).unwrap().len(),
            2,
            "{backend}"
        );
    }
}

#[test]
fn absentees_are_sorted_by_student_name() {
    for (backend, store) in &all_backends().stores {
        let store = &**store;
        let zed = add(store, "zed", "R026");
        let amy = add(store, "Amy", "R001");
        let bob = add(store, "bob", "R002");
        for id in [zed.id, bob.id, amy.id] {
            mark(store, id, "2024-01-05T10:00:00", AttendanceStatus::Absent);
        }

        let names: Vec<_> = store
            .query_absentees(day(2024, 1, 5))
            .unwrap()
            .into_iter()
            .map(|row| row.student_name)
            .collect();
        assert_eq!(names, vec!["Amy", "bob", "zed"], "{backend}");
    }
}

#[test]
fn deleting_a_student_cascades_and_drops_it_from_absentees() {
    for (backend, store) in &all_backends().stores {
        let store = &**store;
        let alice = add(store, "Alice", "R001");
        let bob = add(store, "Bob", "R002");
        mark(store, alice.id, "2024-01-05", AttendanceStatus::Absent);
        mark(store, bob.id, "2024-01-05", AttendanceStatus::Absent);

        assert!(store.delete_student(alice.id).unwrap(), "{backend}");

        let absentees = store.query_absentees(day(2024, 1, 5)).unwrap();
        assert_eq!(absentees.len(), 1, "{backend}");
        assert_eq!(absentees[0].student_id, bob.id, "{backend}");

        let range = DayRange::local(day(2024, 1, 5));
        assert!(
            store
                .attendance_for_student(alice.id, &range)
                .unwrap()
                .is_empty(),
            "{backend}"
        );
    }
}

#[test]
fn delete_attendance_reports_whether_a_record_was_removed() {
    for (backend, store) in &all_backends().stores {
        let store = &**store;
        let alice = add(store, "Alice", "R001");
        let record = store
            .create_attendance(&NewAttendance {
                student_id: alice.id,
                date: DateInput::from("2024-01-05").to_timestamp().unwrap(),
                status: AttendanceStatus::Absent,
            })
            .unwrap();

        assert!(store.delete_attendance(record.id).unwrap(), "{backend}");
        assert!(!store.delete_attendance(record.id).unwrap(), "{backend}");
        assert!(
            store.query_absentees(day(2024, 1, 5)).unwrap().is_empty(),
            "{backend}"
        );
    }
}

#[test]
fn empty_store_answers_with_empty_results() {
    for (backend, store) in &all_backends().stores {
        let store = &**store;
        assert!(store.list_students().unwrap().is_empty(), "{backend}");
        assert!(
            store.query_absentees(day(2024, 1, 5)).unwrap().is_empty(),
            "{backend}"
        );
        assert!(store.get_student(Uuid::new_v4()).unwrap().is_none(), "{backend}");
        store.flush().unwrap();
    }
}

#[test]
fn seeded_memory_store_drops_orphaned_absences() {
    let bob = Student {
        id: Uuid::new_v4(),
        name: "Bob".to_string(),
        roll_number: "R002".to_string(),
    };
    let absent_on = |student_id: Uuid| Attendance {
        id: Uuid::new_v4(),
        student_id,
        date: DateInput::from("2024-01-05T10:00:00").to_timestamp().unwrap(),
        status: AttendanceStatus::Absent,
    };
    let bob_absent = absent_on(bob.id);
    let orphan_absent = absent_on(Uuid::new_v4());

    let store = InMemoryStore::seeded(vec![bob], vec![bob_absent.clone(), orphan_absent]);
    assert_eq!(store.attendance_count(), 2);

    let absentees = store.query_absentees(day(2024, 1, 5)).unwrap();
    assert_eq!(absentees.len(), 1);
    assert_eq!(absentees[0].id, bob_absent.id);
    assert_eq!(absentees[0].student_name, "Bob");
    assert_eq!(absentees[0].roll_number, "R002");
}
