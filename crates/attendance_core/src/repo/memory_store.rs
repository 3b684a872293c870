//! In-memory store and the collection logic shared with the JSON store.
//!
//! # Responsibility
//! - Hold students and attendance as plain collections.
//! - Implement ordering, cascade delete and the absentee join over them.
//!
//! # Invariants
//! - Collection order is insertion order; callers only see sorted views.
//! - Orphaned attendance is skipped by the join, never sentinel-filled.

use crate::model::attendance::{
    sort_absentees, Attendance, AttendanceId, AttendanceStatus, AttendanceWithStudent,
    NewAttendance,
};
use crate::model::day::DayRange;
use crate::model::student::{sort_roster, NewStudent, Student, StudentId};
use crate::repo::{AttendanceStore, StoreResult};
use chrono::NaiveDate;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use uuid::Uuid;

/// Raw roster and attendance collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StoreState {
    pub(crate) students: Vec<Student>,
    pub(crate) attendance: Vec<Attendance>,
}

impl StoreState {
    pub(crate) fn sorted_students(&self) -> Vec<Student> {
        let mut students = self.students.clone();
        sort_roster(&mut students);
        students
    }

    pub(crate) fn find_student(&self, id: StudentId) -> Option<Student> {
        self.students.iter().find(|student| student.id == id).cloned()
    }

    pub(crate) fn insert_student(&mut self, candidate: &NewStudent) -> Student {
        let student = Student::from_candidate(Uuid::new_v4(), candidate);
        self.students.push(student.clone());
        student
    }

    pub(crate) fn remove_student(&mut self, id: StudentId) -> bool {
        let before = self.students.len();
        self.students.retain(|student| student.id != id);
        if self.students.len() == before {
            return false;
        }
        self.attendance.retain(|record| record.student_id != id);
        true
    }

    pub(crate) fn insert_attendance(&mut self, candidate: &NewAttendance) -> Attendance {
        let record = Attendance::from_candidate(Uuid::new_v4(), candidate);
        self.attendance.push(record.clone());
        record
    }

    pub(crate) fn student_attendance(
        &self,
        student_id: StudentId,
        range: &DayRange,
    ) -> Vec<Attendance> {
        self.attendance
            .iter()
            .filter(|record| record.student_id == student_id && range.contains(&record.date))
            .cloned()
            .collect()
    }

    pub(crate) fn remove_attendance(&mut self, id: AttendanceId) -> bool {
        let before = self.attendance.len();
        self.attendance.retain(|record| record.id != id);
        self.attendance.len() != before
    }

    pub(crate) fn absentees(&self, day: NaiveDate) -> Vec<AttendanceWithStudent> {
        let range = DayRange::local(day);
        let roster: HashMap<StudentId, &Student> = self
            .students
            .iter()
            .map(|student| (student.id, student))
            .collect();

        let mut rows = Vec::new();
        for record in self
            .attendance
            .iter()
            .filter(|record| record.status == AttendanceStatus::Absent)
            .filter(|record| range.contains(&record.date))
        {
            match roster.get(&record.student_id) {
                Some(student) => rows.push(AttendanceWithStudent::join(record, student)),
                None => debug!(
                    "event=absentee_join module=store status=skip reason=orphan attendance_id={} student_id={}",
                    record.id, record.student_id
                ),
            }
        }

        sort_absentees(&mut rows);
        rows
    }
}

/// Process-local store; contents vanish with the instance.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RefCell<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with existing records.
    ///
    /// Attendance referencing unknown students is kept as-is and ignored by
    /// absentee queries.
    pub fn seeded(students: Vec<Student>, attendance: Vec<Attendance>) -> Self {
        Self {
            state: RefCell::new(StoreState {
                students,
                attendance,
            }),
        }
    }

    pub fn attendance_count(&self) -> usize {
        self.state.borrow().attendance.len()
    }
}

impl AttendanceStore for InMemoryStore {
    fn list_students(&self) -> StoreResult<Vec<Student>> {
        Ok(self.state.borrow().sorted_students())
    }

    fn get_student(&self, id: StudentId) -> StoreResult<Option<Student>> {
        Ok(self.state.borrow().find_student(id))
    }

    fn create_student(&self, candidate: &NewStudent) -> StoreResult<Student> {
        Ok(self.state.borrow_mut().insert_student(candidate))
    }

    fn delete_student(&self, id: StudentId) -> StoreResult<bool> {
        Ok(self.state.borrow_mut().remove_student(id))
    }

    fn create_attendance(&self, candidate: &NewAttendance) -> StoreResult<Attendance> {
        Ok(self.state.borrow_mut().insert_attendance(candidate))
    }

    fn attendance_for_student(
        &self,
        student_id: StudentId,
        range: &DayRange,
    ) -> StoreResult<Vec<Attendance>> {
        Ok(self.state.borrow().student_attendance(student_id, range))
    }

    fn delete_attendance(&self, id: AttendanceId) -> StoreResult<bool> {
        Ok(self.state.borrow_mut().remove_attendance(id))
    }

    fn query_absentees(&self, day: NaiveDate) -> StoreResult<Vec<AttendanceWithStudent>> {
        Ok(self.state.borrow().absentees(day))
    }
}
