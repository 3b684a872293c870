//! Roster use-case service.
//!
//! # Invariants
//! - Candidates are trimmed and validated before reaching the store.
//! - Identities are accepted as strings and rejected when malformed.

use crate::model::student::{NewStudent, Student};
use crate::repo::AttendanceStore;
use crate::service::{parse_id, ServiceResult};
use log::info;

pub struct StudentService<S: AttendanceStore> {
    store: S,
}

impl<S: AttendanceStore> StudentService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Full roster in name order.
    pub fn list_students(&self) -> ServiceResult<Vec<Student>> {
        Ok(self.store.list_students()?)
    }

    /// Roster filtered by a case-insensitive name or roll-number fragment.
    pub fn search_students(&self, term: &str) -> ServiceResult<Vec<Student>> {
        let mut students = self.store.list_students()?;
        students.retain(|student| student.matches_search(term));
        Ok(students)
    }

    pub fn get_student(&self, id: &str) -> ServiceResult<Option<Student>> {
        Ok(self.store.get_student(parse_id(id)?)?)
    }

    pub fn add_student(&self, candidate: &NewStudent) -> ServiceResult<Student> {
        let candidate = candidate.normalized()?;
        let student = self.store.create_student(&candidate)?;
        info!(
            "event=student_add module=service status=ok student_id={}",
            student.id
        );
        Ok(student)
    }

    /// Deletes a student and its attendance.
    ///
    /// Returns `false` for an unknown (but well-formed) id.
    pub fn delete_student(&self, id: &str) -> ServiceResult<bool> {
        let id = parse_id(id)?;
        let removed = self.store.delete_student(id)?;
        info!("event=student_delete module=service status=ok student_id={id} removed={removed}");
        Ok(removed)
    }
}
