//! Persisted local store backed by two JSON documents.
//!
//! # Responsibility
//! - Load the roster and attendance collections from a data directory,
//!   seeding empty ones when absent.
//! - Write every mutation through to disk.
//!
//! # Invariants
//! - A mutation is committed in memory only after both files are written.
//! - Each file is replaced via temp-file rename, but the two files are not
//!   updated atomically together.
//! - Attendance dates are stored as RFC 3339 strings and re-hydrated on load.
//!
//! # Storage layout
//!
//! ```text
//! <data_dir>/
//! ├── students.json     # [{ "id", "name", "rollNumber" }]
//! └── attendance.json   # [{ "id", "studentId", "date", "status" }]
//! ```

use crate::model::attendance::{Attendance, AttendanceId, AttendanceWithStudent, NewAttendance};
use crate::model::day::DayRange;
use crate::model::student::{NewStudent, Student, StudentId};
use crate::repo::memory_store::StoreState;
use crate::repo::{AttendanceStore, StoreError, StoreResult};
use chrono::NaiveDate;
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

pub const STUDENTS_FILE_NAME: &str = "students.json";
pub const ATTENDANCE_FILE_NAME: &str = "attendance.json";

pub struct JsonFileStore {
    dir: PathBuf,
    state: RefCell<StoreState>,
}

impl JsonFileStore {
    /// Loads both collections from `dir`, creating the directory and empty
    /// collections when they do not exist yet.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        let students: Option<Vec<Student>> = read_collection(&dir.join(STUDENTS_FILE_NAME))?;
        let attendance: Option<Vec<Attendance>> =
            read_collection(&dir.join(ATTENDANCE_FILE_NAME))?;
        let seeded = students.is_none() || attendance.is_none();

        let store = Self {
            state: RefCell::new(StoreState {
                students: students.unwrap_or_default(),
                attendance: attendance.unwrap_or_default(),
            }),
            dir,
        };

        if seeded {
            store.flush()?;
        }

        let state = store.state.borrow();
        info!(
            "event=json_store_open module=store status=ok seeded={} students={} attendance={}",
            seeded,
            state.students.len(),
            state.attendance.len()
        );
        drop(state);

        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    /// Applies `change` to a copy of the state, persists it, then commits.
    fn mutate<T>(&self, change: impl FnOnce(&mut StoreState) -> T) -> StoreResult<T> {
        let mut next = self.state.borrow().clone();
        let output = change(&mut next);
        self.persist(&next)?;
        *self.state.borrow_mut() = next;
        Ok(output)
    }

    fn persist(&self, state: &StoreState) -> StoreResult<()> {
        write_collection(&self.dir.join(STUDENTS_FILE_NAME), &state.students)?;
        write_collection(&self.dir.join(ATTENDANCE_FILE_NAME), &state.attendance)
    }
}

impl AttendanceStore for JsonFileStore {
    fn list_students(&self) -> StoreResult<Vec<Student>> {
        Ok(self.state.borrow().sorted_students())
    }

    fn get_student(&self, id: StudentId) -> StoreResult<Option<Student>> {
        Ok(self.state.borrow().find_student(id))
    }

    fn create_student(&self, candidate: &NewStudent) -> StoreResult<Student> {
        self.mutate(|state| state.insert_student(candidate))
    }

    fn delete_student(&self, id: StudentId) -> StoreResult<bool> {
        if self.state.borrow().find_student(id).is_none() {
            return Ok(false);
        }
        self.mutate(|state| state.remove_student(id))
    }

    fn create_attendance(&self, candidate: &NewAttendance) -> StoreResult<Attendance> {
        self.mutate(|state| state.insert_attendance(candidate))
    }

    fn attendance_for_student(
        &self,
        student_id: StudentId,
        range: &DayRange,
    ) -> StoreResult<Vec<Attendance>> {
        Ok(self.state.borrow().student_attendance(student_id, range))
    }

    fn delete_attendance(&self, id: AttendanceId) -> StoreResult<bool> {
        self.mutate(|state| state.remove_attendance(id))
    }

    fn query_absentees(&self, day: NaiveDate) -> StoreResult<Vec<AttendanceWithStudent>> {
        Ok(self.state.borrow().absentees(day))
    }

    fn flush(&self) -> StoreResult<()> {
        self.persist(&self.state.borrow())
    }
}

fn read_collection<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<Vec<T>>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> StoreResult<()> {
    let json = serde_json::to_string_pretty(items).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json)
        .and_then(|()| std::fs::rename(&tmp_path, path))
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
}
