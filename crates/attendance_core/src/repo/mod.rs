//! Persistence adapter contract and its interchangeable backends.
//!
//! # Responsibility
//! - Define the single read/write contract every backend satisfies.
//! - Select and open the backend named by configuration.
//!
//! # Invariants
//! - Deleting a student removes that student's attendance in every backend.
//! - Absentee queries drop attendance whose student no longer exists.
//! - "Nothing found" is an empty result or `false`, never an error.
//! - Rosters are returned in `roster_order`; absentees in `absentee_order`.

use crate::config::{AttendanceConfig, StoreBackend};
use crate::db::DbError;
use crate::model::attendance::{Attendance, AttendanceId, AttendanceWithStudent, NewAttendance};
use crate::model::day::DayRange;
use crate::model::student::{NewStudent, Student, StudentId};
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod json_store;
pub mod memory_store;
pub mod sqlite_store;

pub use json_store::JsonFileStore;
pub use memory_store::InMemoryStore;
pub use sqlite_store::SqliteAttendanceStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend failure raised by a store, with the original detail kept.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Persisted state that cannot be decoded into the model.
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "malformed store file `{}`: {source}", path.display())
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is not migrated: expected schema version {expected_version}, found {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract shared by the SQLite, in-memory and JSON-file backends.
pub trait AttendanceStore {
    /// All students in roster order.
    fn list_students(&self) -> StoreResult<Vec<Student>>;

    fn get_student(&self, id: StudentId) -> StoreResult<Option<Student>>;

    /// Persists a candidate and returns it with a fresh identity.
    ///
    /// Roll numbers are not checked for uniqueness.
    fn create_student(&self, candidate: &NewStudent) -> StoreResult<Student>;

    /// Removes a student and cascades to its attendance.
    ///
    /// Returns `false` when no student had that id.
    fn delete_student(&self, id: StudentId) -> StoreResult<bool>;

    fn create_attendance(&self, candidate: &NewAttendance) -> StoreResult<Attendance>;

    /// One student's records whose date falls inside `range`.
    fn attendance_for_student(
        &self,
        student_id: StudentId,
        range: &DayRange,
    ) -> StoreResult<Vec<Attendance>>;

    fn delete_attendance(&self, id: AttendanceId) -> StoreResult<bool>;

    /// Absent records inside the local day window of `day`, joined to
    /// their students.
    fn query_absentees(&self, day: NaiveDate) -> StoreResult<Vec<AttendanceWithStudent>>;

    /// Writes any buffered state; called on teardown.
    fn flush(&self) -> StoreResult<()> {
        Ok(())
    }
}

impl<S: AttendanceStore + ?Sized> AttendanceStore for &S {
    fn list_students(&self) -> StoreResult<Vec<Student>> {
        (**self).list_students()
    }

    fn get_student(&self, id: StudentId) -> StoreResult<Option<Student>> {
        (**self).get_student(id)
    }

    fn create_student(&self, candidate: &NewStudent) -> StoreResult<Student> {
        (**self).create_student(candidate)
    }

    fn delete_student(&self, id: StudentId) -> StoreResult<bool> {
        (**self).delete_student(id)
    }

    fn create_attendance(&self, candidate: &NewAttendance) -> StoreResult<Attendance> {
        (**self).create_attendance(candidate)
    }

    fn attendance_for_student(
        &self,
        student_id: StudentId,
        range: &DayRange,
    ) -> StoreResult<Vec<Attendance>> {
        (**self).attendance_for_student(student_id, range)
    }

    fn delete_attendance(&self, id: AttendanceId) -> StoreResult<bool> {
        (**self).delete_attendance(id)
    }

    fn query_absentees(&self, day: NaiveDate) -> StoreResult<Vec<AttendanceWithStudent>> {
        (**self).query_absentees(day)
    }

    fn flush(&self) -> StoreResult<()> {
        (**self).flush()
    }
}

impl<S: AttendanceStore + ?Sized> AttendanceStore for Box<S> {
    fn list_students(&self) -> StoreResult<Vec<Student>> {
        (**self).list_students()
    }

    fn get_student(&self, id: StudentId) -> StoreResult<Option<Student>> {
        (**self).get_student(id)
    }

    fn create_student(&self, candidate: &NewStudent) -> StoreResult<Student> {
        (**self).create_student(candidate)
    }

    fn delete_student(&self, id: StudentId) -> StoreResult<bool> {
        (**self).delete_student(id)
    }

    fn create_attendance(&self, candidate: &NewAttendance) -> StoreResult<Attendance> {
        (**self).create_attendance(candidate)
    }

    fn attendance_for_student(
        &self,
        student_id: StudentId,
        range: &DayRange,
    ) -> StoreResult<Vec<Attendance>> {
        (**self).attendance_for_student(student_id, range)
    }

    fn delete_attendance(&self, id: AttendanceId) -> StoreResult<bool> {
        (**self).delete_attendance(id)
    }

    fn query_absentees(&self, day: NaiveDate) -> StoreResult<Vec<AttendanceWithStudent>> {
        (**self).query_absentees(day)
    }

    fn flush(&self) -> StoreResult<()> {
        (**self).flush()
    }
}

/// Opens the backend selected by `config`.
///
/// # Side effects
/// - Creates `config.data_dir` for the file-backed backends.
pub fn open_configured_store(config: &AttendanceConfig) -> StoreResult<Box<dyn AttendanceStore>> {
    info!(
        "event=store_open module=store status=start backend={}",
        config.backend.as_str()
    );

    let store: Box<dyn AttendanceStore> = match config.backend {
        StoreBackend::Memory => Box::new(InMemoryStore::new()),
        StoreBackend::Json => Box::new(JsonFileStore::open(&config.data_dir)?),
        StoreBackend::Sqlite => {
            std::fs::create_dir_all(&config.data_dir).map_err(|source| StoreError::Io {
                path: config.data_dir.clone(),
                source,
            })?;
            Box::new(SqliteAttendanceStore::open(config.sqlite_path())?)
        }
    };

    info!(
        "event=store_open module=store status=ok backend={}",
        config.backend.as_str()
    );
    Ok(store)
}
