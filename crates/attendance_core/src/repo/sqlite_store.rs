//! SQLite-backed roster and attendance store.
//!
//! # Responsibility
//! - Keep SQL details inside the persistence boundary.
//! - Compute absentees with an inner join over an indexed day window.
//!
//! # Invariants
//! - The connection must be fully migrated; `try_new` rejects others.
//! - Attendance rows cascade away with their student (`ON DELETE CASCADE`).
//! - Read paths reject undecodable rows instead of masking them.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory};
use crate::model::attendance::{
    sort_absentees, Attendance, AttendanceId, AttendanceStatus, AttendanceWithStudent,
    NewAttendance,
};
use crate::model::day::DayRange;
use crate::model::student::{sort_roster, NewStudent, Student, StudentId};
use crate::repo::{AttendanceStore, StoreError, StoreResult};
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use uuid::Uuid;

const STUDENT_SELECT_SQL: &str = "SELECT id, name, roll_number FROM students";

const ATTENDANCE_SELECT_SQL: &str = "SELECT id, student_id, recorded_at, status FROM attendance";

const ABSENTEE_SELECT_SQL: &str = "SELECT
    a.id AS id,
    a.student_id AS student_id,
    a.recorded_at AS recorded_at,
    a.status AS status,
    s.name AS name,
    s.roll_number AS roll_number
FROM attendance a
INNER JOIN students s ON s.id = a.student_id
WHERE a.status = ?1
  AND a.recorded_at_ms BETWEEN ?2 AND ?3";

pub struct SqliteAttendanceStore {
    conn: Connection,
}

impl SqliteAttendanceStore {
    /// Wraps a connection that has already been opened through `crate::db`.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl AttendanceStore for SqliteAttendanceStore {
    fn list_students(&self) -> StoreResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(STUDENT_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        // Sorted in Rust so every backend shares one collation.
        sort_roster(&mut students);
        Ok(students)
    }

    fn get_student(&self, id: StudentId) -> StoreResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_student_row(row)?)),
            None => Ok(None),
        }
    }

    fn create_student(&self, candidate: &NewStudent) -> StoreResult<Student> {
        let student = Student::from_candidate(Uuid::new_v4(), candidate);
        self.conn.execute(
            "INSERT INTO students (id, name, roll_number) VALUES (?1, ?2, ?3);",
            params![
                student.id.to_string(),
                student.name.as_str(),
                student.roll_number.as_str(),
            ],
        )?;
        Ok(student)
    }

    fn delete_student(&self, id: StudentId) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", [id.to_string()])?;
        Ok(changed == 1)
    }

    fn create_attendance(&self, candidate: &NewAttendance) -> StoreResult<Attendance> {
        let record = Attendance::from_candidate(Uuid::new_v4(), candidate);
        self.conn.execute(
            "INSERT INTO attendance (id, student_id, recorded_at, recorded_at_ms, status)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                record.id.to_string(),
                record.student_id.to_string(),
                record.date.to_rfc3339_opts(SecondsFormat::AutoSi, false),
                record.date.timestamp_millis(),
                status_to_db(record.status),
            ],
        )?;
        Ok(record)
    }

    fn attendance_for_student(
        &self,
        student_id: StudentId,
        range: &DayRange,
    ) -> StoreResult<Vec<Attendance>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ATTENDANCE_SELECT_SQL}
             WHERE student_id = ?1
               AND recorded_at_ms BETWEEN ?2 AND ?3
             ORDER BY recorded_at_ms ASC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![
            student_id.to_string(),
            range.start_millis(),
            range.end_millis(),
        ])?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_attendance_row(row)?);
        }
        Ok(records)
    }

    fn delete_attendance(&self, id: AttendanceId) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM attendance WHERE id = ?1;", [id.to_string()])?;
        Ok(changed == 1)
    }

    fn query_absentees(&self, day: NaiveDate) -> StoreResult<Vec<AttendanceWithStudent>> {
        let range = DayRange::local(day);
        let mut stmt = self.conn.prepare(ABSENTEE_SELECT_SQL)?;
        let mut rows = stmt.query(params![
            status_to_db(AttendanceStatus::Absent),
            range.start_millis(),
            range.end_millis(),
        ])?;

        let mut absentees = Vec::new();
        while let Some(row) = rows.next()? {
            let record = parse_attendance_row(row)?;
            absentees.push(AttendanceWithStudent {
                id: record.id,
                student_id: record.student_id,
                date: record.date,
                status: record.status,
                student_name: row.get("name")?,
                roll_number: row.get("roll_number")?,
            });
        }

        sort_absentees(&mut absentees);
        Ok(absentees)
    }
}

fn parse_student_row(row: &Row<'_>) -> StoreResult<Student> {
    let id_text: String = row.get("id")?;
    Ok(Student {
        id: parse_uuid(&id_text, "students.id")?,
        name: row.get("name")?,
        roll_number: row.get("roll_number")?,
    })
}

fn parse_attendance_row(row: &Row<'_>) -> StoreResult<Attendance> {
    let id_text: String = row.get("id")?;
    let student_text: String = row.get("student_id")?;
    let date_text: String = row.get("recorded_at")?;
    let status_text: String = row.get("status")?;

    let status = parse_status(&status_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid status `{status_text}` in attendance.status"
        ))
    })?;

    Ok(Attendance {
        id: parse_uuid(&id_text, "attendance.id")?,
        student_id: parse_uuid(&student_text, "attendance.student_id")?,
        date: parse_timestamp(&date_text)?,
        status,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn parse_timestamp(value: &str) -> StoreResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid timestamp `{value}` in attendance.recorded_at"
        ))
    })
}

fn status_to_db(status: AttendanceStatus) -> &'static str {
    match status {
        AttendanceStatus::Present => "present",
        AttendanceStatus::Absent => "absent",
    }
}

fn parse_status(value: &str) -> Option<AttendanceStatus> {
    match value {
        "present" => Some(AttendanceStatus::Present),
        "absent" => Some(AttendanceStatus::Absent),
        _ => None,
    }
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["students", "attendance"] {
        if !table_exists(conn, table)? {
            return Err(StoreError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let found = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(found.is_some())
}
