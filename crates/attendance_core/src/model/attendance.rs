//! Attendance records and the absentee projection.
//!
//! # Responsibility
//! - Define persisted attendance and its identity-less candidate.
//! - Define the read-only join of attendance with student identity.
//!
//! # Invariants
//! - `status` is exactly `Present` or `Absent`.
//! - `date` keeps the caller's offset and precision; midnight is only the
//!   comparison boundary, never an assumed stored value.
//! - Duplicate records for one student and day are legal under the
//!   default append policy.

use crate::model::student::{compare_names, Student, StudentId};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier assigned by the store when attendance is recorded.
pub type AttendanceId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
        }
    }
}

impl Display for AttendanceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            other => Err(format!(
                "unsupported attendance status `{other}`; expected present|absent"
            )),
        }
    }
}

/// Attendance record as persisted by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: AttendanceId,
    /// Lookup key into the roster.
    pub student_id: StudentId,
    pub date: DateTime<FixedOffset>,
    pub status: AttendanceStatus,
}

/// Normalized attendance candidate handed to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendance {
    pub student_id: StudentId,
    pub date: DateTime<FixedOffset>,
    pub status: AttendanceStatus,
}

impl Attendance {
    pub fn from_candidate(id: AttendanceId, candidate: &NewAttendance) -> Self {
        Self {
            id,
            student_id: candidate.student_id,
            date: candidate.date,
            status: candidate.status,
        }
    }
}

/// Attendance enriched with the referenced student's identity at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceWithStudent {
    pub id: AttendanceId,
    pub student_id: StudentId,
    pub date: DateTime<FixedOffset>,
    pub status: AttendanceStatus,
    pub student_name: String,
    pub roll_number: String,
}

impl AttendanceWithStudent {
    pub fn join(record: &Attendance, student: &Student) -> Self {
        Self {
            id: record.id,
            student_id: record.student_id,
            date: record.date,
            status: record.status,
            student_name: student.name.clone(),
            roll_number: student.roll_number.clone(),
        }
    }
}

/// Absentee order: student name, then date, then attendance id.
pub fn absentee_order(left: &AttendanceWithStudent, right: &AttendanceWithStudent) -> Ordering {
    compare_names(&left.student_name, &right.student_name)
        .then_with(|| left.date.cmp(&right.date))
        .then_with(|| left.id.cmp(&right.id))
}

pub fn sort_absentees(rows: &mut [AttendanceWithStudent]) {
    rows.sort_by(absentee_order);
}
