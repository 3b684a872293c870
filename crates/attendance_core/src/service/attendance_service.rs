//! Attendance use-case service.
//!
//! # Responsibility
//! - Normalize mark requests (string id, loosely typed date) before storage.
//! - Apply the configured one-per-day policy.
//! - Reduce absentee query input to a local calendar day.
//!
//! # Invariants
//! - Attendance is only recorded for students on the roster.
//! - Under `ReplaceExisting`, removing the old records and inserting the
//!   new one are separate store calls, not one atomic step.

use crate::model::attendance::{
    Attendance, AttendanceStatus, AttendanceWithStudent, NewAttendance,
};
use crate::model::day::{local_day_of, DateInput, DayRange};
use crate::repo::AttendanceStore;
use crate::service::{parse_id, ServiceError, ServiceResult};
use log::info;

/// What marking attendance does when the student already has a record
/// for the same local day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DailyAttendancePolicy {
    /// Keep every record; duplicates all show up in queries.
    #[default]
    Append,
    /// Remove the student's earlier records for that day first.
    ReplaceExisting,
}

/// Caller input for marking attendance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkAttendanceRequest {
    pub student_id: String,
    pub date: DateInput,
    pub status: AttendanceStatus,
}

impl MarkAttendanceRequest {
    pub fn new(
        student_id: impl Into<String>,
        date: impl Into<DateInput>,
        status: AttendanceStatus,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            date: date.into(),
            status,
        }
    }
}

pub struct AttendanceService<S: AttendanceStore> {
    store: S,
    policy: DailyAttendancePolicy,
}

impl<S: AttendanceStore> AttendanceService<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, DailyAttendancePolicy::default())
    }

    pub fn with_policy(store: S, policy: DailyAttendancePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> DailyAttendancePolicy {
        self.policy
    }

    pub fn mark_attendance(&self, request: &MarkAttendanceRequest) -> ServiceResult<Attendance> {
        let student_id = parse_id(&request.student_id)?;
        let date = request.date.to_timestamp()?;

        if self.store.get_student(student_id)?.is_none() {
            return Err(ServiceError::StudentNotFound(student_id));
        }

        if self.policy == DailyAttendancePolicy::ReplaceExisting {
            let range = DayRange::local(local_day_of(&date));
            for existing in self.store.attendance_for_student(student_id, &range)? {
                self.store.delete_attendance(existing.id)?;
            }
        }

        let record = self.store.create_attendance(&NewAttendance {
            student_id,
            date,
            status: request.status,
        })?;
        info!(
            "event=attendance_mark module=service status=ok attendance_id={} student_id={} state={}",
            record.id, record.student_id, record.status
        );
        Ok(record)
    }

    /// Absent students for the local day `day` falls on.
    pub fn absentees_on(
        &self,
        day: impl Into<DateInput>,
    ) -> ServiceResult<Vec<AttendanceWithStudent>> {
        let day = day.into().to_local_day()?;
        Ok(self.store.query_absentees(day)?)
    }
}
