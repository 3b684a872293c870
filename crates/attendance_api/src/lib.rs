//! Caller-facing facade over the attendance services.
//!
//! Every operation returns a coarse [`ApiError`] on failure; the detailed
//! cause is logged and never handed to the caller.

mod api;

pub use api::{ApiError, ApiErrorKind, ApiOperation, ApiResult, AttendanceApi};
pub use attendance_core::{
    Attendance, AttendanceConfig, AttendanceStatus, AttendanceWithStudent, DailyAttendancePolicy,
    DateInput, MarkAttendanceRequest, NewStudent, Student, StoreBackend,
};
