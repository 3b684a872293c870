//! Core domain logic for the attendance tracker.
//!
//! Layering, leaf first: `model` → `repo` (adapter contract and backends,
//! with `db` bootstrapping SQLite) → `service`. The facade crate sits on top
//! and is the only intended caller of the services.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AttendanceConfig, StoreBackend};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::attendance::{
    Attendance, AttendanceId, AttendanceStatus, AttendanceWithStudent, NewAttendance,
};
pub use model::day::{DateInput, DateParseError, DayRange};
pub use model::student::{NewStudent, Student, StudentId, StudentValidationError};
pub use repo::{
    open_configured_store, AttendanceStore, InMemoryStore, JsonFileStore, SqliteAttendanceStore,
    StoreError, StoreResult,
};
pub use service::attendance_service::{
    AttendanceService, DailyAttendancePolicy, MarkAttendanceRequest,
};
pub use service::student_service::StudentService;
pub use service::{ServiceError, ServiceErrorKind, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
