//! Use-case API with uniform error translation.
//!
//! # Responsibility
//! - Own one explicitly constructed store and route each call through the
//!   roster or attendance service.
//! - Translate every failure into one fixed message per operation.
//!
//! # Invariants
//! - Successful results pass through unchanged.
//! - The original error is logged before it is discarded; `ApiError` never
//!   carries it.
//! - Nothing is retried.

use attendance_core::{
    open_configured_store, Attendance, AttendanceConfig, AttendanceService, AttendanceStore,
    AttendanceWithStudent, DailyAttendancePolicy, DateInput, MarkAttendanceRequest, NewStudent,
    ServiceError, ServiceErrorKind, ServiceResult, Student, StudentService,
};
use log::{debug, error};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ApiResult<T> = Result<T, ApiError>;

/// Operation a failure is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    FetchStudents,
    AddStudent,
    DeleteStudent,
    MarkAttendance,
    FetchAbsentees,
    OpenStore,
    FlushStore,
}

impl ApiOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FetchStudents => "fetch_students",
            Self::AddStudent => "add_student",
            Self::DeleteStudent => "delete_student",
            Self::MarkAttendance => "mark_attendance",
            Self::FetchAbsentees => "fetch_absentees",
            Self::OpenStore => "open_store",
            Self::FlushStore => "flush_store",
        }
    }

    /// Fixed caller-facing failure message.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::FetchStudents => "failed to fetch students",
            Self::AddStudent => "failed to add student",
            Self::DeleteStudent => "failed to delete student",
            Self::MarkAttendance => "failed to mark attendance",
            Self::FetchAbsentees => "failed to fetch absentees",
            Self::OpenStore => "failed to open attendance store",
            Self::FlushStore => "failed to flush attendance store",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    InvalidInput,
    Backend,
}

impl ApiErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Backend => "backend",
        }
    }
}

impl From<ServiceErrorKind> for ApiErrorKind {
    fn from(value: ServiceErrorKind) -> Self {
        match value {
            ServiceErrorKind::InvalidInput => Self::InvalidInput,
            ServiceErrorKind::Backend => Self::Backend,
        }
    }
}

/// Coarse failure returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError {
    pub operation: ApiOperation,
    pub kind: ApiErrorKind,
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.operation.failure_message())
    }
}

impl Error for ApiError {}

/// Facade over one store instance.
pub struct AttendanceApi<S: AttendanceStore> {
    store: S,
    policy: DailyAttendancePolicy,
}

impl AttendanceApi<Box<dyn AttendanceStore>> {
    /// Opens the configured backend and applies the configured daily policy.
    pub fn from_config(config: &AttendanceConfig) -> ApiResult<Self> {
        let started_at = Instant::now();
        let store = open_configured_store(config)
            .map_err(ServiceError::from)
            .map_err(|err| translate(ApiOperation::OpenStore, started_at, err))?;
        Ok(Self::new(store, config.daily_policy()))
    }
}

impl<S: AttendanceStore> AttendanceApi<S> {
    pub fn new(store: S, policy: DailyAttendancePolicy) -> Self {
        Self { store, policy }
    }

    /// Full roster sorted by name.
    pub fn get_students(&self) -> ApiResult<Vec<Student>> {
        self.call(ApiOperation::FetchStudents, || {
            self.students().list_students()
        })
    }

    /// Roster filtered by a name or roll-number fragment.
    pub fn search_students(&self, term: &str) -> ApiResult<Vec<Student>> {
        self.call(ApiOperation::FetchStudents, || {
            self.students().search_students(term)
        })
    }

    pub fn add_student(&self, candidate: &NewStudent) -> ApiResult<Student> {
        self.call(ApiOperation::AddStudent, || {
            self.students().add_student(candidate)
        })
    }

    /// `Ok(false)` when no student has `id`.
    pub fn delete_student(&self, id: &str) -> ApiResult<bool> {
        self.call(ApiOperation::DeleteStudent, || {
            self.students().delete_student(id)
        })
    }

    pub fn mark_attendance(&self, request: &MarkAttendanceRequest) -> ApiResult<Attendance> {
        self.call(ApiOperation::MarkAttendance, || {
            self.attendance().mark_attendance(request)
        })
    }

    pub fn get_absentees_by_date(
        &self,
        day: impl Into<DateInput>,
    ) -> ApiResult<Vec<AttendanceWithStudent>> {
        let day = day.into();
        self.call(ApiOperation::FetchAbsentees, || {
            self.attendance().absentees_on(day)
        })
    }

    /// Flushes the store and releases it.
    pub fn shutdown(self) -> ApiResult<()> {
        let started_at = Instant::now();
        self.store
            .flush()
            .map_err(|err| translate(ApiOperation::FlushStore, started_at, err.into()))
    }

    fn students(&self) -> StudentService<&S> {
        StudentService::new(&self.store)
    }

    fn attendance(&self) -> AttendanceService<&S> {
        AttendanceService::with_policy(&self.store, self.policy)
    }

    fn call<T>(
        &self,
        operation: ApiOperation,
        run: impl FnOnce() -> ServiceResult<T>,
    ) -> ApiResult<T> {
        let started_at = Instant::now();
        let result = run();
        match result {
            Ok(value) => {
                debug!(
                    "event=api_call module=api op={} status=ok duration_ms={}",
                    operation.as_str(),
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => Err(translate(operation, started_at, err)),
        }
    }
}

fn translate(operation: ApiOperation, started_at: Instant, err: ServiceError) -> ApiError {
    let kind = ApiErrorKind::from(err.kind());
    error!(
        "event=api_call module=api op={} status=error duration_ms={} error_kind={} error={}",
        operation.as_str(),
        started_at.elapsed().as_millis(),
        kind.as_str(),
        err
    );
    ApiError { operation, kind }
}
