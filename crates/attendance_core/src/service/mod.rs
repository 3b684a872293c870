//! Roster and attendance use-case services.
//!
//! # Responsibility
//! - Present a storage-agnostic contract to the facade.
//! - Coerce caller input (string ids, loosely typed dates) into the model.
//!
//! # Invariants
//! - Services never bypass the store contract.
//! - Store failures pass through unchanged inside `ServiceError::Store`.

use crate::model::day::DateParseError;
use crate::model::student::{StudentId, StudentValidationError};
use crate::repo::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod attendance_service;
pub mod student_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Coarse classification used when errors cross the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// The caller supplied something unusable.
    InvalidInput,
    /// The backing store failed.
    Backend,
}

#[derive(Debug)]
pub enum ServiceError {
    InvalidId(String),
    InvalidDate(DateParseError),
    InvalidStudent(StudentValidationError),
    /// Attendance referenced a student that is not on the roster.
    StudentNotFound(StudentId),
    Store(StoreError),
}

impl ServiceError {
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            Self::InvalidId(_)
            | Self::InvalidDate(_)
            | Self::InvalidStudent(_)
            | Self::StudentNotFound(_) => ServiceErrorKind::InvalidInput,
            Self::Store(_) => ServiceErrorKind::Backend,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(value) => write!(f, "invalid identity `{value}`"),
            Self::InvalidDate(err) => write!(f, "{err}"),
            Self::InvalidStudent(err) => write!(f, "{err}"),
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDate(err) => Some(err),
            Self::InvalidStudent(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::InvalidId(_) | Self::StudentNotFound(_) => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<DateParseError> for ServiceError {
    fn from(value: DateParseError) -> Self {
        Self::InvalidDate(value)
    }
}

impl From<StudentValidationError> for ServiceError {
    fn from(value: StudentValidationError) -> Self {
        Self::InvalidStudent(value)
    }
}

/// Parses a caller-supplied identity string.
pub(crate) fn parse_id(value: &str) -> ServiceResult<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| ServiceError::InvalidId(value.to_string()))
}
