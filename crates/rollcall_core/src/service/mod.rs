//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate whole-collection read-modify-write cycles for admin,
//!   instructor and student use cases.
//! - Keep callers decoupled from storage details via `SchoolRepository`.
//!
//! # Invariants
//! - A failed operation never leaves a partial write behind.
//! - Logs carry ids and counts only, never names or credentials.

pub mod attendance_service;
pub mod auth_service;
pub mod instructor_service;
pub mod report_service;
pub mod schedule_service;
pub mod seed;
pub mod stage_service;
pub mod student_service;

use crate::model::attendance::AttendanceValidationError;
use crate::model::EntityId;
use crate::repo::school_repo::RepoError;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error shared by the CRUD use cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Required input was blank or malformed. Carries the field name.
    InvalidInput(&'static str),
    /// Referenced entity does not exist.
    NotFound { entity: &'static str, id: EntityId },
    /// No lecture with this subject on the given stage/day.
    LectureNotFound {
        stage_id: EntityId,
        day: String,
        subject: String,
    },
    /// Subject already scheduled on that stage/day.
    DuplicateLecture { day: String, subject: String },
    /// Day is not part of the configured working days.
    NotAWorkingDay(String),
    /// Date is a configured holiday.
    Holiday(NaiveDate),
    /// Username already taken by another account.
    DuplicateUsername(String),
    /// Stage has no enrolled students to take attendance for.
    EmptyRoster(EntityId),
    /// Unknown username or wrong password.
    InvalidCredentials,
    /// Attendance partition is inconsistent with the roster.
    InvalidAttendance(AttendanceValidationError),
    /// Password hashing backend failed.
    PasswordHash(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(field) => write!(f, "invalid input: `{field}` is required"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::LectureNotFound {
                stage_id,
                day,
                subject,
            } => write!(
                f,
                "lecture `{subject}` not found on {day} for stage {stage_id}"
            ),
            Self::DuplicateLecture { day, subject } => {
                write!(f, "lecture `{subject}` already scheduled on {day}")
            }
            Self::NotAWorkingDay(day) => write!(f, "`{day}` is not a working day"),
            Self::Holiday(date) => write!(f, "{date} is a holiday"),
            Self::DuplicateUsername(username) => {
                write!(f, "username `{username}` is already taken")
            }
            Self::EmptyRoster(stage_id) => {
                write!(f, "stage {stage_id} has no enrolled students")
            }
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::InvalidAttendance(err) => write!(f, "invalid attendance: {err}"),
            Self::PasswordHash(message) => write!(f, "password hashing failed: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidAttendance(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<AttendanceValidationError> for ServiceError {
    fn from(value: AttendanceValidationError) -> Self {
        Self::InvalidAttendance(value)
    }
}

/// Normalizes a required label, failing with `InvalidInput(field)` when blank.
pub(crate) fn required_label(value: &str, field: &'static str) -> ServiceResult<String> {
    crate::model::normalize_label(value).ok_or(ServiceError::InvalidInput(field))
}
