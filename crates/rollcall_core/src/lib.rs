//! Core domain logic for Rollcall, a local school schedule and attendance
//! tracker.
//! This crate owns every business rule; front ends only call into it.

pub mod db;
pub mod logging;
pub mod model;
pub mod report;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attendance::{AttendanceKey, AttendanceRecord, AttendanceValidationError};
pub use model::schedule::{DaySchedule, Lecture, SchoolConfig};
pub use model::school::{Instructor, Role, Session, Stage, Student, UserAccount};
pub use model::EntityId;
pub use report::{
    build_report, compute_stage_percentages, export_to_table, most_absent_day,
    most_absent_subject, to_csv, AttendanceStatus, ExportRow, ExportSink, FileExportSink, Report,
    ReportError, ReportSummary, StagePercentage,
};
pub use repo::school_repo::{KvSchoolRepository, RepoError, RepoResult, SchoolRepository};
pub use service::{ServiceError, ServiceResult};
pub use store::kv_store::{KeyValueStore, SqliteKvStore, StoreError, StoreKey};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
