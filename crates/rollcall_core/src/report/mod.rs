//! Attendance aggregation and tabular export.
//!
//! # Responsibility
//! - Compute per-stage attendance percentages and most-absent subject/day.
//! - Flatten attendance records into export rows and CSV text.
//!
//! # Invariants
//! - Everything here is a pure function of its inputs; nothing is persisted.
//! - Output order follows input order (stages, records, student id lists).

pub mod aggregator;
pub mod export;

pub use aggregator::{
    build_report, compute_stage_percentages, most_absent_day, most_absent_subject, Report,
    ReportSummary, StagePercentage, NO_DATA,
};
pub use export::{
    export_to_table, to_csv, AttendanceStatus, ExportRow, ExportSink, FileExportSink, ReportError,
    CSV_HEADER, DEFAULT_EXPORT_FILENAME,
};
