//! Admin reports and CSV export over stored data.

use crate::report::{
    build_report, export_to_table, to_csv, ExportSink, Report, ReportError,
    DEFAULT_EXPORT_FILENAME,
};
use crate::repo::school_repo::{RepoError, SchoolRepository};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ReportResult<T> = Result<T, ReportServiceError>;

/// Failure while producing a report or export.
#[derive(Debug)]
pub enum ReportServiceError {
    Repo(RepoError),
    Report(ReportError),
    /// Export sink failed to take the payload.
    Delivery(std::io::Error),
}

impl Display for ReportServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Report(err) => write!(f, "{err}"),
            Self::Delivery(err) => write!(f, "failed to deliver export: {err}"),
        }
    }
}

impl Error for ReportServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Report(err) => Some(err),
            Self::Delivery(err) => Some(err),
        }
    }
}

impl From<RepoError> for ReportServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ReportError> for ReportServiceError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

/// Result of [`ReportService::export_csv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Nothing to export; no payload was delivered.
    NoData,
    Exported { filename: String, row_count: usize },
}

/// Report use cases.
pub struct ReportService<R: SchoolRepository> {
    repo: R,
}

impl<R: SchoolRepository> ReportService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Loads stages, students and attendance and aggregates them.
    pub fn summary(&self) -> ReportResult<Report> {
        let attendance = self.repo.attendance()?;
        if attendance.is_empty() {
            info!("event=report_built module=report status=no_data");
            return Ok(Report::NoData);
        }
        let stages = self.repo.stages()?;
        let students = self.repo.students()?;

        let report = build_report(&stages, &students, &attendance);
        info!(
            "event=report_built module=report status=ok records={} stages={}",
            attendance.len(),
            stages.len()
        );
        Ok(report)
    }

    /// Exports all attendance as CSV under [`DEFAULT_EXPORT_FILENAME`].
    pub fn export_csv(&self, sink: &mut dyn ExportSink) -> ReportResult<ExportOutcome> {
        self.export_csv_as(sink, DEFAULT_EXPORT_FILENAME)
    }

    /// Exports all attendance as CSV under a caller-chosen filename.
    ///
    /// # Errors
    /// - `Report(MissingStage)` when a record's stage was deleted; nothing is
    ///   delivered in that case.
    pub fn export_csv_as(
        &self,
        sink: &mut dyn ExportSink,
        filename: &str,
    ) -> ReportResult<ExportOutcome> {
        let attendance = self.repo.attendance()?;
        if attendance.is_empty() {
            info!("event=export module=report status=no_data");
            return Ok(ExportOutcome::NoData);
        }
        let students = self.repo.students()?;
        let stages = self.repo.stages()?;

        let rows = export_to_table(&attendance, &students, &stages).map_err(|err| {
            error!("event=export module=report status=error error_code=missing_reference error={err}");
            err
        })?;
        let payload = to_csv(&rows);
        if let Err(err) = sink.deliver(filename, &payload) {
            error!("event=export module=report status=error error_code=delivery_failed error={err}");
            return Err(ReportServiceError::Delivery(err));
        }

        info!(
            "event=export module=report status=ok rows={} bytes={}",
            rows.len(),
            payload.len()
        );
        Ok(ExportOutcome::Exported {
            filename: filename.to_string(),
            row_count: rows.len(),
        })
    }
}
