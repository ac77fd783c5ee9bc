//! Flat attendance export (rows + CSV) and file delivery.
//!
//! # Invariants
//! - Each record yields its present rows first, then its absent rows, each
//!   in stored id order.
//! - A record pointing at an unknown stage fails the export.
//! - Ids without a matching student are skipped.
//! - CSV fields containing `,` `"` CR or LF are quoted, inner quotes doubled.

use crate::model::attendance::AttendanceRecord;
use crate::model::school::{find_stage, find_student, Stage, Student};
use crate::model::EntityId;
use chrono::NaiveDate;
use std::borrow::Cow;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Filename suggested to the download collaborator.
pub const DEFAULT_EXPORT_FILENAME: &str = "attendance_report.csv";

/// Fixed CSV header row.
pub const CSV_HEADER: [&str; 5] = ["date", "stage", "subject", "student_name", "status"];

/// Errors raised while flattening attendance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// A record references a stage that no longer exists.
    MissingStage {
        record_id: EntityId,
        stage_id: EntityId,
    },
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingStage {
                record_id,
                stage_id,
            } => write!(
                f,
                "attendance record {record_id} references missing stage {stage_id}"
            ),
        }
    }
}

impl Error for ReportError {}

/// Attendance state of one student in one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

/// One student line of the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub date: NaiveDate,
    pub stage_name: String,
    pub subject: String,
    pub student_name: String,
    pub status: AttendanceStatus,
}

/// Flattens attendance into one row per student per record.
///
/// # Errors
/// - `ReportError::MissingStage` for the first record whose stage is gone.
pub fn export_to_table(
    attendance: &[AttendanceRecord],
    students: &[Student],
    stages: &[Stage],
) -> Result<Vec<ExportRow>, ReportError> {
    let mut rows = Vec::new();
    for record in attendance {
        let stage = find_stage(stages, record.stage_id).ok_or(ReportError::MissingStage {
            record_id: record.id,
            stage_id: record.stage_id,
        })?;

        let present = record
            .present_student_ids
            .iter()
            .map(|id| (*id, AttendanceStatus::Present));
        let absent = record
            .absent_student_ids
            .iter()
            .map(|id| (*id, AttendanceStatus::Absent));

        for (student_id, status) in present.chain(absent) {
            let Some(student) = find_student(students, student_id) else {
                continue;
            };
            rows.push(ExportRow {
                date: record.date,
                stage_name: stage.name.clone(),
                subject: record.subject.clone(),
                student_name: student.name.clone(),
                status,
            });
        }
    }
    Ok(rows)
}

/// Serializes rows as CSV text with the [`CSV_HEADER`] line first.
pub fn to_csv(rows: &[ExportRow]) -> String {
    let mut out = String::new();
    push_line(&mut out, CSV_HEADER);
    for row in rows {
        let date = row.date.format("%Y-%m-%d").to_string();
        push_line(
            &mut out,
            [
                date.as_str(),
                row.stage_name.as_str(),
                row.subject.as_str(),
                row.student_name.as_str(),
                row.status.as_str(),
            ],
        );
    }
    out
}

fn push_line<const N: usize>(out: &mut String, fields: [&str; N]) {
    for (position, field) in fields.iter().enumerate() {
        if position > 0 {
            out.push(',');
        }
        out.push_str(&csv_field(field));
    }
    out.push('\n');
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Receives a finished export payload, e.g. to save it as a file.
pub trait ExportSink {
    /// Delivers `payload` under the suggested `filename`.
    fn deliver(&mut self, filename: &str, payload: &str) -> std::io::Result<()>;
}

/// Writes exports into a directory, creating it when missing.
#[derive(Debug, Clone)]
pub struct FileExportSink {
    dir: PathBuf,
    last_written: Option<PathBuf>,
}

impl FileExportSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            last_written: None,
        }
    }

    /// Path of the most recent delivered file.
    pub fn last_written(&self) -> Option<&Path> {
        self.last_written.as_deref()
    }
}

impl ExportSink for FileExportSink {
    fn deliver(&mut self, filename: &str, payload: &str) -> std::io::Result<()> {
        let file_name = Path::new(filename).file_name().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid export filename `{filename}`"),
            )
        })?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, payload)?;
        self.last_written = Some(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::csv_field;

    #[test]
    fn csv_field_quotes_only_when_needed() {
        assert_eq!(csv_field("Math"), "Math");
        assert_eq!(csv_field("Smith, Jane"), "\"Smith, Jane\"");
        assert_eq!(csv_field("The \"Prof\""), "\"The \"\"Prof\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }
}
