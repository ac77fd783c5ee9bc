//! Attendance taking.
//!
//! # Responsibility
//! - Build attendance records from the current stage roster.
//! - Upsert on `(date, stage_id, subject)` so a retake replaces the record.
//! - Only accept attendance for lectures on the stage's schedule.
//!
//! # Invariants
//! - A stored record always partitions the roster it was built from.
//! - Upserts keep the replaced record's position and id.

use super::{required_label, ServiceError, ServiceResult};
use crate::model::attendance::{AttendanceKey, AttendanceRecord, AttendanceValidationError};
use crate::model::school::{find_stage, stage_roster, Student};
use crate::model::EntityId;
use crate::repo::school_repo::{RepoResult, SchoolRepository};
use chrono::NaiveDate;
use log::info;
use std::collections::HashSet;

/// Input for [`AttendanceService::record_attendance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceSubmission {
    pub date: NaiveDate,
    pub stage_id: EntityId,
    pub day: String,
    pub subject: String,
    /// Students ticked as present; everyone else on the roster is absent.
    pub present_student_ids: Vec<EntityId>,
}

/// Whether a save created a new record or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Replaced,
}

/// Instructor use cases for attendance.
pub struct AttendanceService<R: SchoolRepository> {
    repo: R,
}

impl<R: SchoolRepository> AttendanceService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_attendance(&self) -> RepoResult<Vec<AttendanceRecord>> {
        self.repo.attendance()
    }

    /// Students that attendance is taken for in `stage_id`.
    ///
    /// # Errors
    /// - `NotFound` for an unknown stage.
    /// - `EmptyRoster` when nobody is enrolled.
    pub fn roster(&self, stage_id: EntityId) -> ServiceResult<Vec<Student>> {
        let stages = self.repo.stages()?;
        if find_stage(&stages, stage_id).is_none() {
            return Err(ServiceError::NotFound {
                entity: "stage",
                id: stage_id,
            });
        }

        let students = self.repo.students()?;
        let roster: Vec<Student> = stage_roster(&students, stage_id)
            .into_iter()
            .cloned()
            .collect();
        if roster.is_empty() {
            return Err(ServiceError::EmptyRoster(stage_id));
        }
        Ok(roster)
    }

    /// Saves attendance for one lecture occurrence.
    ///
    /// Subject and day are normalized the way lectures are stored, so a
    /// submission always lands on the key of a scheduled lecture.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank subject or day.
    /// - `NotAWorkingDay` / `Holiday` when the school is closed.
    /// - `NotFound` / `EmptyRoster` as for [`Self::roster`].
    /// - `LectureNotFound` when the stage has no such lecture that day.
    /// - `InvalidAttendance` when a present id is not on the roster or listed
    ///   twice.
    pub fn record_attendance(
        &self,
        submission: &AttendanceSubmission,
    ) -> ServiceResult<(AttendanceRecord, SaveOutcome)> {
        let subject = required_label(&submission.subject, "subject")?;
        let day = required_label(&submission.day, "day")?;

        let config = self.repo.config()?.unwrap_or_default();
        if !config.is_working_day(&day) {
            return Err(ServiceError::NotAWorkingDay(day));
        }
        if config.is_holiday(submission.date) {
            return Err(ServiceError::Holiday(submission.date));
        }

        let roster_ids: Vec<EntityId> = self
            .roster(submission.stage_id)?
            .iter()
            .map(|student| student.id)
            .collect();

        let schedules = self.repo.schedules()?;
        let scheduled = schedules
            .iter()
            .find(|schedule| schedule.stage_id == submission.stage_id && schedule.day == day)
            .is_some_and(|schedule| schedule.find_lecture(&subject).is_some());
        if !scheduled {
            return Err(ServiceError::LectureNotFound {
                stage_id: submission.stage_id,
                day,
                subject,
            });
        }

        let present = checked_present_set(&submission.present_student_ids, &roster_ids)?;

        let mut records = self.repo.attendance()?;
        let key = AttendanceKey {
            date: submission.date,
            stage_id: submission.stage_id,
            subject: &subject,
        };
        let existing = records.iter().position(|record| record.matches(&key));
        let id = match existing {
            Some(position) => records[position].id,
            None => self.repo.next_id()?,
        };

        let record = AttendanceRecord::from_roster(
            id,
            submission.date,
            submission.stage_id,
            day,
            subject.as_str(),
            &roster_ids,
            &present,
        );
        record.validate_against_roster(&roster_ids)?;

        let outcome = match existing {
            Some(position) => {
                records[position] = record.clone();
                SaveOutcome::Replaced
            }
            None => {
                records.push(record.clone());
                SaveOutcome::Created
            }
        };
        self.repo.set_attendance(&records)?;

        info!(
            "event=attendance_saved module=service status=ok record_id={} stage_id={} present={} absent={} replaced={}",
            record.id,
            record.stage_id,
            record.present_student_ids.len(),
            record.absent_student_ids.len(),
            outcome == SaveOutcome::Replaced
        );
        Ok((record, outcome))
    }
}

fn checked_present_set(
    present: &[EntityId],
    roster: &[EntityId],
) -> Result<HashSet<EntityId>, AttendanceValidationError> {
    let mut seen = HashSet::with_capacity(present.len());
    for &student_id in present {
        if !roster.contains(&student_id) {
            return Err(AttendanceValidationError::NotOnRoster(student_id));
        }
        if !seen.insert(student_id) {
            return Err(AttendanceValidationError::DuplicateStudent(student_id));
        }
    }
    Ok(seen)
}
