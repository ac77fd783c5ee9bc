//! Attendance record model.
//!
//! # Responsibility
//! - Represent the present/absent split of one stage roster for one subject
//!   on one date.
//! - Validate the partition before it is persisted.
//!
//! # Invariants
//! - `present_student_ids` and `absent_student_ids` are disjoint and free of
//!   duplicates.
//! - Their union equals the stage roster at the time the record is built.
//! - `(date, stage_id, subject)` identifies a record; saving the same key
//!   again replaces the stored record.

use super::EntityId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Attendance for one lecture occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: EntityId,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub stage_id: EntityId,
    /// Weekday name the lecture is scheduled on.
    pub day: String,
    pub subject: String,
    pub present_student_ids: Vec<EntityId>,
    pub absent_student_ids: Vec<EntityId>,
}

/// Natural key of an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceKey<'a> {
    pub date: NaiveDate,
    pub stage_id: EntityId,
    pub subject: &'a str,
}

/// Partition violations detected by [`AttendanceRecord::validate_against_roster`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceValidationError {
    /// The same student id was listed twice.
    DuplicateStudent(EntityId),
    /// A student id appears in both present and absent lists.
    PresentAndAbsent(EntityId),
    /// A listed student is not on the stage roster.
    NotOnRoster(EntityId),
    /// A roster student is in neither list.
    Unaccounted(EntityId),
    /// Subject is blank.
    EmptySubject,
}

impl Display for AttendanceValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateStudent(id) => write!(f, "student {id} listed more than once"),
            Self::PresentAndAbsent(id) => write!(f, "student {id} marked both present and absent"),
            Self::NotOnRoster(id) => write!(f, "student {id} is not enrolled in this stage"),
            Self::Unaccounted(id) => write!(f, "student {id} is neither present nor absent"),
            Self::EmptySubject => write!(f, "attendance subject cannot be empty"),
        }
    }
}

impl Error for AttendanceValidationError {}

impl AttendanceRecord {
    /// Splits `roster` into present and absent lists.
    ///
    /// Roster order is preserved in both lists. Ids in `present` that are not
    /// on the roster are ignored here; callers that must reject them run
    /// [`Self::validate_against_roster`] on the input first.
    pub fn from_roster(
        id: EntityId,
        date: NaiveDate,
        stage_id: EntityId,
        day: impl Into<String>,
        subject: impl Into<String>,
        roster: &[EntityId],
        present: &HashSet<EntityId>,
    ) -> Self {
        let (present_student_ids, absent_student_ids) = roster
            .iter()
            .copied()
            .partition(|student_id| present.contains(student_id));

        Self {
            id,
            date,
            stage_id,
            day: day.into(),
            subject: subject.into(),
            present_student_ids,
            absent_student_ids,
        }
    }

    pub fn key(&self) -> AttendanceKey<'_> {
        AttendanceKey {
            date: self.date,
            stage_id: self.stage_id,
            subject: self.subject.as_str(),
        }
    }

    pub fn matches(&self, key: &AttendanceKey<'_>) -> bool {
        self.key() == *key
    }

    /// Number of students covered by this record.
    pub fn headcount(&self) -> usize {
        self.present_student_ids.len() + self.absent_student_ids.len()
    }

    /// Checks that present/absent form an exact partition of `roster`.
    pub fn validate_against_roster(
        &self,
        roster: &[EntityId],
    ) -> Result<(), AttendanceValidationError> {
        if self.subject.trim().is_empty() {
            return Err(AttendanceValidationError::EmptySubject);
        }

        let roster_ids: HashSet<EntityId> = roster.iter().copied().collect();
        let mut present_seen = HashSet::new();
        for &student_id in &self.present_student_ids {
            if !present_seen.insert(student_id) {
                return Err(AttendanceValidationError::DuplicateStudent(student_id));
            }
            if !roster_ids.contains(&student_id) {
                return Err(AttendanceValidationError::NotOnRoster(student_id));
            }
        }

        let mut absent_seen = HashSet::new();
        for &student_id in &self.absent_student_ids {
            if present_seen.contains(&student_id) {
                return Err(AttendanceValidationError::PresentAndAbsent(student_id));
            }
            if !absent_seen.insert(student_id) {
                return Err(AttendanceValidationError::DuplicateStudent(student_id));
            }
            if !roster_ids.contains(&student_id) {
                return Err(AttendanceValidationError::NotOnRoster(student_id));
            }
        }

        if let Some(&missing) = roster
            .iter()
            .find(|id| !present_seen.contains(*id) && !absent_seen.contains(*id))
        {
            return Err(AttendanceValidationError::Unaccounted(missing));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AttendanceRecord, AttendanceValidationError};
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).expect("valid date")
    }

    #[test]
    fn from_roster_partitions_in_roster_order() {
        let present: HashSet<i64> = [3, 1].into_iter().collect();
        let record = AttendanceRecord::from_roster(9, date(), 1, "Sunday", "Math", &[1, 2, 3, 4], &present);

        assert_eq!(record.present_student_ids, vec![1, 3]);
        assert_eq!(record.absent_student_ids, vec![2, 4]);
        assert_eq!(record.headcount(), 4);
        record
            .validate_against_roster(&[1, 2, 3, 4])
            .expect("partition should be valid");
    }

    #[test]
    fn validate_rejects_overlap_and_missing_students() {
        let mut record = AttendanceRecord::from_roster(1, date(), 1, "Sunday", "Math", &[1, 2], &HashSet::new());
        record.present_student_ids = vec![1];
        record.absent_student_ids = vec![1, 2];
        assert_eq!(
            record.validate_against_roster(&[1, 2]),
            Err(AttendanceValidationError::PresentAndAbsent(1))
        );

        record.present_student_ids = vec![1];
        record.absent_student_ids = vec![];
        assert_eq!(
            record.validate_against_roster(&[1, 2]),
            Err(AttendanceValidationError::Unaccounted(2))
        );

        record.present_student_ids = vec![1, 7];
        record.absent_student_ids = vec![2];
        assert_eq!(
            record.validate_against_roster(&[1, 2]),
            Err(AttendanceValidationError::NotOnRoster(7))
        );
    }

    #[test]
    fn date_serializes_as_calendar_date() {
        let record = AttendanceRecord::from_roster(1, date(), 1, "Sunday", "Math", &[], &HashSet::new());
        let json = serde_json::to_value(&record).expect("serialize record");
        assert_eq!(json["date"], "2024-03-10");
        assert_eq!(json["stageId"], 1);
        assert!(json["presentStudentIds"].as_array().expect("array").is_empty());
    }
}
