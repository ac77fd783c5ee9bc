//! Weekly lecture schedules and school calendar configuration.
//!
//! # Invariants
//! - At most one `DaySchedule` exists per `(stage_id, day)`.
//! - Lecture subjects are unique within one `DaySchedule`.

use super::EntityId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Weekdays lectures may be scheduled on when no config was stored yet.
pub const DEFAULT_WORKING_DAYS: [&str; 5] =
    ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday"];

/// One scheduled subject session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub subject: String,
    pub instructor_id: EntityId,
    /// Free-form slot label, e.g. `08:30 - 10:30`.
    pub time: String,
    /// Topic announced for the next session. Empty until an instructor sets it.
    #[serde(default)]
    pub next_topic: String,
}

impl Lecture {
    pub fn new(subject: impl Into<String>, instructor_id: EntityId, time: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            instructor_id,
            time: time.into(),
            next_topic: String::new(),
        }
    }
}

/// Lectures of one stage on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub id: EntityId,
    pub stage_id: EntityId,
    pub day: String,
    pub lectures: Vec<Lecture>,
}

impl DaySchedule {
    pub fn find_lecture(&self, subject: &str) -> Option<&Lecture> {
        self.lectures.iter().find(|lecture| lecture.subject == subject)
    }

    pub fn find_lecture_mut(&mut self, subject: &str) -> Option<&mut Lecture> {
        self.lectures
            .iter_mut()
            .find(|lecture| lecture.subject == subject)
    }
}

/// School calendar settings stored under the `config` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolConfig {
    /// Ordered weekday names; schedules are presented in this order.
    pub working_days: Vec<String>,
    /// Dates on which no attendance is taken.
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
}

impl SchoolConfig {
    pub fn is_working_day(&self, day: &str) -> bool {
        self.working_days.iter().any(|working_day| working_day == day)
    }

    /// Holidays close the school even on working days.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }
}

impl Default for SchoolConfig {
    fn default() -> Self {
        Self {
            working_days: DEFAULT_WORKING_DAYS.iter().map(|day| day.to_string()).collect(),
            holidays: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DaySchedule, Lecture, SchoolConfig};

    #[test]
    fn default_config_starts_on_sunday() {
        let config = SchoolConfig::default();
        assert_eq!(config.working_days.first().map(String::as_str), Some("Sunday"));
        assert!(config.is_working_day("Thursday"));
        assert!(!config.is_working_day("Friday"));
    }

    #[test]
    fn lecture_without_next_topic_field_deserializes() {
        let lecture: Lecture = serde_json::from_str(
            r#"{"subject":"Math","instructorId":1,"time":"08:30 - 10:30"}"#,
        )
        .expect("lecture should parse");
        assert!(lecture.next_topic.is_empty());
    }

    #[test]
    fn find_lecture_mut_targets_matching_subject() {
        let mut schedule = DaySchedule {
            id: 1,
            stage_id: 1,
            day: "Monday".to_string(),
            lectures: vec![Lecture::new("Math", 1, "08:30"), Lecture::new("Physics", 2, "10:30")],
        };
        schedule
            .find_lecture_mut("Physics")
            .expect("physics exists")
            .next_topic = "Optics".to_string();
        assert_eq!(schedule.lectures[1].next_topic, "Optics");
        assert!(schedule.find_lecture("Chemistry").is_none());
    }
}
