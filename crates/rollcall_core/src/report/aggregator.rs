//! Attendance statistics.
//!
//! # Invariants
//! - Percentages are rounded to two decimals and lie in `[0, 100]`.
//! - A stage with no students or no records reports exactly `0`.
//! - Most-absent ties resolve to the key seen first in input order.

use crate::model::attendance::AttendanceRecord;
use crate::model::school::{Stage, Student};
use crate::model::EntityId;
use serde::Serialize;
use std::collections::HashMap;

/// Returned by the most-absent queries when there is no attendance at all.
pub const NO_DATA: &str = "N/A";

/// Attendance rate of one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagePercentage {
    pub stage_id: EntityId,
    pub stage_name: String,
    /// Present share of all possible attendances, `0.00..=100.00`.
    pub percentage: f64,
}

/// Aggregates shown on the admin reports page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub stage_percentages: Vec<StagePercentage>,
    pub most_absent_subject: String,
    pub most_absent_day: String,
    pub record_count: usize,
}

/// Outcome of [`build_report`].
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// No attendance has been recorded yet.
    NoData,
    Ready(ReportSummary),
}

/// Builds the full summary, or `Report::NoData` when `attendance` is empty.
pub fn build_report(
    stages: &[Stage],
    students: &[Student],
    attendance: &[AttendanceRecord],
) -> Report {
    if attendance.is_empty() {
        return Report::NoData;
    }

    Report::Ready(ReportSummary {
        stage_percentages: compute_stage_percentages(stages, students, attendance),
        most_absent_subject: most_absent_subject(attendance),
        most_absent_day: most_absent_day(attendance),
        record_count: attendance.len(),
    })
}

/// Computes one attendance percentage per stage, in `stages` order.
///
/// `percentage = present / (roster size * record count) * 100`. When the
/// denominator is zero the percentage is `0` by policy. Students removed
/// after records were taken can push the raw ratio above 100; the result
/// is capped.
pub fn compute_stage_percentages(
    stages: &[Stage],
    students: &[Student],
    attendance: &[AttendanceRecord],
) -> Vec<StagePercentage> {
    stages
        .iter()
        .map(|stage| {
            let roster_size = students
                .iter()
                .filter(|student| student.stage_id == stage.id)
                .count();
            let (record_count, total_present) = attendance
                .iter()
                .filter(|record| record.stage_id == stage.id)
                .fold((0usize, 0usize), |(records, present), record| {
                    (records + 1, present + record.present_student_ids.len())
                });

            let total_possible = roster_size * record_count;
            let percentage = if total_possible == 0 {
                0.0
            } else {
                round_to_hundredths(total_present as f64 / total_possible as f64 * 100.0)
                    .min(100.0)
            };

            StagePercentage {
                stage_id: stage.id,
                stage_name: stage.name.clone(),
                percentage,
            }
        })
        .collect()
}

/// Subject with the most recorded absences, or [`NO_DATA`].
pub fn most_absent_subject(attendance: &[AttendanceRecord]) -> String {
    most_absent_by(attendance, |record| record.subject.as_str())
}

/// Weekday with the most recorded absences, or [`NO_DATA`].
pub fn most_absent_day(attendance: &[AttendanceRecord]) -> String {
    most_absent_by(attendance, |record| record.day.as_str())
}

fn most_absent_by<'a, F>(attendance: &'a [AttendanceRecord], key_of: F) -> String
where
    F: Fn(&'a AttendanceRecord) -> &'a str,
{
    // Group totals in first-seen order so ties are deterministic.
    let mut totals: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for record in attendance {
        let key = key_of(record);
        let slot = *index.entry(key).or_insert_with(|| {
            totals.push((key, 0));
            totals.len() - 1
        });
        totals[slot].1 += record.absent_student_ids.len();
    }

    totals
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (key, total)| match best {
            Some((_, best_total)) if best_total >= total => best,
            _ => Some((key, total)),
        })
        .map_or_else(|| NO_DATA.to_string(), |(key, _)| key.to_string())
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::round_to_hundredths;

    #[test]
    fn rounds_half_away_from_zero_to_two_decimals() {
        assert_eq!(round_to_hundredths(66.666_666), 66.67);
        assert_eq!(round_to_hundredths(33.333_333), 33.33);
        assert_eq!(round_to_hundredths(12.5), 12.5);
    }
}
