//! Weekly schedules: admin editing, instructor topic updates, student view.
//!
//! # Responsibility
//! - Maintain one `DaySchedule` per `(stage, day)` and its lectures.
//! - Present a stage's week in configured working-day order.
//!
//! # Invariants
//! - Lectures can only be added on configured working days.
//! - Subjects stay unique within one day of one stage.

use super::{required_label, ServiceError, ServiceResult};
use crate::model::schedule::{DaySchedule, Lecture, SchoolConfig};
use crate::model::school::{find_stage, Instructor};
use crate::model::EntityId;
use crate::repo::school_repo::{RepoResult, SchoolRepository};
use log::info;

/// Input for [`ScheduleService::add_lecture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLecture {
    pub stage_id: EntityId,
    pub day: String,
    pub subject: String,
    pub instructor_id: EntityId,
    pub time: String,
}

/// Lecture read model with the instructor name resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureView {
    pub subject: String,
    pub instructor_id: EntityId,
    /// `None` when the instructor was deleted after scheduling.
    pub instructor_name: Option<String>,
    pub time: String,
    pub next_topic: String,
}

/// Lectures of one working day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayLectures {
    pub day: String,
    pub lectures: Vec<LectureView>,
}

/// A stage's week, one entry per configured working day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySchedule {
    pub stage_id: EntityId,
    pub days: Vec<DayLectures>,
}

impl WeeklySchedule {
    /// True when no working day has a lecture.
    pub fn is_empty(&self) -> bool {
        self.days.iter().all(|day| day.lectures.is_empty())
    }
}

/// A lecture taught by one instructor, with its placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedLecture {
    pub stage_id: EntityId,
    pub day: String,
    pub lecture: Lecture,
}

/// Schedule use cases.
pub struct ScheduleService<R: SchoolRepository> {
    repo: R,
}

impl<R: SchoolRepository> ScheduleService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stored config, falling back to defaults when none was seeded.
    pub fn config(&self) -> RepoResult<SchoolConfig> {
        Ok(self.repo.config()?.unwrap_or_default())
    }

    /// Builds the weekly view for one stage.
    pub fn weekly_schedule(&self, stage_id: EntityId) -> ServiceResult<WeeklySchedule> {
        self.ensure_stage_exists(stage_id)?;
        let config = self.config()?;
        let schedules = self.repo.schedules()?;
        let instructors = self.repo.instructors()?;

        let days = config
            .working_days
            .iter()
            .map(|day| {
                let lectures: Vec<LectureView> = schedules
                    .iter()
                    .find(|schedule| schedule.stage_id == stage_id && &schedule.day == day)
                    .map(|schedule| {
                        schedule
                            .lectures
                            .iter()
                            .map(|lecture| lecture_view(lecture, &instructors))
                            .collect()
                    })
                    .unwrap_or_default();
                DayLectures {
                    day: day.clone(),
                    lectures,
                }
            })
            .collect();

        Ok(WeeklySchedule { stage_id, days })
    }

    /// Adds a lecture to a stage/day, creating the day schedule on first use.
    ///
    /// # Errors
    /// - `InvalidInput` for blank subject/time.
    /// - `NotFound` for unknown stage or instructor.
    /// - `NotAWorkingDay` when `day` is not configured.
    /// - `DuplicateLecture` when the subject already exists that day.
    pub fn add_lecture(&self, request: &NewLecture) -> ServiceResult<Lecture> {
        let subject = required_label(&request.subject, "subject")?;
        let time = required_label(&request.time, "time")?;
        self.ensure_stage_exists(request.stage_id)?;

        let config = self.config()?;
        if !config.is_working_day(&request.day) {
            return Err(ServiceError::NotAWorkingDay(request.day.clone()));
        }

        let instructors = self.repo.instructors()?;
        if !instructors
            .iter()
            .any(|instructor| instructor.id == request.instructor_id)
        {
            return Err(ServiceError::NotFound {
                entity: "instructor",
                id: request.instructor_id,
            });
        }

        let lecture = Lecture::new(subject, request.instructor_id, time);
        let mut schedules = self.repo.schedules()?;
        match find_day_mut(&mut schedules, request.stage_id, &request.day) {
            Some(schedule) => {
                if schedule.find_lecture(&lecture.subject).is_some() {
                    return Err(ServiceError::DuplicateLecture {
                        day: request.day.clone(),
                        subject: lecture.subject,
                    });
                }
                schedule.lectures.push(lecture.clone());
            }
            None => schedules.push(DaySchedule {
                id: self.repo.next_id()?,
                stage_id: request.stage_id,
                day: request.day.clone(),
                lectures: vec![lecture.clone()],
            }),
        }
        self.repo.set_schedules(&schedules)?;

        info!(
            "event=lecture_added module=service status=ok stage_id={} instructor_id={}",
            request.stage_id, request.instructor_id
        );
        Ok(lecture)
    }

    /// Removes one lecture from a stage/day.
    pub fn delete_lecture(&self, stage_id: EntityId, day: &str, subject: &str) -> ServiceResult<()> {
        let mut schedules = self.repo.schedules()?;
        let schedule = find_day_mut(&mut schedules, stage_id, day)
            .filter(|schedule| schedule.find_lecture(subject).is_some())
            .ok_or_else(|| lecture_not_found(stage_id, day, subject))?;
        schedule.lectures.retain(|lecture| lecture.subject != subject);
        self.repo.set_schedules(&schedules)?;

        info!("event=lecture_deleted module=service status=ok stage_id={stage_id}");
        Ok(())
    }

    /// Sets the announced next topic of one lecture. An empty topic clears it.
    pub fn update_next_topic(
        &self,
        stage_id: EntityId,
        day: &str,
        subject: &str,
        topic: &str,
    ) -> ServiceResult<Lecture> {
        let mut schedules = self.repo.schedules()?;
        let lecture = find_day_mut(&mut schedules, stage_id, day)
            .and_then(|schedule| schedule.find_lecture_mut(subject))
            .ok_or_else(|| lecture_not_found(stage_id, day, subject))?;
        lecture.next_topic = topic.trim().to_string();
        let updated = lecture.clone();
        self.repo.set_schedules(&schedules)?;

        info!(
            "event=next_topic_updated module=service status=ok stage_id={stage_id} topic_len={}",
            updated.next_topic.chars().count()
        );
        Ok(updated)
    }

    /// Lists every lecture assigned to `instructor_id`, in stored order.
    pub fn lectures_for_instructor(
        &self,
        instructor_id: EntityId,
    ) -> RepoResult<Vec<AssignedLecture>> {
        let schedules = self.repo.schedules()?;
        Ok(schedules
            .into_iter()
            .flat_map(|schedule| {
                let DaySchedule {
                    stage_id,
                    day,
                    lectures,
                    ..
                } = schedule;
                lectures
                    .into_iter()
                    .filter(|lecture| lecture.instructor_id == instructor_id)
                    .map(move |lecture| AssignedLecture {
                        stage_id,
                        day: day.clone(),
                        lecture,
                    })
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    fn ensure_stage_exists(&self, stage_id: EntityId) -> ServiceResult<()> {
        let stages = self.repo.stages()?;
        if find_stage(&stages, stage_id).is_none() {
            return Err(ServiceError::NotFound {
                entity: "stage",
                id: stage_id,
            });
        }
        Ok(())
    }
}

fn find_day_mut<'a>(
    schedules: &'a mut [DaySchedule],
    stage_id: EntityId,
    day: &str,
) -> Option<&'a mut DaySchedule> {
    schedules
        .iter_mut()
        .find(|schedule| schedule.stage_id == stage_id && schedule.day == day)
}

fn lecture_view(lecture: &Lecture, instructors: &[Instructor]) -> LectureView {
    LectureView {
        subject: lecture.subject.clone(),
        instructor_id: lecture.instructor_id,
        instructor_name: instructors
            .iter()
            .find(|instructor| instructor.id == lecture.instructor_id)
            .map(|instructor| instructor.name.clone()),
        time: lecture.time.clone(),
        next_topic: lecture.next_topic.clone(),
    }
}

fn lecture_not_found(stage_id: EntityId, day: &str, subject: &str) -> ServiceError {
    ServiceError::LectureNotFound {
        stage_id,
        day: day.to_string(),
        subject: subject.to_string(),
    }
}
