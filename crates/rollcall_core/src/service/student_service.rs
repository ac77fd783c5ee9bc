//! Student enrollment.

use super::{required_label, ServiceError, ServiceResult};
use crate::model::school::{find_stage, Student, DEFAULT_SECTION};
use crate::model::EntityId;
use crate::repo::school_repo::{RepoResult, SchoolRepository};
use log::info;

/// Input for [`StudentService::add_student`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub university_id: String,
    pub stage_id: EntityId,
}

/// Admin use cases over the student list.
pub struct StudentService<R: SchoolRepository> {
    repo: R,
}

impl<R: SchoolRepository> StudentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_students(&self) -> RepoResult<Vec<Student>> {
        self.repo.students()
    }

    /// Students enrolled in one stage, in stored order.
    pub fn students_in_stage(&self, stage_id: EntityId) -> RepoResult<Vec<Student>> {
        let mut students = self.repo.students()?;
        students.retain(|student| student.stage_id == stage_id);
        Ok(students)
    }

    /// Enrolls a student in an existing stage with the default section.
    ///
    /// # Errors
    /// - `InvalidInput` when name or university id is blank.
    /// - `NotFound` when the stage does not exist.
    pub fn add_student(&self, request: &NewStudent) -> ServiceResult<Student> {
        let name = required_label(&request.name, "name")?;
        let university_id = required_label(&request.university_id, "university_id")?;

        let stages = self.repo.stages()?;
        if find_stage(&stages, request.stage_id).is_none() {
            return Err(ServiceError::NotFound {
                entity: "stage",
                id: request.stage_id,
            });
        }

        let mut students = self.repo.students()?;
        let student = Student {
            id: self.repo.next_id()?,
            name,
            university_id,
            stage_id: request.stage_id,
            section: DEFAULT_SECTION.to_string(),
        };
        students.push(student.clone());
        self.repo.set_students(&students)?;

        info!(
            "event=student_added module=service status=ok student_id={} stage_id={}",
            student.id, student.stage_id
        );
        Ok(student)
    }

    pub fn delete_student(&self, student_id: EntityId) -> ServiceResult<()> {
        let mut students = self.repo.students()?;
        let before = students.len();
        students.retain(|student| student.id != student_id);
        if students.len() == before {
            return Err(ServiceError::NotFound {
                entity: "student",
                id: student_id,
            });
        }
        self.repo.set_students(&students)?;

        info!("event=student_deleted module=service status=ok student_id={student_id}");
        Ok(())
    }
}
