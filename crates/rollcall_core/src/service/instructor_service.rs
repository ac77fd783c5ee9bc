//! Instructor profiles and their login accounts.
//!
//! # Invariants
//! - Every instructor profile points at exactly one instructor account.
//! - Profile and account are created and removed in the same atomic write.
//! - Usernames are unique across all accounts.

use super::auth_service::hash_password;
use super::{required_label, ServiceError, ServiceResult};
use crate::model::school::{Instructor, Role, UserAccount};
use crate::model::EntityId;
use crate::repo::school_repo::{RepoResult, SchoolRepository};
use log::{info, warn};

/// Input for [`InstructorService::add_instructor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInstructor {
    pub name: String,
    pub department: String,
    pub username: String,
    pub password: String,
}

/// Admin use cases over instructors.
pub struct InstructorService<R: SchoolRepository> {
    repo: R,
}

impl<R: SchoolRepository> InstructorService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_instructors(&self) -> RepoResult<Vec<Instructor>> {
        self.repo.instructors()
    }

    /// Creates an instructor account and profile.
    ///
    /// # Errors
    /// - `InvalidInput` when any field is blank.
    /// - `DuplicateUsername` when the username is taken; nothing is written.
    pub fn add_instructor(&self, request: &NewInstructor) -> ServiceResult<Instructor> {
        let name = required_label(&request.name, "name")?;
        let department = required_label(&request.department, "department")?;
        let username = required_label(&request.username, "username")?;
        if request.password.trim().is_empty() {
            return Err(ServiceError::InvalidInput("password"));
        }

        let mut users = self.repo.users()?;
        if users.iter().any(|user| user.username == username) {
            warn!("event=instructor_add module=service status=rejected error_code=duplicate_username");
            return Err(ServiceError::DuplicateUsername(username));
        }
        let mut instructors = self.repo.instructors()?;

        let account = UserAccount {
            id: self.repo.next_id()?,
            username,
            password_hash: hash_password(request.password.trim())?,
            role: Role::Instructor,
            name: name.clone(),
        };
        let instructor = Instructor {
            id: self.repo.next_id()?,
            user_id: account.id,
            name,
            department,
        };
        users.push(account);
        instructors.push(instructor.clone());
        self.repo.set_users_and_instructors(&users, &instructors)?;

        info!(
            "event=instructor_added module=service status=ok instructor_id={} user_id={}",
            instructor.id, instructor.user_id
        );
        Ok(instructor)
    }

    /// Removes an instructor profile together with its login account.
    pub fn delete_instructor(&self, instructor_id: EntityId) -> ServiceResult<()> {
        let mut instructors = self.repo.instructors()?;
        let Some(position) = instructors
            .iter()
            .position(|instructor| instructor.id == instructor_id)
        else {
            return Err(ServiceError::NotFound {
                entity: "instructor",
                id: instructor_id,
            });
        };
        let removed = instructors.remove(position);

        let mut users = self.repo.users()?;
        users.retain(|user| user.id != removed.user_id);
        self.repo.set_users_and_instructors(&users, &instructors)?;

        info!(
            "event=instructor_deleted module=service status=ok instructor_id={} user_id={}",
            removed.id, removed.user_id
        );
        Ok(())
    }
}
