//! Stages, students, instructors and user accounts.

use super::EntityId;
use serde::{Deserialize, Serialize};

/// Section assigned to students added without an explicit one.
pub const DEFAULT_SECTION: &str = "A";

/// An academic cohort grouping students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: EntityId,
    pub name: String,
}

/// A student enrolled in exactly one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: EntityId,
    pub name: String,
    /// Registration number printed on the student card.
    pub university_id: String,
    pub stage_id: EntityId,
    pub section: String,
}

/// Instructor profile. Login data lives on the linked [`UserAccount`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: EntityId,
    pub user_id: EntityId,
    pub name: String,
    pub department: String,
}

/// Role attached to a login account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Instructor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Instructor => "instructor",
        }
    }
}

/// Login account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: EntityId,
    pub username: String,
    /// PHC-formatted password hash.
    pub password_hash: String,
    pub role: Role,
    /// Display name.
    pub name: String,
}

/// Currently signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: EntityId,
    pub username: String,
    pub role: Role,
    pub name: String,
}

impl Session {
    pub fn for_account(account: &UserAccount) -> Self {
        Self {
            user_id: account.id,
            username: account.username.clone(),
            role: account.role,
            name: account.name.clone(),
        }
    }
}

/// Finds a stage by id.
pub fn find_stage(stages: &[Stage], id: EntityId) -> Option<&Stage> {
    stages.iter().find(|stage| stage.id == id)
}

/// Finds a student by id.
pub fn find_student(students: &[Student], id: EntityId) -> Option<&Student> {
    students.iter().find(|student| student.id == id)
}

/// Returns the students enrolled in `stage_id`, in stored order.
pub fn stage_roster(students: &[Student], stage_id: EntityId) -> Vec<&Student> {
    students
        .iter()
        .filter(|student| student.stage_id == stage_id)
        .collect()
}
