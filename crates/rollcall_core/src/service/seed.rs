//! First-run data seeding.
//!
//! # Invariants
//! - Only keys that were never written are seeded; existing data is kept.
//! - Seeding is idempotent.

use super::auth_service::hash_password;
use super::ServiceResult;
use crate::model::attendance::AttendanceRecord;
use crate::model::schedule::{DaySchedule, SchoolConfig};
use crate::model::school::{Instructor, Role, Stage, Student, UserAccount};
use crate::repo::school_repo::SchoolRepository;
use crate::store::kv_store::StoreKey;
use log::info;

/// Password given to every seeded account.
pub const DEFAULT_PASSWORD: &str = "password";

const DEFAULT_STAGES: [&str; 4] = ["Stage One", "Stage Two", "Stage Three", "Stage Four"];

/// `(username, display name, department)` of the seeded instructors.
const DEFAULT_INSTRUCTORS: [(&str, &str, &str); 2] = [
    ("instructor1", "Dr. Ahmed Ali", "Computer Engineering"),
    ("instructor2", "Fatima Hassan", "Software Engineering"),
];

/// Keys written by one [`seed_database`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub seeded_keys: Vec<StoreKey>,
}

impl SeedSummary {
    pub fn is_noop(&self) -> bool {
        self.seeded_keys.is_empty()
    }
}

/// Fills every absent key with its default value.
pub fn seed_database<R: SchoolRepository>(repo: &R) -> ServiceResult<SeedSummary> {
    let mut summary = SeedSummary::default();

    if !repo.has_key(StoreKey::Config)? {
        repo.set_config(&SchoolConfig::default())?;
        summary.seeded_keys.push(StoreKey::Config);
    }

    if !repo.has_key(StoreKey::Stages)? {
        let mut stages = Vec::with_capacity(DEFAULT_STAGES.len());
        for name in DEFAULT_STAGES {
            stages.push(Stage {
                id: repo.next_id()?,
                name: name.to_string(),
            });
        }
        repo.set_stages(&stages)?;
        summary.seeded_keys.push(StoreKey::Stages);
    }

    seed_accounts(repo, &mut summary)?;

    if !repo.has_key(StoreKey::Students)? {
        repo.set_students(&Vec::<Student>::new())?;
        summary.seeded_keys.push(StoreKey::Students);
    }
    if !repo.has_key(StoreKey::Schedules)? {
        repo.set_schedules(&Vec::<DaySchedule>::new())?;
        summary.seeded_keys.push(StoreKey::Schedules);
    }
    if !repo.has_key(StoreKey::Attendance)? {
        repo.set_attendance(&Vec::<AttendanceRecord>::new())?;
        summary.seeded_keys.push(StoreKey::Attendance);
    }

    info!(
        "event=seed module=service status=ok seeded_keys={}",
        summary.seeded_keys.len()
    );
    Ok(summary)
}

fn seed_accounts<R: SchoolRepository>(repo: &R, summary: &mut SeedSummary) -> ServiceResult<()> {
    let seed_users = !repo.has_key(StoreKey::Users)?;
    let seed_profiles = !repo.has_key(StoreKey::Instructors)?;

    if !seed_users {
        if seed_profiles {
            repo.set_instructors(&[])?;
            summary.seeded_keys.push(StoreKey::Instructors);
        }
        return Ok(());
    }

    let mut users = vec![UserAccount {
        id: repo.next_id()?,
        username: "admin".to_string(),
        password_hash: hash_password(DEFAULT_PASSWORD)?,
        role: Role::Admin,
        name: "Administrator".to_string(),
    }];
    let mut instructors = Vec::new();
    for (username, name, department) in DEFAULT_INSTRUCTORS {
        let account = UserAccount {
            id: repo.next_id()?,
            username: username.to_string(),
            password_hash: hash_password(DEFAULT_PASSWORD)?,
            role: Role::Instructor,
            name: name.to_string(),
        };
        if seed_profiles {
            instructors.push(Instructor {
                id: repo.next_id()?,
                user_id: account.id,
                name: name.to_string(),
                department: department.to_string(),
            });
        }
        users.push(account);
    }

    summary.seeded_keys.push(StoreKey::Users);
    if seed_profiles {
        repo.set_users_and_instructors(&users, &instructors)?;
        summary.seeded_keys.push(StoreKey::Instructors);
    } else {
        repo.set_users(&users)?;
    }
    Ok(())
}
