//! School repository contract and key-value implementation.
//!
//! # Responsibility
//! - Read and write whole collections (stages, students, schedules, ...).
//! - Provide the id sequence used by every create path.
//!
//! # Invariants
//! - Collections keep insertion order across read/write cycles.
//! - Ids returned by `next_id` are strictly increasing and never reused.
//! - Writes that touch several keys go through `KeyValueStore::set_many`.

use crate::model::attendance::AttendanceRecord;
use crate::model::schedule::{DaySchedule, SchoolConfig};
use crate::model::school::{Instructor, Session, Stage, Student, UserAccount};
use crate::model::EntityId;
use crate::store::kv_store::{KeyValueStore, StoreError, StoreKey};
use log::error;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence failure while reading or writing typed collections.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    /// Stored value under `key` is not valid for its collection type.
    InvalidData { key: StoreKey, message: String },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidData { key, message } => {
                write!(f, "invalid persisted data under `{key}`: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InvalidData { .. } => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Typed access to every collection the app persists.
pub trait SchoolRepository {
    fn stages(&self) -> RepoResult<Vec<Stage>>;
    fn set_stages(&self, stages: &[Stage]) -> RepoResult<()>;

    fn students(&self) -> RepoResult<Vec<Student>>;
    fn set_students(&self, students: &[Student]) -> RepoResult<()>;

    fn instructors(&self) -> RepoResult<Vec<Instructor>>;
    fn set_instructors(&self, instructors: &[Instructor]) -> RepoResult<()>;

    fn users(&self) -> RepoResult<Vec<UserAccount>>;
    fn set_users(&self, users: &[UserAccount]) -> RepoResult<()>;

    /// Replaces accounts and instructor profiles in one atomic write.
    fn set_users_and_instructors(
        &self,
        users: &[UserAccount],
        instructors: &[Instructor],
    ) -> RepoResult<()>;

    fn schedules(&self) -> RepoResult<Vec<DaySchedule>>;
    fn set_schedules(&self, schedules: &[DaySchedule]) -> RepoResult<()>;

    fn attendance(&self) -> RepoResult<Vec<AttendanceRecord>>;
    fn set_attendance(&self, records: &[AttendanceRecord]) -> RepoResult<()>;

    /// Returns stored config, `None` when never written.
    fn config(&self) -> RepoResult<Option<SchoolConfig>>;
    fn set_config(&self, config: &SchoolConfig) -> RepoResult<()>;

    fn session(&self) -> RepoResult<Option<Session>>;
    fn set_session(&self, session: &Session) -> RepoResult<()>;
    fn clear_session(&self) -> RepoResult<()>;

    /// Returns whether anything was ever written under `key`.
    fn has_key(&self, key: StoreKey) -> RepoResult<bool>;

    /// Issues the next entity id.
    fn next_id(&self) -> RepoResult<EntityId>;
}

/// [`SchoolRepository`] storing each collection as JSON under its key.
pub struct KvSchoolRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvSchoolRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Gives access to the raw store, e.g. for wiping all data.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn load<T: DeserializeOwned>(&self, key: StoreKey) -> RepoResult<Option<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(|err| {
            error!("event=repo_load module=repo status=error key={key} error_code=invalid_json");
            RepoError::InvalidData {
                key,
                message: err.to_string(),
            }
        })
    }

    fn load_list<T: DeserializeOwned>(&self, key: StoreKey) -> RepoResult<Vec<T>> {
        Ok(self.load(key)?.unwrap_or_default())
    }

    /// Highest id in any stored collection, `0` for an empty store.
    ///
    /// Stores written before the sequence key existed carry ids but no
    /// counter; the sequence resumes above them.
    fn max_stored_id(&self) -> RepoResult<EntityId> {
        let ids = self
            .stages()?
            .iter()
            .map(|stage| stage.id)
            .chain(self.students()?.iter().map(|student| student.id))
            .chain(self.instructors()?.iter().map(|instructor| instructor.id))
            .chain(self.users()?.iter().map(|user| user.id))
            .chain(self.schedules()?.iter().map(|schedule| schedule.id))
            .chain(self.attendance()?.iter().map(|record| record.id))
            .max();
        Ok(ids.unwrap_or(0).max(0))
    }

    fn save<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> RepoResult<()> {
        let raw = encode(key, value)?;
        self.store.set(key, &raw)?;
        Ok(())
    }
}

impl<S: KeyValueStore> SchoolRepository for KvSchoolRepository<S> {
    fn stages(&self) -> RepoResult<Vec<Stage>> {
        self.load_list(StoreKey::Stages)
    }

    fn set_stages(&self, stages: &[Stage]) -> RepoResult<()> {
        self.save(StoreKey::Stages, stages)
    }

    fn students(&self) -> RepoResult<Vec<Student>> {
        self.load_list(StoreKey::Students)
    }

    fn set_students(&self, students: &[Student]) -> RepoResult<()> {
        self.save(StoreKey::Students, students)
    }

    fn instructors(&self) -> RepoResult<Vec<Instructor>> {
        self.load_list(StoreKey::Instructors)
    }

    fn set_instructors(&self, instructors: &[Instructor]) -> RepoResult<()> {
        self.save(StoreKey::Instructors, instructors)
    }

    fn users(&self) -> RepoResult<Vec<UserAccount>> {
        self.load_list(StoreKey::Users)
    }

    fn set_users(&self, users: &[UserAccount]) -> RepoResult<()> {
        self.save(StoreKey::Users, users)
    }

    fn set_users_and_instructors(
        &self,
        users: &[UserAccount],
        instructors: &[Instructor],
    ) -> RepoResult<()> {
        let entries = [
            (StoreKey::Users, encode(StoreKey::Users, users)?),
            (
                StoreKey::Instructors,
                encode(StoreKey::Instructors, instructors)?,
            ),
        ];
        self.store.set_many(&entries)?;
        Ok(())
    }

    fn schedules(&self) -> RepoResult<Vec<DaySchedule>> {
        self.load_list(StoreKey::Schedules)
    }

    fn set_schedules(&self, schedules: &[DaySchedule]) -> RepoResult<()> {
        self.save(StoreKey::Schedules, schedules)
    }

    fn attendance(&self) -> RepoResult<Vec<AttendanceRecord>> {
        self.load_list(StoreKey::Attendance)
    }

    fn set_attendance(&self, records: &[AttendanceRecord]) -> RepoResult<()> {
        self.save(StoreKey::Attendance, records)
    }

    fn config(&self) -> RepoResult<Option<SchoolConfig>> {
        self.load(StoreKey::Config)
    }

    fn set_config(&self, config: &SchoolConfig) -> RepoResult<()> {
        self.save(StoreKey::Config, config)
    }

    fn session(&self) -> RepoResult<Option<Session>> {
        self.load(StoreKey::Session)
    }

    fn set_session(&self, session: &Session) -> RepoResult<()> {
        self.save(StoreKey::Session, session)
    }

    fn clear_session(&self) -> RepoResult<()> {
        self.store.remove(StoreKey::Session)?;
        Ok(())
    }

    fn has_key(&self, key: StoreKey) -> RepoResult<bool> {
        Ok(self.store.get(key)?.is_some())
    }

    fn next_id(&self) -> RepoResult<EntityId> {
        let last: EntityId = match self.load(StoreKey::IdSequence)? {
            Some(last) => last,
            None => self.max_stored_id()?,
        };
        let next = last + 1;
        self.save(StoreKey::IdSequence, &next)?;
        Ok(next)
    }
}

fn encode<T: Serialize + ?Sized>(key: StoreKey, value: &T) -> RepoResult<String> {
    serde_json::to_string(value).map_err(|err| RepoError::InvalidData {
        key,
        message: err.to_string(),
    })
}
