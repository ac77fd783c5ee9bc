//! Stage management.

use super::{required_label, ServiceError, ServiceResult};
use crate::model::school::Stage;
use crate::model::EntityId;
use crate::repo::school_repo::{RepoResult, SchoolRepository};
use log::info;

/// Admin use cases over the stage list.
pub struct StageService<R: SchoolRepository> {
    repo: R,
}

impl<R: SchoolRepository> StageService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists stages in stored order.
    pub fn list_stages(&self) -> RepoResult<Vec<Stage>> {
        self.repo.stages()
    }

    /// Appends a new stage.
    ///
    /// # Errors
    /// - `InvalidInput("name")` when the name is blank.
    pub fn add_stage(&self, name: &str) -> ServiceResult<Stage> {
        let name = required_label(name, "name")?;
        let mut stages = self.repo.stages()?;
        let stage = Stage {
            id: self.repo.next_id()?,
            name,
        };
        stages.push(stage.clone());
        self.repo.set_stages(&stages)?;

        info!(
            "event=stage_added module=service status=ok stage_id={} stage_count={}",
            stage.id,
            stages.len()
        );
        Ok(stage)
    }

    /// Removes a stage by id.
    ///
    /// Students and attendance that reference the stage are kept as-is;
    /// reports surface such records as missing references.
    pub fn delete_stage(&self, stage_id: EntityId) -> ServiceResult<()> {
        let mut stages = self.repo.stages()?;
        let before = stages.len();
        stages.retain(|stage| stage.id != stage_id);
        if stages.len() == before {
            return Err(ServiceError::NotFound {
                entity: "stage",
                id: stage_id,
            });
        }
        self.repo.set_stages(&stages)?;

        info!("event=stage_deleted module=service status=ok stage_id={stage_id}");
        Ok(())
    }
}
