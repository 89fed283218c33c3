use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Project;
use crate::database::repository::{not_found, ProjectStore, SaveOutcome};

/// Process-local store, kept in insertion order.
#[derive(Default)]
pub struct MemoryProjectStore {
    projects: RwLock<Vec<Project>>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.projects.read().await.len()
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn all(&self) -> Result<Vec<Project>, DatabaseError> {
        Ok(self.projects.read().await.clone())
    }

    async fn scoped(&self, user_id: Uuid) -> Result<Vec<Project>, DatabaseError> {
        let projects = self.projects.read().await;
        Ok(projects
            .iter()
            .filter(|p| p.is_owned_by(user_id))
            .cloned()
            .collect())
    }

    async fn find_scoped(&self, user_id: Uuid, id: Uuid) -> Result<Project, DatabaseError> {
        let projects = self.projects.read().await;
        projects
            .iter()
            .find(|p| p.id == Some(id) && p.is_owned_by(user_id))
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn save(&self, mut project: Project) -> Result<SaveOutcome, DatabaseError> {
        let errors = project.validate();
        if !errors.is_empty() {
            return Ok(SaveOutcome::Rejected { project, errors });
        }

        let now = Utc::now();
        let mut projects = self.projects.write().await;

        match project.id {
            None => {
                project.id = Some(Uuid::new_v4());
                project.created_at = Some(now);
                project.updated_at = Some(now);
                projects.push(project.clone());
            }
            Some(id) => {
                let slot = projects
                    .iter_mut()
                    .find(|p| p.id == Some(id))
                    .ok_or_else(|| not_found(id))?;
                project.created_at = slot.created_at;
                project.updated_at = Some(now);
                *slot = project.clone();
            }
        }

        Ok(SaveOutcome::Saved(project))
    }

    async fn destroy(&self, project: &Project) -> Result<(), DatabaseError> {
        let id = project
            .id
            .ok_or_else(|| DatabaseError::QueryError("cannot destroy an unsaved project".into()))?;
        let mut projects = self.projects.write().await;
        let before = projects.len();
        projects.retain(|p| p.id != Some(id));
        if projects.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}
