use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{FieldErrors, Project, ProjectParams};

/// Result of a save attempt. Rejection is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(Project),
    Rejected { project: Project, errors: FieldErrors },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }
}

/// Storage collaborator for projects.
///
/// Every lookup other than `all` is scoped to one owner. A project outside
/// the owner's scope is reported as `DatabaseError::NotFound`, whether or not
/// it exists elsewhere.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Every project in the system.
    async fn all(&self) -> Result<Vec<Project>, DatabaseError>;

    /// Projects owned by `user_id`.
    async fn scoped(&self, user_id: Uuid) -> Result<Vec<Project>, DatabaseError>;

    /// One project by id, within the owner's scope.
    async fn find_scoped(&self, user_id: Uuid, id: Uuid) -> Result<Project, DatabaseError>;

    /// Unsaved project owned by `user_id`. Nothing is written.
    fn build_scoped(&self, user_id: Uuid, params: ProjectParams) -> Project {
        Project::build(user_id, params)
    }

    /// Insert a new record or update an existing one. All-or-nothing.
    async fn save(&self, project: Project) -> Result<SaveOutcome, DatabaseError>;

    async fn destroy(&self, project: &Project) -> Result<(), DatabaseError>;
}

pub(crate) fn not_found(id: Uuid) -> DatabaseError {
    DatabaseError::NotFound(format!("Project {} not found", id))
}
