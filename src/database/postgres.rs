use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Project;
use crate::database::repository::{not_found, ProjectStore, SaveOutcome};

const COLUMNS: &str = "id, user_id, name, description, created_at, updated_at";

/// Postgres-backed store over the `projects` table
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the projects table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id          UUID PRIMARY KEY,
                user_id     UUID NOT NULL,
                name        TEXT NOT NULL,
                description TEXT,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS projects_user_id_idx ON projects (user_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn all(&self) -> Result<Vec<Project>, DatabaseError> {
        let sql = format!("SELECT {} FROM projects ORDER BY created_at, id", COLUMNS);
        let rows = sqlx::query_as::<_, Project>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn scoped(&self, user_id: Uuid) -> Result<Vec<Project>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM projects WHERE user_id = $1 ORDER BY created_at, id",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, Project>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_scoped(&self, user_id: Uuid, id: Uuid) -> Result<Project, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM projects WHERE id = $1 AND user_id = $2",
            COLUMNS
        );
        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn save(&self, project: Project) -> Result<SaveOutcome, DatabaseError> {
        let errors = project.validate();
        if !errors.is_empty() {
            return Ok(SaveOutcome::Rejected { project, errors });
        }

        let saved = match project.id {
            None => {
                let sql = format!(
                    "INSERT INTO projects (id, user_id, name, description) VALUES ($1, $2, $3, $4) RETURNING {}",
                    COLUMNS
                );
                sqlx::query_as::<_, Project>(&sql)
                    .bind(Uuid::new_v4())
                    .bind(project.user_id)
                    .bind(&project.name)
                    .bind(&project.description)
                    .fetch_one(&self.pool)
                    .await?
            }
            Some(id) => {
                let sql = format!(
                    "UPDATE projects SET name = $1, description = $2, updated_at = now() \
                     WHERE id = $3 AND user_id = $4 RETURNING {}",
                    COLUMNS
                );
                sqlx::query_as::<_, Project>(&sql)
                    .bind(&project.name)
                    .bind(&project.description)
                    .bind(id)
                    .bind(project.user_id)
                    .fetch_optional(&self.pool)
                    .await?
                    .ok_or_else(|| not_found(id))?
            }
        };

        debug!("Saved project {:?}", saved.id);
        Ok(SaveOutcome::Saved(saved))
    }

    async fn destroy(&self, project: &Project) -> Result<(), DatabaseError> {
        let id = project
            .id
            .ok_or_else(|| DatabaseError::QueryError("cannot destroy an unsaved project".into()))?;

        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(project.user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}
