use api_types::{MemberRole, Project};
use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use super::project_members::{MemberIdentity, ProjectMemberError, ProjectMemberRepository};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("project member error: {0}")]
    ProjectMember(#[from] ProjectMemberError),
}

pub struct ProjectRepository;

impl ProjectRepository {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Project>, ProjectError> {
        let record = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, created_by, created_at, updated_at
            FROM projects
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Creates a project and grants the creator an `owner` membership.
    pub async fn create(
        pool: &SqlitePool,
        name: &str,
        description: &str,
        owner: &MemberIdentity,
    ) -> Result<Project, ProjectError> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (id, name, description, created_by, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, name, description, created_by, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(owner.user_id)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        ProjectMemberRepository::insert(pool, record.id, owner, MemberRole::Owner).await?;

        Ok(record)
    }
}
