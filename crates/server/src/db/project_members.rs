use api_types::{MemberRole, ProjectMember};
use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProjectMemberError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Denormalized identity snapshot written onto membership rows.
#[derive(Debug, Clone)]
pub struct MemberIdentity {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

pub struct ProjectMemberRepository;

impl ProjectMemberRepository {
    pub async fn find(
        pool: &SqlitePool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectMember>, ProjectMemberError> {
        let record = sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT id, project_id, user_id, name, email, avatar_url, role, joined_at
            FROM project_members
            WHERE project_id = ?1 AND user_id = ?2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn insert(
        pool: &SqlitePool,
        project_id: Uuid,
        identity: &MemberIdentity,
        role: MemberRole,
    ) -> Result<ProjectMember, ProjectMemberError> {
        let record = sqlx::query_as::<_, ProjectMember>(
            r#"
            INSERT INTO project_members (id, project_id, user_id, name, email, avatar_url, role, joined_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING id, project_id, user_id, name, email, avatar_url, role, joined_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(identity.user_id)
        .bind(&identity.name)
        .bind(&identity.email)
        .bind(identity.avatar_url.as_deref())
        .bind(role)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    async fn refresh_identity(
        pool: &SqlitePool,
        id: Uuid,
        identity: &MemberIdentity,
    ) -> Result<ProjectMember, ProjectMemberError> {
        let record = sqlx::query_as::<_, ProjectMember>(
            r#"
            UPDATE project_members
            SET name = ?1, email = ?2, avatar_url = ?3
            WHERE id = ?4
            RETURNING id, project_id, user_id, name, email, avatar_url, role, joined_at
            "#,
        )
        .bind(&identity.name)
        .bind(&identity.email)
        .bind(identity.avatar_url.as_deref())
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Idempotent membership grant. An existing row keeps its role (a higher
    /// role is never downgraded) and only has its identity snapshot
    /// refreshed; an absent row is inserted with `role`.
    pub async fn ensure_membership(
        pool: &SqlitePool,
        project_id: Uuid,
        identity: &MemberIdentity,
        role: MemberRole,
    ) -> Result<ProjectMember, ProjectMemberError> {
        match Self::find(pool, project_id, identity.user_id).await? {
            Some(existing) => {
                let refreshed = Self::refresh_identity(pool, existing.id, identity).await?;
                if role.rank() > refreshed.role.rank() {
                    return Self::set_role(pool, existing.id, role).await;
                }
                Ok(refreshed)
            }
            None => Self::insert(pool, project_id, identity, role).await,
        }
    }

    async fn set_role(
        pool: &SqlitePool,
        id: Uuid,
        role: MemberRole,
    ) -> Result<ProjectMember, ProjectMemberError> {
        let record = sqlx::query_as::<_, ProjectMember>(
            r#"
            UPDATE project_members
            SET role = ?1
            WHERE id = ?2
            RETURNING id, project_id, user_id, name, email, avatar_url, role, joined_at
            "#,
        )
        .bind(role)
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }
}
