use api_types::{Invitation, InvitationRole, InvitationStatus, InvitationType};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum InvitationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug)]
pub struct CreateInvitationParams<'a> {
    pub email: &'a str,
    pub invited_by: Uuid,
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub invitation_type: InvitationType,
    pub role: InvitationRole,
    pub token: &'a str,
    pub expires_at: DateTime<Utc>,
    pub message: Option<&'a str>,
}

pub struct InvitationRepository;

impl InvitationRepository {
    pub async fn find_by_id(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<Invitation>, InvitationError> {
        let record = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, email, invited_by, project_id, task_id, invitation_type,
                   role, status, token, expires_at, created_at, accepted_at, message
            FROM invitations
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn find_by_token(
        pool: &SqlitePool,
        token: &str,
    ) -> Result<Option<Invitation>, InvitationError> {
        let record = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, email, invited_by, project_id, task_id, invitation_type,
                   role, status, token, expires_at, created_at, accepted_at, message
            FROM invitations
            WHERE token = ?1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn find_pending_by_email(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Option<Invitation>, InvitationError> {
        let record = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, email, invited_by, project_id, task_id, invitation_type,
                   role, status, token, expires_at, created_at, accepted_at, message
            FROM invitations
            WHERE LOWER(email) = LOWER(?1) AND status = ?2
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(InvitationStatus::Pending)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn list_by_inviter(
        pool: &SqlitePool,
        invited_by: Uuid,
    ) -> Result<Vec<Invitation>, InvitationError> {
        let records = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, email, invited_by, project_id, task_id, invitation_type,
                   role, status, token, expires_at, created_at, accepted_at, message
            FROM invitations
            WHERE invited_by = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(invited_by)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn list_by_project(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<Invitation>, InvitationError> {
        let records = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, email, invited_by, project_id, task_id, invitation_type,
                   role, status, token, expires_at, created_at, accepted_at, message
            FROM invitations
            WHERE project_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn create(
        pool: &SqlitePool,
        params: &CreateInvitationParams<'_>,
    ) -> Result<Invitation, InvitationError> {
        let record = sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO invitations (id, email, invited_by, project_id, task_id, invitation_type,
                                     role, status, token, expires_at, created_at, accepted_at, message)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, NULL, ?12)
            RETURNING id, email, invited_by, project_id, task_id, invitation_type,
                      role, status, token, expires_at, created_at, accepted_at, message
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.email)
        .bind(params.invited_by)
        .bind(params.project_id)
        .bind(params.task_id)
        .bind(params.invitation_type)
        .bind(params.role)
        .bind(InvitationStatus::Pending)
        .bind(params.token)
        .bind(params.expires_at)
        .bind(Utc::now())
        .bind(params.message)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    pub async fn set_status(
        pool: &SqlitePool,
        id: Uuid,
        status: InvitationStatus,
    ) -> Result<Invitation, InvitationError> {
        let record = sqlx::query_as::<_, Invitation>(
            r#"
            UPDATE invitations
            SET status = ?1
            WHERE id = ?2
            RETURNING id, email, invited_by, project_id, task_id, invitation_type,
                      role, status, token, expires_at, created_at, accepted_at, message
            "#,
        )
        .bind(status)
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    pub async fn mark_accepted(pool: &SqlitePool, id: Uuid) -> Result<Invitation, InvitationError> {
        let record = sqlx::query_as::<_, Invitation>(
            r#"
            UPDATE invitations
            SET status = ?1, accepted_at = ?2
            WHERE id = ?3
            RETURNING id, email, invited_by, project_id, task_id, invitation_type,
                      role, status, token, expires_at, created_at, accepted_at, message
            "#,
        )
        .bind(InvitationStatus::Accepted)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }
}
