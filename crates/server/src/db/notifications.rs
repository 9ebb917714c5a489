use api_types::{Notification, NotificationType, RelatedType};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification not found")]
    NotFound,
    #[error("notification belongs to another user")]
    NotAuthorized,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug)]
pub struct CreateNotificationParams<'a> {
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: &'a str,
    pub message: &'a str,
    pub action_url: Option<&'a str>,
    pub related_id: Option<Uuid>,
    pub related_type: Option<RelatedType>,
}

pub struct NotificationRepository;

impl NotificationRepository {
    pub async fn create(
        pool: &SqlitePool,
        params: &CreateNotificationParams<'_>,
    ) -> Result<Notification, NotificationError> {
        let record = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, user_id, notification_type, title, message, read,
                                       action_url, related_id, related_type, created_at, read_at)
            VALUES (?1, ?2, ?3, ?4, ?5, FALSE, ?6, ?7, ?8, ?9, NULL)
            RETURNING id, user_id, notification_type, title, message, read,
                      action_url, related_id, related_type, created_at, read_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.user_id)
        .bind(params.notification_type)
        .bind(params.title)
        .bind(params.message)
        .bind(params.action_url)
        .bind(params.related_id)
        .bind(params.related_type)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    pub async fn list_for_user(
        pool: &SqlitePool,
        user_id: Uuid,
        unread_only: bool,
        limit: Option<i64>,
    ) -> Result<Vec<Notification>, NotificationError> {
        let limit = limit.unwrap_or(50);
        let records = if unread_only {
            sqlx::query_as::<_, Notification>(
                r#"
                SELECT id, user_id, notification_type, title, message, read,
                       action_url, related_id, related_type, created_at, read_at
                FROM notifications
                WHERE user_id = ?1 AND read = FALSE
                ORDER BY created_at DESC
                LIMIT ?2
                "#,
            )
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        } else {
            sqlx::query_as::<_, Notification>(
                r#"
                SELECT id, user_id, notification_type, title, message, read,
                       action_url, related_id, related_type, created_at, read_at
                FROM notifications
                WHERE user_id = ?1
                ORDER BY created_at DESC
                LIMIT ?2
                "#,
            )
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        };

        Ok(records)
    }

    pub async fn unread_count(pool: &SqlitePool, user_id: Uuid) -> Result<i64, NotificationError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM notifications
            WHERE user_id = ?1 AND read = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    async fn find_owned(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Notification, NotificationError> {
        let record = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, notification_type, title, message, read,
                   action_url, related_id, related_type, created_at, read_at
            FROM notifications
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(NotificationError::NotFound)?;

        if record.user_id != user_id {
            return Err(NotificationError::NotAuthorized);
        }

        Ok(record)
    }

    pub async fn mark_read_for_user(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Notification, NotificationError> {
        Self::find_owned(pool, id, user_id).await?;

        let record = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET read = TRUE, read_at = ?1
            WHERE id = ?2
            RETURNING id, user_id, notification_type, title, message, read,
                      action_url, related_id, related_type, created_at, read_at
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    pub async fn mark_all_read(pool: &SqlitePool, user_id: Uuid) -> Result<u64, NotificationError> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET read = TRUE, read_at = ?1
            WHERE user_id = ?2 AND read = FALSE
            "#,
        )
        .bind(Utc::now())
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_for_user(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<(), NotificationError> {
        Self::find_owned(pool, id, user_id).await?;

        sqlx::query("DELETE FROM notifications WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Whether a due-date reminder was already written for this user and task
    /// at or after `since`. Keeps the daily sweep from stacking duplicates.
    pub async fn reminder_exists_since(
        pool: &SqlitePool,
        user_id: Uuid,
        task_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<bool, NotificationError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM notifications
            WHERE user_id = ?1
              AND notification_type = ?2
              AND related_id = ?3
              AND created_at >= ?4
            "#,
        )
        .bind(user_id)
        .bind(NotificationType::TaskDueReminder)
        .bind(task_id)
        .bind(since)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }
}
