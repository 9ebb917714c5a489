use api_types::{
    DueDateReminderPrefs, EmailNotificationPrefs, NotificationSettings, QuietHours,
    UpdateNotificationSettingsRequest,
};
use chrono::Utc;
use sqlx::{types::Json, SqlitePool};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotificationSettingsError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct NotificationSettingsRepository;

impl NotificationSettingsRepository {
    pub async fn find_by_user(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Option<NotificationSettings>, NotificationSettingsError> {
        let record = sqlx::query_as::<_, NotificationSettings>(
            r#"
            SELECT user_id, email_notifications, due_date_reminders, digest_frequency,
                   quiet_hours, created_at, updated_at
            FROM notification_settings
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Settings rows are created lazily with defaults on first read.
    pub async fn get_or_create_default(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<NotificationSettings, NotificationSettingsError> {
        if let Some(existing) = Self::find_by_user(pool, user_id).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let record = sqlx::query_as::<_, NotificationSettings>(
            r#"
            INSERT INTO notification_settings (user_id, email_notifications, due_date_reminders,
                                               digest_frequency, quiet_hours, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING user_id, email_notifications, due_date_reminders, digest_frequency,
                      quiet_hours, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(Json(EmailNotificationPrefs::default()))
        .bind(Json(DueDateReminderPrefs::default()))
        .bind(api_types::DigestFrequency::default())
        .bind(Json(QuietHours::default()))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Group-wise partial update: only the groups present in the request are
    /// replaced, the rest keep their stored value.
    pub async fn update(
        pool: &SqlitePool,
        user_id: Uuid,
        update: &UpdateNotificationSettingsRequest,
    ) -> Result<NotificationSettings, NotificationSettingsError> {
        let current = Self::get_or_create_default(pool, user_id).await?;

        let email_notifications = update
            .email_notifications
            .clone()
            .unwrap_or(current.email_notifications.0);
        let due_date_reminders = update
            .due_date_reminders
            .clone()
            .unwrap_or(current.due_date_reminders.0);
        let digest_frequency = update.digest_frequency.unwrap_or(current.digest_frequency);
        let quiet_hours = update.quiet_hours.clone().unwrap_or(current.quiet_hours.0);

        let record = sqlx::query_as::<_, NotificationSettings>(
            r#"
            UPDATE notification_settings
            SET email_notifications = ?1, due_date_reminders = ?2, digest_frequency = ?3,
                quiet_hours = ?4, updated_at = ?5
            WHERE user_id = ?6
            RETURNING user_id, email_notifications, due_date_reminders, digest_frequency,
                      quiet_hours, created_at, updated_at
            "#,
        )
        .bind(Json(email_notifications))
        .bind(Json(due_date_reminders))
        .bind(digest_frequency)
        .bind(Json(quiet_hours))
        .bind(Utc::now())
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    pub async fn list_all(
        pool: &SqlitePool,
    ) -> Result<Vec<NotificationSettings>, NotificationSettingsError> {
        let records = sqlx::query_as::<_, NotificationSettings>(
            r#"
            SELECT user_id, email_notifications, due_date_reminders, digest_frequency,
                   quiet_hours, created_at, updated_at
            FROM notification_settings
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
