use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type, types::Json};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailNotificationPrefs {
    pub task_assigned: bool,
    pub task_due_soon: bool,
    pub task_completed: bool,
    pub project_invitation: bool,
    pub weekly_digest: bool,
}

impl Default for EmailNotificationPrefs {
    fn default() -> Self {
        Self {
            task_assigned: true,
            task_due_soon: true,
            task_completed: false,
            project_invitation: true,
            weekly_digest: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDateReminderPrefs {
    pub enabled: bool,
    /// Lead times, in days before the due date, the user wants reminders for.
    pub reminder_days: Vec<i64>,
}

impl Default for DueDateReminderPrefs {
    fn default() -> Self {
        Self {
            enabled: true,
            reminder_days: vec![1, 3],
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, EnumString, Display, Default,
)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DigestFrequency {
    Daily,
    #[default]
    Weekly,
    Never,
}

/// Captured in preferences but not consulted by the reminder sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    pub enabled: bool,
    pub start_time: String,
    pub end_time: String,
    pub timezone: String,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start_time: "22:00".to_string(),
            end_time: "08:00".to_string(),
            timezone: "America/New_York".to_string(),
        }
    }
}

/// Per-user notification preferences, created lazily with defaults.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub user_id: Uuid,
    pub email_notifications: Json<EmailNotificationPrefs>,
    pub due_date_reminders: Json<DueDateReminderPrefs>,
    pub digest_frequency: DigestFrequency,
    pub quiet_hours: Json<QuietHours>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update: each group replaces the stored group wholesale when
/// present and is left untouched when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNotificationSettingsRequest {
    pub email_notifications: Option<EmailNotificationPrefs>,
    pub due_date_reminders: Option<DueDateReminderPrefs>,
    pub digest_frequency: Option<DigestFrequency>,
    pub quiet_hours: Option<QuietHours>,
}
