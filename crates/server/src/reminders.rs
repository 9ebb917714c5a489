//! Daily due-date reminder sweep. Runs once a day at a configured UTC hour,
//! walking a fixed set of lead times and writing in-app reminders for
//! assigned, still-open tasks due that many days out.

use std::collections::HashSet;

use api_types::{NotificationType, RelatedType};
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::db::notification_settings::{NotificationSettingsError, NotificationSettingsRepository};
use crate::db::notifications::{CreateNotificationParams, NotificationError, NotificationRepository};
use crate::db::projects::{ProjectError, ProjectRepository};
use crate::db::tasks::{TaskError, TaskRepository};

pub const REMINDER_LEAD_DAYS: [i64; 5] = [1, 2, 3, 7, 14];

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error(transparent)]
    Settings(#[from] NotificationSettingsError),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub created: u64,
    pub skipped_existing: u64,
    pub failed_buckets: u64,
}

pub struct ReminderService;

impl ReminderService {
    pub fn spawn(pool: SqlitePool, hour_utc: u32) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(hour_utc, "due-date reminder service started");
            loop {
                let now = Utc::now();
                let next = next_run_after(now, hour_utc);
                let wait = (next - now).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;

                let stats = run_sweep(&pool, Utc::now()).await;
                info!(
                    created = stats.created,
                    skipped = stats.skipped_existing,
                    failed_buckets = stats.failed_buckets,
                    "due-date reminder sweep finished"
                );
            }
        })
    }
}

/// One full sweep across all lead-day buckets. A failing bucket is logged
/// and skipped so the remaining buckets still run.
pub async fn run_sweep(pool: &SqlitePool, now: DateTime<Utc>) -> SweepStats {
    let mut stats = SweepStats::default();
    for lead_days in REMINDER_LEAD_DAYS {
        match sweep_bucket(pool, now, lead_days).await {
            Ok((created, skipped)) => {
                stats.created += created;
                stats.skipped_existing += skipped;
            }
            Err(err) => {
                stats.failed_buckets += 1;
                error!(lead_days, "reminder bucket failed: {err}");
            }
        }
    }
    stats
}

async fn sweep_bucket(
    pool: &SqlitePool,
    now: DateTime<Utc>,
    lead_days: i64,
) -> Result<(u64, u64), ReminderError> {
    let recipients = recipients_for_lead(pool, lead_days).await?;
    if recipients.is_empty() {
        return Ok((0, 0));
    }

    let (start, end) = day_window(now, lead_days);
    let tasks = TaskRepository::list_due_between(pool, start, end).await?;
    let since = start_of_utc_day(now);

    let mut created = 0;
    let mut skipped = 0;
    for task in tasks {
        let Some(user_id) = task.assigned_to else {
            continue;
        };
        if !recipients.contains(&user_id) {
            continue;
        }
        if NotificationRepository::reminder_exists_since(pool, user_id, task.id, since).await? {
            skipped += 1;
            continue;
        }

        let project_name = ProjectRepository::find_by_id(pool, task.project_id)
            .await?
            .map(|project| project.name)
            .unwrap_or_else(|| "Unknown Project".to_string());

        let due_text = if lead_days == 1 {
            "tomorrow".to_string()
        } else {
            format!("in {lead_days} days")
        };
        let due_date = task
            .due_date
            .map(|due| due.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        let title = format!("Task due {due_text}: {}", task.title);
        let message = format!(
            "Your task \"{}\" in {project_name} is due {due_text} ({due_date})",
            task.title
        );

        NotificationRepository::create(
            pool,
            &CreateNotificationParams {
                user_id,
                notification_type: NotificationType::TaskDueReminder,
                title: &title,
                message: &message,
                action_url: Some("/dashboard/tasks"),
                related_id: Some(task.id),
                related_type: Some(RelatedType::Task),
            },
        )
        .await?;
        created += 1;
    }

    Ok((created, skipped))
}

/// Users opted in to a reminder at this lead time: reminders enabled, the
/// lead time selected, and the due-soon preference on.
async fn recipients_for_lead(
    pool: &SqlitePool,
    lead_days: i64,
) -> Result<HashSet<Uuid>, ReminderError> {
    let all_settings = NotificationSettingsRepository::list_all(pool).await?;
    Ok(all_settings
        .into_iter()
        .filter(|settings| {
            settings.due_date_reminders.enabled
                && settings.due_date_reminders.reminder_days.contains(&lead_days)
                && settings.email_notifications.task_due_soon
        })
        .map(|settings| settings.user_id)
        .collect())
}

fn start_of_utc_day(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN))
}

/// The UTC calendar day `lead_days` from now, as a half-open interval.
fn day_window(now: DateTime<Utc>, lead_days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_utc_day(now) + Duration::days(lead_days);
    (start, start + Duration::days(1))
}

fn next_run_after(now: DateTime<Utc>, hour_utc: u32) -> DateTime<Utc> {
    let today_run = start_of_utc_day(now) + Duration::hours(i64::from(hour_utc));
    if today_run > now {
        today_run
    } else {
        today_run + Duration::days(1)
    }
}
