use api_types::{Task, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug)]
pub struct CreateTaskParams<'a> {
    pub project_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_by: Uuid,
}

pub struct TaskRepository;

impl TaskRepository {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Task>, TaskError> {
        let record = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, priority,
                   assigned_to, due_date, created_by, created_at, updated_at
            FROM tasks
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn create(
        pool: &SqlitePool,
        params: &CreateTaskParams<'_>,
    ) -> Result<Task, TaskError> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, project_id, title, description, status, priority,
                               assigned_to, due_date, created_by, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7, ?8, ?9, ?10)
            RETURNING id, project_id, title, description, status, priority,
                      assigned_to, due_date, created_by, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.project_id)
        .bind(params.title)
        .bind(params.description)
        .bind(TaskStatus::Todo)
        .bind(params.priority)
        .bind(params.due_date)
        .bind(params.created_by)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    pub async fn assign(pool: &SqlitePool, id: Uuid, user_id: Uuid) -> Result<Task, TaskError> {
        let record = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET assigned_to = ?1, updated_at = ?2
            WHERE id = ?3
            RETURNING id, project_id, title, description, status, priority,
                      assigned_to, due_date, created_by, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    pub async fn set_status(
        pool: &SqlitePool,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Task, TaskError> {
        let record = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = ?1, updated_at = ?2
            WHERE id = ?3
            RETURNING id, project_id, title, description, status, priority,
                      assigned_to, due_date, created_by, created_at, updated_at
            "#,
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Assigned, still-open tasks whose due date falls inside `[start, end)`.
    pub async fn list_due_between(
        pool: &SqlitePool,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Task>, TaskError> {
        let records = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, priority,
                   assigned_to, due_date, created_by, created_at, updated_at
            FROM tasks
            WHERE due_date >= ?1 AND due_date < ?2
              AND assigned_to IS NOT NULL
              AND status NOT IN (?3, ?4)
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(TaskStatus::Completed)
        .bind(TaskStatus::Cancelled)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
