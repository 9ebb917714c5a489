use api_types::User;
use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, UserError> {
        let record = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, avatar_url, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, UserError> {
        let record = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, avatar_url, created_at
            FROM users
            WHERE LOWER(email) = LOWER(?1)
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        email: &str,
        name: &str,
        avatar_url: Option<&str>,
    ) -> Result<User, UserError> {
        let record = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, avatar_url, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, email, name, avatar_url, created_at
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(name)
        .bind(avatar_url)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    pub async fn update_identity(
        pool: &SqlitePool,
        id: Uuid,
        name: &str,
        email: &str,
        avatar_url: Option<&str>,
    ) -> Result<User, UserError> {
        let record = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = ?1, email = ?2, avatar_url = ?3
            WHERE id = ?4
            RETURNING id, email, name, avatar_url, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(avatar_url)
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }
}
