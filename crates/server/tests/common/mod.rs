#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use tokio::sync::mpsc;
use uuid::Uuid;

use api_types::{Project, Task, TaskPriority, User};
use server::auth::AuthUser;
use server::db::project_members::MemberIdentity;
use server::db::projects::ProjectRepository;
use server::db::tasks::{CreateTaskParams, TaskRepository};
use server::db::users::UserRepository;
use server::invitations::InvitationService;
use server::mail::{MailError, Mailer, OutboundEmail};

/// A single-connection in-memory database; every handle sees the same data.
pub async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

/// Captures outbound mail on a channel instead of sending it.
pub struct RecordingMailer {
    tx: mpsc::UnboundedSender<OutboundEmail>,
}

impl RecordingMailer {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<OutboundEmail>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        let _ = self.tx.send(email);
        Ok(())
    }
}

pub fn invitation_service(pool: &SqlitePool, mailer: Arc<dyn Mailer>) -> InvitationService {
    InvitationService::new(pool.clone(), mailer, "http://localhost:3000".to_string())
}

pub fn auth_user(user: &User) -> AuthUser {
    AuthUser {
        id: user.id,
        email: Some(user.email.clone()),
        name: Some(user.name.clone()),
        picture_url: user.avatar_url.clone(),
    }
}

/// An authenticated caller with no account row yet, as a first sign-in has.
pub fn fresh_auth_user(email: &str, name: Option<&str>) -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        email: Some(email.to_string()),
        name: name.map(str::to_string),
        picture_url: None,
    }
}

pub async fn create_user(pool: &SqlitePool, email: &str, name: &str) -> User {
    UserRepository::create(pool, Uuid::new_v4(), email, name, None)
        .await
        .expect("create user")
}

pub async fn create_project(pool: &SqlitePool, owner: &User, name: &str) -> Project {
    let identity = MemberIdentity {
        user_id: owner.id,
        name: owner.name.clone(),
        email: owner.email.clone(),
        avatar_url: owner.avatar_url.clone(),
    };
    ProjectRepository::create(pool, name, "", &identity)
        .await
        .expect("create project")
}

pub async fn create_task(
    pool: &SqlitePool,
    project: &Project,
    created_by: Uuid,
    title: &str,
    due_date: Option<DateTime<Utc>>,
) -> Task {
    TaskRepository::create(
        pool,
        &CreateTaskParams {
            project_id: project.id,
            title,
            description: None,
            priority: TaskPriority::Medium,
            due_date,
            created_by,
        },
    )
    .await
    .expect("create task")
}
