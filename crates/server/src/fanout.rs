//! In-app notification fanout for invitation status changes. The row for the
//! inviter is written synchronously; the confirmation email rides on a
//! detached task and never blocks or fails the triggering flow.

use std::sync::Arc;

use api_types::{Invitation, InvitationStatus, NotificationType, RelatedType};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, warn};

use crate::db::notifications::{CreateNotificationParams, NotificationError, NotificationRepository};
use crate::db::projects::ProjectRepository;
use crate::db::tasks::TaskRepository;
use crate::db::users::UserRepository;
use crate::mail::{templates, Mailer};

#[derive(Debug, Error)]
pub enum FanoutError {
    #[error("invitation status {0} is not a terminal status")]
    NotTerminal(InvitationStatus),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

pub struct NotificationFanout {
    pool: SqlitePool,
    mailer: Arc<dyn Mailer>,
}

impl NotificationFanout {
    pub fn new(pool: SqlitePool, mailer: Arc<dyn Mailer>) -> Self {
        Self { pool, mailer }
    }

    /// Notifies the inviter that `invitation` reached `status`. Writes the
    /// in-app notification row, then (for accepted and declined) schedules a
    /// confirmation email to the inviter.
    pub async fn notify_invitation_status(
        &self,
        invitation: &Invitation,
        status: InvitationStatus,
    ) -> Result<(), FanoutError> {
        let kind = invitation.invitation_type;
        let (notification_type, title, message, action_url) = match status {
            InvitationStatus::Accepted => (
                NotificationType::InvitationAccepted,
                "Invitation Accepted".to_string(),
                format!("{} accepted your {} invitation", invitation.email, kind),
                accepted_action_url(invitation),
            ),
            InvitationStatus::Declined => (
                NotificationType::InvitationDeclined,
                "Invitation Declined".to_string(),
                format!("{} declined your {} invitation", invitation.email, kind),
                "/dashboard/invitations".to_string(),
            ),
            InvitationStatus::Expired => (
                NotificationType::InvitationExpired,
                "Invitation Expired".to_string(),
                format!("Your {} invitation to {} has expired", kind, invitation.email),
                "/dashboard/invitations".to_string(),
            ),
            InvitationStatus::Cancelled => (
                NotificationType::InvitationCancelled,
                "Invitation Cancelled".to_string(),
                format!("Your {} invitation to {} was cancelled", kind, invitation.email),
                "/dashboard/invitations".to_string(),
            ),
            InvitationStatus::Pending => return Err(FanoutError::NotTerminal(status)),
        };

        NotificationRepository::create(
            &self.pool,
            &CreateNotificationParams {
                user_id: invitation.invited_by,
                notification_type,
                title: &title,
                message: &message,
                action_url: Some(&action_url),
                related_id: Some(invitation.id),
                related_type: Some(RelatedType::Invitation),
            },
        )
        .await?;

        if matches!(status, InvitationStatus::Accepted | InvitationStatus::Declined) {
            let pool = self.pool.clone();
            let mailer = Arc::clone(&self.mailer);
            let invitation = invitation.clone();
            tokio::spawn(async move {
                if let Err(err) = send_outcome_email(&pool, mailer, &invitation, status).await {
                    error!(invitation_id = %invitation.id, "failed to send status email: {err}");
                }
            });
        }

        Ok(())
    }
}

fn accepted_action_url(invitation: &Invitation) -> String {
    match invitation.project_id {
        Some(project_id) if invitation.invitation_type == api_types::InvitationType::Project => {
            format!("/dashboard/projects/{project_id}")
        }
        _ => "/dashboard/team".to_string(),
    }
}

async fn send_outcome_email(
    pool: &SqlitePool,
    mailer: Arc<dyn Mailer>,
    invitation: &Invitation,
    status: InvitationStatus,
) -> anyhow::Result<()> {
    let inviter = UserRepository::find_by_id(pool, invitation.invited_by).await?;
    let Some(inviter) = inviter else {
        warn!(inviter_id = %invitation.invited_by, "no inviter on record, skipping status email");
        return Ok(());
    };

    let mut context = None;
    if let Some(project_id) = invitation.project_id {
        context = ProjectRepository::find_by_id(pool, project_id)
            .await?
            .map(|project| project.name);
    }
    if let Some(task_id) = invitation.task_id {
        if let Some(task) = TaskRepository::find_by_id(pool, task_id).await? {
            context = Some(task.title);
        }
    }

    let kind = invitation.invitation_type.to_string();
    let outcome = templates::InvitationOutcomeEmail {
        to: &inviter.email,
        invitee_email: &invitation.email,
        invitation_kind: &kind,
        context: context.as_deref(),
    };
    let rendered = match status {
        InvitationStatus::Accepted => templates::invitation_accepted(&outcome),
        InvitationStatus::Declined => templates::invitation_declined(&outcome),
        _ => return Ok(()),
    };

    mailer.send(rendered).await?;
    Ok(())
}
