//! Invitation lifecycle: send, accept, decline, cancel, resend. State moves
//! pending -> accepted | declined | expired | cancelled and never back.
//! Expiry is detected lazily at accept time; nothing sweeps pending rows.

use std::sync::Arc;

use api_types::{
    Invitation, InvitationStatus, InvitationType, MemberRole, SendInvitationRequest, User,
};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::invitations::{CreateInvitationParams, InvitationError, InvitationRepository};
use crate::db::project_members::{MemberIdentity, ProjectMemberError, ProjectMemberRepository};
use crate::db::projects::{ProjectError, ProjectRepository};
use crate::db::tasks::{TaskError, TaskRepository};
use crate::db::users::{UserError, UserRepository};
use crate::fanout::NotificationFanout;
use crate::identity::{derive_display_name, PLACEHOLDER_NAMES};
use crate::mail::{templates, Mailer};
use crate::token::generate_invitation_token;

const INVITATION_TTL_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum InvitationFlowError {
    #[error("invitation not found")]
    NotFound,
    #[error("task not found")]
    TaskNotFound,
    #[error("project not found")]
    ProjectNotFound,
    #[error("user already exists in the system")]
    UserAlreadyExists,
    #[error("a pending invitation already exists for {0}")]
    AlreadyInvited(String),
    #[error("not authorized")]
    NotAuthorized,
    #[error("invalid invitation scope: {0}")]
    InvalidScope(&'static str),
    #[error("invitation is {0}, not pending")]
    InvalidState(InvitationStatus),
    #[error("invitation has expired")]
    Expired,
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    ProjectMember(#[from] ProjectMemberError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Invitation(#[from] InvitationError),
}

pub struct InvitationService {
    pool: SqlitePool,
    mailer: Arc<dyn Mailer>,
    public_base_url: String,
}

impl InvitationService {
    pub fn new(pool: SqlitePool, mailer: Arc<dyn Mailer>, public_base_url: String) -> Self {
        Self {
            pool,
            mailer,
            public_base_url,
        }
    }

    /// Creates a pending invitation and schedules the invitation email.
    pub async fn send(
        &self,
        inviter: &AuthUser,
        request: &SendInvitationRequest,
    ) -> Result<Invitation, InvitationFlowError> {
        // Stored lowercase-trimmed so the pending-uniqueness check cannot be
        // sidestepped by casing or whitespace variants.
        let email = request.email.trim().to_lowercase();

        if UserRepository::find_by_email(&self.pool, &email)
            .await?
            .is_some()
        {
            return Err(InvitationFlowError::UserAlreadyExists);
        }
        if InvitationRepository::find_pending_by_email(&self.pool, &email)
            .await?
            .is_some()
        {
            return Err(InvitationFlowError::AlreadyInvited(email));
        }

        self.validate_scope(inviter.id, request).await?;

        let token = generate_invitation_token();
        let invitation = InvitationRepository::create(
            &self.pool,
            &CreateInvitationParams {
                email: &email,
                invited_by: inviter.id,
                project_id: request.project_id,
                task_id: request.task_id,
                invitation_type: request.invitation_type,
                role: request.role,
                token: &token,
                expires_at: Utc::now() + Duration::days(INVITATION_TTL_DAYS),
                message: request.message.as_deref(),
            },
        )
        .await?;

        let inviter_name = self.resolve_inviter_name(inviter).await?;
        self.spawn_invitation_email(invitation.clone(), inviter_name);

        Ok(invitation)
    }

    /// Token lookup for the public invite page. Unknown tokens resolve to
    /// `None` rather than an error so the endpoint leaks nothing.
    pub async fn lookup(&self, token: &str) -> Result<Option<Invitation>, InvitationFlowError> {
        Ok(InvitationRepository::find_by_token(&self.pool, token).await?)
    }

    /// Accepts the invitation behind `token` as the authenticated caller,
    /// provisioning their account and any memberships the scope implies.
    pub async fn accept(
        &self,
        claimant: &AuthUser,
        token: &str,
    ) -> Result<Invitation, InvitationFlowError> {
        let invitation = InvitationRepository::find_by_token(&self.pool, token)
            .await?
            .ok_or(InvitationFlowError::NotFound)?;

        if invitation.status.is_terminal() {
            return Err(InvitationFlowError::InvalidState(invitation.status));
        }
        if invitation.expires_at < Utc::now() {
            let expired =
                InvitationRepository::set_status(&self.pool, invitation.id, InvitationStatus::Expired)
                    .await?;
            self.fanout_status(&expired, InvitationStatus::Expired).await;
            return Err(InvitationFlowError::Expired);
        }

        let user = self.provision_user(claimant, &invitation).await?;
        let identity = MemberIdentity {
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
        };

        match invitation.invitation_type {
            InvitationType::Task => {
                // The task may have been deleted since the invite went out;
                // the acceptance still stands, only the side effects are
                // skipped.
                let task = match invitation.task_id {
                    Some(task_id) => TaskRepository::find_by_id(&self.pool, task_id).await?,
                    None => None,
                };
                if let Some(task) = task {
                    ProjectMemberRepository::ensure_membership(
                        &self.pool,
                        task.project_id,
                        &identity,
                        MemberRole::Member,
                    )
                    .await?;
                    TaskRepository::assign(&self.pool, task.id, user.id).await?;
                }
            }
            InvitationType::Project => {
                let project_id = invitation.project_id.ok_or(InvitationFlowError::InvalidScope(
                    "project invitation has no project",
                ))?;
                ProjectMemberRepository::ensure_membership(
                    &self.pool,
                    project_id,
                    &identity,
                    MemberRole::from(invitation.role),
                )
                .await?;
            }
            InvitationType::Workspace => {}
        }

        let accepted = InvitationRepository::mark_accepted(&self.pool, invitation.id).await?;
        self.fanout_status(&accepted, InvitationStatus::Accepted).await;

        Ok(accepted)
    }

    /// Declines a pending invitation. Requires no account, only the token.
    pub async fn decline(&self, token: &str) -> Result<Invitation, InvitationFlowError> {
        let invitation = InvitationRepository::find_by_token(&self.pool, token)
            .await?
            .ok_or(InvitationFlowError::NotFound)?;

        if invitation.status.is_terminal() {
            return Err(InvitationFlowError::InvalidState(invitation.status));
        }

        let declined =
            InvitationRepository::set_status(&self.pool, invitation.id, InvitationStatus::Declined)
                .await?;
        self.fanout_status(&declined, InvitationStatus::Declined).await;

        Ok(declined)
    }

    /// Cancels a pending invitation. Only the inviter may cancel, and the row
    /// is retained under `cancelled` rather than deleted.
    pub async fn cancel(
        &self,
        caller_id: Uuid,
        invitation_id: Uuid,
    ) -> Result<Invitation, InvitationFlowError> {
        let invitation = InvitationRepository::find_by_id(&self.pool, invitation_id)
            .await?
            .ok_or(InvitationFlowError::NotFound)?;

        if invitation.invited_by != caller_id {
            return Err(InvitationFlowError::NotAuthorized);
        }
        if invitation.status.is_terminal() {
            return Err(InvitationFlowError::InvalidState(invitation.status));
        }

        Ok(
            InvitationRepository::set_status(&self.pool, invitation.id, InvitationStatus::Cancelled)
                .await?,
        )
    }

    /// Reissues an invitation: the original row is cancelled and a fresh
    /// pending clone with a new token and expiry replaces it.
    pub async fn resend(
        &self,
        caller: &AuthUser,
        invitation_id: Uuid,
    ) -> Result<Invitation, InvitationFlowError> {
        let original = InvitationRepository::find_by_id(&self.pool, invitation_id)
            .await?
            .ok_or(InvitationFlowError::NotFound)?;

        if original.invited_by != caller.id {
            return Err(InvitationFlowError::NotAuthorized);
        }
        if original.status == InvitationStatus::Accepted {
            return Err(InvitationFlowError::InvalidState(original.status));
        }

        InvitationRepository::set_status(&self.pool, original.id, InvitationStatus::Cancelled)
            .await?;

        let token = generate_invitation_token();
        let replacement = InvitationRepository::create(
            &self.pool,
            &CreateInvitationParams {
                email: &original.email,
                invited_by: original.invited_by,
                project_id: original.project_id,
                task_id: original.task_id,
                invitation_type: original.invitation_type,
                role: original.role,
                token: &token,
                expires_at: Utc::now() + Duration::days(INVITATION_TTL_DAYS),
                message: original.message.as_deref(),
            },
        )
        .await?;

        let inviter_name = self.resolve_inviter_name(caller).await?;
        self.spawn_invitation_email(replacement.clone(), inviter_name);

        Ok(replacement)
    }

    pub async fn list_for_inviter(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Invitation>, InvitationFlowError> {
        Ok(InvitationRepository::list_by_inviter(&self.pool, user_id).await?)
    }

    /// Any member of the project may see its invitations; only owners and
    /// admins may create them.
    pub async fn list_for_project(
        &self,
        caller_id: Uuid,
        project_id: Uuid,
    ) -> Result<Vec<Invitation>, InvitationFlowError> {
        if ProjectMemberRepository::find(&self.pool, project_id, caller_id)
            .await?
            .is_none()
        {
            return Err(InvitationFlowError::NotAuthorized);
        }
        Ok(InvitationRepository::list_by_project(&self.pool, project_id).await?)
    }

    /// Scope rules: the id fields present must match the invitation type, and
    /// project- and task-scoped invitations require the caller to hold an
    /// owner or admin membership on the target project.
    async fn validate_scope(
        &self,
        inviter_id: Uuid,
        request: &SendInvitationRequest,
    ) -> Result<(), InvitationFlowError> {
        match request.invitation_type {
            InvitationType::Workspace => {
                if request.project_id.is_some() || request.task_id.is_some() {
                    return Err(InvitationFlowError::InvalidScope(
                        "workspace invitations take no project or task",
                    ));
                }
            }
            InvitationType::Project => {
                if request.task_id.is_some() {
                    return Err(InvitationFlowError::InvalidScope(
                        "project invitations take no task",
                    ));
                }
                let project_id = request
                    .project_id
                    .ok_or(InvitationFlowError::InvalidScope("project id is required"))?;
                if ProjectRepository::find_by_id(&self.pool, project_id)
                    .await?
                    .is_none()
                {
                    return Err(InvitationFlowError::ProjectNotFound);
                }
                self.require_can_invite(inviter_id, project_id).await?;
            }
            InvitationType::Task => {
                let task_id = request
                    .task_id
                    .ok_or(InvitationFlowError::InvalidScope("task id is required"))?;
                let task = TaskRepository::find_by_id(&self.pool, task_id)
                    .await?
                    .ok_or(InvitationFlowError::TaskNotFound)?;
                if let Some(project_id) = request.project_id {
                    if project_id != task.project_id {
                        return Err(InvitationFlowError::InvalidScope(
                            "project id does not match the task's project",
                        ));
                    }
                }
                self.require_can_invite(inviter_id, task.project_id).await?;
            }
        }
        Ok(())
    }

    async fn require_can_invite(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Result<(), InvitationFlowError> {
        let member = ProjectMemberRepository::find(&self.pool, project_id, user_id).await?;
        match member {
            Some(member) if member.role.can_invite() => Ok(()),
            _ => Err(InvitationFlowError::NotAuthorized),
        }
    }

    /// Finds or creates the caller's account, then refreshes a stale profile.
    /// A non-empty claim name wins over the stored one; a stored placeholder
    /// name is upgraded to one derived from the email local part.
    async fn provision_user(
        &self,
        claimant: &AuthUser,
        invitation: &Invitation,
    ) -> Result<User, InvitationFlowError> {
        let email = claimant
            .email
            .clone()
            .unwrap_or_else(|| invitation.email.clone());

        let Some(existing) = UserRepository::find_by_id(&self.pool, claimant.id).await? else {
            let name = derive_display_name(claimant.name.as_deref(), Some(&email));
            return Ok(UserRepository::create(
                &self.pool,
                claimant.id,
                &email,
                &name,
                claimant.picture_url.as_deref(),
            )
            .await?);
        };

        let claim_name = claimant
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        let name = match claim_name {
            Some(name) => name.to_string(),
            None if PLACEHOLDER_NAMES.contains(&existing.name.as_str()) => {
                derive_display_name(None, Some(&email))
            }
            None => existing.name.clone(),
        };
        let avatar_url = claimant
            .picture_url
            .clone()
            .or_else(|| existing.avatar_url.clone());

        if name != existing.name || email != existing.email || avatar_url != existing.avatar_url {
            return Ok(UserRepository::update_identity(
                &self.pool,
                existing.id,
                &name,
                &email,
                avatar_url.as_deref(),
            )
            .await?);
        }

        Ok(existing)
    }

    async fn resolve_inviter_name(
        &self,
        inviter: &AuthUser,
    ) -> Result<String, InvitationFlowError> {
        let stored = UserRepository::find_by_id(&self.pool, inviter.id)
            .await?
            .map(|user| user.name)
            .filter(|name| !name.trim().is_empty());
        Ok(stored
            .or_else(|| {
                inviter
                    .name
                    .clone()
                    .filter(|name| !name.trim().is_empty())
            })
            .unwrap_or_else(|| "Someone".to_string()))
    }

    fn spawn_invitation_email(&self, invitation: Invitation, inviter_name: String) {
        let pool = self.pool.clone();
        let mailer = Arc::clone(&self.mailer);
        let invite_url = format!("{}/invite/{}", self.public_base_url, invitation.token);
        tokio::spawn(async move {
            if let Err(err) =
                deliver_invitation_email(&pool, mailer, &invite_url, &invitation, &inviter_name)
                    .await
            {
                error!(invitation_id = %invitation.id, "failed to send invitation email: {err}");
            }
        });
    }

    async fn fanout_status(&self, invitation: &Invitation, status: InvitationStatus) {
        let fanout = NotificationFanout::new(self.pool.clone(), Arc::clone(&self.mailer));
        if let Err(err) = fanout.notify_invitation_status(invitation, status).await {
            error!(invitation_id = %invitation.id, "notification fanout failed: {err}");
        }
    }
}

async fn deliver_invitation_email(
    pool: &SqlitePool,
    mailer: Arc<dyn Mailer>,
    invite_url: &str,
    invitation: &Invitation,
    inviter_name: &str,
) -> anyhow::Result<()> {
    let rendered = if invitation.invitation_type == InvitationType::Task {
        let task = match invitation.task_id {
            Some(task_id) => TaskRepository::find_by_id(pool, task_id).await?,
            None => None,
        };
        let project = match task.as_ref().map(|task| task.project_id) {
            Some(project_id) => ProjectRepository::find_by_id(pool, project_id).await?,
            None => None,
        };
        let task_title = task
            .as_ref()
            .map(|task| task.title.as_str())
            .unwrap_or("Untitled Task");
        let project_name = project
            .as_ref()
            .map(|project| project.name.as_str())
            .unwrap_or("Unknown Project");
        templates::task_assignment(&templates::TaskAssignmentEmail {
            to: &invitation.email,
            inviter_name,
            task_title,
            project_name,
            invite_url,
            due_date: task.as_ref().and_then(|task| task.due_date),
            message: invitation.message.as_deref(),
        })
    } else {
        templates::workspace_invitation(&templates::WorkspaceInvitationEmail {
            to: &invitation.email,
            inviter_name,
            invite_url,
            message: invitation.message.as_deref(),
        })
    };

    mailer.send(rendered).await?;
    Ok(())
}
