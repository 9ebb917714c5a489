mod common;

use chrono::{Duration, Utc};

use api_types::{
    DigestFrequency, EmailNotificationPrefs, InvitationRole, InvitationStatus, InvitationType,
    NotificationType, RelatedType, UpdateNotificationSettingsRequest,
};
use server::db::invitations::{CreateInvitationParams, InvitationRepository};
use server::db::notification_settings::NotificationSettingsRepository;
use server::db::notifications::{
    CreateNotificationParams, NotificationError, NotificationRepository,
};
use server::fanout::{FanoutError, NotificationFanout};

use common::*;

async fn seed_notification(
    pool: &sqlx::SqlitePool,
    user_id: uuid::Uuid,
    title: &str,
) -> api_types::Notification {
    NotificationRepository::create(
        pool,
        &CreateNotificationParams {
            user_id,
            notification_type: NotificationType::TaskAssigned,
            title,
            message: "You were assigned a task",
            action_url: Some("/dashboard/tasks"),
            related_id: None,
            related_type: None,
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn list_respects_unread_filter_and_limit() {
    let pool = setup_pool().await;
    let user = create_user(&pool, "user@example.com", "User").await;

    let first = seed_notification(&pool, user.id, "first").await;
    seed_notification(&pool, user.id, "second").await;
    seed_notification(&pool, user.id, "third").await;
    NotificationRepository::mark_read_for_user(&pool, first.id, user.id)
        .await
        .unwrap();

    let unread = NotificationRepository::list_for_user(&pool, user.id, true, None)
        .await
        .unwrap();
    assert_eq!(unread.len(), 2);
    assert!(unread.iter().all(|n| !n.read));

    let limited = NotificationRepository::list_for_user(&pool, user.id, false, Some(1))
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);

    let count = NotificationRepository::unread_count(&pool, user.id)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn mark_read_and_delete_enforce_ownership() {
    let pool = setup_pool().await;
    let user = create_user(&pool, "user@example.com", "User").await;
    let other = create_user(&pool, "other@example.com", "Other").await;

    let notification = seed_notification(&pool, user.id, "mine").await;

    let err = NotificationRepository::mark_read_for_user(&pool, notification.id, other.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NotificationError::NotAuthorized));

    let read = NotificationRepository::mark_read_for_user(&pool, notification.id, user.id)
        .await
        .unwrap();
    assert!(read.read);
    assert!(read.read_at.is_some());

    let err = NotificationRepository::delete_for_user(&pool, notification.id, other.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NotificationError::NotAuthorized));

    NotificationRepository::delete_for_user(&pool, notification.id, user.id)
        .await
        .unwrap();
    let err = NotificationRepository::mark_read_for_user(&pool, notification.id, user.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NotificationError::NotFound));
}

#[tokio::test]
async fn mark_all_read_reports_updated_rows() {
    let pool = setup_pool().await;
    let user = create_user(&pool, "user@example.com", "User").await;
    let other = create_user(&pool, "other@example.com", "Other").await;

    seed_notification(&pool, user.id, "one").await;
    seed_notification(&pool, user.id, "two").await;
    seed_notification(&pool, other.id, "not yours").await;

    let updated = NotificationRepository::mark_all_read(&pool, user.id)
        .await
        .unwrap();
    assert_eq!(updated, 2);

    assert_eq!(
        NotificationRepository::unread_count(&pool, user.id)
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        NotificationRepository::unread_count(&pool, other.id)
            .await
            .unwrap(),
        1
    );

    let again = NotificationRepository::mark_all_read(&pool, user.id)
        .await
        .unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
async fn settings_are_created_lazily_and_updated_groupwise() {
    let pool = setup_pool().await;
    let user = create_user(&pool, "user@example.com", "User").await;

    let defaults = NotificationSettingsRepository::get_or_create_default(&pool, user.id)
        .await
        .unwrap();
    assert!(defaults.email_notifications.task_assigned);
    assert!(!defaults.email_notifications.task_completed);
    assert_eq!(defaults.due_date_reminders.reminder_days, vec![1, 3]);
    assert_eq!(defaults.digest_frequency, DigestFrequency::Weekly);
    assert!(!defaults.quiet_hours.enabled);

    let updated = NotificationSettingsRepository::update(
        &pool,
        user.id,
        &UpdateNotificationSettingsRequest {
            email_notifications: Some(EmailNotificationPrefs {
                task_assigned: false,
                ..Default::default()
            }),
            digest_frequency: Some(DigestFrequency::Never),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(!updated.email_notifications.task_assigned);
    assert_eq!(updated.digest_frequency, DigestFrequency::Never);
    // Untouched groups keep their stored values.
    assert_eq!(updated.due_date_reminders.reminder_days, vec![1, 3]);
    assert!(updated.updated_at >= defaults.updated_at);
}

#[tokio::test]
async fn fanout_rejects_pending_and_skips_email_for_cancelled() {
    let pool = setup_pool().await;
    let (mailer, mut outbox) = RecordingMailer::new();
    let inviter = create_user(&pool, "jane@example.com", "Jane Doe").await;

    let invitation = InvitationRepository::create(
        &pool,
        &CreateInvitationParams {
            email: "new@example.com",
            invited_by: inviter.id,
            project_id: None,
            task_id: None,
            invitation_type: InvitationType::Workspace,
            role: InvitationRole::Member,
            token: "cafebabe",
            expires_at: Utc::now() + Duration::days(7),
            message: None,
        },
    )
    .await
    .unwrap();

    let fanout = NotificationFanout::new(pool.clone(), mailer);

    let err = fanout
        .notify_invitation_status(&invitation, InvitationStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, FanoutError::NotTerminal(_)));

    fanout
        .notify_invitation_status(&invitation, InvitationStatus::Cancelled)
        .await
        .unwrap();

    let notifications = NotificationRepository::list_for_user(&pool, inviter.id, false, None)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Invitation Cancelled");
    assert_eq!(
        notifications[0].message,
        "Your workspace invitation to new@example.com was cancelled"
    );
    assert_eq!(notifications[0].related_id, Some(invitation.id));
    assert_eq!(
        notifications[0].related_type,
        Some(RelatedType::Invitation)
    );

    // Only accepted and declined trigger a confirmation email.
    assert!(outbox.try_recv().is_err());
}

#[tokio::test]
async fn fanout_links_accepted_project_invitations_to_the_project() {
    let pool = setup_pool().await;
    let (mailer, mut outbox) = RecordingMailer::new();
    let inviter = create_user(&pool, "jane@example.com", "Jane Doe").await;
    let project = create_project(&pool, &inviter, "Launch").await;

    let invitation = InvitationRepository::create(
        &pool,
        &CreateInvitationParams {
            email: "new@example.com",
            invited_by: inviter.id,
            project_id: Some(project.id),
            task_id: None,
            invitation_type: InvitationType::Project,
            role: InvitationRole::Member,
            token: "feedface",
            expires_at: Utc::now() + Duration::days(7),
            message: None,
        },
    )
    .await
    .unwrap();

    let fanout = NotificationFanout::new(pool.clone(), mailer);
    fanout
        .notify_invitation_status(&invitation, InvitationStatus::Accepted)
        .await
        .unwrap();

    let notifications = NotificationRepository::list_for_user(&pool, inviter.id, false, None)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(
        notifications[0].action_url.as_deref(),
        Some(format!("/dashboard/projects/{}", project.id).as_str())
    );

    let email = outbox.recv().await.unwrap();
    assert_eq!(email.to, "jane@example.com");
    assert!(email.text.contains("for Launch"));
}
