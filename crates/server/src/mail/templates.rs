//! Message rendering. Each builder returns a fully addressed [`OutboundEmail`]
//! with both text and HTML bodies.

use chrono::{DateTime, Utc};

use super::OutboundEmail;

pub struct WorkspaceInvitationEmail<'a> {
    pub to: &'a str,
    pub inviter_name: &'a str,
    pub invite_url: &'a str,
    pub message: Option<&'a str>,
}

pub struct TaskAssignmentEmail<'a> {
    pub to: &'a str,
    pub inviter_name: &'a str,
    pub task_title: &'a str,
    pub project_name: &'a str,
    pub invite_url: &'a str,
    pub due_date: Option<DateTime<Utc>>,
    pub message: Option<&'a str>,
}

pub struct InvitationOutcomeEmail<'a> {
    pub to: &'a str,
    pub invitee_email: &'a str,
    pub invitation_kind: &'a str,
    /// Project name or task title, when the invitation was scoped to one.
    pub context: Option<&'a str>,
}

pub fn workspace_invitation(email: &WorkspaceInvitationEmail<'_>) -> OutboundEmail {
    let subject = format!("{} invited you to join Workstream", email.inviter_name);

    let mut text = format!(
        "{} has invited you to join their team on Workstream, a modern project \
         management platform.\n\n",
        email.inviter_name
    );
    if let Some(message) = email.message {
        text.push_str(&format!("\"{message}\"\n\n"));
    }
    text.push_str(&format!(
        "Accept the invitation: {}\n\nThis invitation will expire in 7 days. If you \
         didn't expect this invitation, you can safely ignore this email.\n",
        email.invite_url
    ));

    let message_block = email
        .message
        .map(|message| {
            format!(
                r#"<blockquote style="border-left: 4px solid #667eea; padding-left: 12px; font-style: italic;">"{message}"</blockquote>"#
            )
        })
        .unwrap_or_default();
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h1>You're Invited to Workstream</h1>
  <p><strong>{inviter}</strong> has invited you to join their team on Workstream, a modern project management platform.</p>
  {message_block}
  <p><a href="{url}" style="background: #667eea; color: white; padding: 12px 24px; text-decoration: none; border-radius: 8px;">Accept Invitation</a></p>
  <p style="color: #999; font-size: 14px;">This invitation will expire in 7 days. If you can't click the button, copy and paste this link into your browser:<br><a href="{url}">{url}</a></p>
  <p style="color: #999; font-size: 12px;">Sent by Workstream. If you didn't expect this invitation, you can safely ignore this email.</p>
</div>"#,
        inviter = email.inviter_name,
        url = email.invite_url,
    );

    OutboundEmail {
        to: email.to.to_string(),
        subject,
        text,
        html,
    }
}

pub fn task_assignment(email: &TaskAssignmentEmail<'_>) -> OutboundEmail {
    let subject = format!("You've been assigned to: {}", email.task_title);
    let due_text = email
        .due_date
        .map(|due| due.format("%A, %B %-d, %Y").to_string())
        .unwrap_or_else(|| "No due date set".to_string());

    let mut text = format!(
        "{} has assigned you to a task in the {} project.\n\nTask: {}\nProject: {}\nDue Date: {}\n\n",
        email.inviter_name, email.project_name, email.task_title, email.project_name, due_text
    );
    if let Some(message) = email.message {
        text.push_str(&format!("\"{message}\"\n\n"));
    }
    text.push_str(&format!(
        "View the task and join the project: {}\n\nThis invitation will expire in 7 days.\n",
        email.invite_url
    ));

    let message_block = email
        .message
        .map(|message| {
            format!(
                r#"<blockquote style="border-left: 4px solid #10b981; padding-left: 12px; font-style: italic;">"{message}"</blockquote>"#
            )
        })
        .unwrap_or_default();
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h1>New Task Assignment</h1>
  <p><strong>{inviter}</strong> has assigned you to a task in the <strong>{project}</strong> project.</p>
  <div style="border-left: 4px solid #10b981; padding-left: 12px;">
    <h3>{task}</h3>
    <p><strong>Project:</strong> {project}</p>
    <p><strong>Due Date:</strong> {due}</p>
  </div>
  {message_block}
  <p><a href="{url}" style="background: #10b981; color: white; padding: 12px 24px; text-decoration: none; border-radius: 8px;">View Task &amp; Join Project</a></p>
  <p style="color: #999; font-size: 14px;">This invitation will expire in 7 days. If you can't click the button, copy and paste this link into your browser:<br><a href="{url}">{url}</a></p>
  <p style="color: #999; font-size: 12px;">Sent by Workstream. If you didn't expect this task assignment, please contact {inviter}.</p>
</div>"#,
        inviter = email.inviter_name,
        project = email.project_name,
        task = email.task_title,
        due = due_text,
        url = email.invite_url,
    );

    OutboundEmail {
        to: email.to.to_string(),
        subject,
        text,
        html,
    }
}

pub fn invitation_accepted(email: &InvitationOutcomeEmail<'_>) -> OutboundEmail {
    outcome_email(email, "accepted")
}

pub fn invitation_declined(email: &InvitationOutcomeEmail<'_>) -> OutboundEmail {
    outcome_email(email, "declined")
}

fn outcome_email(email: &InvitationOutcomeEmail<'_>, outcome: &str) -> OutboundEmail {
    let context = email
        .context
        .map(|context| format!(" for {context}"))
        .unwrap_or_default();
    let subject = format!(
        "{} {} your {} invitation",
        email.invitee_email, outcome, email.invitation_kind
    );
    let text = format!(
        "{} has {} your {} invitation{}.\n",
        email.invitee_email, outcome, email.invitation_kind, context
    );
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <p><strong>{invitee}</strong> has {outcome} your {kind} invitation{context}.</p>
</div>"#,
        invitee = email.invitee_email,
        kind = email.invitation_kind,
    );

    OutboundEmail {
        to: email.to.to_string(),
        subject,
        text,
        html,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn workspace_invitation_carries_link_and_message() {
        let rendered = workspace_invitation(&WorkspaceInvitationEmail {
            to: "new@example.com",
            inviter_name: "Jane Doe",
            invite_url: "http://localhost:3000/invite/abc123",
            message: Some("Join us!"),
        });

        assert_eq!(rendered.to, "new@example.com");
        assert_eq!(rendered.subject, "Jane Doe invited you to join Workstream");
        assert!(rendered.text.contains("http://localhost:3000/invite/abc123"));
        assert!(rendered.text.contains("\"Join us!\""));
        assert!(rendered.html.contains("http://localhost:3000/invite/abc123"));
        assert!(rendered.html.contains("Join us!"));
    }

    #[test]
    fn workspace_invitation_without_message_has_no_quote() {
        let rendered = workspace_invitation(&WorkspaceInvitationEmail {
            to: "new@example.com",
            inviter_name: "Jane Doe",
            invite_url: "http://localhost:3000/invite/abc123",
            message: None,
        });

        assert!(!rendered.html.contains("blockquote"));
    }

    #[test]
    fn task_assignment_formats_due_date() {
        let due = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        let rendered = task_assignment(&TaskAssignmentEmail {
            to: "new@example.com",
            inviter_name: "Jane Doe",
            task_title: "Ship release",
            project_name: "Launch",
            invite_url: "http://localhost:3000/invite/abc123",
            due_date: Some(due),
            message: None,
        });

        assert_eq!(rendered.subject, "You've been assigned to: Ship release");
        assert!(rendered.text.contains("Monday, January 5, 2026"));
    }

    #[test]
    fn task_assignment_without_due_date() {
        let rendered = task_assignment(&TaskAssignmentEmail {
            to: "new@example.com",
            inviter_name: "Jane Doe",
            task_title: "Ship release",
            project_name: "Launch",
            invite_url: "http://localhost:3000/invite/abc123",
            due_date: None,
            message: None,
        });

        assert!(rendered.text.contains("No due date set"));
    }

    #[test]
    fn outcome_email_mentions_context() {
        let rendered = invitation_accepted(&InvitationOutcomeEmail {
            to: "inviter@example.com",
            invitee_email: "new@example.com",
            invitation_kind: "project",
            context: Some("Launch"),
        });

        assert_eq!(
            rendered.subject,
            "new@example.com accepted your project invitation"
        );
        assert!(rendered.text.contains("for Launch"));
    }
}
