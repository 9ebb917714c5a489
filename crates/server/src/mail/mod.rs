//! Outbound email. Delivery is always best-effort: callers log failures and
//! never let a mail error fail the flow that triggered it.

use async_trait::async_trait;
use thiserror::Error;

pub mod resend;
pub mod templates;

pub use resend::ResendMailer;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail provider rejected the message: {status} {body}")]
    Rejected { status: u16, body: String },
}

/// A fully rendered message, ready for a provider.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError>;
}

/// Used when no provider is configured: logs the message instead of sending.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "email delivery disabled, dropping message"
        );
        Ok(())
    }
}
