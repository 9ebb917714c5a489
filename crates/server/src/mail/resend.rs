use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::MailConfig;

use super::{MailError, Mailer, OutboundEmail};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Delivers mail through the Resend HTTP API.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: SecretString,
    from: String,
}

#[derive(Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

impl ResendMailer {
    pub fn new(config: &MailConfig) -> Self {
        let from = match &config.from_name {
            Some(name) => format!("{} <{}>", name, config.from_address),
            None => config.from_address.clone(),
        };
        Self {
            client: reqwest::Client::new(),
            api_key: config.resend_api_key.clone(),
            from,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        let body = SendEmailBody {
            from: &self.from,
            to: [&email.to],
            subject: &email.subject,
            text: &email.text,
            html: &email.html,
        };

        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected { status, body });
        }

        Ok(())
    }
}
