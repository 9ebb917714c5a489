use std::env;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use secrecy::SecretString;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable `{0}` is not set")]
    MissingVar(&'static str),
    #[error("invalid value for environment variable `{0}`")]
    InvalidVar(&'static str),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub listen_addr: String,
    /// Base URL of the web app; invitation links are `<base>/invite/<token>`.
    pub app_public_base_url: String,
    pub jwt_secret: SecretString,
    pub mail: Option<MailConfig>,
    /// Hour (UTC) at which the daily reminder sweep runs.
    pub reminder_hour_utc: u32,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub resend_api_key: SecretString,
    pub from_address: String,
    pub from_name: Option<String>,
}

impl MailConfig {
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let resend_api_key = match env::var("RESEND_API_KEY") {
            Ok(v) if !v.is_empty() => v,
            _ => {
                tracing::info!("RESEND_API_KEY not set, outbound email disabled");
                return Ok(None);
            }
        };

        let from_address = env::var("RESEND_FROM_EMAIL")
            .map_err(|_| ConfigError::MissingVar("RESEND_FROM_EMAIL"))?;

        let from_name = env::var("RESEND_FROM_NAME").ok();

        tracing::info!(from_address = %from_address, "mail config loaded successfully");

        Ok(Some(Self {
            resend_api_key: SecretString::new(resend_api_key.into()),
            from_address,
            from_name,
        }))
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:workstream.db?mode=rwc".to_string());

        let listen_addr =
            env::var("SERVER_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let app_public_base_url =
            env::var("APP_PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let jwt_secret = env::var("WORKSTREAM_JWT_SECRET")
            .map_err(|_| ConfigError::MissingVar("WORKSTREAM_JWT_SECRET"))?;
        validate_jwt_secret(&jwt_secret)?;
        let jwt_secret = SecretString::new(jwt_secret.into());

        let mail = MailConfig::from_env()?;

        let reminder_hour_utc = match env::var("REMINDER_HOUR_UTC") {
            Ok(v) => {
                let hour: u32 = v
                    .parse()
                    .map_err(|_| ConfigError::InvalidVar("REMINDER_HOUR_UTC"))?;
                if hour >= 24 {
                    return Err(ConfigError::InvalidVar("REMINDER_HOUR_UTC"));
                }
                hour
            }
            Err(_) => 13,
        };

        Ok(Self {
            database_url,
            listen_addr,
            app_public_base_url,
            jwt_secret,
            mail,
            reminder_hour_utc,
        })
    }
}

fn validate_jwt_secret(secret: &str) -> Result<(), ConfigError> {
    let decoded = BASE64_STANDARD
        .decode(secret.as_bytes())
        .map_err(|_| ConfigError::InvalidVar("WORKSTREAM_JWT_SECRET"))?;

    if decoded.len() < 32 {
        return Err(ConfigError::InvalidVar("WORKSTREAM_JWT_SECRET"));
    }

    Ok(())
}
