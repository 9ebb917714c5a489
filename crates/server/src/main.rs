use std::sync::Arc;

use anyhow::Context;
use server::{
    AppState, Server,
    auth::JwtService,
    config::ServerConfig,
    init_tracing,
    mail::{LogMailer, Mailer, ResendMailer},
    reminders::ReminderService,
};
use sqlx::sqlite::SqlitePoolOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::from_env().context("failed to load configuration")?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("failed to open database")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let jwt = Arc::new(JwtService::new(&config.jwt_secret));
    let mailer: Arc<dyn Mailer> = match &config.mail {
        Some(mail_config) => Arc::new(ResendMailer::new(mail_config)),
        None => Arc::new(LogMailer),
    };

    ReminderService::spawn(pool.clone(), config.reminder_hour_utc);

    let addr = config
        .listen_addr
        .parse()
        .context("invalid SERVER_LISTEN_ADDR")?;
    let state = AppState::new(pool, config, jwt, mailer);

    Server::new(state).serve(addr).await
}
