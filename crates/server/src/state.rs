use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{
    auth::JwtService, config::ServerConfig, invitations::InvitationService, mail::Mailer,
};

#[derive(Clone)]
pub struct AppState {
    pool: SqlitePool,
    config: Arc<ServerConfig>,
    jwt: Arc<JwtService>,
    mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        config: ServerConfig,
        jwt: Arc<JwtService>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            jwt,
            mailer,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn jwt(&self) -> Arc<JwtService> {
        Arc::clone(&self.jwt)
    }

    pub fn invitations(&self) -> InvitationService {
        InvitationService::new(
            self.pool.clone(),
            Arc::clone(&self.mailer),
            self.config.app_public_base_url.clone(),
        )
    }
}
