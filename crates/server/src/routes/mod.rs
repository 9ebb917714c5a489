use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};

use crate::{AppState, auth::require_auth};

pub mod error;
pub mod invitations;
pub mod notifications;
pub mod settings;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(invitations::protected_router())
        .merge(notifications::router())
        .merge(settings::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .merge(invitations::public_router())
        .merge(protected)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
