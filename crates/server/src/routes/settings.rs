use axum::{
    Json, Router,
    extract::{Extension, State},
    http::StatusCode,
    routing::get,
};
use tracing::instrument;

use api_types::{NotificationSettings, UpdateNotificationSettingsRequest};

use super::error::ErrorResponse;
use crate::{AppState, auth::RequestContext,
    db::notification_settings::NotificationSettingsRepository};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/settings/notifications",
        get(get_settings).put(update_settings),
    )
}

#[instrument(
    name = "settings.get_notification_settings",
    skip(state, ctx),
    fields(user_id = %ctx.user.id)
)]
async fn get_settings(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<NotificationSettings>, ErrorResponse> {
    let settings = NotificationSettingsRepository::get_or_create_default(state.pool(), ctx.user.id)
        .await
        .map_err(|error| {
            tracing::error!(?error, "failed to load notification settings");
            ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        })?;
    Ok(Json(settings))
}

#[instrument(
    name = "settings.update_notification_settings",
    skip(state, ctx, payload),
    fields(user_id = %ctx.user.id)
)]
async fn update_settings(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<UpdateNotificationSettingsRequest>,
) -> Result<Json<NotificationSettings>, ErrorResponse> {
    let settings = NotificationSettingsRepository::update(state.pool(), ctx.user.id, &payload)
        .await
        .map_err(|error| {
            tracing::error!(?error, "failed to update notification settings");
            ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        })?;
    Ok(Json(settings))
}
