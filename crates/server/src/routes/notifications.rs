use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use tracing::instrument;
use uuid::Uuid;

use api_types::{
    ListNotificationsQuery, ListNotificationsResponse, MarkAllReadResponse, Notification,
    UnreadCountResponse,
};

use super::error::ErrorResponse;
use crate::{AppState, auth::RequestContext, db::notifications::NotificationRepository};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/{id}/read", post(mark_read))
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/{id}", delete(delete_notification))
}

#[instrument(
    name = "notifications.list_notifications",
    skip(state, ctx),
    fields(user_id = %ctx.user.id, unread_only = query.unread_only)
)]
async fn list_notifications(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<ListNotificationsResponse>, ErrorResponse> {
    let notifications = NotificationRepository::list_for_user(
        state.pool(),
        ctx.user.id,
        query.unread_only,
        query.limit,
    )
    .await?;
    Ok(Json(ListNotificationsResponse { notifications }))
}

#[instrument(
    name = "notifications.unread_count",
    skip(state, ctx),
    fields(user_id = %ctx.user.id)
)]
async fn unread_count(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<UnreadCountResponse>, ErrorResponse> {
    let count = NotificationRepository::unread_count(state.pool(), ctx.user.id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

#[instrument(
    name = "notifications.mark_read",
    skip(state, ctx),
    fields(user_id = %ctx.user.id, notification_id = %id)
)]
async fn mark_read(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, ErrorResponse> {
    let notification =
        NotificationRepository::mark_read_for_user(state.pool(), id, ctx.user.id).await?;
    Ok(Json(notification))
}

#[instrument(
    name = "notifications.mark_all_read",
    skip(state, ctx),
    fields(user_id = %ctx.user.id)
)]
async fn mark_all_read(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<MarkAllReadResponse>, ErrorResponse> {
    let updated = NotificationRepository::mark_all_read(state.pool(), ctx.user.id).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}

#[instrument(
    name = "notifications.delete_notification",
    skip(state, ctx),
    fields(user_id = %ctx.user.id, notification_id = %id)
)]
async fn delete_notification(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ErrorResponse> {
    NotificationRepository::delete_for_user(state.pool(), id, ctx.user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
