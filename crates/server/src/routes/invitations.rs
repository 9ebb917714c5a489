use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    routing::{get, post},
};
use tracing::instrument;
use uuid::Uuid;

use api_types::{Invitation, ListInvitationsResponse, SendInvitationRequest};

use super::error::ErrorResponse;
use crate::{AppState, auth::RequestContext};

/// Routes that require a bearer token.
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/invitations", post(send_invitation).get(list_invitations))
        .route("/projects/{project_id}/invitations", get(list_project_invitations))
        .route("/invitations/token/{token}/accept", post(accept_invitation))
        .route("/invitations/{id}/cancel", post(cancel_invitation))
        .route("/invitations/{id}/resend", post(resend_invitation))
}

/// Token-keyed routes reachable without an account. The invite page has to
/// work for people who have never signed in.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/invitations/token/{token}", get(lookup_invitation))
        .route("/invitations/token/{token}/decline", post(decline_invitation))
}

#[instrument(
    name = "invitations.send_invitation",
    skip(state, ctx, payload),
    fields(user_id = %ctx.user.id, invitation_type = %payload.invitation_type)
)]
async fn send_invitation(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<SendInvitationRequest>,
) -> Result<Json<Invitation>, ErrorResponse> {
    let invitation = state.invitations().send(&ctx.user, &payload).await?;
    Ok(Json(invitation))
}

#[instrument(
    name = "invitations.list_invitations",
    skip(state, ctx),
    fields(user_id = %ctx.user.id)
)]
async fn list_invitations(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<ListInvitationsResponse>, ErrorResponse> {
    let invitations = state.invitations().list_for_inviter(ctx.user.id).await?;
    Ok(Json(ListInvitationsResponse { invitations }))
}

#[instrument(
    name = "invitations.list_project_invitations",
    skip(state, ctx),
    fields(user_id = %ctx.user.id, project_id = %project_id)
)]
async fn list_project_invitations(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ListInvitationsResponse>, ErrorResponse> {
    let invitations = state
        .invitations()
        .list_for_project(ctx.user.id, project_id)
        .await?;
    Ok(Json(ListInvitationsResponse { invitations }))
}

#[instrument(name = "invitations.lookup_invitation", skip(state, token))]
async fn lookup_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Option<Invitation>>, ErrorResponse> {
    let invitation = state.invitations().lookup(&token).await?;
    Ok(Json(invitation))
}

#[instrument(
    name = "invitations.accept_invitation",
    skip(state, ctx, token),
    fields(user_id = %ctx.user.id)
)]
async fn accept_invitation(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(token): Path<String>,
) -> Result<Json<Invitation>, ErrorResponse> {
    let invitation = state.invitations().accept(&ctx.user, &token).await?;
    Ok(Json(invitation))
}

#[instrument(name = "invitations.decline_invitation", skip(state, token))]
async fn decline_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Invitation>, ErrorResponse> {
    let invitation = state.invitations().decline(&token).await?;
    Ok(Json(invitation))
}

#[instrument(
    name = "invitations.cancel_invitation",
    skip(state, ctx),
    fields(user_id = %ctx.user.id, invitation_id = %id)
)]
async fn cancel_invitation(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Invitation>, ErrorResponse> {
    let invitation = state.invitations().cancel(ctx.user.id, id).await?;
    Ok(Json(invitation))
}

#[instrument(
    name = "invitations.resend_invitation",
    skip(state, ctx),
    fields(user_id = %ctx.user.id, invitation_id = %id)
)]
async fn resend_invitation(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Invitation>, ErrorResponse> {
    let invitation = state.invitations().resend(&ctx.user, id).await?;
    Ok(Json(invitation))
}
