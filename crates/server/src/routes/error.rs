use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::db::notifications::NotificationError;
use crate::invitations::InvitationFlowError;

#[derive(Debug)]
pub struct ErrorResponse {
    status: StatusCode,
    message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<InvitationFlowError> for ErrorResponse {
    fn from(error: InvitationFlowError) -> Self {
        let status = match &error {
            InvitationFlowError::NotFound
            | InvitationFlowError::TaskNotFound
            | InvitationFlowError::ProjectNotFound => StatusCode::NOT_FOUND,
            InvitationFlowError::UserAlreadyExists
            | InvitationFlowError::AlreadyInvited(_)
            | InvitationFlowError::InvalidState(_) => StatusCode::CONFLICT,
            InvitationFlowError::NotAuthorized => StatusCode::FORBIDDEN,
            InvitationFlowError::InvalidScope(_) => StatusCode::UNPROCESSABLE_ENTITY,
            InvitationFlowError::Expired => StatusCode::GONE,
            InvitationFlowError::User(_)
            | InvitationFlowError::Project(_)
            | InvitationFlowError::ProjectMember(_)
            | InvitationFlowError::Task(_)
            | InvitationFlowError::Invitation(_) => {
                tracing::error!(?error, "invitation flow failed");
                return ErrorResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error",
                );
            }
        };
        ErrorResponse::new(status, error.to_string())
    }
}

impl From<NotificationError> for ErrorResponse {
    fn from(error: NotificationError) -> Self {
        match error {
            NotificationError::NotFound => {
                ErrorResponse::new(StatusCode::NOT_FOUND, "notification not found")
            }
            NotificationError::NotAuthorized => {
                ErrorResponse::new(StatusCode::FORBIDDEN, "notification belongs to another user")
            }
            NotificationError::Database(error) => {
                tracing::error!(?error, "notification query failed");
                ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}
