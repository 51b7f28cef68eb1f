use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use quill_db::StoreError;

/// Request-level failures, mapped one-to-one onto response statuses. The
/// body is always `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("User with this email already exists")]
    DuplicateEmail,

    /// Deliberately vague: never reveals whether the email or the password
    /// was wrong.
    #[error("Invalid Credentials")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("Not authorized to perform requested action")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::DuplicateEmail => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "detail": self.to_string() }));

        if matches!(self, ApiError::Unauthorized) {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }

        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ApiError::DuplicateEmail,
            StoreError::PostNotFound(id) => {
                ApiError::NotFound(format!("post with id: {id} was not found"))
            }
            StoreError::VoteNotFound => ApiError::NotFound("Vote does not exist".into()),
            StoreError::DuplicateVote { post_id, user_id } => ApiError::Conflict(format!(
                "user {user_id} has already voted on post {post_id}"
            )),
            StoreError::NotOwner => ApiError::Forbidden,
            StoreError::LockPoisoned | StoreError::Sqlite(_) => {
                error!("store failure: {err}");
                ApiError::Internal
            }
        }
    }
}
