use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

use quill_db::models::UserRow;
use quill_types::api::{CreateUserRequest, UserOut};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::{parse_timestamp, password, run_blocking};

pub(crate) fn user_out(row: &UserRow) -> UserOut {
    UserOut {
        id: row.id,
        email: row.email.clone(),
        created_at: parse_timestamp(&row.created_at),
    }
}

/// Registration. The email unique constraint closes the
/// check-then-insert race; the response never carries the hash.
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let CreateUserRequest { email, password } = req;

    let user = run_blocking(move || {
        let digest = password::hash(&password).map_err(|e| {
            error!("password hashing failed: {e}");
            ApiError::Internal
        })?;
        db.db.create_user(&email, &digest).map_err(ApiError::from)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(user_out(&user))))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserOut>, ApiError> {
    let db = state.clone();
    let user = run_blocking(move || db.db.get_user_by_id(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user with id: {id} was not found")))?;

    Ok(Json(user_out(&user)))
}
