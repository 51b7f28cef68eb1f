use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use quill_types::api::{VoteRequest, VoteResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::run_blocking;

/// Single toggle-style endpoint: dir=1 adds the caller's vote, dir=0
/// removes it. The ledger itself only knows add and remove.
pub async fn vote(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<VoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.dir > 1 {
        return Err(ApiError::Validation("dir must be 0 or 1".into()));
    }

    let db = state.clone();
    let user_id = user.id;
    let message = if req.dir == 1 {
        run_blocking(move || db.db.add_vote(req.post_id, user_id)).await?;
        "successfully added vote"
    } else {
        run_blocking(move || db.db.remove_vote(req.post_id, user_id)).await?;
        "successfully deleted vote"
    };

    Ok((
        StatusCode::CREATED,
        Json(VoteResponse {
            message: message.into(),
        }),
    ))
}
