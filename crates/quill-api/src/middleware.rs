use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};

use quill_types::api::UserOut;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::{parse_timestamp, run_blocking};

/// The authenticated caller for the current request, loaded from the
/// database at token-validation time.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl CurrentUser {
    pub(crate) fn to_user_out(&self) -> UserOut {
        UserOut {
            id: self.id,
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

/// Extract and validate the bearer token, then resolve it to a live user
/// row. A token whose user no longer exists is rejected the same as an
/// invalid one.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    let claims = state
        .tokens
        .validate(token)
        .map_err(|_| ApiError::Unauthorized)?;

    let db = state.clone();
    let user = run_blocking(move || db.db.get_user_by_id(claims.user_id))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        created_at: parse_timestamp(&user.created_at),
    });

    Ok(next.run(req).await)
}
