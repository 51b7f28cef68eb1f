use std::sync::Arc;

use axum::{Form, Json, extract::State};
use tracing::error;

use quill_db::Database;
use quill_types::api::{LoginForm, TokenResponse};

use crate::error::ApiError;
use crate::token::TokenService;
use crate::{password, run_blocking};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenService,
}

/// OAuth2 password-flow login: form-encoded `username` (the email) and
/// `password`. Unknown email and wrong password are indistinguishable in
/// the response.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let db = state.clone();
    let LoginForm { username, password } = form;

    // Lookup and argon2 verification both run off the async runtime.
    let user = run_blocking(move || {
        let user = db
            .db
            .get_user_by_email(&username)
            .map_err(ApiError::from)?
            .ok_or(ApiError::InvalidCredentials)?;

        if !password::verify(&password, &user.password) {
            return Err(ApiError::InvalidCredentials);
        }
        Ok(user)
    })
    .await?;

    let token = state.tokens.issue(user.id).map_err(|e| {
        error!("token issue failed: {e}");
        ApiError::Internal
    })?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".into(),
    }))
}
