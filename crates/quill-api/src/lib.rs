pub mod auth;
pub mod error;
pub mod middleware;
pub mod password;
pub mod posts;
pub mod token;
pub mod users;
pub mod votes;

use axum::{
    Json, Router,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::json;
use tracing::{error, warn};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::require_auth;

/// Full application router: public routes (registration, user lookup,
/// login) and protected routes behind the auth middleware.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/users/", post(users::create_user))
        .route("/users/{id}", get(users::get_user))
        .route("/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/posts/", get(posts::list_posts).post(posts::create_post))
        .route(
            "/posts/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/vote/", post(votes::vote))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to my API" }))
}

/// Run blocking rusqlite work off the async runtime.
pub(crate) async fn run_blocking<T, E, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(Into::into),
        Err(e) => {
            error!("spawn_blocking join error: {e}");
            Err(ApiError::Internal)
        }
    }
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone;
/// accept RFC 3339 first, then fall back to naive UTC.
pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("corrupt created_at '{raw}': {e}");
            DateTime::default()
        })
}
