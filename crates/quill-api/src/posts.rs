use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use quill_db::models::{PostRow, PostWithVotesRow};
use quill_types::api::{PostBody, PostResponse, PostWithVotes, UserOut};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::{parse_timestamp, run_blocking};

#[derive(Debug, Deserialize)]
pub struct PostQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub skip: u32,
    #[serde(default)]
    pub search: String,
}

fn default_limit() -> u32 {
    10
}

fn post_with_votes(row: PostWithVotesRow) -> PostWithVotes {
    PostWithVotes {
        id: row.post.id,
        title: row.post.title,
        content: row.post.content,
        published: row.post.published,
        owner_id: row.post.owner_id,
        created_at: parse_timestamp(&row.post.created_at),
        votes: row.votes,
        owner: UserOut {
            id: row.post.owner_id,
            email: row.owner_email,
            created_at: parse_timestamp(&row.owner_created_at),
        },
    }
}

/// Owner projection for create/update responses, where the caller is the
/// owner by construction.
fn post_response(row: PostRow, owner: &CurrentUser) -> PostResponse {
    PostResponse {
        id: row.id,
        title: row.title,
        content: row.content,
        published: row.published,
        owner_id: row.owner_id,
        created_at: parse_timestamp(&row.created_at),
        owner: owner.to_user_out(),
    }
}

/// Listing is visible to any authenticated user, not owner-filtered.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<Vec<PostWithVotes>>, ApiError> {
    let db = state.clone();
    let rows =
        run_blocking(move || db.db.list_posts(query.limit, query.skip, &query.search)).await?;

    Ok(Json(rows.into_iter().map(post_with_votes).collect()))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<PostBody>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let owner_id = user.id;
    let row = run_blocking(move || {
        db.db
            .create_post(owner_id, &body.title, &body.content, body.published)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(post_response(row, &user))))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<PostWithVotes>, ApiError> {
    let db = state.clone();
    let row = run_blocking(move || db.db.get_post_with_votes(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("post with id: {id} was not found")))?;

    Ok(Json(post_with_votes(row)))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<PostBody>,
) -> Result<Json<PostResponse>, ApiError> {
    let db = state.clone();
    let caller_id = user.id;
    let row = run_blocking(move || {
        db.db
            .update_post(id, caller_id, &body.title, &body.content, body.published)
    })
    .await?;

    Ok(Json(post_response(row, &user)))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(user): Extension<CurrentUser>,
) -> Result<StatusCode, ApiError> {
    let db = state.clone();
    let caller_id = user.id;
    run_blocking(move || db.db.delete_post(id, caller_id)).await?;

    Ok(StatusCode::NO_CONTENT)
}
