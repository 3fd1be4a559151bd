use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::db::posts::{self, FEED_LIMIT};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub const MAX_POST_LENGTH: usize = 1000;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_feed).post(create_post))
        .route("/api/posts/user/{user_id}", get(list_by_user))
        .route("/api/posts/{id}/like", post(toggle_like))
        .route("/api/posts/{id}/comment", post(add_comment))
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct AddCommentRequest {
    pub text: String,
}

/// GET /api/posts — the global feed, newest first, capped.
async fn list_feed(State(state): State<AppState>, _user: CurrentUser) -> AppResult<Response> {
    let conn = state.db.get()?;
    let views = posts::list_recent(&conn, FEED_LIMIT)?;
    Ok(Json(views).into_response())
}

/// GET /api/posts/user/{user_id} — one author's posts, newest first.
async fn list_by_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(user_id): Path<String>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let views = posts::list_by_author(&conn, &user_id)?;
    Ok(Json(views).into_response())
}

/// POST /api/posts
async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<Response> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("Post content is required".into()));
    }
    if content.chars().count() > MAX_POST_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Post content too long (max {} characters)",
            MAX_POST_LENGTH
        )));
    }

    let conn = state.db.get()?;
    let post = posts::insert_post(&conn, &user, content)?;
    let view = posts::get_view(&conn, &post.id)?
        .ok_or_else(|| AppError::Internal("Post vanished after insert".into()))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Post created successfully", "post": view })),
    )
        .into_response())
}

/// POST /api/posts/{id}/like — flips the caller's like on the post.
async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let mut conn = state.db.get()?;
    let liked = posts::toggle_like(&mut conn, &id, &user.id)?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    let view = posts::get_view(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    let message = if liked { "Post liked" } else { "Post unliked" };
    Ok(Json(json!({ "message": message, "post": view })).into_response())
}

/// POST /api/posts/{id}/comment
async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<AddCommentRequest>,
) -> AppResult<Response> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("Comment text is required".into()));
    }

    let conn = state.db.get()?;
    posts::add_comment(&conn, &id, &user, text)?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    let view = posts::get_view(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    Ok(Json(json!({ "message": "Comment added successfully", "post": view })).into_response())
}
