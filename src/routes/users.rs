use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth::handlers::MAX_BIO_LENGTH;
use crate::db::users;
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/me", get(get_me).put(update_me))
        .route("/api/users/{id}", get(get_by_id))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

/// GET /api/users/me — the identity behind the bearer token.
async fn get_me(CurrentUser(user): CurrentUser) -> AppResult<Response> {
    Ok(Json(user).into_response())
}

/// GET /api/users/{id}
async fn get_by_id(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let user =
        users::find_by_id(&conn, &id)?.ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(user).into_response())
}

/// PUT /api/users/me — partial self-service profile update. Existing
/// posts keep the author name they were created with.
async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Response> {
    let name = match req.name.as_deref().map(str::trim) {
        Some("") => return Err(AppError::BadRequest("Name cannot be empty".into())),
        other => other,
    };

    let bio = req.bio.as_deref().map(str::trim);
    if let Some(bio) = bio {
        if bio.chars().count() > MAX_BIO_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Bio too long (max {} characters)",
                MAX_BIO_LENGTH
            )));
        }
    }

    let conn = state.db.get()?;
    let updated = users::update_profile(
        &conn,
        &user.id,
        name,
        bio,
        req.profile_picture.as_deref(),
    )?
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(json!({ "user": updated })).into_response())
}
