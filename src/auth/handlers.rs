use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::password;
use crate::db::models::User;
use crate::db::users;
use crate::error::{conflict_on_unique, AppError, AppResult};
use crate::state::AppState;

pub const MAX_BIO_LENGTH: usize = 500;
pub const MIN_PASSWORD_LENGTH: usize = 6;

// -- Request/Response types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub bio: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// -- Handlers --

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Response> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }

    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("A valid email is required".into()));
    }

    if req.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let bio = req.bio.as_deref().map(str::trim).filter(|b| !b.is_empty());
    if let Some(bio) = bio {
        if bio.chars().count() > MAX_BIO_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Bio too long (max {} characters)",
                MAX_BIO_LENGTH
            )));
        }
    }

    let password_hash = password::hash_password(&req.password)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

    let conn = state.db.get()?;
    // Duplicate email races resolve at the unique index, not here.
    let user = users::insert_user(&conn, name, email, &password_hash, bio)
        .map_err(|e| conflict_on_unique(e, "Email already registered"))?;

    let token = state
        .signer
        .issue(&user.id)
        .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))?;

    tracing::info!("Registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })).into_response())
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Response> {
    let conn = state.db.get()?;

    let user = match users::find_by_email(&conn, req.email.trim())? {
        Some(user) if password::verify_password(&req.password, &user.password_hash) => user,
        Some(_) => return Err(AppError::InvalidCredentials),
        None => {
            // Same cost and same error as a wrong password.
            password::verify_dummy(&req.password);
            return Err(AppError::InvalidCredentials);
        }
    };

    let token = state
        .signer
        .issue(&user.id)
        .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))?;

    Ok((StatusCode::OK, Json(AuthResponse { token, user })).into_response())
}
