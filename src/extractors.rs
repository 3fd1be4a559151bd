use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::db::models::User;
use crate::db::users;
use crate::error::AppError;
use crate::state::AppState;

/// The currently authenticated identity, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extractor that requires authentication.
/// Verifies the Authorization bearer token and loads the user row;
/// returns 401 before the handler runs on any failure.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts).ok_or(AppError::Unauthorized)?;

        let user_id = state.signer.verify(token).ok_or(AppError::Unauthorized)?;

        let conn = state.db.get()?;
        let user = users::find_by_id(&conn, &user_id)?.ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser(user))
    }
}

fn extract_bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
