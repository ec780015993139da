//! Session authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use uuid::Uuid;
use vtrack_db::models::user::User;

use crate::auth::cookie::{read_cookie, SESSION_COOKIE};
use crate::auth::token::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user resolved from the session cookie or a Bearer token.
///
/// The user record is reloaded from storage on every request, so role
/// changes and deletions take effect immediately.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user = %user.username(), "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// Session the request was authenticated with.
    pub session_id: Uuid,
}

impl AuthUser {
    /// Display name recorded as the acting identity in activities.
    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;
        let token = read_cookie(headers, SESSION_COOKIE)
            .or_else(|| bearer_token(headers))
            .ok_or_else(|| AppError::unauthorized("Not authenticated"))?;

        let claims = validate_token(token, &state.config.session)
            .map_err(|_| AppError::unauthorized("Invalid or expired session"))?;

        let session = state
            .sessions
            .get(claims.jti)
            .await
            .filter(|s| s.user_id == claims.sub)
            .ok_or_else(|| AppError::unauthorized("Session has ended"))?;

        let user = state
            .storage
            .get_user(session.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

        Ok(AuthUser {
            user,
            session_id: session.id,
        })
    }
}
