//! Handlers for the `/auth` resource (login, logout, me).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderName;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;
use vtrack_db::models::user::User;

use crate::auth::cookie::{clear_session_cookie, session_cookie};
use crate::auth::token::issue_token;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
}

/// `{ "user": ... }` envelope returned by login and me.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// Body returned by logout.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

type WithCookie<T> = ([(HeaderName, String); 1], Json<T>);

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/login
///
/// Establish a session for an existing username and set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AppResult<WithCookie<UserResponse>> {
    let user = state
        .identity
        .authenticate(&input.username)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid username"))?;

    let config = &state.config.session;
    let session = state.sessions.create(user.id, config.ttl()).await;
    let token = issue_token(&session, user.role.as_str(), config)
        .map_err(|e| AppError::InternalError(format!("Failed to sign session token: {e}")))?;

    tracing::info!(user = %user.username, role = %user.role, "User logged in");

    let cookie = session_cookie(&token, config.ttl().num_seconds(), config.cookie_secure);
    Ok(([(SET_COOKIE, cookie)], Json(UserResponse { user })))
}

/// POST /api/auth/logout
///
/// Revoke the current session and clear the cookie.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<WithCookie<LogoutResponse>> {
    state.sessions.revoke(auth.session_id).await;
    tracing::info!(user = %auth.username(), "User logged out");

    let cookie = clear_session_cookie(state.config.session.cookie_secure);
    Ok((
        [(SET_COOKIE, cookie)],
        Json(LogoutResponse {
            message: "Logged out",
        }),
    ))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<UserResponse> {
    Json(UserResponse { user: auth.user })
}
