//! Handlers for the `/users` resource (admin only).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use vtrack_db::models::user::{CreateUser, User};

use super::auth::UserResponse;
use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.storage.create_user(&input).await?;
    tracing::info!(
        username = %user.username,
        role = %user.role,
        admin = %admin.username(),
        "User created",
    );
    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<User>>> {
    let users = state.storage.list_users().await?;
    Ok(Json(users))
}
