//! Handlers for the `/requests` resource (rollout tickets).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use vtrack_db::models::request::{CreateRequest, Request, UpdateRequest};

use super::services::DeletedResponse;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/requests
pub async fn list(State(state): State<AppState>, _auth: AuthUser) -> AppResult<Json<Vec<Request>>> {
    let requests = state.storage.list_requests().await?;
    Ok(Json(requests))
}

/// GET /api/requests/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Request>> {
    state
        .storage
        .get_request(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Request", id))
}

/// POST /api/requests
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateRequest>,
) -> AppResult<(StatusCode, Json<Request>)> {
    let request = state.storage.create_request(&input).await?;
    tracing::info!(request_id = %request.id, user = %auth.username(), "Request created");
    Ok((StatusCode::CREATED, Json(request)))
}

/// PUT /api/requests/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateRequest>,
) -> AppResult<Json<Request>> {
    let request = state.storage.update_request(&id, &input).await?;
    tracing::info!(request_id = %request.id, user = %auth.username(), "Request updated");
    Ok(Json(request))
}

/// DELETE /api/requests/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<DeletedResponse>> {
    state.storage.delete_request(&id).await?;
    tracing::info!(request_id = %id, user = %auth.username(), "Request deleted");
    Ok(Json(DeletedResponse {
        message: "Request deleted",
    }))
}
