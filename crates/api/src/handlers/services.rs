//! Handlers for the `/services` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use vtrack_db::models::service::{CreateService, Service, UpdateService, UpdateServiceVersion};

use super::parse_id;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Body returned by a successful delete.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
}

/// GET /api/services
pub async fn list(State(state): State<AppState>, _auth: AuthUser) -> AppResult<Json<Vec<Service>>> {
    let services = state.storage.get_all_services().await?;
    Ok(Json(services))
}

/// GET /api/services/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Service>> {
    let service = match parse_id(&id) {
        Some(id) => state.storage.get_service(id).await?,
        None => None,
    };
    service
        .map(Json)
        .ok_or_else(|| AppError::not_found("Service", id))
}

/// POST /api/services
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateService>,
) -> AppResult<(StatusCode, Json<Service>)> {
    let service = state
        .storage
        .create_service_with_activity(&input, auth.username())
        .await?;
    tracing::info!(service = %service.name, user = %auth.username(), "Service created");
    Ok((StatusCode::CREATED, Json(service)))
}

/// PUT /api/services/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateService>,
) -> AppResult<Json<Service>> {
    let id = parse_id(&id).ok_or_else(|| AppError::not_found("Service", &id))?;
    let service = state
        .storage
        .update_service(id, &input, auth.username())
        .await?;
    tracing::info!(service = %service.name, user = %auth.username(), "Service updated");
    Ok(Json(service))
}

/// DELETE /api/services/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<DeletedResponse>> {
    let id = parse_id(&id).ok_or_else(|| AppError::not_found("Service", &id))?;
    state.storage.delete_service(id, auth.username()).await?;
    tracing::info!(service_id = %id, user = %auth.username(), "Service deleted");
    Ok(Json(DeletedResponse {
        message: "Service deleted",
    }))
}

/// PATCH /api/services/version
///
/// Deploy a version to one environment of the named service.
pub async fn update_version(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<UpdateServiceVersion>,
) -> AppResult<Json<Service>> {
    let change = input.by(auth.username());
    let service = state.storage.update_service_version(&change).await?;
    tracing::info!(
        service = %change.service_name,
        environment = %change.environment,
        version = %change.version,
        user = %change.user,
        "Service version changed",
    );
    Ok(Json(service))
}
