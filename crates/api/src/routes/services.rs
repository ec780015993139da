//! Route definitions for the `/services` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::services;
use crate::state::AppState;

/// Routes mounted at `/services`.
///
/// ```text
/// GET    /          -> list
/// POST   /          -> create
/// PATCH  /version   -> update_version
/// GET    /{id}      -> get_by_id
/// PUT    /{id}      -> update
/// DELETE /{id}      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(services::list).post(services::create))
        .route("/version", patch(services::update_version))
        .route(
            "/{id}",
            get(services::get_by_id)
                .put(services::update)
                .delete(services::delete),
        )
}
