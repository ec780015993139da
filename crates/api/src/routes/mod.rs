pub mod auth;
pub mod health;
pub mod requests;
pub mod services;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                  login (public)
/// /auth/logout                 logout (session)
/// /auth/me                     current user (session)
///
/// /services                    list, create
/// /services/version            deploy a version (PATCH)
/// /services/{id}               get, update, delete
///
/// /activities                  list, newest first
/// /stats                       dashboard counters
///
/// /requests                    list, create
/// /requests/{id}               get, update, delete
///
/// /users                       list, create (admin only)
/// ```
///
/// Everything outside `/auth/login` requires a session.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/services", services::router())
        .route("/activities", get(handlers::activities::list))
        .route("/stats", get(handlers::stats::get))
        .nest("/requests", requests::router())
        .nest("/users", users::router())
}
