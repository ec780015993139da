//! Handlers for the `/activities` resource.

use axum::extract::State;
use axum::Json;
use vtrack_db::models::activity::Activity;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/activities
///
/// Newest first.
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<Vec<Activity>>> {
    let activities = state.storage.get_all_activities().await?;
    Ok(Json(activities))
}
