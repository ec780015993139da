use axum::extract::State;
use axum::Json;
use vtrack_db::models::stats::ServiceStats;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/stats
pub async fn get(State(state): State<AppState>, _auth: AuthUser) -> AppResult<Json<ServiceStats>> {
    let stats = state.storage.get_stats().await?;
    Ok(Json(stats))
}
