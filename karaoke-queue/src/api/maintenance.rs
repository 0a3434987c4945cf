//! Maintenance endpoints

use axum::{extract::State, Json};

use crate::error::{ApiError, ApiResult};
use crate::queue::NormalizeReport;
use crate::AppState;

/// POST /api/maintenance/normalize-queue
///
/// Rewrites non-canonical stored entries in place, keeping their order. Same
/// best-effort rewrite as normalize-on-read, run on demand.
pub async fn normalize_queue(State(state): State<AppState>) -> ApiResult<Json<NormalizeReport>> {
    state.queue.normalize().await.map(Json).map_err(|e| {
        let err = ApiError::from(e);
        err.log("normalize", "queue");
        err
    })
}
