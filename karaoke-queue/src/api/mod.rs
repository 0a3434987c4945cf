//! HTTP API handlers for karaoke-queue

pub mod health;
pub mod maintenance;
pub mod queue;
pub mod songs;

pub use health::health_routes;
pub use maintenance::normalize_queue;
pub use queue::{list_queue, remove_by_body, remove_by_path, submit_entry};
pub use songs::list_songs;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::error::ApiError;
use crate::AppState;

/// Queue and catalog routes
///
/// Each path answers unsupported methods with 405, an `Allow` header, and a
/// JSON error body.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/queue",
            get(list_queue)
                .post(submit_entry)
                .delete(remove_by_body)
                .fallback(|| async { method_not_allowed("GET, POST, DELETE") }),
        )
        .route(
            "/api/queue/:id",
            delete(remove_by_path).fallback(|| async { method_not_allowed("DELETE") }),
        )
        .route(
            "/api/songs",
            get(list_songs).fallback(|| async { method_not_allowed("GET") }),
        )
        .route(
            "/api/maintenance/normalize-queue",
            post(normalize_queue).fallback(|| async { method_not_allowed("POST") }),
        )
}

fn method_not_allowed(allow: &'static str) -> ApiError {
    ApiError::MethodNotAllowed { allow }
}
