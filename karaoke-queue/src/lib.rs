//! karaoke-queue library - song request queue service
//!
//! Exposes the router and application state for the binary and for
//! integration tests.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod config;
pub mod error;
pub mod queue;
pub mod store;

pub use crate::error::{ApiError, ApiResult};

use crate::queue::{QueueService, QueueSettings};
use crate::store::ListStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Request queue over the configured list store
    pub queue: Arc<QueueService>,
    /// Service database (song catalog)
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, store: Arc<dyn ListStore>, settings: QueueSettings) -> Self {
        Self {
            queue: Arc::new(QueueService::new(store, settings)),
            db,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::api_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
