//! Queue endpoints
//!
//! - `GET /api/queue` - ordered canonical entries
//! - `POST /api/queue` - submit `{name, songTitle}`
//! - `DELETE /api/queue` - remove by body `{id}`
//! - `DELETE /api/queue/:id` - remove by path segment

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::queue::QueueEntry;
use crate::AppState;

/// Deletion confirmation
#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub message: String,
    pub id: String,
}

/// GET /api/queue
pub async fn list_queue(State(state): State<AppState>) -> ApiResult<Json<Vec<QueueEntry>>> {
    let entries = state.queue.list().await.map_err(|e| {
        let err = ApiError::from(e);
        err.log("list", "queue");
        err
    })?;

    debug!(entries = entries.len(), "Queue listed");
    Ok(Json(entries))
}

/// POST /api/queue
///
/// Body is parsed by hand so malformed JSON is reported as 400 like any other
/// invalid submission.
pub async fn submit_entry(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<QueueEntry>)> {
    let result = async {
        let body = parse_body(&body)?;
        Ok::<_, ApiError>(state.queue.submit(&body).await?)
    }
    .await;

    match result {
        Ok(entry) => Ok((StatusCode::CREATED, Json(entry))),
        Err(err) => {
            err.log("submit", "queue");
            Err(err)
        }
    }
}

/// DELETE /api/queue with body `{"id": ...}`
pub async fn remove_by_body(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<RemovedResponse>> {
    let id = match parse_body(&body).and_then(|value| id_from_body(&value)) {
        Ok(id) => id,
        Err(err) => {
            err.log("remove", "<missing id>");
            return Err(err);
        }
    };

    remove(&state, id).await
}

/// DELETE /api/queue/:id
pub async fn remove_by_path(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RemovedResponse>> {
    remove(&state, id).await
}

async fn remove(state: &AppState, id: String) -> ApiResult<Json<RemovedResponse>> {
    match state.queue.remove(&id).await {
        Ok(()) => Ok(Json(RemovedResponse {
            message: "Entry removed".to_string(),
            id,
        })),
        Err(e) => {
            let err = ApiError::from(e);
            err.log("remove", &id);
            Err(err)
        }
    }
}

/// Empty bodies read as JSON null
fn parse_body(body: &[u8]) -> ApiResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|_| ApiError::BadRequest("body is not valid JSON".to_string()))
}

/// Deletion id from a body: a non-blank string or a number
fn id_from_body(body: &Value) -> ApiResult<String> {
    match body.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(ApiError::BadRequest("id is required".to_string())),
    }
}
