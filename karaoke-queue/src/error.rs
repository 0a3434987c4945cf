//! HTTP error mapping for the queue service
//!
//! | Error | Status |
//! |---|---|
//! | BadRequest | 400 |
//! | QueueFull | 403 |
//! | NotFound | 404 |
//! | MethodNotAllowed | 405 |
//! | Store, Encode, Catalog | 500 |
//!
//! Server-side failures carry only a generic message in the response body;
//! the detail goes to the log.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::queue::QueueError;
use crate::store::StoreError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or mistyped request fields (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Queue at capacity (403)
    #[error("Queue is full ({capacity} entries)")]
    QueueFull { capacity: usize },

    /// Unknown queue entry (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Method not routed for this path (405)
    #[error("Method not allowed; allowed: {allow}")]
    MethodNotAllowed { allow: &'static str },

    /// List store failure (500)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Entry serialization failure (500)
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Song catalog failure (500)
    #[error("Catalog error: {0}")]
    Catalog(#[from] karaoke_common::Error),
}

impl From<QueueError> for ApiError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Validation(msg) => ApiError::BadRequest(msg),
            QueueError::Capacity { capacity } => ApiError::QueueFull { capacity },
            QueueError::NotFound(id) => ApiError::NotFound(format!("queue entry '{}'", id)),
            QueueError::Encode(e) => ApiError::Encode(e),
            QueueError::Store(e) => ApiError::Store(e),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::QueueFull { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Store(_) | ApiError::Encode(_) | ApiError::Catalog(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Log the failure of `operation` on `subject` at a level matching its status
    pub fn log(&self, operation: &str, subject: &str) {
        if self.status().is_server_error() {
            error!(operation, subject, error = %self, "Request failed");
        } else {
            warn!(operation, subject, error = %self, "Request rejected");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg.clone()),
            ApiError::QueueFull { .. } => ("QUEUE_FULL", self.to_string()),
            ApiError::NotFound(_) => ("NOT_FOUND", "Entry not found".to_string()),
            ApiError::MethodNotAllowed { .. } => ("METHOD_NOT_ALLOWED", self.to_string()),
            ApiError::Store(_) | ApiError::Encode(_) | ApiError::Catalog(_) => {
                ("INTERNAL_ERROR", "Server error".to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        let mut response = (status, body).into_response();
        if let ApiError::MethodNotAllowed { allow } = self {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
