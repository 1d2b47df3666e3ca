//! API error types mapped to HTTP status codes.
//!
//! Each [`ApiError`] variant maps to a specific HTTP status code and produces
//! a JSON response body `{"error": "message"}`.

use crate::recommender::RecommendError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type that implements `IntoResponse`.
///
/// - `BadRequest` → 400
/// - `NotFound` → 404
/// - `Internal` → 500
#[derive(Debug)]
pub enum ApiError {
    /// Invalid request body or parameters (400).
    BadRequest(String),
    /// Resource not found (404).
    NotFound(String),
    /// Unexpected server error (500).
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<RecommendError> for ApiError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::InvalidQuery(e) => ApiError::BadRequest(e.to_string()),
            RecommendError::CorpusUnavailable(e) => {
                ApiError::Internal(format!("Corpus unavailable: {}", e))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
