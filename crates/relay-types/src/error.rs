//! HTTP error taxonomy shared by both services.
//!
//! Handlers construct errors through these helpers so the status mapping
//! stays uniform: BadRequest and ValidationFailed are 400, NotFound is 404,
//! UpstreamFailure (broker or registry) is 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// An error response with an explicit status and JSON body.
///
/// The body is the exact JSON the client receives; endpoints with bespoke
/// error shapes build it with [`ApiError::with_body`].
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiError {
    pub fn with_body(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// 400 with a plain `{"error": ...}` body.
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: json!({ "error": error.into() }),
        }
    }

    /// 400 with a caller-supplied body (validation failures carry extra
    /// fields such as `details` and `schema`).
    pub fn bad_request_body(body: Value) -> Self {
        Self::with_body(StatusCode::BAD_REQUEST, body)
    }

    /// 404 with a caller-supplied body.
    pub fn not_found(body: Value) -> Self {
        Self::with_body(StatusCode::NOT_FOUND, body)
    }

    /// 500 for broker/registry failures, with the underlying error as
    /// `details`.
    pub fn upstream(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: json!({ "error": error.into(), "details": details.into() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::bad_request("x").status, StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::not_found(json!({"error": "Schema not found"})).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::upstream("Failed to send message", "broker down").status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_body_carries_details() {
        let err = ApiError::upstream("Failed to get topics", "timed out");
        assert_eq!(err.body["error"], json!("Failed to get topics"));
        assert_eq!(err.body["details"], json!("timed out"));
    }
}
