//! Typed error handling for the API surface
//!
//! One error type covers the three failure kinds the handlers can produce:
//!
//! - [`ApiError::NotFound`]: missing record or unmatched route, HTTP 404
//! - [`ApiError::BadRequest`]: malformed batch input or body, HTTP 400
//! - [`ApiError::Storage`]: a store operation failed, HTTP 500
//!
//! Every variant renders as a JSON body of the form `{"error": "..."}`.
//! Per-row failures inside an upload batch never become an `ApiError`; they
//! are isolated in the batch report instead.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

/// Error type returned by all HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The addressed resource does not exist
    NotFound(String),

    /// The request body could not be understood
    BadRequest(String),

    /// The backing store failed
    Storage(anyhow::Error),
}

impl ApiError {
    /// Standard not-found error for the per-record routes.
    pub fn invoice_not_found() -> Self {
        ApiError::NotFound("Invoice not found".to_string())
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "{}", msg),
            ApiError::BadRequest(msg) => write!(f, "{}", msg),
            ApiError::Storage(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Storage(err) => err.source(),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Storage(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage(err) = &self {
            tracing::error!(error = %err, "storage operation failed");
        }
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::invoice_not_found().status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadRequest("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Storage(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message() {
        assert_eq!(ApiError::invoice_not_found().to_string(), "Invoice not found");
    }

    #[test]
    fn storage_error_preserves_message() {
        let err: ApiError = anyhow::anyhow!("connection refused").into();
        assert!(err.to_string().contains("connection refused"));
    }
}
