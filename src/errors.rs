use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Error body returned to HTTP clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Gateway")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Additional error details (validation failures, per-line errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

/// Service-level error taxonomy.
///
/// The store is a spreadsheet behind an opaque HTTP endpoint, so remote
/// failures split into transient ones (retried by the submitter) and
/// permanent rejections (surfaced verbatim, never retried). Mapping and
/// aggregation never produce errors at all; malformed cells coerce to safe
/// defaults so one bad row cannot blank a whole view.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Retryable remote-store failure (busy/quota/rate/timeout/429/503).
    #[error("Transient store error: {0}")]
    Transient(String),

    /// Permanent remote-store rejection; the server-provided message is kept.
    #[error("Store error: {0}")]
    Store(String),

    /// Connectivity failure talking to the store.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether this error may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::Transient(_))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Store(_) | ServiceError::Network(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // Timeouts match the transient-error pattern the retry policy uses.
            ServiceError::Transient(format!("request timeout: {err}"))
        } else if err.is_connect() {
            ServiceError::Network(format!("connection failed: {err}"))
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            message: self.to_string(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        };
        tracing::warn!(status = %status, error = %body.message, "request failed");
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_flagged() {
        assert!(ServiceError::Transient("busy".into()).is_transient());
        assert!(!ServiceError::Store("rejected".into()).is_transient());
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            ServiceError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Transient("quota".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServiceError::Store("rejected".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
