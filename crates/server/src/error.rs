use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use resolver::{ResolveError, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        StoreError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Store(err) => store_status(err),
            ServerError::Resolve(err) => match err {
                ResolveError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                // Lookup failures are reported as gateway errors, like any other store miss.
                ResolveError::NotFound { .. } => StatusCode::BAD_GATEWAY,
                ResolveError::NoVectorsResolved => StatusCode::NOT_FOUND,
                ResolveError::DimensionMismatch { .. } | ResolveError::UpstreamProtocol(_) => {
                    StatusCode::BAD_GATEWAY
                }
                ResolveError::Upstream(store) => store_status(store),
                ResolveError::UnsupportedMetric { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::NotFound(_) => "NOT_FOUND",
            ServerError::Unavailable(_) => "SERVICE_UNAVAILABLE",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::Store(StoreError::Timeout) => "UPSTREAM_TIMEOUT",
            ServerError::Store(StoreError::Protocol(_)) => "UPSTREAM_PROTOCOL_ERROR",
            ServerError::Store(_) => "UPSTREAM_ERROR",
            ServerError::Resolve(err) => match err {
                ResolveError::InvalidInput(_) => "INVALID_INPUT",
                ResolveError::NotFound { .. } => "CARD_NOT_FOUND",
                ResolveError::NoVectorsResolved => "NO_VECTORS_RESOLVED",
                ResolveError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
                ResolveError::Upstream(StoreError::Timeout) => "UPSTREAM_TIMEOUT",
                ResolveError::Upstream(_) => "UPSTREAM_ERROR",
                ResolveError::UpstreamProtocol(_) => "UPSTREAM_PROTOCOL_ERROR",
                ResolveError::UnsupportedMetric { .. } => "UNSUPPORTED_METRIC",
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::warn!(status = %status, code = %error_code, error = %message, "request failed");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::BadRequest(format!("JSON parse error: {err}"))
    }
}
