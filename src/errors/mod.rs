//! Unified error handling with consistent API response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error detail in the API response envelope.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Consistent JSON envelope for all API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a successful result in the envelope.
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            data: Some(data),
            error: None,
        })
    }

    /// Wrap an error in the envelope.
    pub fn error(code: &str, message: &str) -> Json<Self> {
        Json(Self {
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        })
    }
}

/// Failure of a single call against the remote content API.
///
/// Access failures (`PermissionDenied`, `NotFound`) are kept apart from
/// transport failures so callers can absorb them per content type.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl QueryError {
    /// Check if the caller is not allowed to see the resource.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_) | Self::NotFound(_))
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Top-level failure of one statistics aggregation run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AggregationError {
    #[error("dependencies unavailable")]
    DependenciesUnavailable,

    /// A count or pagination call failed; carries the underlying message verbatim.
    #[error("{0}")]
    Transport(#[from] QueryError),
}

/// Application error type mapping to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, ApiResponse::<()>::error(code, &message)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_response_success() {
        let response = ApiResponse::success("hello");
        let json = serde_json::to_value(&response.0).unwrap();
        assert_eq!(json["data"], "hello");
        assert!(json["error"].is_null());
    }

    #[test]
    fn api_response_error() {
        let response = ApiResponse::<()>::error("NOT_FOUND", "Item not found");
        let json = serde_json::to_value(&response.0).unwrap();
        assert!(json["data"].is_null());
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "Item not found");
    }

    #[test]
    fn app_error_status_codes() {
        let resp = AppError::Unavailable("no stack".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let resp = AppError::Internal("boom".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn internal_error_body_hides_detail() {
        let resp = AppError::Internal("serializer exploded".to_string()).into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["data"].is_null());
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[test]
    fn access_failures_are_distinct_from_transport() {
        assert!(QueryError::PermissionDenied("ct".to_string()).is_access_denied());
        assert!(QueryError::NotFound("ct".to_string()).is_access_denied());
        assert!(!QueryError::Transport("timeout".to_string()).is_access_denied());
        assert!(!QueryError::Decode("bad json".to_string()).is_access_denied());
    }

    #[test]
    fn transport_message_passes_through_verbatim() {
        let err: AggregationError = QueryError::Transport("connection reset".to_string()).into();
        assert_eq!(err.to_string(), "connection reset");
        assert_eq!(
            AggregationError::DependenciesUnavailable.to_string(),
            "dependencies unavailable"
        );
    }
}
