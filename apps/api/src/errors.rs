use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::baas::BaasError;
use crate::generation::GenerationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    /// Non-success reply from a remote service; status and message pass through.
    #[error("Upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Generation service error: {0}")]
    Generation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<BaasError> for AppError {
    fn from(e: BaasError) -> Self {
        match (&e, e.status()) {
            (_, Some(401)) => AppError::Unauthorized,
            (_, Some(403)) => AppError::Forbidden,
            (BaasError::Api { message, .. }, Some(404)) => AppError::NotFound(message.clone()),
            (BaasError::Api { message, .. }, Some(400 | 409)) => {
                AppError::Validation(message.clone())
            }
            _ => AppError::Storage(e.to_string()),
        }
    }
}

impl From<GenerationError> for AppError {
    fn from(e: GenerationError) -> Self {
        match e {
            GenerationError::Upstream { status, message } => AppError::Upstream { status, message },
            GenerationError::Timeout => AppError::Timeout,
            GenerationError::InvalidResponse(msg) => AppError::Generation(msg),
            other => AppError::Generation(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::Upstream { status, message } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "UPSTREAM_ERROR",
                message.clone(),
            ),
            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
                "Request timed out. The server is taking too long to respond. Please try again."
                    .to_string(),
            ),
            AppError::Generation(msg) => {
                tracing::error!("Generation error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_ERROR",
                    "Could not connect to the content generation service. Please try again later."
                        .to_string(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "status": "error",
            "code": code,
            "message": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, message: &str) -> BaasError {
        BaasError::Api {
            status,
            kind: String::new(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_baas_status_mapping() {
        assert!(matches!(AppError::from(api_error(401, "x")), AppError::Unauthorized));
        assert!(matches!(AppError::from(api_error(403, "x")), AppError::Forbidden));
        assert!(matches!(
            AppError::from(api_error(404, "Team not found")),
            AppError::NotFound(m) if m == "Team not found"
        ));
        assert!(matches!(
            AppError::from(api_error(409, "exists")),
            AppError::Validation(_)
        ));
        assert!(matches!(AppError::from(api_error(500, "boom")), AppError::Storage(_)));
    }

    #[test]
    fn test_upstream_status_passes_through() {
        let response = AppError::Upstream {
            status: 429,
            message: "slow down".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_generation_timeout_maps_to_gateway_timeout() {
        let err: AppError = GenerationError::Timeout.into();
        assert_eq!(err.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
