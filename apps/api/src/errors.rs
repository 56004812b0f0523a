use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::vendor::VendorError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Vendor error: {0}")]
    Vendor(#[from] VendorError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnknownCapability(code) => (
                StatusCode::BAD_REQUEST,
                "UNKNOWN_CAPABILITY",
                format!("No capability is registered for function {code}"),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid or missing credentials".to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Vendor(e) => {
                tracing::error!("Vendor error: {e}");
                vendor_response(e)
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
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

fn vendor_response(e: &VendorError) -> (StatusCode, &'static str, String) {
    match e {
        VendorError::Timeout { .. } => (
            StatusCode::GATEWAY_TIMEOUT,
            "GENERATION_TIMEOUT",
            e.to_string(),
        ),
        VendorError::Config(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "VENDOR_CONFIG_ERROR",
            "The AI service is not configured correctly".to_string(),
        ),
        VendorError::JobFailed { .. } => (StatusCode::BAD_GATEWAY, "GENERATION_FAILED", e.to_string()),
        VendorError::SubmissionFailed { .. } | VendorError::Remote { .. } => {
            (StatusCode::BAD_GATEWAY, "VENDOR_ERROR", e.to_string())
        }
        VendorError::Transport(_) | VendorError::Parse(_) => (
            StatusCode::BAD_GATEWAY,
            "VENDOR_UNAVAILABLE",
            "The AI service could not be reached".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn status_and_code(err: AppError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let (_, body) = response.into_parts();
        let bytes = body_bytes(body);
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, value["error"]["code"].as_str().unwrap().to_string())
    }

    fn body_bytes(body: axum::body::Body) -> bytes::Bytes {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(axum::body::to_bytes(body, usize::MAX))
            .unwrap()
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let err = AppError::from(VendorError::Timeout {
            job_id: "sid-1".into(),
            elapsed: Duration::from_secs(300),
        });
        assert_eq!(
            status_and_code(err),
            (StatusCode::GATEWAY_TIMEOUT, "GENERATION_TIMEOUT".to_string())
        );
    }

    #[test]
    fn test_remote_maps_to_bad_gateway() {
        let err = AppError::from(VendorError::Remote {
            code: 10013,
            message: "rejected".into(),
        });
        assert_eq!(status_and_code(err).0, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_unknown_capability_is_client_error() {
        assert_eq!(
            status_and_code(AppError::UnknownCapability("42".into())),
            (StatusCode::BAD_REQUEST, "UNKNOWN_CAPABILITY".to_string())
        );
    }
}
