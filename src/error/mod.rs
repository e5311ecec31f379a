use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::SinkError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] SinkError),

    #[error("Not found: {0}")]
    NotFound(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, client_message, log_message) = match &self {
            AppError::Config(e) => {
                let log_msg = e.to_string();
                let client_msg = if is_production() {
                    "Configuration error".to_string()
                } else {
                    log_msg.clone()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", client_msg, log_msg)
            }
            AppError::Persistence(e) => {
                let log_msg = e.to_string();
                let client_msg = if is_production() {
                    "Service temporarily unavailable".to_string()
                } else {
                    log_msg.clone()
                };
                (StatusCode::SERVICE_UNAVAILABLE, "PERSISTENCE_ERROR", client_msg, log_msg)
            }
            AppError::NotFound(path) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("No route for {}", path),
                path.clone(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(code = %code, status = %status.as_u16(), message = %log_message, "Request failed");
        } else {
            tracing::debug!(code = %code, status = %status.as_u16(), message = %log_message, "Request rejected");
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        let response = AppError::NotFound("/health".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_persistence_error_is_unavailable() {
        let error = AppError::from(SinkError::Timeout(5000));
        assert!(error.to_string().contains("5000"));
        assert_eq!(error.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
