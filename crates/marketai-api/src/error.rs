use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Error type for HTTP handlers.
///
/// Every failure a handler can produce maps onto one of these categories and
/// renders as `{"error": <message>, "code": <CATEGORY>}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed request fields.
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed, or expired bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// An external dependency failed. `details` is relayed to the caller.
    #[error("{message}")]
    Upstream {
        message: String,
        details: serde_json::Value,
    },

    /// Unexpected failure, including storage errors. The message is logged,
    /// never returned.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{:#}", err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Unauthorized".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Upstream { message, details } => {
                tracing::error!(error = %message, details = %details, "Upstream failure");
                let body = json!({
                    "error": message,
                    "code": "UPSTREAM_ERROR",
                    "details": details,
                });
                return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response();
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

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
