//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Full Day leave must not span two calendar months")]
    CrossMonthNotAllowed,

    #[error("Short Leave limit reached for this month (max 2)")]
    ShortLeaveLimitExceeded,

    #[error("Insufficient leave balance")]
    InsufficientBalance,

    #[error("Access denied")]
    AccessDenied,

    #[error("Leave application is not pending")]
    InvalidStateTransition,

    #[error("{0} not found")]
    NotFound(&'static str),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::CrossMonthNotAllowed => "cross_month_not_allowed",
            AppError::ShortLeaveLimitExceeded => "short_leave_limit_exceeded",
            AppError::InsufficientBalance => "insufficient_balance",
            AppError::AccessDenied => "access_denied",
            AppError::InvalidStateTransition => "invalid_state_transition",
            AppError::NotFound(_) => "not_found",
            AppError::Database(_) => "database_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            // Policy rejections: the request was well-formed, the rules said no
            AppError::CrossMonthNotAllowed
            | AppError::ShortLeaveLimitExceeded
            | AppError::InsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::InvalidStateTransition => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // 5xx details stay in the log, not in the response body
        let message = match self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                "Internal Server Error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: message,
            error_code: self.error_code().to_string(),
        })
    }
}
