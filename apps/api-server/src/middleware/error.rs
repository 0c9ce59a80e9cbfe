//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use juicebox_core::error::RepoError;
use juicebox_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let problem = ErrorResponse::from_status(status.as_u16());
        let problem = match self {
            AppError::NotFound(detail)
            | AppError::BadRequest(detail)
            | AppError::Conflict(detail) => problem.with_detail(detail),
            // Internal details stay in the logs.
            AppError::Internal(_) => problem,
        };

        HttpResponse::build(status).json(problem)
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            RepoError::Connection(source) => {
                tracing::error!("Database connection error: {}", source);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(source) => {
                tracing::error!("Database query error: {}", source);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Integrity(msg) => {
                tracing::error!("Data integrity violation: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Credential(source) => {
                tracing::error!("Credential error: {}", source);
                AppError::Internal("Credential error".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
