//! Blog Error Types
//!
//! Gate failures arrive as [`AuthError`] and keep their status and message.

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type BlogResult<T> = Result<T, BlogError>;

#[derive(Debug, Error)]
pub enum BlogError {
    /// Guard or account lookup failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Upstream content generation failed; the message is the payload
    #[error("{0}")]
    Generation(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Internal error")]
    Internal(String),
}

impl BlogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BlogError::Auth(e) => e.status_code(),
            BlogError::Validation(_) => StatusCode::BAD_REQUEST,
            BlogError::NotFound(_) => StatusCode::NOT_FOUND,
            BlogError::Generation(_) | BlogError::Database(_) | BlogError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BlogError::Auth(e) => e.kind(),
            BlogError::Validation(_) => ErrorKind::BadRequest,
            BlogError::NotFound(_) => ErrorKind::NotFound,
            BlogError::Generation(_) | BlogError::Database(_) | BlogError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            BlogError::Auth(e) => e.to_app_error(),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            BlogError::Database(e) => {
                tracing::error!(error = %e, "Blog database error");
            }
            BlogError::Internal(msg) => {
                tracing::error!(message = %msg, "Blog internal error");
            }
            BlogError::Generation(msg) => {
                tracing::error!(message = %msg, "Content generation failed");
            }
            _ => {
                tracing::debug!(error = %self, "Blog error");
            }
        }
    }
}

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        match self {
            // Logs at its own levels
            BlogError::Auth(e) => e.into_response(),
            other => {
                other.log();
                other.to_app_error().into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_keep_their_status() {
        let err = BlogError::from(AuthError::VerificationRequired);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(
            err.to_string(),
            "Verification required. Please verify either your email or phone number."
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            BlogError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BlogError::NotFound("Blog not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BlogError::Generation("upstream".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
