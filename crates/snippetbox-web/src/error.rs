use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use snippetbox_db::DbError;

/// Request-terminating errors. Nothing is retried; the variant decides the
/// status code and whether the error is logged.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad input from the client. Answered with the status's reason phrase
    /// and not logged.
    #[error("client error: {0}")]
    Client(StatusCode),

    #[error("not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] DbError),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Client(status) => *status,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Database(err) => {
                error!(error = ?err, "database error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Session(err) => {
                error!(error = ?err, "session error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Internal(err) => {
                error!(error = ?err, "internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = status.canonical_reason().unwrap_or("Error");
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_keeps_status() {
        let response = AppError::Client(StatusCode::BAD_REQUEST).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_is_404() {
        let response = AppError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_errors_are_500() {
        let response = AppError::from(DbError::Internal(anyhow::anyhow!("disk on fire")))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_display() {
        let err = AppError::Internal(anyhow::anyhow!("something broke"));
        assert_eq!(err.to_string(), "internal error: something broke");
    }
}
