//! HTTP error mapping. Every failure leaves the API as `{error, code}`.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kudos_core::error::CoreError;
use serde::Serialize;

/// Unique constraints from the migrations and the message a caller sees
/// when an insert races past the handler's own duplicate check.
const UNIQUE_CONSTRAINTS: &[(&str, &str)] = &[
    ("uq_users_email", "An account with this email already exists"),
    ("uq_products_slug", "A product with this slug already exists"),
];

const POSTGRES_UNIQUE_VIOLATION: &str = "23505";

const INTERNAL_MESSAGE: &str = "An internal error occurred";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A malformed or oversized multipart upload.
    #[error("Upload error: {0}")]
    Upload(#[from] MultipartError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Logged in full; the caller only sees a generic message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl AppError {
    fn status_code_message(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(CoreError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),
            AppError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Core(CoreError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg.clone())
            }
            AppError::Core(CoreError::Unauthorized(msg)) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::Core(CoreError::Forbidden(msg)) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone())
            }
            AppError::Core(CoreError::Internal(_)) | AppError::InternalError(_) => internal(),
            AppError::Database(sqlx::Error::RowNotFound) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            ),
            AppError::Database(err) => match unique_violation_message(err) {
                Some(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.to_string()),
                None => internal(),
            },
            AppError::Upload(err) => (err.status(), "INVALID_UPLOAD", err.body_text()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = self.status_code_message();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(ErrorBody { error, code })).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

/// `true` if `err` is a unique violation of the named constraint.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(POSTGRES_UNIQUE_VIOLATION)
                && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

/// Caller-facing message for a violation of one of [`UNIQUE_CONSTRAINTS`].
fn unique_violation_message(err: &sqlx::Error) -> Option<&'static str> {
    UNIQUE_CONSTRAINTS
        .iter()
        .find(|(constraint, _)| is_unique_violation(err, constraint))
        .map(|(_, msg)| *msg)
}
