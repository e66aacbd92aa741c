//! HTTP mapping for [`AppError`].

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use burrow_core::{AppError, ErrorKind};

/// Newtype so handlers in this crate can return `AppError` with `?`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind;

        // No-maze is a normal protocol state, not an error on the wire.
        if kind == ErrorKind::NoMaze {
            return StatusCode::NO_CONTENT.into_response();
        }

        let status = match kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(%kind, error = %self.0, "request failed");
        }

        let body = Json(json!({
            "error": kind.to_string(),
            "message": self.0.message,
        }));
        (status, body).into_response()
    }
}
