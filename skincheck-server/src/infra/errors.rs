use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use skincheck_core::ScanError;

use crate::auth::AuthError;

pub type AppResult<T> = Result<T, AppError>;

/// Message returned for every 5xx; details only go to the log.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Logs `detail` and returns the generic 500 body.
    pub fn internal(detail: impl fmt::Display) -> Self {
        tracing::error!(error = %detail, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Validation(msg) => Self::bad_request(msg),
            ScanError::NotFound(msg) => Self::not_found(msg),
            ScanError::Persistence(detail) => Self::internal(detail),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self::unauthorized(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_errors_map_to_status_codes() {
        let validation: AppError =
            ScanError::Validation("Image path is required".into()).into();
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);
        assert_eq!(validation.message, "Image path is required");

        let missing: AppError = ScanError::scan_not_found().into();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.message, "Scan not found");
    }

    #[test]
    fn persistence_details_are_masked() {
        let err: AppError =
            ScanError::Persistence("connection reset by peer".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, INTERNAL_ERROR_MESSAGE);

        let err: AppError = anyhow::anyhow!("pool timed out").into();
        assert_eq!(err.message, INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn auth_errors_are_unauthorized() {
        let err: AppError = AuthError::Expired.into();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "Token has expired");
    }
}
