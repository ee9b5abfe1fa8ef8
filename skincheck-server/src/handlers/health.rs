use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub const SERVICE_NAME: &str = "skincheck-api";

pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "service": SERVICE_NAME }))
}

/// Fallback for any path no route matched.
pub async fn endpoint_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
}
