use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};

use crate::{
    AppState,
    auth::auth_middleware,
    handlers::{health, scans},
};

/// Create all v1 API routes
pub fn create_v1_router(
    state: AppState,
    max_body_bytes: usize,
) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(create_scan_routes(state, max_body_bytes))
}

/// Scan routes; every one requires a bearer token.
fn create_scan_routes(
    state: AppState,
    max_body_bytes: usize,
) -> Router<AppState> {
    Router::new()
        .route("/scans", get(scans::list_scans).post(scans::create_scan))
        .route("/scans/sync", post(scans::sync_scans))
        .route(
            "/scans/{id}",
            get(scans::get_scan).delete(scans::delete_scan),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .layer(DefaultBodyLimit::max(max_body_bytes))
}
