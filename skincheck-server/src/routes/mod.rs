pub mod v1;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::health::endpoint_not_found,
    infra::{app_state::AppState, config::CorsConfig},
};

/// Create the main API router with all versions
pub fn create_api_router(
    state: AppState,
    max_body_bytes: usize,
) -> Router<AppState> {
    Router::new().nest("/api/v1", v1::create_v1_router(state, max_body_bytes))
}

/// The complete application: versioned API, JSON 404 fallback, request
/// tracing and CORS. Scan bodies may be up to `max_body_bytes` long.
pub fn create_app(
    state: AppState,
    cors: &CorsConfig,
    max_body_bytes: usize,
) -> Router {
    create_api_router(state.clone(), max_body_bytes)
        .fallback(endpoint_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(cors)),
        )
        .with_state(state)
}

pub fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let allow_origin = if cors.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();
        AllowOrigin::list(origins)
    };

    // Methods and headers were validated during config load.
    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|m| Method::from_bytes(m.as_bytes()).ok())
        .collect();

    let allow_headers = if cors.allowed_headers.iter().any(|h| h == "*") {
        AllowHeaders::any()
    } else {
        let headers: Vec<HeaderName> = cors
            .allowed_headers
            .iter()
            .filter_map(|h| HeaderName::from_bytes(h.as_bytes()).ok())
            .collect();
        AllowHeaders::list(headers)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::list(methods))
        .allow_headers(allow_headers)
}
