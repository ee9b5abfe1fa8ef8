use std::{io::Cursor, net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum_test::TestServer;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Duration;
use image::{ImageFormat, Rgb, RgbImage};
use skincheck_core::{
    classifier::{ClassifierAdapter, RandomSkinModel},
    database::infrastructure::memory::InMemoryScanRepository,
};
use skincheck_server::{
    AppState,
    auth::JwtTokenVerifier,
    infra::config::{CorsConfig, DEFAULT_MAX_BODY_BYTES},
    routes::create_app,
};
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

// Code is used by test modules, but not in this scope
#[allow(unused)]
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryScanRepository>,
    pub verifier: JwtTokenVerifier,
}

#[allow(unused)]
impl TestApp {
    /// `Authorization` header value for a fresh token issued to `user_id`.
    pub fn bearer(&self, user_id: Uuid) -> String {
        let token = self
            .verifier
            .issue(user_id, Duration::minutes(15))
            .expect("issue test token");
        format!("Bearer {token}")
    }
}

/// Full router over an in-memory store and a seeded stand-in classifier.
#[allow(unused)]
pub fn build_test_app() -> Result<TestApp> {
    build_test_app_with_body_limit(DEFAULT_MAX_BODY_BYTES)
}

#[allow(unused)]
pub fn build_test_app_with_body_limit(max_body_bytes: usize) -> Result<TestApp> {
    let store = Arc::new(InMemoryScanRepository::new());
    let verifier = JwtTokenVerifier::new(TEST_SECRET);

    let state = AppState::new(
        store.clone(),
        ClassifierAdapter::new(Arc::new(RandomSkinModel::seeded(7))),
        Arc::new(verifier.clone()),
    );
    let router =
        create_app(state, &CorsConfig::default(), max_body_bytes);

    let make_service =
        router.into_make_service_with_connect_info::<SocketAddr>();
    let server = TestServer::builder()
        .http_transport()
        .build(make_service)
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;

    Ok(TestApp {
        server,
        store,
        verifier,
    })
}

/// A small PNG encoded as an inline data URI.
#[allow(unused)]
pub fn png_data_uri() -> String {
    let image = RgbImage::from_fn(16, 12, |x, y| {
        Rgb([(x * 13) as u8, (y * 17) as u8, 96])
    });
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .expect("encode png");
    format!("data:image/png;base64,{}", STANDARD.encode(bytes.into_inner()))
}

/// A noisy PNG of `width` x `height` pixels as a data URI. Noise keeps the
/// encoded size close to the raw pixel size.
#[allow(unused)]
pub fn noisy_png_data_uri(width: u32, height: u32) -> String {
    let mut state: u32 = 0x2545_f491;
    let image = RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        };
        Rgb([next(), next(), next()])
    });
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .expect("encode png");
    format!("data:image/png;base64,{}", STANDARD.encode(bytes.into_inner()))
}
