//! HTTP surface of the SkinCheck API.
//!
//! The binary wires [`infra::app_state::AppState`] from configuration and
//! serves [`routes::create_app`]; integration tests build the same router
//! over an in-memory scan store.

pub mod auth;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
