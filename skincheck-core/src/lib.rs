//! # SkinCheck Core
//!
//! Domain types, persistence ports and application services for the SkinCheck
//! scan API.
//!
//! ## Overview
//!
//! - **Scan records**: one skin-image capture per record, owned by a single
//!   user and never visible to anyone else
//! - **Classification**: a swappable model capability behind an adapter that
//!   degrades to a sentinel result instead of failing
//! - **Ingestion**: validate, classify inline images, persist
//! - **Sync**: persist a batch of offline captures as one transaction
//!
//! ## Feature Flags
//!
//! - `testing`: exposes [`database::infrastructure::memory`] for integration
//!   tests in downstream crates
//! - `postgres-tests`: enables repository tests against a live database

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Ingestion and sync services
pub mod application;

/// Classifier adapter and model capability
pub mod classifier;

/// Repository ports and their implementations
pub mod database;

/// Scan records and request payloads
pub mod domain;

/// Error types shared by every layer
pub mod error;

/// Lenient client timestamp resolution
pub mod timestamp;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use error::{Result, ScanError};
