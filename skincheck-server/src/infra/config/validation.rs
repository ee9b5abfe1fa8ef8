use axum::http::{HeaderName, Method};
use thiserror::Error;
use url::Url;

use super::models::{
    AuthConfig, Config, CorsConfig, DatabaseConfig, ServerConfig,
};

/// Secrets shorter than this still work but are flagged at startup.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigGuardRailError {
    #[error("database URL must use the postgres:// or postgresql:// scheme")]
    UnsupportedDatabaseScheme,
    #[error("database URL must name a database")]
    MissingDatabaseName,
    #[error("JWT secret must not be empty")]
    EmptyJwtSecret,
    #[error(
        "DB_MIN_CONNECTIONS ({min}) must not exceed DB_MAX_CONNECTIONS ({max})"
    )]
    PoolBounds { min: u32, max: u32 },
    #[error("DB_MAX_CONNECTIONS must be at least 1")]
    EmptyPool,
    #[error("SERVER_MAX_BODY_BYTES must be at least 1")]
    EmptyBodyLimit,
    #[error("invalid CORS method '{0}'")]
    InvalidCorsMethod(String),
    #[error("invalid CORS header '{0}'")]
    InvalidCorsHeader(String),
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    check_server(&config.server)?;
    check_database(&config.database)?;
    check_secret(&config.auth, &mut warnings)?;
    check_cors(&config.cors)?;

    Ok(warnings)
}

/// Parse a database URL and confirm it points at a PostgreSQL database.
pub fn parse_database_url(raw: &str) -> Result<Url, url::ParseError> {
    Url::parse(raw.trim())
}

fn check_server(server: &ServerConfig) -> Result<(), ConfigGuardRailError> {
    if server.max_body_bytes == 0 {
        return Err(ConfigGuardRailError::EmptyBodyLimit);
    }
    Ok(())
}

fn check_database(
    database: &DatabaseConfig,
) -> Result<(), ConfigGuardRailError> {
    // The loader already rejected unparseable URLs.
    if let Ok(url) = parse_database_url(&database.url) {
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(ConfigGuardRailError::UnsupportedDatabaseScheme);
        }
        let name = url.path().trim_start_matches('/');
        if name.is_empty() {
            return Err(ConfigGuardRailError::MissingDatabaseName);
        }
    }

    if database.max_connections == 0 {
        return Err(ConfigGuardRailError::EmptyPool);
    }
    if database.min_connections > database.max_connections {
        return Err(ConfigGuardRailError::PoolBounds {
            min: database.min_connections,
            max: database.max_connections,
        });
    }
    Ok(())
}

fn check_secret(
    auth: &AuthConfig,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    if auth.jwt_secret.trim().is_empty() {
        return Err(ConfigGuardRailError::EmptyJwtSecret);
    }
    if auth.jwt_secret.len() < RECOMMENDED_SECRET_LEN {
        warnings.push_with_hint(
            format!(
                "JWT secret is shorter than {RECOMMENDED_SECRET_LEN} bytes"
            ),
            "Use a long random value for JWT_SECRET in production",
        );
    }
    Ok(())
}

fn check_cors(cors: &CorsConfig) -> Result<(), ConfigGuardRailError> {
    for method in &cors.allowed_methods {
        Method::from_bytes(method.as_bytes()).map_err(|_| {
            ConfigGuardRailError::InvalidCorsMethod(method.clone())
        })?;
    }
    for header in &cors.allowed_headers {
        if header == "*" {
            continue;
        }
        HeaderName::from_bytes(header.as_bytes()).map_err(|_| {
            ConfigGuardRailError::InvalidCorsHeader(header.clone())
        })?;
    }
    Ok(())
}
