use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_body_bytes: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_headers: Option<Vec<String>>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub max_body_bytes: Option<usize>,
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    pub db_min_connections: Option<u32>,
    pub jwt_secret: Option<String>,
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl EnvConfig {
    /// Read the process environment.
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Unparseable numbers are
    /// ignored so the file or default value applies.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name).filter(|value| !value.trim().is_empty())
        };

        Self {
            config_path: non_empty("SKINCHECK_CONFIG").map(PathBuf::from),
            server_host: non_empty("SERVER_HOST"),
            server_port: non_empty("SERVER_PORT")
                .and_then(|s| s.trim().parse().ok()),
            max_body_bytes: non_empty("SERVER_MAX_BODY_BYTES")
                .and_then(|s| s.trim().parse().ok()),
            database_url: non_empty("DATABASE_URL"),
            db_max_connections: non_empty("DB_MAX_CONNECTIONS")
                .and_then(|s| s.trim().parse().ok()),
            db_min_connections: non_empty("DB_MIN_CONNECTIONS")
                .and_then(|s| s.trim().parse().ok()),
            jwt_secret: non_empty("JWT_SECRET"),
            cors_allowed_origins: non_empty("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_csv(&raw)),
        }
    }
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
