use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use super::{
    models::{
        AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
        ServerConfig, default_cors_headers, default_cors_methods,
        default_cors_origins,
    },
    sources::{EnvConfig, FileConfig},
    validation::{
        self, ConfigGuardRailError, ConfigWarnings, parse_database_url,
    },
};

const DEFAULT_CONFIG_LOCATIONS: &[&str] =
    &["skincheck.toml", "config/skincheck.toml"];

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;

/// Layers configuration sources: defaults, then the TOML file, then the
/// environment. CLI overrides are applied by the binary afterwards.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Load `.env` (if present), read the process environment and resolve.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded =
            dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?;

        self.load_with_env(EnvConfig::gather(), env_file_loaded)
    }

    /// Resolve against an already gathered environment.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) =
            compose_config(file_config, env, config_path, env_file_loaded)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let requested = self
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match requested {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigLoadError::MissingConfig { path });
                }
                path
            }
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => path,
                None => return Ok((None, None)),
            },
        };

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
    env_file_loaded: bool,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if file_config.is_none() {
        warnings.push_with_hint(
            "No skincheck.toml detected; using environment variables only",
            "Set SKINCHECK_CONFIG or place skincheck.toml in the working directory",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        auth: file_auth,
        cors: file_cors,
    } = file_config.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        max_body_bytes: env
            .max_body_bytes
            .or(file_server.max_body_bytes)
            .unwrap_or(DEFAULT_MAX_BODY_BYTES),
    };

    let url = env
        .database_url
        .or(file_database.url)
        .filter(|url| !url.trim().is_empty())
        .ok_or(ConfigLoadError::MissingDatabaseUrl)?;
    parse_database_url(&url)
        .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;

    let database = DatabaseConfig {
        url: url.trim().to_string(),
        max_connections: env
            .db_max_connections
            .or(file_database.max_connections)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        min_connections: env
            .db_min_connections
            .or(file_database.min_connections)
            .unwrap_or(DEFAULT_MIN_CONNECTIONS),
    };

    let auth = AuthConfig {
        jwt_secret: env
            .jwt_secret
            .or(file_auth.jwt_secret)
            .ok_or(ConfigLoadError::MissingJwtSecret)?,
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_else(default_cors_origins),
        allowed_methods: file_cors
            .allowed_methods
            .unwrap_or_else(default_cors_methods),
        allowed_headers: file_cors
            .allowed_headers
            .unwrap_or_else(default_cors_headers),
    };

    let config = Config {
        server,
        database,
        auth,
        cors,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded,
        },
    };

    warnings.extend(validation::apply_guard_rails(&config)?);
    Ok((config, warnings))
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("DATABASE_URL is not set and no database.url is configured")]
    MissingDatabaseUrl,
    #[error("invalid database URL")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("JWT_SECRET is not set and no auth.jwt_secret is configured")]
    MissingJwtSecret,
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
