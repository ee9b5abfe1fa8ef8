pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{
    ConfigLoad, ConfigLoadError, ConfigLoader, DEFAULT_MAX_BODY_BYTES,
};
pub use models::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    ServerConfig,
};
pub use validation::{ConfigWarning, ConfigWarnings};
