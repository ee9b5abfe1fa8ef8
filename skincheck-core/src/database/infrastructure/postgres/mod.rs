mod scans;

pub use scans::PostgresScanRepository;

use std::{fmt, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::error::{Result, ScanError};

/// Pool sizing for [`PostgresDatabase::connect`].
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    settings: PoolSettings,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .field("max_connections", &self.settings.max_connections)
            .field("min_connections", &self.settings.min_connections)
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn connect(url: &str, settings: PoolSettings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.acquire_timeout)
            .max_lifetime(Duration::from_secs(1800))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(url)
            .await
            .map_err(|e| {
                ScanError::Persistence(format!("Database connection failed: {e}"))
            })?;

        info!(
            max_connections = settings.max_connections,
            min_connections = settings.min_connections,
            "database pool initialized"
        );

        Ok(Self { pool, settings })
    }

    /// Wrap a pool someone else configured, such as the per-test pools
    /// handed out by `sqlx::test`.
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            settings: PoolSettings::default(),
        }
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        crate::MIGRATOR.run(&self.pool).await.map_err(|e| {
            ScanError::Persistence(format!("Database migration failed: {e}"))
        })?;
        info!("database migrations applied");
        Ok(())
    }

    pub fn scans(&self) -> PostgresScanRepository {
        PostgresScanRepository::new(self.pool.clone())
    }
}
