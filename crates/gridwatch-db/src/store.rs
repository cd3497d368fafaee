//! The `PostgreSQL`-backed store handle.
//!
//! Queries are built at runtime, so the crate compiles without a live
//! database. Every statement is parameterized.

use std::time::Duration;

use gridwatch_core::config::DatabaseConfig;
use gridwatch_core::store::{GridStore, StoreError};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::error::DbError;

/// How long a tick or request waits for a free connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Implements every store trait on one connection pool.
///
/// Cloning is cheap; clones share the pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a pool of at most `config.max_connections` connections.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] for an unparseable URL and
    /// [`DbError::Postgres`] if the server cannot be reached.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        let options: PgConnectOptions = config
            .url
            .parse()
            .map_err(|e: sqlx::Error| DbError::Config(format!("invalid database URL: {e}")))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;

        tracing::info!(
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );
        Ok(Self { pool })
    }

    /// Connect to `url` with the default pool size.
    ///
    /// # Errors
    ///
    /// See [`PgStore::connect`].
    pub async fn connect_url(url: &str) -> Result<Self, DbError> {
        let config = DatabaseConfig {
            url: url.to_owned(),
            ..DatabaseConfig::default()
        };
        Self::connect(&config).await
    }

    /// Create the enums, tables and the one-active-alert index if they
    /// are missing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Migration`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }

    /// Close every pooled connection. Clones of this store stop working.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL pool closed");
    }

    pub(crate) const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl GridStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }
}
