//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`sqlx`] errors. At the store-trait boundary they are folded into
//! [`StoreError`] so the engine and API never see `sqlx` types.

use gridwatch_core::store::StoreError;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be mapped back to a domain type.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Postgres(sqlx::Error::RowNotFound) => Self::NotFound(String::from("row")),
            DbError::Postgres(sqlx::Error::Database(ref db)) if db.is_unique_violation() => {
                Self::Conflict(db.message().to_owned())
            }
            other => Self::Backend(other.to_string()),
        }
    }
}
