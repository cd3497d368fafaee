//! Error types for the service binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup.

/// Top-level error for the service binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: gridwatch_core::config::ConfigError,
    },

    /// Connecting to or migrating the database failed.
    #[error("database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: gridwatch_db::DbError,
    },

    /// Seeding the line registry failed.
    #[error("seed error: {source}")]
    Seed {
        /// The underlying store error.
        #[from]
        source: gridwatch_core::store::StoreError,
    },

    /// The auth service could not be built.
    #[error("auth error: {source}")]
    Auth {
        /// The underlying auth error.
        #[from]
        source: gridwatch_core::auth::AuthError,
    },

    /// The API server failed to start.
    #[error("api server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: gridwatch_api::ServerError,
    },
}
