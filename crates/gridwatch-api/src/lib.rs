//! Dashboard HTTP API for the Gridwatch feeder monitoring service.
//!
//! Serves JSON views over the line registry and alert ledger, plus user
//! registration and login. Handlers are generic over
//! [`GridStore`](gridwatch_core::store::GridStore), so the same router
//! runs against `PostgreSQL` in production and the in-memory store in
//! tests.
//!
//! All routes live under `/api/data/*` and `/api/auth/*`. Errors are
//! returned as `{"msg": "..."}`.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use startup::spawn_api;
pub use state::AppState;
