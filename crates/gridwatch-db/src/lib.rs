//! `PostgreSQL` persistence for the Gridwatch feeder monitoring service.
//!
//! [`PgStore`] implements the line registry, the alert ledger and the
//! user directory from `gridwatch-core` on a single connection pool.
//!
//! ```text
//! PgStore
//!     |-- LineRegistry   (lines)
//!     |-- AlertLedger    (alerts, one active per line via partial index)
//!     +-- UserDirectory  (users)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The [`PgStore`] handle: pool, migrations, liveness probe
//! - [`line_store`] -- Line rows and queries
//! - [`alert_store`] -- Alert rows and queries
//! - [`user_store`] -- User rows and queries
//! - [`error`] -- Shared error types

pub mod alert_store;
pub mod error;
pub mod line_store;
pub mod store;
pub mod user_store;

pub use alert_store::AlertRow;
pub use error::DbError;
pub use line_store::LineRow;
pub use store::PgStore;
pub use user_store::UserRow;
