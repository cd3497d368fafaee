//! Store traits for the line registry, alert ledger and user directory.
//!
//! The tick engine, the query surface and the auth service are written
//! against these traits. Two implementations exist: [`MemoryStore`] in
//! this crate, used by tests, and the `PostgreSQL` store in `gridwatch-db`.
//!
//! Trait methods return `impl Future + Send`; implementations may use
//! `async fn`.
//!
//! [`MemoryStore`]: crate::memory::MemoryStore

use std::future::Future;

use gridwatch_types::{Alert, Line, LineId, NewLine, NewUser, User};

/// Errors reported by any store implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The record to update does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store failed (connection, query, decode).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// The set of monitored feeder lines and their latest telemetry.
pub trait LineRegistry: Send + Sync {
    /// All lines, ordered by name ascending.
    fn list(&self) -> impl Future<Output = Result<Vec<Line>, StoreError>> + Send;

    /// Look a line up by its unique name.
    fn get_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Line>, StoreError>> + Send;

    /// Number of registered lines.
    fn count(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Register new lines, skipping any whose name is already taken.
    ///
    /// Returns the number of lines actually inserted.
    fn insert_many(
        &self,
        lines: &[NewLine],
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Replace the stored record for `line.id` and refresh its
    /// `last_updated` timestamp. Returns the record as stored.
    ///
    /// Fails with [`StoreError::NotFound`] for an unknown ID.
    fn save(&self, line: &Line) -> impl Future<Output = Result<Line, StoreError>> + Send;
}

/// Record of fault episodes, at most one active per line.
pub trait AlertLedger: Send + Sync {
    /// Return the active alert for `line_id`, creating one if none exists.
    fn open_for(
        &self,
        line_id: LineId,
        line_name: &str,
    ) -> impl Future<Output = Result<Alert, StoreError>> + Send;

    /// The active alert for a line, if any.
    fn find_active_for(
        &self,
        line_id: LineId,
    ) -> impl Future<Output = Result<Option<Alert>, StoreError>> + Send;

    /// Resolve the active alert for a line.
    ///
    /// Returns `None` when the line had no active alert.
    fn resolve(
        &self,
        line_id: LineId,
    ) -> impl Future<Output = Result<Option<Alert>, StoreError>> + Send;

    /// Number of active alerts across all lines.
    fn count_active(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// All active alerts, newest first.
    fn list_active(&self) -> impl Future<Output = Result<Vec<Alert>, StoreError>> + Send;

    /// The `limit` most recently resolved alerts, newest resolution first.
    fn list_resolved(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Alert>, StoreError>> + Send;
}

/// Registered dashboard users.
pub trait UserDirectory: Send + Sync {
    /// Look a user up by login email.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Store a new user.
    ///
    /// Fails with [`StoreError::Conflict`] if the email is taken.
    fn insert(&self, user: NewUser) -> impl Future<Output = Result<User, StoreError>> + Send;
}

/// Everything the HTTP surface needs from one store handle.
pub trait GridStore: LineRegistry + AlertLedger + UserDirectory + Clone + 'static {
    /// Cheap liveness probe for the status panel.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
