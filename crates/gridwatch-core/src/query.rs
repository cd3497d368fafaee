//! Read-only views over the registry and the ledger.
//!
//! Nothing here writes. A view may observe a line before or after the
//! current tick touched it, but never half-written.

use gridwatch_types::{Alert, DashboardSummary, Line, LineStatus, SystemStatus};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::store::{AlertLedger, LineRegistry, StoreError};

/// Upper bound on the analytics history length.
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// Clamp a requested history length to `1..=MAX_HISTORY_LIMIT`, using
/// `default` when none was requested.
pub fn clamp_history_limit(requested: Option<u32>, default: u32) -> u32 {
    requested.unwrap_or(default).clamp(1, MAX_HISTORY_LIMIT)
}

/// Round a kilowatt figure to two decimal places.
pub fn round_load(kw: f64) -> f64 {
    Decimal::try_from(kw)
        .ok()
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(kw)
}

/// Aggregate the dashboard figures from a snapshot of the registry.
pub fn summarize(lines: &[Line], active_alerts: u64) -> DashboardSummary {
    let system_status = if lines.iter().any(|l| l.status == LineStatus::Fault) {
        SystemStatus::FaultDetected
    } else {
        SystemStatus::Operational
    };
    let online = lines.iter().filter(|l| l.status.is_online()).count();
    let load: f64 = lines
        .iter()
        .filter(|l| l.status == LineStatus::Operational)
        .map(|l| l.current_load)
        .sum();

    DashboardSummary {
        system_status,
        active_alerts,
        lines_monitored: u64::try_from(lines.len()).unwrap_or(u64::MAX),
        online_lines: u64::try_from(online).unwrap_or(u64::MAX),
        system_load: round_load(load),
    }
}

/// The dashboard overview.
///
/// # Errors
///
/// Propagates any store error.
pub async fn dashboard<S>(store: &S) -> Result<DashboardSummary, StoreError>
where
    S: LineRegistry + AlertLedger,
{
    let lines = store.list().await?;
    let active = store.count_active().await?;
    Ok(summarize(&lines, active))
}

/// All lines, ordered by name.
///
/// # Errors
///
/// Propagates any store error.
pub async fn live_monitor<R: LineRegistry>(registry: &R) -> Result<Vec<Line>, StoreError> {
    registry.list().await
}

/// The most recently resolved alerts, newest resolution first.
///
/// # Errors
///
/// Propagates any store error.
pub async fn resolved_history<L: AlertLedger>(
    ledger: &L,
    limit: u32,
) -> Result<Vec<Alert>, StoreError> {
    ledger.list_resolved(limit.clamp(1, MAX_HISTORY_LIMIT)).await
}

/// Alerts that are still open, newest first.
///
/// # Errors
///
/// Propagates any store error.
pub async fn active_alerts<L: AlertLedger>(ledger: &L) -> Result<Vec<Alert>, StoreError> {
    ledger.list_active().await
}
