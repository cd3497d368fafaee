//! [`AlertLedger`] over the `alerts` table.
//!
//! The partial unique index `alerts_one_active_per_line` guarantees at
//! most one active alert per line. [`AlertLedger::open_for`] leans on it:
//! the insert is skipped on conflict and the surviving active row is
//! returned instead.

use chrono::{DateTime, Utc};
use gridwatch_core::store::{AlertLedger, StoreError};
use gridwatch_types::{Alert, AlertId, AlertStatus, AlertType, LineId};
use uuid::Uuid;

use crate::error::DbError;
use crate::store::PgStore;

const ALERT_COLUMNS: &str = "id, line_id, line_name, alert_type::TEXT AS alert_type, \
                             status::TEXT AS status, raised_at, resolved_at";

/// A row from the `alerts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AlertRow {
    /// Alert UUID.
    pub id: Uuid,
    /// Faulted line.
    pub line_id: Uuid,
    /// Line name at raise time.
    pub line_name: String,
    /// Alert type as a string (cast from the `PostgreSQL` enum).
    pub alert_type: String,
    /// Status as a string (cast from the `PostgreSQL` enum).
    pub status: String,
    /// When the fault was detected.
    pub raised_at: DateTime<Utc>,
    /// When the line recovered.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl TryFrom<AlertRow> for Alert {
    type Error = DbError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        let alert_type = alert_type_from_db(&row.alert_type)
            .ok_or_else(|| DbError::Decode(format!("unknown alert_type '{}'", row.alert_type)))?;
        let status = alert_status_from_db(&row.status)
            .ok_or_else(|| DbError::Decode(format!("unknown alert_status '{}'", row.status)))?;
        Ok(Self {
            id: AlertId::from(row.id),
            line_id: LineId::from(row.line_id),
            line_name: row.line_name,
            alert_type,
            status,
            timestamp: row.raised_at,
            resolved_timestamp: row.resolved_at,
        })
    }
}

fn rows_to_alerts(rows: Vec<AlertRow>) -> Result<Vec<Alert>, DbError> {
    rows.into_iter().map(Alert::try_from).collect()
}

impl PgStore {
    async fn active_alert(&self, line_id: LineId) -> Result<Option<Alert>, DbError> {
        let row = sqlx::query_as::<_, AlertRow>(&format!(
            "SELECT {ALERT_COLUMNS} FROM alerts WHERE line_id = $1 AND status = 'Active'"
        ))
        .bind(line_id.into_inner())
        .fetch_optional(self.pool())
        .await?;
        row.map(Alert::try_from).transpose()
    }

    async fn open_alert(&self, line_id: LineId, line_name: &str) -> Result<Alert, DbError> {
        let alert = Alert::raise(line_id, line_name);
        let inserted = sqlx::query_as::<_, AlertRow>(&format!(
            r"INSERT INTO alerts (id, line_id, line_name, alert_type, status, raised_at)
              VALUES ($1, $2, $3, $4::alert_type, 'Active', $5)
              ON CONFLICT (line_id) WHERE status = 'Active' DO NOTHING
              RETURNING {ALERT_COLUMNS}"
        ))
        .bind(alert.id.into_inner())
        .bind(line_id.into_inner())
        .bind(line_name)
        .bind(alert_type_to_db(alert.alert_type))
        .bind(alert.timestamp)
        .fetch_optional(self.pool())
        .await?;

        if let Some(row) = inserted {
            return Alert::try_from(row);
        }
        // Lost the race: another writer's active alert is the one to use.
        self.active_alert(line_id)
            .await?
            .ok_or_else(|| DbError::Decode(format!("active alert for line {line_id} vanished")))
    }

    async fn resolve_alert(&self, line_id: LineId) -> Result<Option<Alert>, DbError> {
        let row = sqlx::query_as::<_, AlertRow>(&format!(
            r"UPDATE alerts SET status = 'Resolved', resolved_at = GREATEST(now(), raised_at + INTERVAL '1 microsecond')
              WHERE line_id = $1 AND status = 'Active'
              RETURNING {ALERT_COLUMNS}"
        ))
        .bind(line_id.into_inner())
        .fetch_optional(self.pool())
        .await?;
        row.map(Alert::try_from).transpose()
    }

    async fn count_active_alerts(&self) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE status = 'Active'")
            .fetch_one(self.pool())
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn active_alerts(&self) -> Result<Vec<Alert>, DbError> {
        let rows = sqlx::query_as::<_, AlertRow>(&format!(
            "SELECT {ALERT_COLUMNS} FROM alerts WHERE status = 'Active' ORDER BY raised_at DESC"
        ))
        .fetch_all(self.pool())
        .await?;
        rows_to_alerts(rows)
    }

    async fn resolved_alerts(&self, limit: u32) -> Result<Vec<Alert>, DbError> {
        let rows = sqlx::query_as::<_, AlertRow>(&format!(
            r"SELECT {ALERT_COLUMNS} FROM alerts
              WHERE status = 'Resolved'
              ORDER BY resolved_at DESC
              LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await?;
        rows_to_alerts(rows)
    }
}

impl AlertLedger for PgStore {
    async fn open_for(&self, line_id: LineId, line_name: &str) -> Result<Alert, StoreError> {
        Ok(self.open_alert(line_id, line_name).await?)
    }

    async fn find_active_for(&self, line_id: LineId) -> Result<Option<Alert>, StoreError> {
        Ok(self.active_alert(line_id).await?)
    }

    async fn resolve(&self, line_id: LineId) -> Result<Option<Alert>, StoreError> {
        Ok(self.resolve_alert(line_id).await?)
    }

    async fn count_active(&self) -> Result<u64, StoreError> {
        Ok(self.count_active_alerts().await?)
    }

    async fn list_active(&self) -> Result<Vec<Alert>, StoreError> {
        Ok(self.active_alerts().await?)
    }

    async fn list_resolved(&self, limit: u32) -> Result<Vec<Alert>, StoreError> {
        Ok(self.resolved_alerts(limit).await?)
    }
}

/// Convert an [`AlertType`] to its `PostgreSQL` enum string.
pub const fn alert_type_to_db(alert_type: AlertType) -> &'static str {
    alert_type.label()
}

/// Parse an `alert_type` enum string.
pub fn alert_type_from_db(value: &str) -> Option<AlertType> {
    match value {
        "Overload" => Some(AlertType::Overload),
        "Short Circuit" => Some(AlertType::ShortCircuit),
        "Voltage Drop" => Some(AlertType::VoltageDrop),
        _ => None,
    }
}

/// Parse an `alert_status` enum string.
pub fn alert_status_from_db(value: &str) -> Option<AlertStatus> {
    match value {
        "Active" => Some(AlertStatus::Active),
        "Resolved" => Some(AlertStatus::Resolved),
        _ => None,
    }
}
