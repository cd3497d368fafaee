//! [`LineRegistry`] over the `lines` table.

use chrono::{DateTime, Utc};
use gridwatch_core::store::{LineRegistry, StoreError};
use gridwatch_types::{Line, LineId, LineStatus, NewLine};
use uuid::Uuid;

use crate::error::DbError;
use crate::store::PgStore;

const LINE_COLUMNS: &str = "id, name, location, status::TEXT AS status, current_load, voltage, \
                            current_amps, temperature, power, last_updated";

/// A row from the `lines` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LineRow {
    /// Line UUID.
    pub id: Uuid,
    /// Unique line name.
    pub name: String,
    /// Service area.
    pub location: String,
    /// Status as a string (cast from the `PostgreSQL` enum).
    pub status: String,
    /// Load in kilowatts.
    pub current_load: f64,
    /// Volts.
    pub voltage: f64,
    /// Amperes.
    pub current_amps: f64,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Watts.
    pub power: f64,
    /// Last write time.
    pub last_updated: DateTime<Utc>,
}

impl TryFrom<LineRow> for Line {
    type Error = DbError;

    fn try_from(row: LineRow) -> Result<Self, Self::Error> {
        let status = line_status_from_db(&row.status)
            .ok_or_else(|| DbError::Decode(format!("unknown line_status '{}'", row.status)))?;
        Ok(Self {
            id: LineId::from(row.id),
            name: row.name,
            location: row.location,
            status,
            current_load: row.current_load,
            voltage: row.voltage,
            current: row.current_amps,
            temperature: row.temperature,
            power: row.power,
            last_updated: row.last_updated,
        })
    }
}

fn rows_to_lines(rows: Vec<LineRow>) -> Result<Vec<Line>, DbError> {
    rows.into_iter().map(Line::try_from).collect()
}

impl PgStore {
    async fn list_lines(&self) -> Result<Vec<Line>, DbError> {
        let rows = sqlx::query_as::<_, LineRow>(&format!(
            "SELECT {LINE_COLUMNS} FROM lines ORDER BY name"
        ))
        .fetch_all(self.pool())
        .await?;
        rows_to_lines(rows)
    }

    async fn line_by_name(&self, name: &str) -> Result<Option<Line>, DbError> {
        let row = sqlx::query_as::<_, LineRow>(&format!(
            "SELECT {LINE_COLUMNS} FROM lines WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(self.pool())
        .await?;
        row.map(Line::try_from).transpose()
    }

    async fn count_lines(&self) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lines")
            .fetch_one(self.pool())
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Inserts with a single `UNNEST`; taken names are skipped.
    async fn insert_lines(&self, new_lines: &[NewLine]) -> Result<u64, DbError> {
        if new_lines.is_empty() {
            return Ok(0);
        }

        let len = new_lines.len();
        let mut ids = Vec::with_capacity(len);
        let mut names = Vec::with_capacity(len);
        let mut locations = Vec::with_capacity(len);
        let mut loads = Vec::with_capacity(len);
        for new_line in new_lines {
            let line = new_line.clone().into_line();
            ids.push(line.id.into_inner());
            names.push(line.name);
            locations.push(line.location);
            loads.push(line.current_load);
        }

        let result = sqlx::query(
            r"INSERT INTO lines (id, name, location, current_load)
              SELECT * FROM UNNEST($1::UUID[], $2::TEXT[], $3::TEXT[], $4::FLOAT8[])
              ON CONFLICT (name) DO NOTHING",
        )
        .bind(&ids)
        .bind(&names)
        .bind(&locations)
        .bind(&loads)
        .execute(self.pool())
        .await?;

        tracing::debug!(requested = len, inserted = result.rows_affected(), "Inserted lines");
        Ok(result.rows_affected())
    }

    async fn save_line(&self, line: &Line) -> Result<Option<Line>, DbError> {
        let row = sqlx::query_as::<_, LineRow>(&format!(
            r"UPDATE lines SET
                name = $2,
                location = $3,
                status = $4::line_status,
                current_load = $5,
                voltage = $6,
                current_amps = $7,
                temperature = $8,
                power = $9,
                last_updated = now()
              WHERE id = $1
              RETURNING {LINE_COLUMNS}"
        ))
        .bind(line.id.into_inner())
        .bind(&line.name)
        .bind(&line.location)
        .bind(line_status_to_db(line.status))
        .bind(line.current_load)
        .bind(line.voltage)
        .bind(line.current)
        .bind(line.temperature)
        .bind(line.power)
        .fetch_optional(self.pool())
        .await?;
        row.map(Line::try_from).transpose()
    }
}

impl LineRegistry for PgStore {
    async fn list(&self) -> Result<Vec<Line>, StoreError> {
        Ok(self.list_lines().await?)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Line>, StoreError> {
        Ok(self.line_by_name(name).await?)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.count_lines().await?)
    }

    async fn insert_many(&self, lines: &[NewLine]) -> Result<u64, StoreError> {
        Ok(self.insert_lines(lines).await?)
    }

    async fn save(&self, line: &Line) -> Result<Line, StoreError> {
        self.save_line(line)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("line {}", line.id)))
    }
}

/// Convert a [`LineStatus`] to its `PostgreSQL` enum string.
pub const fn line_status_to_db(status: LineStatus) -> &'static str {
    match status {
        LineStatus::Operational => "Operational",
        LineStatus::Fault => "Fault",
        LineStatus::Offline => "Offline",
    }
}

/// Parse a `line_status` enum string.
pub fn line_status_from_db(value: &str) -> Option<LineStatus> {
    match value {
        "Operational" => Some(LineStatus::Operational),
        "Fault" => Some(LineStatus::Fault),
        "Offline" => Some(LineStatus::Offline),
        _ => None,
    }
}
