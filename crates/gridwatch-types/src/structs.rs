//! Core record structs: feeder lines, alerts, users and dashboard payloads.
//!
//! Field names serialize in `camelCase` because the dashboard pages
//! read them directly (`currentLoad`, `lastUpdated`, `resolvedTimestamp`).

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AlertStatus, AlertType, LineStatus, SystemStatus};
use crate::ids::{AlertId, LineId, UserId};

/// Load in kilowatts assigned to a line before its first reading.
pub const DEFAULT_LINE_LOAD_KW: f64 = 10.0;

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

/// One set of electrical readings for a line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Telemetry {
    /// Line voltage in volts.
    pub voltage: f64,
    /// Line current in amperes.
    pub current: f64,
    /// Conductor temperature in degrees Celsius.
    pub temperature: f64,
}

impl Telemetry {
    /// Real power in watts (`P = V * I`).
    pub fn power(&self) -> f64 {
        self.voltage * self.current
    }

    /// Real power in kilowatts.
    pub fn load_kw(&self) -> f64 {
        self.power() / 1000.0
    }
}

/// A monitored feeder circuit with its latest telemetry and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Line {
    /// Unique identifier.
    pub id: LineId,
    /// Unique display name, e.g. `Feeder Line 01`.
    pub name: String,
    /// Service area the line feeds.
    pub location: String,
    /// Current operating status.
    pub status: LineStatus,
    /// Load in kilowatts, derived from the last reading.
    pub current_load: f64,
    /// Last voltage reading in volts.
    pub voltage: f64,
    /// Last current reading in amperes.
    pub current: f64,
    /// Last temperature reading in degrees Celsius.
    pub temperature: f64,
    /// Last real power figure in watts.
    pub power: f64,
    /// When the record was last written.
    pub last_updated: DateTime<Utc>,
}

impl Line {
    /// Create a new operational line with no readings yet.
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: LineId::new(),
            name: name.into(),
            location: location.into(),
            status: LineStatus::Operational,
            current_load: DEFAULT_LINE_LOAD_KW,
            voltage: 0.0,
            current: 0.0,
            temperature: 0.0,
            power: 0.0,
            last_updated: Utc::now(),
        }
    }

    /// The line's last readings.
    pub const fn telemetry(&self) -> Telemetry {
        Telemetry {
            voltage: self.voltage,
            current: self.current,
            temperature: self.temperature,
        }
    }

    /// Store a new reading and recompute power and load from it.
    pub fn apply_telemetry(&mut self, reading: Telemetry) {
        self.voltage = reading.voltage;
        self.current = reading.current;
        self.temperature = reading.temperature;
        self.power = reading.power();
        self.current_load = reading.load_kw();
    }
}

/// Name and location of a line to be registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewLine {
    /// Unique display name.
    pub name: String,
    /// Service area the line feeds.
    pub location: String,
}

impl NewLine {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }

    /// Build the full record for this line.
    pub fn into_line(self) -> Line {
        Line::new(self.name, self.location)
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// A recorded fault episode on a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Alert {
    /// Unique identifier.
    pub id: AlertId,
    /// The line the fault occurred on.
    pub line_id: LineId,
    /// Line name captured when the alert was raised.
    pub line_name: String,
    /// Kind of violation.
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// Active while the fault lasts, then resolved.
    pub status: AlertStatus,
    /// When the fault was detected.
    pub timestamp: DateTime<Utc>,
    /// When the line recovered. `None` while the alert is active.
    pub resolved_timestamp: Option<DateTime<Utc>>,
}

impl Alert {
    /// Raise a new active alert for a line.
    pub fn raise(line_id: LineId, line_name: impl Into<String>) -> Self {
        Self {
            id: AlertId::new(),
            line_id,
            line_name: line_name.into(),
            alert_type: AlertType::default(),
            status: AlertStatus::Active,
            timestamp: Utc::now(),
            resolved_timestamp: None,
        }
    }

    /// Whether the fault is still ongoing.
    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }

    /// Mark the alert resolved at `at`, or one microsecond after it was
    /// raised when `at` is not later than that.
    pub fn resolve_at(&mut self, at: DateTime<Utc>) {
        let earliest = self
            .timestamp
            .checked_add_signed(TimeDelta::microseconds(1))
            .unwrap_or(self.timestamp);
        self.status = AlertStatus::Resolved;
        self.resolved_timestamp = Some(at.max(earliest));
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// A registered dashboard user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email, unique across users.
    pub email: String,
    /// Encoded password hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// A user about to be stored, with the password already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email.
    pub email: String,
    /// Encoded password hash.
    pub password_hash: String,
}

impl NewUser {
    /// Build the stored record.
    pub fn into_user(self) -> User {
        User {
            id: UserId::new(),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            created_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard payloads
// ---------------------------------------------------------------------------

/// Aggregate figures for the dashboard overview cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct DashboardSummary {
    /// `Fault Detected` if any line is in fault.
    pub system_status: SystemStatus,
    /// Number of active alerts.
    pub active_alerts: u64,
    /// Number of registered lines.
    pub lines_monitored: u64,
    /// Number of lines that are not offline.
    pub online_lines: u64,
    /// Total load of operational lines in kilowatts, two decimals.
    pub system_load: f64,
}

/// Placeholder system settings served to the settings page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SystemSettings {
    /// Load threshold in kilowatts above which operators want attention.
    pub alert_threshold: f64,
    /// Address notifications are sent to.
    pub notification_email: String,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            alert_threshold: 25.0,
            notification_email: String::from("admin@ksebl.com"),
        }
    }
}

/// Health of the service components, for the system status panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SystemHealth {
    /// Always `Online` when the API answers.
    pub api_status: String,
    /// `Connected` if the store answered a probe, else `Disconnected`.
    pub db_status: String,
    /// `Running`, `Stopped` or `Starting`.
    pub simulation_status: String,
    /// Number of simulation ticks completed since start.
    pub ticks_completed: u64,
    /// When the last tick completed.
    pub last_tick_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn new_line_has_default_load() {
        let line = Line::new("Feeder Line 01", "Trivandrum North");
        assert_eq!(line.status, LineStatus::Operational);
        assert!((line.current_load - DEFAULT_LINE_LOAD_KW).abs() < EPSILON);
    }

    #[test]
    fn apply_telemetry_derives_power_and_load() {
        let mut line = Line::new("Feeder Line 02", "Kollam Industrial");
        line.apply_telemetry(Telemetry {
            voltage: 230.0,
            current: 15.0,
            temperature: 45.0,
        });
        assert!((line.power - 3450.0).abs() < EPSILON);
        assert!((line.current_load - 3.45).abs() < EPSILON);
    }

    #[test]
    fn line_serializes_camel_case() {
        let line = Line::new("Feeder Line 03", "Kochi Metro");
        let value = serde_json::to_value(&line).unwrap_or_default();
        assert!(value.get("currentLoad").is_some());
        assert!(value.get("lastUpdated").is_some());
        assert_eq!(
            value.get("status").and_then(serde_json::Value::as_str),
            Some("Operational")
        );
    }

    #[test]
    fn alert_serializes_type_field_and_null_resolution() {
        let alert = Alert::raise(LineId::new(), "Feeder Line 04");
        let value = serde_json::to_value(&alert).unwrap_or_default();
        assert_eq!(
            value.get("type").and_then(serde_json::Value::as_str),
            Some("Overload")
        );
        assert_eq!(value.get("resolvedTimestamp"), Some(&serde_json::Value::Null));
        assert_eq!(
            value.get("lineName").and_then(serde_json::Value::as_str),
            Some("Feeder Line 04")
        );
    }

    #[test]
    fn resolving_an_alert_sets_timestamp() {
        let mut alert = Alert::raise(LineId::new(), "Feeder Line 01");
        let at = alert.timestamp + TimeDelta::minutes(3);
        alert.resolve_at(at);
        assert!(!alert.is_active());
        assert_eq!(alert.resolved_timestamp, Some(at));
    }

    #[test]
    fn resolution_is_always_after_raise() {
        let mut alert = Alert::raise(LineId::new(), "Feeder Line 01");
        let raised = alert.timestamp;
        alert.resolve_at(raised - TimeDelta::seconds(1));
        assert_eq!(
            alert.resolved_timestamp,
            Some(raised + TimeDelta::microseconds(1))
        );
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = NewUser {
            first_name: String::from("Asha"),
            last_name: String::from("Nair"),
            email: String::from("asha@example.com"),
            password_hash: String::from("$pbkdf2-sha256$i=1,l=32$c2FsdHNhbHQ$aGFzaA"),
        }
        .into_user();
        let value = serde_json::to_value(&user).unwrap_or_default();
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("email").is_some());
    }
}
