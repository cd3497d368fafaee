//! Enumeration types for feeder lines, alerts and the dashboard.
//!
//! The serialized names are the labels the dashboard pages display
//! (`"Fault"`, `"Short Circuit"`, `"Fault Detected"`), so the JSON
//! produced by the API can be rendered without any client-side mapping.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Line status
// ---------------------------------------------------------------------------

/// Operating status of a feeder line.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum LineStatus {
    /// Healthy and carrying load.
    #[default]
    Operational,
    /// A fault episode is in progress.
    Fault,
    /// Taken out of service. Never entered by the simulation.
    Offline,
}

impl LineStatus {
    /// Display label, identical to the serialized form.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Operational => "Operational",
            Self::Fault => "Fault",
            Self::Offline => "Offline",
        }
    }

    /// Whether the line counts as online on the dashboard.
    pub const fn is_online(self) -> bool {
        !matches!(self, Self::Offline)
    }
}

impl core::fmt::Display for LineStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Alert classification
// ---------------------------------------------------------------------------

/// Kind of threshold violation an alert records.
///
/// The simulation always records [`AlertType::Overload`]; the other
/// kinds are kept so externally written alerts round-trip.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum AlertType {
    /// Load above the line's rating.
    #[default]
    Overload,
    /// Phase-to-phase or phase-to-ground short.
    #[serde(rename = "Short Circuit")]
    ShortCircuit,
    /// Supply voltage collapse.
    #[serde(rename = "Voltage Drop")]
    VoltageDrop,
}

impl AlertType {
    /// Display label, identical to the serialized form.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Overload => "Overload",
            Self::ShortCircuit => "Short Circuit",
            Self::VoltageDrop => "Voltage Drop",
        }
    }
}

impl core::fmt::Display for AlertType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle state of an alert.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum AlertStatus {
    /// The fault on the owning line is ongoing.
    #[default]
    Active,
    /// The owning line has recovered.
    Resolved,
}

impl AlertStatus {
    /// Display label, identical to the serialized form.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Resolved => "Resolved",
        }
    }
}

impl core::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Overall grid status shown on the dashboard banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SystemStatus {
    /// No line is in fault.
    Operational,
    /// At least one line is in fault.
    #[serde(rename = "Fault Detected")]
    FaultDetected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_type_uses_display_labels_on_the_wire() {
        let json = serde_json::to_string(&AlertType::ShortCircuit).ok();
        assert_eq!(json.as_deref(), Some("\"Short Circuit\""));
        let parsed: Result<AlertType, _> = serde_json::from_str("\"Voltage Drop\"");
        assert_eq!(parsed.ok(), Some(AlertType::VoltageDrop));
    }

    #[test]
    fn system_status_fault_label() {
        let json = serde_json::to_string(&SystemStatus::FaultDetected).ok();
        assert_eq!(json.as_deref(), Some("\"Fault Detected\""));
    }

    #[test]
    fn only_offline_lines_are_not_online() {
        assert!(LineStatus::Operational.is_online());
        assert!(LineStatus::Fault.is_online());
        assert!(!LineStatus::Offline.is_online());
    }

    #[test]
    fn defaults_match_new_records() {
        assert_eq!(LineStatus::default(), LineStatus::Operational);
        assert_eq!(AlertType::default(), AlertType::Overload);
        assert_eq!(AlertStatus::default(), AlertStatus::Active);
    }
}
