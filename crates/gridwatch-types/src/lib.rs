//! Shared type definitions for the Gridwatch feeder monitoring service.
//!
//! This crate is the single source of truth for the records that flow
//! between the simulation engine, the stores and the HTTP API. Types
//! flow downstream to `TypeScript` via `ts-rs` for the dashboard pages.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for line, alert and user identifiers
//! - [`enums`] -- Line status, alert type / status, dashboard status
//! - [`structs`] -- Line, alert, user and dashboard payload records

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AlertStatus, AlertType, LineStatus, SystemStatus};
pub use ids::{AlertId, LineId, UserId};
pub use structs::{
    Alert, DEFAULT_LINE_LOAD_KW, DashboardSummary, Line, NewLine, NewUser, SystemHealth,
    SystemSettings, Telemetry, User,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the dashboard pages.

    #[test]
    fn export_bindings() {
        // Types with #[ts(export)] are written to `bindings/` relative
        // to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::LineId::export_all();
        let _ = crate::ids::AlertId::export_all();
        let _ = crate::ids::UserId::export_all();
        let _ = crate::enums::LineStatus::export_all();
        let _ = crate::enums::AlertType::export_all();
        let _ = crate::enums::AlertStatus::export_all();
        let _ = crate::enums::SystemStatus::export_all();
        let _ = crate::structs::Telemetry::export_all();
        let _ = crate::structs::Line::export_all();
        let _ = crate::structs::NewLine::export_all();
        let _ = crate::structs::Alert::export_all();
        let _ = crate::structs::DashboardSummary::export_all();
        let _ = crate::structs::SystemSettings::export_all();
        let _ = crate::structs::SystemHealth::export_all();
    }
}
