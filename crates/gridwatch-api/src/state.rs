//! Shared application state for the dashboard API.

use std::sync::Arc;

use gridwatch_core::auth::{AuthError, AuthService};
use gridwatch_core::config::GridwatchConfig;
use gridwatch_core::monitor::SimulationMonitor;
use gridwatch_core::store::GridStore;
use gridwatch_types::SystemSettings;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// store handle is the same one the tick engine writes through; handlers
/// only read from it, except for user registration.
#[derive(Debug)]
pub struct AppState<S> {
    /// Line registry, alert ledger and user directory.
    pub store: S,
    /// Registration and login.
    pub auth: AuthService<S>,
    /// Progress of the simulation loop.
    pub monitor: Arc<SimulationMonitor>,
    /// Placeholder settings served to the settings page.
    pub settings: SystemSettings,
    /// Default length of the analytics history.
    pub analytics_limit: u32,
}

impl<S: GridStore> AppState<S> {
    /// Assemble state from a store, an auth service and a monitor.
    pub fn new(store: S, auth: AuthService<S>, monitor: Arc<SimulationMonitor>) -> Self {
        Self {
            store,
            auth,
            monitor,
            settings: SystemSettings::default(),
            analytics_limit: 20,
        }
    }

    /// Build state from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if the auth settings are unusable.
    pub fn from_config(
        store: S,
        config: &GridwatchConfig,
        monitor: Arc<SimulationMonitor>,
    ) -> Result<Self, AuthError> {
        let auth = AuthService::from_config(store.clone(), &config.auth)?;
        Ok(Self {
            analytics_limit: config.simulation.analytics_limit,
            ..Self::new(store, auth, monitor)
        })
    }
}
