//! Simulation engine and domain services for the Gridwatch feeder
//! monitoring service.
//!
//! Every tick, each feeder line either holds its status or flips between
//! operational and fault according to a two-state Markov chain. Entering
//! fault opens an alert, leaving it resolves the alert, and a fresh
//! telemetry reading is drawn from the envelope of the resulting status.
//!
//! # Modules
//!
//! - [`auth`] -- Password hashing, session tokens, register and login.
//! - [`config`] -- Configuration loading from `gridwatch.yaml` into
//!   strongly-typed structs.
//! - [`engine`] -- The per-line fault state machine and [`SimulationEngine`].
//! - [`memory`] -- [`MemoryStore`], an in-process implementation of every
//!   store trait.
//! - [`monitor`] -- Lock-free progress counters shared with the API.
//! - [`query`] -- Dashboard, live listing and alert history views.
//! - [`runner`] -- The periodic loop that drives the engine.
//! - [`seed`] -- First-start registry bootstrap.
//! - [`store`] -- [`LineRegistry`], [`AlertLedger`] and [`UserDirectory`].
//! - [`telemetry`] -- Normal and fault reading envelopes.
//!
//! [`SimulationEngine`]: engine::SimulationEngine
//! [`MemoryStore`]: memory::MemoryStore
//! [`LineRegistry`]: store::LineRegistry
//! [`AlertLedger`]: store::AlertLedger
//! [`UserDirectory`]: store::UserDirectory

pub mod auth;
pub mod config;
pub mod engine;
pub mod memory;
pub mod monitor;
pub mod query;
pub mod runner;
pub mod seed;
pub mod store;
pub mod telemetry;
