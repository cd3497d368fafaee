//! Shared runtime state of the simulation loop.
//!
//! The tick loop writes to a [`SimulationMonitor`] after every tick and the
//! HTTP status handler reads it. All fields are atomics, so neither side
//! ever waits on the other.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use crate::engine::TickSummary;

/// Sentinel stored in `last_tick_ms` before the first tick completes.
const NO_TICK: i64 = i64::MIN;

/// Progress counters for the running simulation.
#[derive(Debug)]
pub struct SimulationMonitor {
    /// Whether the tick loop is currently running.
    running: AtomicBool,

    /// Ticks that completed (successfully listed the registry).
    ticks_completed: AtomicU64,

    /// Ticks that aborted before visiting any line.
    ticks_failed: AtomicU64,

    /// Per-line failures in the most recent completed tick.
    last_line_failures: AtomicU32,

    /// Completion time of the last tick, as Unix milliseconds.
    last_tick_ms: AtomicI64,
}

impl Default for SimulationMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationMonitor {
    /// Create a monitor for a loop that has not started yet.
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            ticks_completed: AtomicU64::new(0),
            ticks_failed: AtomicU64::new(0),
            last_line_failures: AtomicU32::new(0),
            last_tick_ms: AtomicI64::new(NO_TICK),
        }
    }

    /// Mark the loop as started or stopped.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    /// Whether the loop is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Record a completed tick.
    pub fn record_tick(&self, summary: &TickSummary) {
        self.ticks_completed.fetch_add(1, Ordering::AcqRel);
        self.last_line_failures
            .store(summary.failures, Ordering::Release);
        self.last_tick_ms
            .store(Utc::now().timestamp_millis(), Ordering::Release);
    }

    /// Record a tick that aborted.
    pub fn record_failed_tick(&self) {
        self.ticks_failed.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of completed ticks.
    pub fn ticks_completed(&self) -> u64 {
        self.ticks_completed.load(Ordering::Acquire)
    }

    /// Number of aborted ticks.
    pub fn ticks_failed(&self) -> u64 {
        self.ticks_failed.load(Ordering::Acquire)
    }

    /// Per-line failures in the most recent completed tick.
    pub fn last_line_failures(&self) -> u32 {
        self.last_line_failures.load(Ordering::Acquire)
    }

    /// When the last tick completed, if any has.
    pub fn last_tick_at(&self) -> Option<DateTime<Utc>> {
        match self.last_tick_ms.load(Ordering::Acquire) {
            NO_TICK => None,
            ms => DateTime::from_timestamp_millis(ms),
        }
    }

    /// Human-readable loop state for the status panel.
    pub fn status_label(&self) -> &'static str {
        if self.is_running() {
            "Running"
        } else if self.ticks_completed() == 0 && self.ticks_failed() == 0 {
            "Starting"
        } else {
            "Stopped"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_monitor_has_no_ticks() {
        let monitor = SimulationMonitor::new();
        assert!(!monitor.is_running());
        assert_eq!(monitor.ticks_completed(), 0);
        assert!(monitor.last_tick_at().is_none());
        assert_eq!(monitor.status_label(), "Starting");
    }

    #[test]
    fn record_tick_updates_counters() {
        let monitor = SimulationMonitor::new();
        monitor.set_running(true);
        monitor.record_tick(&TickSummary {
            tick: 1,
            lines_processed: 3,
            failures: 1,
            ..TickSummary::default()
        });
        assert_eq!(monitor.ticks_completed(), 1);
        assert_eq!(monitor.last_line_failures(), 1);
        assert!(monitor.last_tick_at().is_some());
        assert_eq!(monitor.status_label(), "Running");
    }

    #[test]
    fn stopped_after_running() {
        let monitor = SimulationMonitor::new();
        monitor.set_running(true);
        monitor.record_failed_tick();
        monitor.set_running(false);
        assert_eq!(monitor.ticks_failed(), 1);
        assert_eq!(monitor.status_label(), "Stopped");
    }
}
