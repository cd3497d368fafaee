//! Periodic driver for the tick engine.
//!
//! [`run_simulation`] fires the first tick immediately and then one tick
//! per period. Ticks never overlap: a tick that overruns its period delays
//! the next one instead of queueing a burst. A tick that fails outright is
//! logged and the loop carries on.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::engine::{SimulationEngine, TickSummary};
use crate::monitor::SimulationMonitor;
use crate::store::{AlertLedger, LineRegistry};

/// Reason why the simulation loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// The shutdown future completed.
    Shutdown,
    /// The configured tick limit was reached.
    TickLimit,
}

/// How the loop should be paced and bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Time between tick starts.
    pub period: Duration,
    /// Stop after this many ticks. `None` runs until shutdown.
    pub max_ticks: Option<u64>,
}

impl RunOptions {
    /// Unbounded run at the given period.
    pub const fn every(period: Duration) -> Self {
        Self {
            period,
            max_ticks: None,
        }
    }
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// Why the loop returned.
    pub end_reason: SimulationEndReason,
    /// The last completed tick, if any.
    pub final_summary: Option<TickSummary>,
    /// Ticks attempted, including aborted ones.
    pub total_ticks: u64,
}

/// Drive `engine` until `shutdown` resolves or the tick limit is hit.
///
/// The monitor is marked running for the duration of the call and
/// updated after every tick.
pub async fn run_simulation<R, L, F>(
    engine: &mut SimulationEngine<R, L>,
    monitor: &SimulationMonitor,
    options: RunOptions,
    shutdown: F,
) -> SimulationResult
where
    R: LineRegistry,
    L: AlertLedger,
    F: Future<Output = ()>,
{
    // tokio panics on a zero period.
    let period = options.period.max(Duration::from_millis(1));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut final_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
        max_ticks = options.max_ticks,
        "Simulation starting"
    );
    monitor.set_running(true);

    let end_reason = loop {
        if options.max_ticks.is_some_and(|max| total_ticks >= max) {
            info!(total_ticks, "Tick limit reached");
            break SimulationEndReason::TickLimit;
        }

        tokio::select! {
            biased;
            () = &mut shutdown => {
                info!("Shutdown requested");
                break SimulationEndReason::Shutdown;
            }
            _ = interval.tick() => {}
        }

        total_ticks = total_ticks.saturating_add(1);
        match engine.run_tick().await {
            Ok(summary) => {
                monitor.record_tick(&summary);
                final_summary = Some(summary);
            }
            Err(e) => {
                error!(tick = engine.tick(), error = %e, "Tick failed");
                monitor.record_failed_tick();
            }
        }
    };

    monitor.set_running(false);
    SimulationResult {
        end_reason,
        final_summary,
        total_ticks,
    }
}

/// Log the outcome of a finished run.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );
    if result.final_summary.is_none() {
        warn!("Simulation ended with no completed ticks");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gridwatch_types::NewLine;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::engine::FaultModel;
    use crate::memory::MemoryStore;

    async fn engine() -> SimulationEngine<MemoryStore, MemoryStore> {
        let store = MemoryStore::new();
        store
            .insert_many(&[
                NewLine::new("Feeder Line 01", "Trivandrum North"),
                NewLine::new("Feeder Line 02", "Kollam Industrial"),
            ])
            .await
            .unwrap();
        SimulationEngine::new(
            store.clone(),
            store,
            FaultModel::DEFAULT,
            StdRng::seed_from_u64(9),
        )
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let mut engine = engine().await;
        let monitor = SimulationMonitor::new();
        let options = RunOptions {
            period: Duration::from_millis(1),
            max_ticks: Some(5),
        };

        let result = run_simulation(&mut engine, &monitor, options, std::future::pending()).await;

        assert_eq!(result.end_reason, SimulationEndReason::TickLimit);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.unwrap().tick, 5);
        assert_eq!(monitor.ticks_completed(), 5);
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn ready_shutdown_runs_no_ticks() {
        let mut engine = engine().await;
        let monitor = SimulationMonitor::new();

        let result = run_simulation(
            &mut engine,
            &monitor,
            RunOptions::every(Duration::from_secs(5)),
            std::future::ready(()),
        )
        .await;

        assert_eq!(result.end_reason, SimulationEndReason::Shutdown);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_is_immediate_then_periodic() {
        let mut engine = engine().await;
        let monitor = SimulationMonitor::new();
        let shutdown = tokio::time::sleep(Duration::from_millis(260));

        let result = run_simulation(
            &mut engine,
            &monitor,
            RunOptions::every(Duration::from_millis(50)),
            shutdown,
        )
        .await;

        // Ticks at 0, 50, 100, 150, 200 and 250 ms.
        assert_eq!(result.end_reason, SimulationEndReason::Shutdown);
        assert!((5..=7).contains(&result.total_ticks), "{}", result.total_ticks);
    }
}
