//! Simulation tick engine: the per-line fault state machine.
//!
//! Each tick visits every registered line once, in name order:
//!
//! 1. **Status roll** -- an operational line faults with probability
//!    `fault_probability`; a faulted line recovers with probability
//!    `recovery_probability`. Offline lines are left untouched.
//! 2. **Alert bookkeeping** -- entering `Fault` opens (or reuses) the
//!    line's active alert; leaving it resolves that alert. A line whose
//!    status did not change is reconciled instead: a faulted line with no
//!    active alert gets one, an operational line with one has it resolved.
//! 3. **Telemetry** -- a fresh reading is drawn from the envelope of the
//!    status the line ended up in, and power / load are recomputed.
//! 4. **Write-back** -- the whole line record is saved.
//!
//! A failure in steps 2-4 is logged and only affects that line; the rest
//! of the tick proceeds. If the alert write landed but the save did not,
//! the next tick's reconciliation repairs the pair.

use gridwatch_types::{Alert, Line, LineId, LineStatus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};

use crate::config::SimulationConfig;
use crate::store::{AlertLedger, LineRegistry, StoreError};
use crate::telemetry::Envelope;

/// Per-tick transition probabilities of the two-state fault chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultModel {
    /// Chance per tick that an operational line faults.
    pub fault_probability: f64,
    /// Chance per tick that a faulted line recovers.
    pub recovery_probability: f64,
}

impl FaultModel {
    /// 5% fault chance, 20% recovery chance.
    pub const DEFAULT: Self = Self {
        fault_probability: 0.05,
        recovery_probability: 0.20,
    };

    /// Build the model from configuration.
    pub const fn from_config(config: &SimulationConfig) -> Self {
        Self {
            fault_probability: config.fault_probability,
            recovery_probability: config.recovery_probability,
        }
    }
}

impl Default for FaultModel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What happened to a line's status during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Status unchanged.
    Held,
    /// Operational to fault.
    Faulted,
    /// Fault to operational.
    Recovered,
    /// Offline; the engine did not touch the line.
    Skipped,
}

/// Apply one status roll. `roll` is a uniform draw from `[0, 1)`.
pub fn next_status(status: LineStatus, roll: f64, model: &FaultModel) -> (LineStatus, Transition) {
    match status {
        LineStatus::Operational if roll < model.fault_probability => {
            (LineStatus::Fault, Transition::Faulted)
        }
        LineStatus::Fault if roll < model.recovery_probability => {
            (LineStatus::Operational, Transition::Recovered)
        }
        LineStatus::Offline => (status, Transition::Skipped),
        LineStatus::Operational | LineStatus::Fault => (status, Transition::Held),
    }
}

/// Errors that abort a whole tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The registry could not be listed, so no line was visited.
    #[error("failed to list lines: {source}")]
    ListLines {
        /// The underlying store error.
        source: StoreError,
    },
}

/// Errors confined to one line's update.
#[derive(Debug, thiserror::Error)]
pub enum LineUpdateError {
    /// Looking up the line's active alert failed.
    #[error("failed to look up alert for line {line_id}: {source}")]
    LookupAlert {
        /// The affected line.
        line_id: LineId,
        /// The underlying store error.
        source: StoreError,
    },

    /// Opening the alert for a new fault failed.
    #[error("failed to open alert for line {line_id}: {source}")]
    OpenAlert {
        /// The affected line.
        line_id: LineId,
        /// The underlying store error.
        source: StoreError,
    },

    /// Resolving the alert for a recovered line failed.
    #[error("failed to resolve alert for line {line_id}: {source}")]
    ResolveAlert {
        /// The affected line.
        line_id: LineId,
        /// The underlying store error.
        source: StoreError,
    },

    /// Writing the line record back failed.
    #[error("failed to save line {line_id}: {source}")]
    Save {
        /// The affected line.
        line_id: LineId,
        /// The underlying store error.
        source: StoreError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that was executed (first tick is 1).
    pub tick: u64,
    /// Lines whose update was written back.
    pub lines_processed: u32,
    /// Lines that entered fault this tick.
    pub faults_raised: u32,
    /// Lines that recovered this tick.
    pub faults_cleared: u32,
    /// Offline lines left untouched.
    pub lines_skipped: u32,
    /// Lines whose update failed and was skipped.
    pub failures: u32,
}

/// Owns the line registry, the alert ledger and the random source, and
/// advances every line once per [`run_tick`](Self::run_tick).
#[derive(Debug)]
pub struct SimulationEngine<R, L> {
    registry: R,
    ledger: L,
    model: FaultModel,
    rng: StdRng,
    tick: u64,
}

impl<R, L> SimulationEngine<R, L>
where
    R: LineRegistry,
    L: AlertLedger,
{
    /// Create an engine with an explicit random source.
    pub const fn new(registry: R, ledger: L, model: FaultModel, rng: StdRng) -> Self {
        Self {
            registry,
            ledger,
            model,
            rng,
            tick: 0,
        }
    }

    /// Create an engine from configuration. A configured seed makes runs
    /// reproducible; otherwise the random source is seeded from the OS.
    pub fn from_config(registry: R, ledger: L, config: &SimulationConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::new(registry, ledger, FaultModel::from_config(config), rng)
    }

    /// Number of ticks executed so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The transition probabilities in use.
    pub const fn model(&self) -> FaultModel {
        self.model
    }

    /// Replace the transition probabilities for subsequent ticks.
    pub const fn set_model(&mut self, model: FaultModel) {
        self.model = model;
    }

    /// The line registry the engine writes to.
    pub const fn registry(&self) -> &R {
        &self.registry
    }

    /// The alert ledger the engine writes to.
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Advance every line by one tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::ListLines`] if the registry cannot be read.
    /// Per-line failures never surface here; they are logged and counted
    /// in [`TickSummary::failures`].
    pub async fn run_tick(&mut self) -> Result<TickSummary, TickError> {
        self.tick = self.tick.saturating_add(1);
        let mut summary = TickSummary {
            tick: self.tick,
            ..TickSummary::default()
        };

        let lines = self
            .registry
            .list()
            .await
            .map_err(|source| TickError::ListLines { source })?;

        for line in lines {
            let name = line.name.clone();
            match self.advance_line(line).await {
                Ok(Transition::Skipped) => {
                    summary.lines_skipped = summary.lines_skipped.saturating_add(1);
                }
                Ok(transition) => {
                    summary.lines_processed = summary.lines_processed.saturating_add(1);
                    match transition {
                        Transition::Faulted => {
                            summary.faults_raised = summary.faults_raised.saturating_add(1);
                        }
                        Transition::Recovered => {
                            summary.faults_cleared = summary.faults_cleared.saturating_add(1);
                        }
                        Transition::Held | Transition::Skipped => {}
                    }
                }
                Err(e) => {
                    error!(tick = self.tick, line = %name, error = %e, "Line update failed, skipping");
                    summary.failures = summary.failures.saturating_add(1);
                }
            }
        }

        debug!(
            tick = summary.tick,
            processed = summary.lines_processed,
            faults_raised = summary.faults_raised,
            faults_cleared = summary.faults_cleared,
            failures = summary.failures,
            "Tick complete"
        );
        Ok(summary)
    }

    /// Run the state machine for one line and write it back.
    async fn advance_line(&mut self, mut line: Line) -> Result<Transition, LineUpdateError> {
        let roll: f64 = self.rng.random();
        let (status, transition) = next_status(line.status, roll, &self.model);

        let Some(envelope) = Envelope::for_status(status) else {
            return Ok(Transition::Skipped);
        };

        match transition {
            Transition::Faulted => {
                let alert = self.open_alert(&line).await?;
                info!(line = %line.name, alert_id = %alert.id, "Fault detected");
            }
            Transition::Recovered => match self.resolve_alert(&line).await? {
                Some(alert) => {
                    info!(line = %line.name, alert_id = %alert.id, "Fault resolved");
                }
                None => warn!(line = %line.name, "Line recovered with no active alert"),
            },
            Transition::Held => self.reconcile_alert(&line, status).await?,
            Transition::Skipped => {}
        }

        line.status = status;
        line.apply_telemetry(envelope.sample(&mut self.rng));

        self.registry
            .save(&line)
            .await
            .map_err(|source| LineUpdateError::Save {
                line_id: line.id,
                source,
            })?;

        Ok(transition)
    }

    /// Make the ledger agree with a status that did not change this tick.
    /// Only an earlier update that failed between its alert write and its
    /// save can leave them apart.
    async fn reconcile_alert(
        &self,
        line: &Line,
        status: LineStatus,
    ) -> Result<(), LineUpdateError> {
        let active = self
            .ledger
            .find_active_for(line.id)
            .await
            .map_err(|source| LineUpdateError::LookupAlert {
                line_id: line.id,
                source,
            })?;

        match (status, active) {
            (LineStatus::Fault, None) => {
                let alert = self.open_alert(line).await?;
                warn!(
                    line = %line.name,
                    alert_id = %alert.id,
                    "Opened missing alert for faulted line"
                );
            }
            (LineStatus::Operational, Some(stale)) => {
                self.resolve_alert(line).await?;
                warn!(
                    line = %line.name,
                    alert_id = %stale.id,
                    "Resolved stale alert on operational line"
                );
            }
            _ => {}
        }
        Ok(())
    }

    async fn open_alert(&self, line: &Line) -> Result<Alert, LineUpdateError> {
        self.ledger
            .open_for(line.id, &line.name)
            .await
            .map_err(|source| LineUpdateError::OpenAlert {
                line_id: line.id,
                source,
            })
    }

    async fn resolve_alert(&self, line: &Line) -> Result<Option<Alert>, LineUpdateError> {
        self.ledger
            .resolve(line.id)
            .await
            .map_err(|source| LineUpdateError::ResolveAlert {
                line_id: line.id,
                source,
            })
    }
}
