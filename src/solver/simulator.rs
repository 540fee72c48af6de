//! Simulation driver: configuration, single runs and parallel batches.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::circuit::Schematic;
use crate::error::{NodalError, Result};

use super::transient::{Sample, Transient};
use super::{DEFAULT_STEP_SIZE, DEFAULT_STOP_TIME};

/// Configuration for a transient run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransientConfig {
    /// Total simulated time in seconds.
    pub stop_time: f64,
    /// Fixed step size in seconds.
    pub step_size: f64,
}

impl Default for TransientConfig {
    fn default() -> Self {
        Self {
            stop_time: DEFAULT_STOP_TIME,
            step_size: DEFAULT_STEP_SIZE,
        }
    }
}

impl TransientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total simulated time.
    pub fn with_stop_time(mut self, stop_time: f64) -> Self {
        self.stop_time = stop_time;
        self
    }

    /// Set the fixed step size.
    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    /// Number of steps a run takes, counting the one at t = 0.
    pub fn step_count(&self) -> usize {
        (self.stop_time / self.step_size + 1e-9).floor() as usize + 1
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(NodalError::InvalidSimulationParam {
                message: format!("step size must be positive and finite, got {}", self.step_size),
            });
        }
        if !(self.stop_time.is_finite() && self.stop_time >= 0.0) {
            return Err(NodalError::InvalidSimulationParam {
                message: format!("stop time must be non-negative and finite, got {}", self.stop_time),
            });
        }
        Ok(())
    }
}

/// A run that stopped early, together with whatever it had solved.
#[derive(Error, Debug, Clone)]
#[error("{error}")]
pub struct RunFailure {
    error: NodalError,
    /// `None` when the run was rejected before a transient existed
    transient: Option<Box<Transient>>,
}

impl RunFailure {
    fn partial(error: NodalError, transient: Transient) -> Self {
        Self {
            error,
            transient: Some(Box::new(transient)),
        }
    }

    /// The terminal error, usually [`NodalError::StepFailed`].
    pub fn error(&self) -> &NodalError {
        &self.error
    }

    /// The terminated transient, if the run got far enough to build one.
    pub fn transient(&self) -> Option<&Transient> {
        self.transient.as_deref()
    }

    /// Samples solved before the failure, oldest first.
    pub fn history(&self) -> &[Sample] {
        self.transient().map(Transient::history).unwrap_or_default()
    }

    pub fn into_parts(self) -> (NodalError, Option<Transient>) {
        (self.error, self.transient.map(|t| *t))
    }
}

impl From<NodalError> for RunFailure {
    fn from(error: NodalError) -> Self {
        Self {
            error,
            transient: None,
        }
    }
}

impl From<RunFailure> for NodalError {
    fn from(failure: RunFailure) -> Self {
        failure.error
    }
}

/// Outcome of a single run: the finished transient, or the failure with the
/// history gathered before it.
pub type RunResult = std::result::Result<Transient, RunFailure>;

/// Run a complete transient simulation of `schematic`.
///
/// A failed run still hands back its partial history through [`RunFailure`].
pub fn simulate(schematic: &Schematic, config: &TransientConfig) -> RunResult {
    config.validate()?;
    let _span = tracing::info_span!(
        "transient",
        stop_time = config.stop_time,
        step_size = config.step_size
    )
    .entered();

    let mut transient = Transient::new(schematic, config.step_size)?;
    debug!(
        nodes = schematic.node_count(),
        components = schematic.components().len(),
        steps = config.step_count(),
        "starting transient run"
    );

    if let Err(error) = transient.run(schematic, config.stop_time) {
        debug!(samples = transient.history().len(), "transient run failed");
        return Err(RunFailure::partial(error, transient));
    }

    debug!(samples = transient.history().len(), "transient run finished");
    Ok(transient)
}

/// Configuration for batch execution.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Minimum batch size to run in parallel (below this, sequential is faster).
    pub min_jobs_for_parallel: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            min_jobs_for_parallel: 4,
        }
    }
}

impl BatchConfig {
    /// Set the minimum parallel threshold.
    pub fn with_min_parallel(mut self, min: usize) -> Self {
        self.min_jobs_for_parallel = min;
        self
    }
}

/// Simulate independent circuits, one result per job in input order.
///
/// No state is shared between jobs, so each runs on its own rayon worker.
pub fn simulate_batch(jobs: &[(Schematic, TransientConfig)]) -> Vec<RunResult> {
    simulate_batch_with(jobs, &BatchConfig::default())
}

/// [`simulate_batch`] with an explicit [`BatchConfig`].
pub fn simulate_batch_with(
    jobs: &[(Schematic, TransientConfig)],
    batch: &BatchConfig,
) -> Vec<RunResult> {
    if jobs.len() < batch.min_jobs_for_parallel {
        debug!(jobs = jobs.len(), "running batch sequentially");
        return jobs
            .iter()
            .map(|(schematic, config)| simulate(schematic, config))
            .collect();
    }

    debug!(jobs = jobs.len(), "running batch in parallel");
    jobs.par_iter()
        .map(|(schematic, config)| simulate(schematic, config))
        .collect()
}
