//! Transient solver.
//!
//! This module provides the time-stepped modified nodal analysis engine.
//!
//! ## Modified Nodal Analysis
//!
//! Each step assembles a system of equations Ax = b where:
//! - x contains node voltages (ground excluded) and voltage source currents
//! - A is the conductance/coefficient matrix
//! - b is the source vector
//!
//! The matrix structure is:
//! ```text
//! [ G   B ] [ v ]   [ i ]
//! [ C   0 ] [ j ] = [ e ]
//! ```
//!
//! where:
//! - G is the conductance matrix (node equations)
//! - B, C connect voltage sources to nodes
//! - v is the vector of node voltages
//! - j is the vector of voltage source currents
//! - i is the sum of currents injected into each node
//! - e is the vector of voltage source values
//!
//! A step moves through the phases of [`Phase`]: components stamp into a
//! zeroed system, the system is solved by inversion, and the solution is
//! integrated into the branch accumulators and the voltage history.

mod simulator;
mod transient;

pub use simulator::{
    simulate, simulate_batch, simulate_batch_with, BatchConfig, RunFailure, RunResult, TransientConfig,
};
pub use transient::{BranchState, Phase, Sample, Transient};

/// Default total simulated time in seconds.
pub const DEFAULT_STOP_TIME: f64 = 1e-3;

/// Default fixed step size in seconds.
pub const DEFAULT_STEP_SIZE: f64 = 1e-6;
