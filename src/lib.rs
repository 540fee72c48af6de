//! # Nodal Core
//!
//! The numerical core of a time-stepped circuit simulator.
//!
//! This library provides:
//! - A dense matrix engine (arithmetic, products, powers, determinant,
//!   Gauss-Jordan inverse, transpose, tolerance equality)
//! - A schematic model: nodes plus an ordered list of components
//! - Component models that stamp their equations into a shared system
//! - The transient step protocol: stamp, solve, integrate, advance
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`matrix`] - Dense row-major matrix engine
//! - [`circuit`] - Schematic topology (nodes and components)
//! - [`components`] - Component models (resistors, capacitors, inductors, sources)
//! - [`solver`] - Transient state, stamping API and simulation driver
//!
//! ## Usage
//!
//! ```
//! use nodal_core::circuit::{NodeId, Schematic};
//! use nodal_core::components::{Inductor, VoltageSource};
//! use nodal_core::solver::{simulate, TransientConfig};
//!
//! let mut schematic = Schematic::new();
//! let n1 = schematic.add_node();
//! schematic.add_component(VoltageSource::new("V1", [n1, NodeId::GROUND], 10.0))?;
//! let l1 = schematic.add_component(Inductor::new("L1", [n1, NodeId::GROUND], 2.0))?;
//!
//! let config = TransientConfig::new().with_stop_time(1.0).with_step_size(1e-3);
//! let transient = simulate(&schematic, &config)?;
//! assert!((transient.branch_current(l1)? - 5.0).abs() < 1e-2);
//! # Ok::<(), nodal_core::NodalError>(())
//! ```
//!
//! ## Simulation Method
//!
//! For each time step:
//!
//! 1. Every component adds its contribution to the system matrix A and
//!    source vector b, in schematic order
//! 2. Solve x = A⁻¹ b for node voltages and voltage source currents
//! 3. Fold the new voltages into each inductor's voltage-time integral
//!    (trapezoidal rule) and append them to the history
//!
//! Capacitors use a backward-Euler companion model; inductors inject the
//! current implied by their accumulated voltage-time integral.

pub mod circuit;
pub mod components;
pub mod error;
pub mod matrix;
pub mod solver;

// Re-export main types for convenience
pub use circuit::Schematic;
pub use error::{NodalError, Result};
pub use matrix::Matrix;
pub use solver::{simulate, RunFailure, Transient, TransientConfig};
