//! Error types for the nodal simulation core.
//!
//! This module provides a unified error type [`NodalError`] that covers
//! all error conditions raised by the matrix engine, schematic construction,
//! component stamping, and the transient step protocol.

use thiserror::Error;

/// Result type alias using [`NodalError`].
pub type Result<T> = std::result::Result<T, NodalError>;

/// Unified error type for all nodal operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodalError {
    // ============ Matrix Errors ============
    /// Arithmetic between incompatibly-sized matrices, or a stamp outside
    /// the system bounds
    #[error("Dimension mismatch in {operation}: {left:?} vs {right:?}")]
    DimensionMismatch {
        operation: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// Determinant or inverse requested on a non-square matrix
    #[error("Matrix is not square ({width}x{height})")]
    NotSquare { width: usize, height: usize },

    /// Matrix is singular and cannot be inverted
    #[error("Singular matrix - circuit may have a floating node or a zero-impedance loop")]
    SingularMatrix,

    /// Element access beyond the matrix dimensions
    #[error("Index ({column}, {row}) out of bounds for {width}x{height} matrix")]
    OutOfBounds {
        column: usize,
        row: usize,
        width: usize,
        height: usize,
    },

    /// Scalar division by zero
    #[error("Division by zero")]
    DivisionByZero,

    // ============ Schematic Errors ============
    /// Component references a node that is not part of the schematic
    #[error("Node '{node}' not found in schematic")]
    NodeNotFound { node: usize },

    /// Duplicate component name
    #[error("Duplicate component name '{name}'")]
    DuplicateComponent { name: String },

    /// Component ID outside the schematic the transient was built for
    #[error("Component '{id}' not found in schematic")]
    ComponentNotFound { id: usize },

    // ============ Simulation Errors ============
    /// Component parameter makes its governing equation undefined
    #[error("Invalid value {value} for '{parameter}' of component '{component}'")]
    InvalidComponentValue {
        component: String,
        parameter: &'static str,
        value: f64,
    },

    /// Invalid simulation parameter
    #[error("Invalid simulation parameter: {message}")]
    InvalidSimulationParam { message: String },

    /// A time step failed; the run stopped at `time`
    #[error("Simulation failed at t = {time:.6e}s: {source}")]
    StepFailed {
        time: f64,
        #[source]
        source: Box<NodalError>,
    },

    /// The run has already terminated
    #[error("Simulation has terminated; no further steps can be taken")]
    Terminated,

    // ============ Output Errors ============
    /// Error writing simulation results
    #[error("Output error: {message}")]
    OutputError { message: String },
}

impl NodalError {
    /// Create a dimension mismatch error
    pub fn dimension_mismatch(
        operation: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    ) -> Self {
        Self::DimensionMismatch {
            operation,
            left,
            right,
        }
    }

    /// Create an invalid component value error
    pub fn invalid_value(component: impl Into<String>, parameter: &'static str, value: f64) -> Self {
        Self::InvalidComponentValue {
            component: component.into(),
            parameter,
            value,
        }
    }

    /// Wrap an error with the time of the step that raised it
    pub fn step_failed(time: f64, source: NodalError) -> Self {
        Self::StepFailed {
            time,
            source: Box::new(source),
        }
    }

    /// The underlying error, with any step context removed.
    pub fn root(&self) -> &NodalError {
        match self {
            Self::StepFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_unwraps_step_context() {
        let err = NodalError::step_failed(0.5, NodalError::SingularMatrix);
        assert_eq!(err.root(), &NodalError::SingularMatrix);
        assert_eq!(NodalError::DivisionByZero.root(), &NodalError::DivisionByZero);
    }

    #[test]
    fn test_step_failed_message_names_time() {
        let err = NodalError::step_failed(1e-3, NodalError::SingularMatrix);
        let message = err.to_string();
        assert!(message.contains("1.000000e-3"));
        assert!(message.contains("Singular matrix"));
    }
}
