//! Linear passive components: Resistor, Capacitor, Inductor.

use crate::circuit::{ComponentId, NodeId, Schematic};
use crate::error::{NodalError, Result};
use crate::solver::Transient;

/// A resistor component.
#[derive(Debug, Clone)]
pub struct Resistor {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NodeId; 2],
    pub resistance: f64,
}

impl Resistor {
    /// Create a new resistor. The ID is assigned when it joins a schematic.
    pub fn new(name: impl Into<String>, nodes: [NodeId; 2], resistance: f64) -> Self {
        Self {
            id: ComponentId(0),
            name: name.into(),
            nodes,
            resistance,
        }
    }

    /// Get the conductance (1/R).
    pub fn conductance(&self) -> Result<f64> {
        if self.resistance == 0.0 || !self.resistance.is_finite() {
            return Err(NodalError::invalid_value(&self.name, "resistance", self.resistance));
        }
        Ok(1.0 / self.resistance)
    }

    /// Stamp `G = 1/R` between the two terminals.
    pub fn simulate(&self, transient: &mut Transient, _schematic: &Schematic, _time: f64) -> Result<()> {
        let g = self.conductance()?;
        transient.add_conductance(self.nodes[0], self.nodes[1], g)
    }
}

/// A capacitor component.
///
/// Discretized with the backward-Euler companion model:
///   i(n) = (C/dt) * (v(n) - v(n-1))
///
/// which is a conductance `G_eq = C/dt` in parallel with a history current
/// source `G_eq * v(n-1)` driven from the previous step's solved voltages.
#[derive(Debug, Clone)]
pub struct Capacitor {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NodeId; 2],
    pub capacitance: f64,
}

impl Capacitor {
    /// Create a new capacitor.
    pub fn new(name: impl Into<String>, nodes: [NodeId; 2], capacitance: f64) -> Self {
        Self {
            id: ComponentId(0),
            name: name.into(),
            nodes,
            capacitance,
        }
    }

    /// Get the equivalent conductance for the companion model.
    pub fn conductance(&self, dt: f64) -> Result<f64> {
        if !self.capacitance.is_finite() {
            return Err(NodalError::invalid_value(&self.name, "capacitance", self.capacitance));
        }
        Ok(self.capacitance / dt)
    }

    pub fn simulate(&self, transient: &mut Transient, _schematic: &Schematic, _time: f64) -> Result<()> {
        let [a, b] = self.nodes;
        let g = self.conductance(transient.step_size())?;
        let v_prev = transient.previous_voltage(a) - transient.previous_voltage(b);

        transient.add_conductance(a, b, g)?;
        // History term pushes current back into the positive terminal.
        transient.add_history_current(b, a, g * v_prev)
    }
}

/// An inductor component.
///
/// Modeled directly from `I = (1/L) * ∫v dt`: each step the inductor reads
/// the voltage-time integral the transient has accumulated across its
/// terminals and injects the resulting current as a Norton source, leaving
/// `nodes[0]` and entering `nodes[1]`.
#[derive(Debug, Clone)]
pub struct Inductor {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NodeId; 2],
    pub inductance: f64,
}

impl Inductor {
    /// Create a new inductor.
    pub fn new(name: impl Into<String>, nodes: [NodeId; 2], inductance: f64) -> Self {
        Self {
            id: ComponentId(0),
            name: name.into(),
            nodes,
            inductance,
        }
    }

    /// Branch current implied by a voltage-time integral.
    pub fn current(&self, voltage_integral: f64) -> Result<f64> {
        if self.inductance == 0.0 || !self.inductance.is_finite() {
            return Err(NodalError::invalid_value(&self.name, "inductance", self.inductance));
        }
        Ok(voltage_integral / self.inductance)
    }

    pub fn simulate(&self, transient: &mut Transient, _schematic: &Schematic, _time: f64) -> Result<()> {
        let current = self.current(transient.voltage_integral(self.id)?)?;
        transient.add_current(self.nodes[0], self.nodes[1], self.id, current)
    }
}
