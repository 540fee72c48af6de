//! Component models for transient simulation.
//!
//! This module provides the stampable circuit elements:
//! - Linear: Resistor, Capacitor, Inductor
//! - Sources: Voltage Source, Current Source (driven by a [`Waveform`])
//!
//! Every variant stamps its governing equation into a [`Transient`]'s system
//! once per time step through [`Component::simulate`]. Stamps only ever add
//! to the system; a component reads prior-step state from the transient and
//! touches no accumulator other than its own.

mod linear;
mod sources;

pub use linear::{Capacitor, Inductor, Resistor};
pub use sources::{CurrentSource, VoltageSource, Waveform};

use crate::circuit::{ComponentId, NodeId, Schematic};
use crate::error::Result;
use crate::solver::Transient;

/// Per-branch state a component needs the transient to allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchRequirement {
    /// Only the shared node equations.
    None,
    /// An extra system row carrying the branch current (ideal voltage sources).
    SourceRow,
    /// A running voltage-time integral across the terminals (inductors).
    VoltageIntegral,
}

/// A circuit component.
#[derive(Debug, Clone)]
pub enum Component {
    Resistor(Resistor),
    Capacitor(Capacitor),
    Inductor(Inductor),
    VoltageSource(VoltageSource),
    CurrentSource(CurrentSource),
}

impl Component {
    /// Stamp this component's contribution for the step at `time`.
    pub fn simulate(&self, transient: &mut Transient, schematic: &Schematic, time: f64) -> Result<()> {
        match self {
            Component::Resistor(r) => r.simulate(transient, schematic, time),
            Component::Capacitor(c) => c.simulate(transient, schematic, time),
            Component::Inductor(l) => l.simulate(transient, schematic, time),
            Component::VoltageSource(v) => v.simulate(transient, schematic, time),
            Component::CurrentSource(i) => i.simulate(transient, schematic, time),
        }
    }

    /// Get the component ID.
    pub fn id(&self) -> ComponentId {
        match self {
            Component::Resistor(r) => r.id,
            Component::Capacitor(c) => c.id,
            Component::Inductor(l) => l.id,
            Component::VoltageSource(v) => v.id,
            Component::CurrentSource(i) => i.id,
        }
    }

    /// Get the component name.
    pub fn name(&self) -> &str {
        match self {
            Component::Resistor(r) => &r.name,
            Component::Capacitor(c) => &c.name,
            Component::Inductor(l) => &l.name,
            Component::VoltageSource(v) => &v.name,
            Component::CurrentSource(i) => &i.name,
        }
    }

    /// Terminal nodes, in the component's own polarity order.
    pub fn nodes(&self) -> [NodeId; 2] {
        match self {
            Component::Resistor(r) => r.nodes,
            Component::Capacitor(c) => c.nodes,
            Component::Inductor(l) => l.nodes,
            Component::VoltageSource(v) => v.nodes,
            Component::CurrentSource(i) => i.nodes,
        }
    }

    pub fn branch_requirement(&self) -> BranchRequirement {
        match self {
            Component::Inductor(_) => BranchRequirement::VoltageIntegral,
            Component::VoltageSource(_) => BranchRequirement::SourceRow,
            _ => BranchRequirement::None,
        }
    }

    /// Called by the schematic when the component is added.
    pub(crate) fn assign_id(&mut self, id: ComponentId) {
        match self {
            Component::Resistor(r) => r.id = id,
            Component::Capacitor(c) => c.id = id,
            Component::Inductor(l) => l.id = id,
            Component::VoltageSource(v) => v.id = id,
            Component::CurrentSource(i) => i.id = id,
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Component {
                fn from(component: $variant) -> Self {
                    Component::$variant(component)
                }
            }
        )*
    };
}

impl_from_variant!(Resistor, Capacitor, Inductor, VoltageSource, CurrentSource);
