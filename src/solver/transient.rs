//! Transient state and the per-step stamp/solve/integrate protocol.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::circuit::{ComponentId, NodeId, Schematic};
use crate::components::BranchRequirement;
use crate::error::{NodalError, Result};
use crate::matrix::{cross_product, Matrix};

/// Where the step protocol currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// System sized and zeroed, no step taken yet.
    Initialized,
    /// Components are adding their contributions.
    Stamping,
    /// The assembled system is being inverted.
    Solving,
    /// Solved voltages are being folded into the accumulators.
    Integrating,
    /// The run is over; no further stamping occurs.
    Terminated,
}

/// One solved time point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Simulated time in seconds
    pub time: f64,
    /// Node voltages indexed by node ID; entry 0 is ground
    pub voltages: Vec<f64>,
    /// Branch currents of voltage sources, in schematic order, measured
    /// into the positive terminal
    pub source_currents: Vec<f64>,
}

/// Accumulators owned by a single component.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchState {
    /// Terminals the integral is taken across (`nodes[0] - nodes[1]`)
    pub nodes: [NodeId; 2],
    /// State the transient allocated for this branch
    pub requirement: BranchRequirement,
    /// ∫(v[nodes[0]] - v[nodes[1]]) dt up to the last solved step
    pub voltage_integral: f64,
    /// Last current recorded for this branch
    pub current: f64,
}

/// Per-run simulation state.
///
/// Owns the system `A x = b` rebuilt every step, the solved voltage history
/// and each component's branch accumulators. Components mutate it only
/// through the additive stamp methods while it is in [`Phase::Stamping`].
#[derive(Debug, Clone)]
pub struct Transient {
    /// System matrix A
    system: Matrix,
    /// Right-hand side b (single column)
    rhs: Matrix,
    /// Nodes in the schematic, including ground
    node_count: usize,
    /// Fixed step size in seconds
    step_size: f64,
    /// Steps completed so far
    step_index: usize,
    phase: Phase,
    /// Most recently solved node voltages, ground included
    previous: Vec<f64>,
    history: Vec<Sample>,
    /// Indexed by component ID
    branches: Vec<BranchState>,
    /// System row of each voltage source's branch current, in schematic order
    source_rows: Vec<(ComponentId, usize)>,
}

impl Transient {
    /// Size the system for `schematic` and zero all state.
    pub fn new(schematic: &Schematic, step_size: f64) -> Result<Self> {
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(NodalError::InvalidSimulationParam {
                message: format!("step size must be positive and finite, got {step_size}"),
            });
        }

        let node_count = schematic.node_count();
        let size = schematic.system_size();

        let mut source_rows = Vec::new();
        let mut branches = Vec::with_capacity(schematic.components().len());
        for component in schematic.components() {
            let requirement = component.branch_requirement();
            if requirement == BranchRequirement::SourceRow {
                let row = (node_count - 1) + source_rows.len();
                source_rows.push((component.id(), row));
            }
            branches.push(BranchState {
                nodes: component.nodes(),
                requirement,
                voltage_integral: 0.0,
                current: 0.0,
            });
        }

        Ok(Self {
            system: Matrix::new(size, size),
            rhs: Matrix::new(1, size),
            node_count,
            step_size,
            step_index: 0,
            phase: Phase::Initialized,
            previous: vec![0.0; node_count],
            history: Vec::new(),
            branches,
            source_rows,
        })
    }

    // ============ Prior-step reads ============

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Time of the step about to be (or being) stamped.
    pub fn time(&self) -> f64 {
        self.step_index as f64 * self.step_size
    }

    /// Voltage at `node` from the last solved step; zero before the first
    /// solve and always zero for ground.
    pub fn previous_voltage(&self, node: NodeId) -> f64 {
        self.previous.get(node.0).copied().unwrap_or(0.0)
    }

    /// Accumulated voltage-time integral across a component's terminals.
    pub fn voltage_integral(&self, id: ComponentId) -> Result<f64> {
        Ok(self.branch(id)?.voltage_integral)
    }

    /// Last current recorded for a component: the value its stamp injected
    /// (inductors, current sources) or the solved branch current (voltage
    /// sources, measured into the positive terminal).
    pub fn branch_current(&self, id: ComponentId) -> Result<f64> {
        Ok(self.branch(id)?.current)
    }

    pub fn branch(&self, id: ComponentId) -> Result<&BranchState> {
        self.branches
            .get(id.0)
            .ok_or(NodalError::ComponentNotFound { id: id.0 })
    }

    /// Solved samples, oldest first.
    pub fn history(&self) -> &[Sample] {
        &self.history
    }

    /// `(time, voltage)` pairs for a single node.
    pub fn voltage_history(&self, node: NodeId) -> Vec<(f64, f64)> {
        self.history
            .iter()
            .map(|sample| (sample.time, sample.voltages.get(node.0).copied().unwrap_or(0.0)))
            .collect()
    }

    /// Consume the transient, keeping only its voltage history.
    pub fn into_history(self) -> Vec<Sample> {
        self.history
    }

    // ============ Stamp API ============
    //
    // Crate-private: only components stamp, each with its own ID.

    /// Stamp a conductance `g` between nodes `a` and `b`.
    pub(crate) fn add_conductance(&mut self, a: NodeId, b: NodeId, g: f64) -> Result<()> {
        let i = self.node_row(a)?;
        let j = self.node_row(b)?;
        if let Some(i) = i {
            self.add_entry(i, i, g)?;
        }
        if let Some(j) = j {
            self.add_entry(j, j, g)?;
        }
        if let (Some(i), Some(j)) = (i, j) {
            self.add_entry(i, j, -g)?;
            self.add_entry(j, i, -g)?;
        }
        Ok(())
    }

    /// Inject `amps` leaving node `from` and entering node `to`, recording
    /// it as the branch current of component `id`.
    pub(crate) fn add_current(&mut self, from: NodeId, to: NodeId, id: ComponentId, amps: f64) -> Result<()> {
        self.add_history_current(from, to, amps)?;
        self.branch_mut(id)?.current = amps;
        Ok(())
    }

    /// Inject `amps` leaving `from` and entering `to` without recording it;
    /// used for companion-model history terms.
    pub(crate) fn add_history_current(&mut self, from: NodeId, to: NodeId, amps: f64) -> Result<()> {
        if let Some(i) = self.node_row(from)? {
            self.add_source(i, -amps)?;
        }
        if let Some(j) = self.node_row(to)? {
            self.add_source(j, amps)?;
        }
        Ok(())
    }

    /// Stamp an ideal voltage source `V[pos] - V[neg] = volts` on the
    /// branch row reserved for component `id`.
    pub(crate) fn add_voltage_source(&mut self, id: ComponentId, pos: NodeId, neg: NodeId, volts: f64) -> Result<()> {
        let br = self
            .source_rows
            .iter()
            .find(|&&(source, _)| source == id)
            .map(|&(_, row)| row)
            .ok_or(NodalError::ComponentNotFound { id: id.0 })?;

        if let Some(i) = self.node_row(pos)? {
            self.add_entry(br, i, 1.0)?;
            self.add_entry(i, br, 1.0)?;
        }
        if let Some(j) = self.node_row(neg)? {
            self.add_entry(br, j, -1.0)?;
            self.add_entry(j, br, -1.0)?;
        }
        self.add_source(br, volts)
    }

    // ============ Step protocol ============

    /// Run one full step: stamp, solve, integrate, advance.
    ///
    /// A failure terminates the run. The history gathered so far is kept and
    /// the error carries the failing step's time.
    pub fn step(&mut self, schematic: &Schematic) -> Result<()> {
        if self.phase == Phase::Terminated {
            return Err(NodalError::Terminated);
        }

        let time = self.time();
        match self.advance(schematic, time) {
            Ok(()) => Ok(()),
            Err(source) => {
                warn!(time, error = %source, "transient step failed");
                self.phase = Phase::Terminated;
                Err(NodalError::step_failed(time, source))
            }
        }
    }

    /// Step until the time passes `stop_time`, then terminate.
    pub fn run(&mut self, schematic: &Schematic, stop_time: f64) -> Result<()> {
        if self.phase == Phase::Terminated {
            return Err(NodalError::Terminated);
        }
        if !(stop_time.is_finite() && stop_time >= 0.0) {
            return Err(NodalError::InvalidSimulationParam {
                message: format!("stop time must be non-negative and finite, got {stop_time}"),
            });
        }

        let last_step = (stop_time / self.step_size + 1e-9).floor() as usize;
        while self.phase != Phase::Terminated && self.step_index <= last_step {
            self.step(schematic)?;
        }
        self.phase = Phase::Terminated;
        Ok(())
    }

    fn advance(&mut self, schematic: &Schematic, time: f64) -> Result<()> {
        self.check_schematic(schematic)?;

        self.phase = Phase::Stamping;
        self.system.clear();
        self.rhs.clear();
        for component in schematic.components() {
            component.simulate(self, schematic, time)?;
        }

        self.phase = Phase::Solving;
        let solution = cross_product(&self.system.inverse()?, &self.rhs)?;

        self.phase = Phase::Integrating;
        self.integrate(time, solution.values());
        self.step_index += 1;

        trace!(time, step = self.step_index, "transient step solved");
        Ok(())
    }

    /// Fold the solved vector into the branch integrals and the history.
    fn integrate(&mut self, time: f64, solution: &[f64]) {
        let nodes = self.node_count - 1;

        let mut voltages = vec![0.0; self.node_count];
        voltages[1..].copy_from_slice(&solution[..nodes]);

        // The first sample opens every integral at zero area.
        if !self.history.is_empty() {
            let dt = self.step_size;
            let integrating = self
                .branches
                .iter_mut()
                .filter(|b| b.requirement == BranchRequirement::VoltageIntegral);
            for branch in integrating {
                let [a, b] = branch.nodes;
                let before = self.previous[a.0] - self.previous[b.0];
                let after = voltages[a.0] - voltages[b.0];
                branch.voltage_integral += 0.5 * dt * (before + after);
            }
        }

        let mut source_currents = Vec::with_capacity(self.source_rows.len());
        for &(id, row) in &self.source_rows {
            self.branches[id.0].current = solution[row];
            source_currents.push(solution[row]);
        }

        self.previous.copy_from_slice(&voltages);
        self.history.push(Sample {
            time,
            voltages,
            source_currents,
        });
    }

    fn check_schematic(&self, schematic: &Schematic) -> Result<()> {
        let expected = (self.node_count, self.branches.len());
        let found = (schematic.node_count(), schematic.components().len());
        if expected != found {
            return Err(NodalError::dimension_mismatch("schematic", expected, found));
        }

        let same_topology = schematic
            .components()
            .iter()
            .zip(&self.branches)
            .all(|(component, branch)| {
                component.nodes() == branch.nodes && component.branch_requirement() == branch.requirement
            });
        if !same_topology {
            return Err(NodalError::InvalidSimulationParam {
                message: "schematic topology differs from the one the transient was built for".into(),
            });
        }
        Ok(())
    }

    fn branch_mut(&mut self, id: ComponentId) -> Result<&mut BranchState> {
        self.branches
            .get_mut(id.0)
            .ok_or(NodalError::ComponentNotFound { id: id.0 })
    }

    /// System row of a node's KCL equation; `None` for ground.
    fn node_row(&self, node: NodeId) -> Result<Option<usize>> {
        if node.0 >= self.node_count {
            return Err(NodalError::dimension_mismatch(
                "stamp",
                self.system.size(),
                (node.0, node.0),
            ));
        }
        Ok(node.system_index())
    }

    fn add_entry(&mut self, row: usize, column: usize, value: f64) -> Result<()> {
        let size = self.system.size();
        let cell = self
            .system
            .get_mut(column, row)
            .map_err(|_| NodalError::dimension_mismatch("stamp", size, (column, row)))?;
        *cell += value;
        Ok(())
    }

    fn add_source(&mut self, row: usize, value: f64) -> Result<()> {
        let size = self.rhs.size();
        let cell = self
            .rhs
            .get_mut(0, row)
            .map_err(|_| NodalError::dimension_mismatch("stamp", size, (0, row)))?;
        *cell += value;
        Ok(())
    }
}
