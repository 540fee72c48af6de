//! Voltage and current sources.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::circuit::{ComponentId, NodeId, Schematic};
use crate::error::{NodalError, Result};
use crate::solver::Transient;

/// Time-dependent source value.
///
/// `Sin` and `Pulse` follow the SPICE SIN and PULSE definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Waveform {
    /// Constant value held from t = 0.
    Dc(f64),
    /// `offset + amplitude * sin(2π f (t - delay)) * exp(-damping (t - delay))`
    /// after `delay`, `offset` before it.
    Sin {
        offset: f64,
        amplitude: f64,
        frequency: f64,
        delay: f64,
        damping: f64,
    },
    /// Trapezoidal pulse train between `low` and `high`.
    Pulse {
        low: f64,
        high: f64,
        delay: f64,
        rise: f64,
        fall: f64,
        width: f64,
        period: f64,
    },
}

impl Waveform {
    /// Evaluate the waveform at time `t`.
    pub fn value(&self, t: f64) -> f64 {
        match *self {
            Waveform::Dc(value) => value,
            Waveform::Sin {
                offset,
                amplitude,
                frequency,
                delay,
                damping,
            } => {
                if t < delay {
                    return offset;
                }
                let elapsed = t - delay;
                let envelope = if damping != 0.0 {
                    (-elapsed * damping).exp()
                } else {
                    1.0
                };
                offset + amplitude * (2.0 * PI * frequency * elapsed).sin() * envelope
            }
            Waveform::Pulse {
                low,
                high,
                delay,
                rise,
                fall,
                width,
                period,
            } => {
                if t < delay {
                    return low;
                }
                let local = if period > 0.0 {
                    (t - delay) % period
                } else {
                    t - delay
                };

                if local < rise {
                    low + (high - low) * local / rise
                } else if local < rise + width {
                    high
                } else if local < rise + width + fall {
                    high + (low - high) * (local - rise - width) / fall
                } else {
                    low
                }
            }
        }
    }

    /// Evaluate at `t`, rejecting a non-finite result.
    fn checked_value(&self, component: &str, t: f64) -> Result<f64> {
        let value = self.value(t);
        if !value.is_finite() {
            return Err(NodalError::invalid_value(component, "waveform", value));
        }
        Ok(value)
    }
}

impl From<f64> for Waveform {
    fn from(value: f64) -> Self {
        Waveform::Dc(value)
    }
}

/// An ideal voltage source.
///
/// Voltage sources require an extra row/column in the system for the
/// branch current. The source enforces: V+ - V- = V_source
#[derive(Debug, Clone)]
pub struct VoltageSource {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NodeId; 2], // [positive, negative]
    pub waveform: Waveform,
}

impl VoltageSource {
    /// Create a new voltage source.
    pub fn new(name: impl Into<String>, nodes: [NodeId; 2], waveform: impl Into<Waveform>) -> Self {
        Self {
            id: ComponentId(0),
            name: name.into(),
            nodes,
            waveform: waveform.into(),
        }
    }

    /// Source voltage at time `t`.
    pub fn voltage(&self, t: f64) -> f64 {
        self.waveform.value(t)
    }

    pub fn simulate(&self, transient: &mut Transient, _schematic: &Schematic, time: f64) -> Result<()> {
        let volts = self.waveform.checked_value(&self.name, time)?;
        transient.add_voltage_source(self.id, self.nodes[0], self.nodes[1], volts)
    }
}

/// An ideal current source.
///
/// Current flows from `nodes[0]` through the source into `nodes[1]`, and is
/// added directly to the right-hand side of the node equations.
#[derive(Debug, Clone)]
pub struct CurrentSource {
    pub id: ComponentId,
    pub name: String,
    pub nodes: [NodeId; 2],
    pub waveform: Waveform,
}

impl CurrentSource {
    /// Create a new current source.
    pub fn new(name: impl Into<String>, nodes: [NodeId; 2], waveform: impl Into<Waveform>) -> Self {
        Self {
            id: ComponentId(0),
            name: name.into(),
            nodes,
            waveform: waveform.into(),
        }
    }

    /// Source current at time `t`.
    pub fn current(&self, t: f64) -> f64 {
        self.waveform.value(t)
    }

    pub fn simulate(&self, transient: &mut Transient, _schematic: &Schematic, time: f64) -> Result<()> {
        let amps = self.waveform.checked_value(&self.name, time)?;
        transient.add_current(self.nodes[0], self.nodes[1], self.id, amps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pulse() -> Waveform {
        Waveform::Pulse {
            low: 0.0,
            high: 5.0,
            delay: 1e-9,
            rise: 1e-9,
            fall: 1e-9,
            width: 5e-9,
            period: 10e-9,
        }
    }

    #[test]
    fn test_dc_is_constant() {
        let w = Waveform::from(10.0);
        assert_eq!(w.value(0.0), 10.0);
        assert_eq!(w.value(1e3), 10.0);
    }

    #[test]
    fn test_pulse_phases() {
        let w = pulse();
        assert_relative_eq!(w.value(0.5e-9), 0.0);
        assert_relative_eq!(w.value(1.5e-9), 2.5, epsilon = 1e-9);
        assert_relative_eq!(w.value(4e-9), 5.0);
        assert_relative_eq!(w.value(7.5e-9), 2.5, epsilon = 1e-9);
        assert_relative_eq!(w.value(9.5e-9), 0.0);
    }

    #[test]
    fn test_pulse_repeats_each_period() {
        let w = pulse();
        assert_relative_eq!(w.value(14e-9), w.value(4e-9));
    }

    #[test]
    fn test_sin_waveform() {
        let w = Waveform::Sin {
            offset: 1.0,
            amplitude: 2.0,
            frequency: 1000.0,
            delay: 0.0,
            damping: 0.0,
        };
        assert_relative_eq!(w.value(0.0), 1.0);
        assert_relative_eq!(w.value(0.25e-3), 3.0, epsilon = 1e-12);
        assert_relative_eq!(w.value(0.75e-3), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sin_holds_offset_before_delay() {
        let w = Waveform::Sin {
            offset: 0.5,
            amplitude: 1.0,
            frequency: 50.0,
            delay: 1.0,
            damping: 2.0,
        };
        assert_eq!(w.value(0.5), 0.5);
    }

    #[test]
    fn test_non_finite_waveform_is_rejected() {
        let w = Waveform::Dc(f64::INFINITY);
        assert!(matches!(
            w.checked_value("V1", 0.0),
            Err(NodalError::InvalidComponentValue { parameter: "waveform", .. })
        ));
    }
}
