//! Whole-run transient scenarios.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use nodal_core::circuit::{NodeId, Schematic};
use nodal_core::components::{Capacitor, CurrentSource, Inductor, Resistor, VoltageSource, Waveform};
use nodal_core::matrix::{cross_product, Matrix};
use nodal_core::solver::{simulate, Phase, Transient, TransientConfig};
use nodal_core::NodalError;

const GND: NodeId = NodeId::GROUND;

#[test]
fn inverse_of_reference_matrix() {
    let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    assert_relative_eq!(m.determinant().unwrap(), -2.0, epsilon = 1e-12);

    let inverse = m.inverse().unwrap();
    let expected = Matrix::from_rows(vec![vec![-2.0, 1.0], vec![1.5, -0.5]]).unwrap();
    assert_abs_diff_eq!(inverse, expected, epsilon = 1e-9);
    assert_abs_diff_eq!(
        cross_product(&inverse, &m).unwrap(),
        Matrix::identity(2),
        epsilon = 1e-9
    );
}

#[test]
fn inductor_driven_by_held_source() {
    let mut schematic = Schematic::with_nodes(1);
    schematic
        .add_component(VoltageSource::new("V1", [NodeId(1), GND], 10.0))
        .unwrap();
    let l1 = schematic
        .add_component(Inductor::new("L1", [NodeId(1), GND], 2.0))
        .unwrap();

    let config = TransientConfig::new().with_stop_time(1.0).with_step_size(1e-3);
    let transient = simulate(&schematic, &config).unwrap();

    // 10 V * 1 s / 2 H, less one step of truncation.
    assert_relative_eq!(transient.branch_current(l1).unwrap(), 5.0, epsilon = 1e-2);
    assert_eq!(transient.phase(), Phase::Terminated);
}

#[test]
fn floating_node_fails_first_solve() {
    let mut schematic = Schematic::with_nodes(2);
    schematic
        .add_component(VoltageSource::new("V1", [NodeId(1), GND], 1.0))
        .unwrap();
    schematic
        .add_component(Resistor::new("R1", [NodeId(1), GND], 100.0))
        .unwrap();

    let mut transient = Transient::new(&schematic, 1e-3).unwrap();
    let err = transient.run(&schematic, 1e-2).unwrap_err();

    assert!(matches!(err, NodalError::StepFailed { time, .. } if time == 0.0));
    assert_eq!(err.root(), &NodalError::SingularMatrix);
    assert!(transient.history().is_empty());
}

#[test]
fn lc_tank_oscillates() {
    // Charged capacitor discharging through an inductor: the voltage must
    // cross zero near a quarter period, T = 2π sqrt(LC) = 2π ms.
    let mut schematic = Schematic::with_nodes(1);
    schematic
        .add_component(CurrentSource::new(
            "I1",
            [GND, NodeId(1)],
            Waveform::Pulse {
                low: 0.0,
                high: 1.0,
                delay: 0.0,
                rise: 0.0,
                fall: 0.0,
                width: 1e-6,
                period: 0.0,
            },
        ))
        .unwrap();
    schematic
        .add_component(Capacitor::new("C1", [NodeId(1), GND], 1e-3))
        .unwrap();
    schematic
        .add_component(Inductor::new("L1", [NodeId(1), GND], 1e-3))
        .unwrap();

    let config = TransientConfig::new().with_stop_time(4e-3).with_step_size(1e-6);
    let transient = simulate(&schematic, &config).unwrap();

    let trace = transient.voltage_history(NodeId(1));
    let peak = trace.iter().map(|&(_, v)| v).fold(f64::MIN, f64::max);
    assert!(peak > 0.0);

    let crossing = trace
        .windows(2)
        .find(|w| w[0].1 > 0.0 && w[1].1 <= 0.0)
        .map(|w| w[1].0)
        .expect("voltage never crossed zero");
    let quarter = std::f64::consts::PI / 2.0 * 1e-3;
    assert!((crossing - quarter).abs() < 0.05 * quarter, "crossing at {crossing}");
}

#[test]
fn components_share_node_rows_additively() {
    // Two parallel resistors behave as their combined conductance.
    let mut schematic = Schematic::with_nodes(1);
    schematic
        .add_component(CurrentSource::new("I1", [GND, NodeId(1)], 1.0))
        .unwrap();
    schematic
        .add_component(Resistor::new("R1", [NodeId(1), GND], 2.0))
        .unwrap();
    schematic
        .add_component(Resistor::new("R2", [NodeId(1), GND], 2.0))
        .unwrap();

    let config = TransientConfig::new().with_stop_time(0.0).with_step_size(1.0);
    let transient = simulate(&schematic, &config).unwrap();

    assert_eq!(transient.history().len(), 1);
    assert_relative_eq!(transient.history()[0].voltages[1], 1.0, epsilon = 1e-12);
}

#[test]
fn runs_are_reproducible() {
    let mut schematic = Schematic::with_nodes(2);
    schematic
        .add_component(VoltageSource::new(
            "V1",
            [NodeId(1), GND],
            Waveform::Sin {
                offset: 0.0,
                amplitude: 1.0,
                frequency: 1e3,
                delay: 0.0,
                damping: 0.0,
            },
        ))
        .unwrap();
    schematic
        .add_component(Resistor::new("R1", [NodeId(1), NodeId(2)], 1e3))
        .unwrap();
    schematic
        .add_component(Capacitor::new("C1", [NodeId(2), GND], 1e-7))
        .unwrap();

    let config = TransientConfig::new().with_stop_time(2e-3).with_step_size(1e-5);
    let first = simulate(&schematic, &config).unwrap().into_history();
    let second = simulate(&schematic, &config).unwrap().into_history();
    assert_eq!(first, second);
}

#[test]
fn failed_simulation_returns_partial_history() {
    // The source holds its offset until t = 3, then evaluates to NaN.
    let mut schematic = Schematic::with_nodes(1);
    schematic
        .add_component(VoltageSource::new(
            "V1",
            [NodeId(1), GND],
            Waveform::Sin {
                offset: 1.0,
                amplitude: f64::NAN,
                frequency: 1.0,
                delay: 3.0,
                damping: 0.0,
            },
        ))
        .unwrap();
    schematic
        .add_component(Resistor::new("R1", [NodeId(1), GND], 10.0))
        .unwrap();

    let config = TransientConfig::new().with_stop_time(10.0).with_step_size(1.0);
    let failure = simulate(&schematic, &config).unwrap_err();

    assert!(matches!(failure.error(), NodalError::StepFailed { time, .. } if *time == 3.0));
    let times: Vec<f64> = failure.history().iter().map(|s| s.time).collect();
    assert_eq!(times, vec![0.0, 1.0, 2.0]);
    assert_relative_eq!(failure.history()[2].voltages[1], 1.0, epsilon = 1e-12);

    let err: NodalError = failure.into();
    assert!(matches!(err.root(), NodalError::InvalidComponentValue { .. }));
}
