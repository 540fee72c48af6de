//! Nodal - transient demo driver
//!
//! Builds one of a few canned schematics, runs a transient simulation and
//! prints the node voltage history to stdout.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug nodal --circuit rl --stop-time 5e-3 --step-size 1e-6 > rl.csv
//! ```

use clap::{Parser, ValueEnum};
use nodal_core::{
    circuit::{NodeId, Schematic},
    components::{Capacitor, Inductor, Resistor, VoltageSource},
    error::{NodalError, Result},
    solver::{simulate, Sample, TransientConfig, DEFAULT_STEP_SIZE, DEFAULT_STOP_TIME},
};

/// Demo circuits
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Circuit {
    /// Source -> R -> L to ground
    Rl,
    /// Source -> R -> C to ground
    Rc,
    /// Source -> R -> R to ground
    Divider,
}

/// Output formats
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

/// Transient circuit simulation demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Circuit to simulate
    #[arg(short, long, value_enum, default_value_t = Circuit::Rl)]
    circuit: Circuit,

    /// Total simulated time in seconds
    #[arg(long, default_value_t = DEFAULT_STOP_TIME)]
    stop_time: f64,

    /// Fixed step size in seconds
    #[arg(long, default_value_t = DEFAULT_STEP_SIZE)]
    step_size: f64,

    /// Source voltage in volts
    #[arg(long, default_value_t = 1.0)]
    voltage: f64,

    /// Series resistance in ohms
    #[arg(long, default_value_t = 1000.0)]
    resistance: f64,

    /// Inductance in henries (rl)
    #[arg(long, default_value_t = 1.0)]
    inductance: f64,

    /// Capacitance in farads (rc)
    #[arg(long, default_value_t = 1e-6)]
    capacitance: f64,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Csv)]
    format: Format,
}

fn build_schematic(args: &Args) -> Result<Schematic> {
    let mut schematic = Schematic::new();
    let input = schematic.add_node();
    let output = schematic.add_node();

    schematic.add_component(VoltageSource::new("V1", [input, NodeId::GROUND], args.voltage))?;
    schematic.add_component(Resistor::new("R1", [input, output], args.resistance))?;
    match args.circuit {
        Circuit::Rl => {
            schematic.add_component(Inductor::new("L1", [output, NodeId::GROUND], args.inductance))?
        }
        Circuit::Rc => {
            schematic.add_component(Capacitor::new("C1", [output, NodeId::GROUND], args.capacitance))?
        }
        Circuit::Divider => {
            schematic.add_component(Resistor::new("R2", [output, NodeId::GROUND], args.resistance))?
        }
    };

    Ok(schematic)
}

fn print_csv(history: &[Sample]) {
    println!("time,v_in,v_out,i_source");
    for sample in history {
        println!(
            "{:e},{:e},{:e},{:e}",
            sample.time, sample.voltages[1], sample.voltages[2], sample.source_currents[0]
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let schematic = build_schematic(&args)?;
    let config = TransientConfig::new()
        .with_stop_time(args.stop_time)
        .with_step_size(args.step_size);

    // A failed run still prints the samples solved before the failure.
    let result = simulate(&schematic, &config);
    let history = match &result {
        Ok(transient) => transient.history(),
        Err(failure) => failure.history(),
    };

    match args.format {
        Format::Csv => print_csv(history),
        Format::Json => {
            let json = serde_json::to_string_pretty(history).map_err(|e| NodalError::OutputError {
                message: e.to_string(),
            })?;
            println!("{json}");
        }
    }

    result.map(|_| ()).map_err(NodalError::from)
}
