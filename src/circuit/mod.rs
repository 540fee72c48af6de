//! Circuit topology.
//!
//! A [`Schematic`] is the static description handed to the simulator: a set
//! of nodes (node 0 is ground) and an ordered collection of components bound
//! to those nodes. It is not modified while a simulation runs.

mod schematic;
mod types;

pub use schematic::Schematic;
pub use types::*;
