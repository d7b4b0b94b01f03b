//! Simulation engine.
//!
//! One simulated cycle (a "tick") is:
//!
//! 1. advance every clock counter, starting an edge where a period elapsed;
//! 2. sweep all devices in network order, each recomputing its outputs from
//!    whatever its inputs currently hold;
//! 3. repeat the sweep until one changes nothing (steady state).
//!
//! If the network is still changing after the pass budget the tick fails
//! and is reported as an oscillation.

mod relax;
mod simulator;

pub use simulator::{Simulator, SimulatorConfig};
