//! # Gatesim Core
//!
//! A compiler and cycle simulator for a small logic circuit definition
//! language.
//!
//! This library provides:
//! - A text language for describing networks of switches, clocks, gates,
//!   D-type flip-flops and devices built from other circuit files
//! - A front end with error recovery that reports every problem it can find,
//!   with source excerpts and "did you mean" suggestions
//! - A deterministic simulator that relaxes the network to a steady state
//!   each cycle and reports oscillation
//! - Monitors that record a bounded history of selected signals
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`dsl`] - Lexer, parser and diagnostics for the circuit language
//! - [`circuit`] - Network representation, construction and validation
//! - [`components`] - Device models (switches, clocks, gates, flip-flops)
//! - [`engine`] - Relaxation scheduler and the [`Simulator`]
//! - [`monitor`] - Signal history and waveform rendering
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! gatesim counter.circuit --cycles 16
//! ```
//!
//! ### Library
//!
//! ```no_run
//! use gatesim_core::{dsl, Simulator};
//!
//! let loaded = dsl::load_circuit("counter.circuit").expect("circuit has errors");
//! let mut sim = Simulator::new(loaded.circuit);
//! sim.run_cycles(16).expect("network oscillates");
//! let waveform = sim.trace_of(0);
//! ```
//!
//! ## Simulation Method
//!
//! Gates have no delay. Each cycle the clocks advance once, then every
//! device is evaluated in network order, over and over, until a full pass
//! changes nothing. A signal that changed during a pass is `Rising` or
//! `Falling` until its driver is evaluated again, which is how flip-flops
//! see clock edges.

pub mod circuit;
pub mod components;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod monitor;

// Re-export main types for convenience
pub use circuit::{Circuit, Network, Signal};
pub use dsl::{load_circuit, load_str, LoadedCircuit};
pub use engine::{Simulator, SimulatorConfig};
pub use error::{Result, SimError};

/// Relaxation passes allowed per cycle before reporting oscillation
pub const DEFAULT_MAX_PASSES: usize = 20;

/// Cycles of history kept per monitor
pub const DEFAULT_MAX_CYCLES: usize = 1000;

/// Maximum number of monitored signals
pub const DEFAULT_MAX_MONITORS: usize = 64;
