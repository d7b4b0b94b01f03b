//! Gatesim - Logic Circuit Simulator
//!
//! Compiles a circuit definition file, runs it for a number of cycles and
//! prints the waveform of every monitored signal.
//!
//! # Usage
//!
//! ```bash
//! gatesim counter.circuit --cycles 16 --set ENABLE=1 -v
//! ```

use std::path::PathBuf;

use clap::Parser;
use gatesim_core::{
    dsl,
    error::{Result, SimError},
    monitor::render_trace,
    Simulator, SimulatorConfig, DEFAULT_MAX_PASSES,
};
use log::error;

/// Logic circuit simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the circuit definition file
    #[arg(value_name = "CIRCUIT_FILE")]
    circuit_file: PathBuf,

    /// Number of cycles to simulate
    #[arg(short, long, default_value_t = 20)]
    cycles: usize,

    /// Set a switch before running, e.g. `--set SW1=1` (repeatable)
    #[arg(short, long = "set", value_name = "NAME=0|1", value_parser = parse_setting)]
    set: Vec<(String, bool)>,

    /// Relaxation passes allowed per cycle
    #[arg(long, default_value_t = DEFAULT_MAX_PASSES)]
    max_passes: usize,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_setting(text: &str) -> std::result::Result<(String, bool), String> {
    let (name, level) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=0|1, found '{}'", text))?;
    match level.trim() {
        "0" => Ok((name.trim().to_string(), false)),
        "1" => Ok((name.trim().to_string(), true)),
        other => Err(format!("switch level must be 0 or 1, found '{}'", other)),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Err(e) = dispatch.apply() {
        eprintln!("cannot install logger: {}", e);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Compile and validate the circuit
    let loaded = match dsl::load_circuit(&args.circuit_file) {
        Ok(loaded) => loaded,
        Err(diagnostics) => {
            if let Err(e) = diagnostics.print() {
                error!("cannot print diagnostics: {}", e);
            }
            return Err(SimError::LoadFailed {
                path: args.circuit_file.display().to_string(),
                errors: diagnostics.error_count(),
            });
        }
    };
    if let Err(e) = loaded.diagnostics.print() {
        error!("cannot print diagnostics: {}", e);
    }

    let config = SimulatorConfig::new().with_max_passes(args.max_passes);
    let mut simulator = Simulator::with_config(loaded.circuit, config);
    for (name, level) in &args.set {
        simulator.set_switch(name, *level)?;
    }

    // Waveforms are printed even if the run stops early
    let result = simulator.run_cycles(args.cycles);

    let monitors = simulator.monitors();
    let names: Vec<String> = (0..monitors.len())
        .filter_map(|i| simulator.display_name(i))
        .collect();
    let width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);
    for (i, name) in names.iter().enumerate() {
        let trace = simulator.trace_of(i).unwrap_or_default();
        println!("{:<width$} : {}", name, render_trace(&trace), width = width);
    }

    result
}
