//! Main simulator interface.

use log::{debug, warn};

use crate::circuit::{Circuit, DeviceId, Network, Signal};
use crate::components::DeviceKind;
use crate::dsl::Symbol;
use crate::error::{Result, SimError};
use crate::monitor::Monitors;
use crate::{DEFAULT_MAX_CYCLES, DEFAULT_MAX_MONITORS, DEFAULT_MAX_PASSES};

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Relaxation passes allowed per tick before reporting oscillation.
    pub max_passes: usize,
    /// Cycles of history kept per monitor.
    pub max_cycles: usize,
    /// Maximum number of monitor points.
    pub max_monitors: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            max_cycles: DEFAULT_MAX_CYCLES,
            max_monitors: DEFAULT_MAX_MONITORS,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pass budget per tick.
    ///
    /// A chain of N combinational devices declared in the "wrong" order may
    /// need up to N passes to settle, so very deep circuits may need more
    /// than the default.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Set how many cycles of history each monitor keeps.
    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn with_max_monitors(mut self, max_monitors: usize) -> Self {
        self.max_monitors = max_monitors;
        self
    }
}

/// Runs a loaded circuit cycle by cycle.
pub struct Simulator {
    network: Network,
    monitors: Monitors,
    config: SimulatorConfig,
    /// Number of completed cycles
    cycle: usize,
}

impl Simulator {
    /// Create a new simulator for the given circuit with default configuration.
    pub fn new(circuit: Circuit) -> Self {
        Self::with_config(circuit, SimulatorConfig::default())
    }

    /// Create a new simulator for the given circuit with custom configuration.
    pub fn with_config(circuit: Circuit, config: SimulatorConfig) -> Self {
        let Circuit {
            network,
            mut monitors,
        } = circuit;
        monitors.set_max_cycles(config.max_cycles);
        monitors.set_max_monitors(config.max_monitors);
        Self {
            network,
            monitors,
            config,
            cycle: 0,
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn monitors(&self) -> &Monitors {
        &self.monitors
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Cycles completed so far.
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    /// Set the level of switch `name`. Takes effect on the next tick.
    pub fn set_switch(&mut self, name: &str, high: bool) -> Result<()> {
        let id = self.lookup_device(name)?;
        match &mut self.network.device_mut(id).kind {
            DeviceKind::Switch(sw) => {
                sw.set(high);
                debug!("switch {} set to {}", name, u8::from(high));
                Ok(())
            }
            _ => Err(SimError::NotASwitch {
                name: name.to_string(),
            }),
        }
    }

    /// Set the half period of clock `name`, restarting its count.
    pub fn set_clock_period(&mut self, name: &str, period: u32) -> Result<()> {
        let id = self.lookup_device(name)?;
        if period == 0 {
            return Err(SimError::InvalidPeriod {
                name: name.to_string(),
                period,
            });
        }
        match &mut self.network.device_mut(id).kind {
            DeviceKind::Clock(clock) => {
                clock.set_period(period);
                debug!("clock {} period set to {}", name, period);
                Ok(())
            }
            _ => Err(SimError::NotAClock {
                name: name.to_string(),
            }),
        }
    }

    /// Run a single tick without recording history.
    ///
    /// Returns false if the network did not settle.
    pub fn execute_devices(&mut self) -> bool {
        self.network.execute_devices(self.config.max_passes)
    }

    /// Run `cycles` ticks, recording monitor history after each one.
    ///
    /// Stops at the first tick that does not settle; that tick is not
    /// recorded.
    pub fn run_cycles(&mut self, cycles: usize) -> Result<()> {
        for _ in 0..cycles {
            if !self.execute_devices() {
                warn!(
                    "network oscillating at cycle {} after {} passes",
                    self.cycle, self.config.max_passes
                );
                return Err(SimError::oscillation(self.cycle, self.config.max_passes));
            }
            self.monitors.record_cycle(&self.network);
            self.cycle += 1;
        }
        debug!("ran {} cycle(s), now at cycle {}", cycles, self.cycle);
        Ok(())
    }

    /// Monitor `signal` (`DEV` or `DEV.PIN`), optionally shown as `alias`.
    pub fn add_monitor(&mut self, signal: &str, alias: Option<&str>) -> Result<usize> {
        let (device, pin) = self.resolve_signal(signal)?;
        let alias = alias.map(|a| {
            let (alias_device, alias_pin) = split_signal(a);
            let alias_device = self.network.symbols.intern(alias_device);
            let alias_pin = alias_pin.map_or(Symbol::BLANK, |p| self.network.symbols.intern(p));
            (alias_device, alias_pin)
        });
        let index = self.monitors.add(&self.network, device, pin, alias)?;
        debug!("monitoring {} as #{}", signal, index);
        Ok(index)
    }

    pub fn remove_monitor(&mut self, signal: &str) -> Result<()> {
        let (device, pin) = self.resolve_signal(signal)?;
        self.monitors.remove(&self.network, device, pin)
    }

    pub fn reset_history(&mut self) {
        self.monitors.reset_history();
    }

    /// Recorded history of monitor `index`, oldest first.
    pub fn trace_of(&self, index: usize) -> Option<Vec<Signal>> {
        self.monitors.trace_of(index)
    }

    pub fn display_name(&self, index: usize) -> Option<String> {
        self.monitors.display_text(&self.network, index)
    }

    /// Current value of `signal` (`DEV` or `DEV.PIN`).
    pub fn signal_of(&self, signal: &str) -> Result<Signal> {
        let (device, pin) = self.resolve_signal(signal)?;
        let id = self.lookup_device(split_signal(signal).0)?;
        let output = self.network.find_output(id, pin).ok_or_else(|| {
            SimError::unknown_output(
                self.network.symbols.text(device),
                self.network.symbols.text(pin),
            )
        })?;
        Ok(self.network.output_signal(output))
    }

    fn lookup_device(&self, name: &str) -> Result<DeviceId> {
        self.network
            .find_device_by_name(name)
            .ok_or_else(|| SimError::unknown_device(name))
    }

    /// Symbols for `DEV` / `DEV.PIN` without interning anything new.
    fn resolve_signal(&self, signal: &str) -> Result<(Symbol, Symbol)> {
        let (device_name, pin_name) = split_signal(signal);
        let id = self.lookup_device(device_name)?;
        let device = self.network.device(id).id;
        let pin = match pin_name {
            None => Symbol::BLANK,
            Some(p) => self
                .network
                .symbols
                .lookup(p)
                .ok_or_else(|| SimError::unknown_output(device_name, p))?,
        };
        Ok((device, pin))
    }
}

fn split_signal(signal: &str) -> (&str, Option<&str>) {
    match signal.split_once('.') {
        Some((device, pin)) => (device, Some(pin)),
        None => (signal, None),
    }
}
