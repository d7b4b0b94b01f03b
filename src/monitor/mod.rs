//! Signal monitors and their recorded waveforms.
//!
//! A monitor point watches one output. After every simulated cycle the
//! current signal of each point is appended to its history; the history is a
//! sliding window of at most `max_cycles` entries.

use std::collections::VecDeque;

use crate::circuit::{signal_text, Network, OutputId, Signal};
use crate::dsl::Symbol;
use crate::error::{Result, SimError};
use crate::{DEFAULT_MAX_CYCLES, DEFAULT_MAX_MONITORS};

/// One watched output.
#[derive(Debug, Clone)]
pub struct MonitorPoint {
    pub device: Symbol,
    /// `Symbol::BLANK` for a single-output device
    pub pin: Symbol,
    pub output: OutputId,
    /// Display name; blank device means no alias
    pub alias_device: Symbol,
    pub alias_pin: Symbol,
    history: VecDeque<Signal>,
}

impl MonitorPoint {
    pub fn has_alias(&self) -> bool {
        !self.alias_device.is_blank()
    }

    /// Name shown in traces: the alias if there is one.
    pub fn display_name(&self) -> (Symbol, Symbol) {
        if self.has_alias() {
            (self.alias_device, self.alias_pin)
        } else {
            (self.device, self.pin)
        }
    }

    pub fn history(&self) -> &VecDeque<Signal> {
        &self.history
    }
}

/// All monitor points of a circuit.
#[derive(Debug, Clone)]
pub struct Monitors {
    points: Vec<MonitorPoint>,
    max_monitors: usize,
    max_cycles: usize,
}

impl Default for Monitors {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MONITORS, DEFAULT_MAX_CYCLES)
    }
}

impl Monitors {
    pub fn new(max_monitors: usize, max_cycles: usize) -> Self {
        Self {
            points: Vec::new(),
            max_monitors,
            max_cycles,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_monitors(&self) -> usize {
        self.max_monitors
    }

    pub fn max_cycles(&self) -> usize {
        self.max_cycles
    }

    pub fn set_max_monitors(&mut self, max_monitors: usize) {
        self.max_monitors = max_monitors;
    }

    pub fn is_full(&self) -> bool {
        self.points.len() >= self.max_monitors
    }

    pub fn points(&self) -> impl Iterator<Item = &MonitorPoint> {
        self.points.iter()
    }

    pub fn get(&self, index: usize) -> Option<&MonitorPoint> {
        self.points.get(index)
    }

    /// Index of the point watching `device.pin`.
    pub fn find(&self, device: Symbol, pin: Symbol) -> Option<usize> {
        self.points
            .iter()
            .position(|p| p.device == device && p.pin == pin)
    }

    /// Index of the point whose alias is `device.pin`.
    pub fn find_alias(&self, device: Symbol, pin: Symbol) -> Option<usize> {
        self.points
            .iter()
            .position(|p| p.has_alias() && p.alias_device == device && p.alias_pin == pin)
    }

    /// Start watching `device.pin`, returning the new point's index.
    pub fn add(
        &mut self,
        network: &Network,
        device: Symbol,
        pin: Symbol,
        alias: Option<(Symbol, Symbol)>,
    ) -> Result<usize> {
        let name = signal_text(&network.symbols, device, pin);
        let device_id = network
            .find_device(device)
            .ok_or_else(|| SimError::unknown_device(network.symbols.text(device)))?;
        let output = network.find_output(device_id, pin).ok_or_else(|| {
            SimError::unknown_output(network.symbols.text(device), network.symbols.text(pin))
        })?;
        if self.is_full() {
            return Err(SimError::TooManyMonitors {
                max: self.max_monitors,
            });
        }
        if self.find(device, pin).is_some() {
            return Err(SimError::AlreadyMonitored { signal: name });
        }

        let (alias_device, alias_pin) = alias.unwrap_or((Symbol::BLANK, Symbol::BLANK));
        self.points.push(MonitorPoint {
            device,
            pin,
            output,
            alias_device,
            alias_pin,
            history: VecDeque::new(),
        });
        Ok(self.points.len() - 1)
    }

    /// Stop watching `device.pin`.
    pub fn remove(&mut self, network: &Network, device: Symbol, pin: Symbol) -> Result<()> {
        match self.find(device, pin) {
            Some(index) => {
                self.points.remove(index);
                Ok(())
            }
            None => Err(SimError::NotMonitored {
                signal: signal_text(&network.symbols, device, pin),
            }),
        }
    }

    pub fn reset_history(&mut self) {
        for point in &mut self.points {
            point.history.clear();
        }
    }

    /// Shrink or grow the history window, dropping the oldest entries.
    pub fn set_max_cycles(&mut self, max_cycles: usize) {
        self.max_cycles = max_cycles;
        for point in &mut self.points {
            while point.history.len() > max_cycles {
                point.history.pop_front();
            }
        }
    }

    /// Append the current signal of every point.
    pub fn record_cycle(&mut self, network: &Network) {
        for point in &mut self.points {
            if point.history.len() >= self.max_cycles {
                point.history.pop_front();
            }
            if self.max_cycles > 0 {
                point.history.push_back(network.output_signal(point.output));
            }
        }
    }

    /// Signal recorded at `cycle` (0 is the oldest kept entry).
    pub fn trace(&self, index: usize, cycle: usize) -> Option<Signal> {
        self.points.get(index)?.history.get(cycle).copied()
    }

    pub fn trace_of(&self, index: usize) -> Option<Vec<Signal>> {
        Some(self.points.get(index)?.history.iter().copied().collect())
    }

    pub fn display_name(&self, index: usize) -> Option<(Symbol, Symbol)> {
        Some(self.points.get(index)?.display_name())
    }

    /// `DEV` or `DEV.PIN` shown for point `index`.
    pub fn display_text(&self, network: &Network, index: usize) -> Option<String> {
        let (device, pin) = self.display_name(index)?;
        Some(signal_text(&network.symbols, device, pin))
    }
}

/// ASCII waveform: `_` low, `-` high, `/` rising, `\` falling, `?` floating.
pub fn render_trace(signals: &[Signal]) -> String {
    signals
        .iter()
        .map(|s| match s {
            Signal::Low => '_',
            Signal::High => '-',
            Signal::Rising => '/',
            Signal::Falling => '\\',
            Signal::Floating => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{DeviceKind, DeviceType};
    use crate::dsl::{FileId, SourcePos};

    fn network_with_switch() -> (Network, Symbol) {
        let mut net = Network::new();
        let sw = net.symbols.intern("SW1");
        let id = net.add_device(sw, DeviceKind::new(DeviceType::Switch), SourcePos::start_of(FileId(0)));
        net.device_mut(id).outputs[0].signal = Signal::High;
        (net, sw)
    }

    #[test]
    fn test_history_window() {
        let (net, sw) = network_with_switch();
        let mut monitors = Monitors::new(4, 3);
        let index = monitors.add(&net, sw, Symbol::BLANK, None).unwrap();
        for _ in 0..5 {
            monitors.record_cycle(&net);
        }
        assert_eq!(monitors.trace_of(index).unwrap().len(), 3);
        assert_eq!(monitors.trace(index, 2), Some(Signal::High));
        assert_eq!(monitors.trace(index, 3), None);

        monitors.set_max_cycles(1);
        assert_eq!(monitors.trace_of(index).unwrap(), vec![Signal::High]);
        monitors.reset_history();
        assert!(monitors.trace_of(index).unwrap().is_empty());
    }

    #[test]
    fn test_add_rejects_duplicates_and_overflow() {
        let (mut net, sw) = network_with_switch();
        let mut monitors = Monitors::new(1, 10);
        monitors.add(&net, sw, Symbol::BLANK, None).unwrap();
        assert!(matches!(
            monitors.add(&net, sw, Symbol::BLANK, None),
            Err(SimError::TooManyMonitors { max: 1 })
        ));

        let mut monitors = Monitors::new(4, 10);
        monitors.add(&net, sw, Symbol::BLANK, None).unwrap();
        assert!(matches!(
            monitors.add(&net, sw, Symbol::BLANK, None),
            Err(SimError::AlreadyMonitored { .. })
        ));
        let q = net.symbols.intern("Q");
        assert!(matches!(
            monitors.add(&net, sw, q, None),
            Err(SimError::UnknownOutput { .. })
        ));
    }

    #[test]
    fn test_alias_display_name() {
        let (mut net, sw) = network_with_switch();
        let alias = net.symbols.intern("ENABLE");
        let mut monitors = Monitors::default();
        let index = monitors
            .add(&net, sw, Symbol::BLANK, Some((alias, Symbol::BLANK)))
            .unwrap();
        assert_eq!(monitors.display_text(&net, index).as_deref(), Some("ENABLE"));
        assert_eq!(monitors.find_alias(alias, Symbol::BLANK), Some(index));
        monitors.remove(&net, sw, Symbol::BLANK).unwrap();
        assert!(monitors.is_empty());
        assert!(monitors.remove(&net, sw, Symbol::BLANK).is_err());
    }

    #[test]
    fn test_render_trace() {
        let signals = [Signal::Low, Signal::Rising, Signal::High, Signal::Falling, Signal::Floating];
        assert_eq!(render_trace(&signals), "_/-\\?");
    }
}
