//! Network graph structure.

use std::collections::HashMap;

use super::types::{Device, DeviceId, InputPin, OutputId, OutputPin, Signal};
use crate::components::DeviceKind;
use crate::dsl::{SourcePos, Symbol, SymbolTable};
use crate::monitor::Monitors;

/// A loaded circuit: its network and the signals it monitors.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    pub network: Network,
    pub monitors: Monitors,
}

/// A network of devices, ready for simulation once validated.
///
/// Devices live in an arena and are referred to by [`DeviceId`]. The
/// execution order is kept separately: non-clock devices are prepended as
/// they are defined and clocks appended, so a clock edge started at the top
/// of a tick is seen by every other device during the first pass.
#[derive(Debug, Clone, Default)]
pub struct Network {
    /// Names used by this network
    pub symbols: SymbolTable,
    devices: Vec<Device>,
    order: Vec<DeviceId>,
    index: HashMap<Symbol, DeviceId>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device and create the pins its kind always has.
    pub fn add_device(&mut self, id: Symbol, kind: DeviceKind, defined_at: SourcePos) -> DeviceId {
        let inputs = kind
            .fixed_inputs()
            .iter()
            .map(|name| InputPin::new(self.symbols.intern(name), defined_at))
            .collect();
        let outputs = kind
            .fixed_outputs()
            .iter()
            .enumerate()
            .map(|(i, name)| OutputPin::new(self.symbols.intern(name), kind.initial_output(i), defined_at))
            .collect();

        let device_id = DeviceId(self.devices.len());
        let is_clock = matches!(kind, DeviceKind::Clock(_));
        self.devices.push(Device {
            id,
            kind,
            inputs,
            outputs,
            defined_at,
        });
        self.index.insert(id, device_id);
        if is_clock {
            self.order.push(device_id);
        } else {
            self.order.insert(0, device_id);
        }
        device_id
    }

    /// Add an input pin to an existing device, returning its index.
    pub fn add_input(&mut self, device: DeviceId, pin: Symbol, defined_at: SourcePos) -> usize {
        let inputs = &mut self.devices[device.0].inputs;
        inputs.push(InputPin::new(pin, defined_at));
        inputs.len() - 1
    }

    pub fn connect(&mut self, device: DeviceId, input: usize, source: OutputId) {
        self.devices[device.0].inputs[input].connection = Some(source);
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn contains(&self, device: DeviceId) -> bool {
        device.0 < self.devices.len()
    }

    pub fn device(&self, device: DeviceId) -> &Device {
        &self.devices[device.0]
    }

    pub fn device_mut(&mut self, device: DeviceId) -> &mut Device {
        &mut self.devices[device.0]
    }

    /// All devices in definition order.
    pub fn devices(&self) -> impl Iterator<Item = (DeviceId, &Device)> {
        self.devices.iter().enumerate().map(|(i, d)| (DeviceId(i), d))
    }

    pub fn devices_mut(&mut self) -> impl Iterator<Item = &mut Device> {
        self.devices.iter_mut()
    }

    /// Devices in execution order.
    pub fn order(&self) -> &[DeviceId] {
        &self.order
    }

    pub fn find_device(&self, id: Symbol) -> Option<DeviceId> {
        self.index.get(&id).copied()
    }

    /// Find a device by name without interning the name.
    pub fn find_device_by_name(&self, name: &str) -> Option<DeviceId> {
        self.symbols.lookup(name).and_then(|s| self.find_device(s))
    }

    pub fn find_input(&self, device: DeviceId, pin: Symbol) -> Option<usize> {
        self.devices.get(device.0)?.find_input(pin)
    }

    pub fn find_output(&self, device: DeviceId, pin: Symbol) -> Option<OutputId> {
        let pin = self.devices.get(device.0)?.find_output(pin)?;
        Some(OutputId { device, pin })
    }

    /// Current signal of an output; `Floating` if the handle is stale.
    pub fn output_signal(&self, output: OutputId) -> Signal {
        self.devices
            .get(output.device.0)
            .and_then(|d| d.outputs.get(output.pin))
            .map(|p| p.signal)
            .unwrap_or(Signal::Floating)
    }

    /// Signal on each input of `device`, in pin order.
    pub fn input_signals(&self, device: DeviceId) -> Vec<Signal> {
        self.devices[device.0]
            .inputs
            .iter()
            .map(|pin| {
                pin.connection
                    .map(|c| self.output_signal(c))
                    .unwrap_or(Signal::Floating)
            })
            .collect()
    }

    pub fn switches(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.devices()
            .filter(|(_, d)| matches!(d.kind, DeviceKind::Switch(_)))
            .map(|(id, _)| id)
    }

    pub fn clocks(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.devices()
            .filter(|(_, d)| d.is_clock())
            .map(|(id, _)| id)
    }

    pub fn device_name(&self, device: DeviceId) -> &str {
        self.symbols.text(self.devices[device.0].id)
    }

    /// `DEV` or `DEV.PIN` for an output.
    pub fn output_name(&self, output: OutputId) -> String {
        let device = &self.devices[output.device.0];
        let pin = device.outputs[output.pin].id;
        signal_text(&self.symbols, device.id, pin)
    }
}

/// `DEV` or `DEV.PIN`.
pub fn signal_text(symbols: &SymbolTable, device: Symbol, pin: Symbol) -> String {
    if pin.is_blank() {
        symbols.text(device).to_string()
    } else {
        format!("{}.{}", symbols.text(device), symbols.text(pin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::DeviceType;
    use crate::dsl::FileId;

    fn pos() -> SourcePos {
        SourcePos::start_of(FileId(0))
    }

    #[test]
    fn test_clocks_ordered_last() {
        let mut net = Network::new();
        let clk = net.symbols.intern("CLK");
        let a = net.symbols.intern("A");
        let b = net.symbols.intern("B");
        let clk = net.add_device(clk, DeviceKind::new(DeviceType::Clock), pos());
        let a = net.add_device(a, DeviceKind::new(DeviceType::And), pos());
        let b = net.add_device(b, DeviceKind::new(DeviceType::Switch), pos());
        assert_eq!(net.order(), &[b, a, clk]);
        assert_eq!(net.clocks().collect::<Vec<_>>(), vec![clk]);
        assert_eq!(net.switches().collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn test_lookup_pins() {
        let mut net = Network::new();
        let ff = net.symbols.intern("FF1");
        let ff = net.add_device(ff, DeviceKind::new(DeviceType::DType), pos());
        let q_bar = net.symbols.intern("qbar");
        let clk = net.symbols.intern("clk");
        assert_eq!(net.find_output(ff, q_bar), Some(OutputId { device: ff, pin: 1 }));
        assert_eq!(net.find_input(ff, clk), Some(1));
        assert_eq!(net.find_output(ff, Symbol::BLANK), None);
        assert_eq!(net.output_name(OutputId { device: ff, pin: 1 }), "FF1.QBAR");
        assert_eq!(net.find_device_by_name("ff1"), Some(ff));
    }

    #[test]
    fn test_unconnected_inputs_read_floating() {
        let mut net = Network::new();
        let g = net.symbols.intern("G");
        let g = net.add_device(g, DeviceKind::new(DeviceType::Xor), pos());
        assert_eq!(net.input_signals(g), vec![Signal::Floating, Signal::Floating]);
    }
}
