//! Semantic analysis: turns parsed statements into a network.
//!
//! The parser calls one builder operation per statement. Each operation
//! either applies the whole statement or reports why it could not and
//! changes nothing. Signal references are only recorded while parsing and
//! are resolved in [`Builder::finish`], once every device is known, so a
//! device may be wired to one defined later in the file.

use std::path::PathBuf;

use log::debug;

use super::graph::{signal_text, Circuit, Network};
use super::types::{DeviceId, OutputId};
use super::validate::check_network;
use crate::components::{DeviceKind, DeviceType, Subcircuit, MAX_GATE_INPUTS, XOR_INPUTS};
use crate::dsl::{did_you_mean, DiagnosticKind, Name, Session, SignalRef, SourcePos, Symbol, SymbolTable};
use crate::monitor::Monitors;

#[derive(Debug)]
struct PendingConnection {
    device: DeviceId,
    input: usize,
    key_pos: SourcePos,
    signal: SignalRef,
}

#[derive(Debug)]
struct PendingMonitor {
    signal: SignalRef,
    alias: Option<SignalRef>,
}

#[derive(Debug)]
struct AssignedValue {
    device: DeviceId,
    key: &'static str,
    pos: SourcePos,
}

/// How a property key maps onto a device's inputs.
enum InputKey {
    /// An existing pin
    Pin(usize),
    /// Gate pin `In` that does not exist yet
    Grow(usize),
}

enum KeyError {
    Unknown,
    OutOfRange { max: usize },
}

/// Builds one circuit. Each sub-circuit gets its own builder.
#[derive(Debug, Default)]
pub struct Builder {
    network: Network,
    monitors: Monitors,
    connections: Vec<PendingConnection>,
    pending_monitors: Vec<PendingMonitor>,
    values: Vec<AssignedValue>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.network.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.network.symbols
    }

    /// `dev NAME = TYPE`
    pub fn define_device(&mut self, s: &mut Session, name: Name, ty: DeviceType) -> Option<DeviceId> {
        self.add_device(s, name, DeviceKind::new(ty))
    }

    /// `dev NAME = "file"`: wrap a compiled sub-circuit as a device.
    ///
    /// The sub-circuit's switches become the device inputs, named after the
    /// switch. Its unaliased monitors become the outputs, named after the
    /// monitored pin, or the device when the pin is unnamed. Aliases only
    /// change how a monitor is shown, so aliased monitors are not exported.
    pub fn import_device(
        &mut self,
        s: &mut Session,
        name: Name,
        path: PathBuf,
        path_pos: SourcePos,
        sub: Circuit,
    ) -> Option<DeviceId> {
        let Circuit {
            network,
            monitors,
        } = sub;

        let inputs: Vec<(String, DeviceId)> = network
            .switches()
            .map(|id| (network.device_name(id).to_string(), id))
            .collect();

        let mut outputs: Vec<(String, OutputId)> = Vec::new();
        for point in monitors.points().filter(|p| !p.has_alias()) {
            let port = if point.pin.is_blank() {
                point.device
            } else {
                point.pin
            };
            let port = network.symbols.text(port);
            if let Some((_, taken)) = outputs.iter().find(|(n, _)| n.eq_ignore_ascii_case(port)) {
                s.warning(
                    path_pos,
                    format!(
                        "monitor '{}' in '{}' is not exported: output '{}' is already used by '{}'",
                        signal_text(&network.symbols, point.device, point.pin),
                        path.display(),
                        port,
                        network.output_name(*taken)
                    ),
                );
                continue;
            }
            outputs.push((port.to_string(), point.output));
        }

        if outputs.is_empty() {
            s.error(
                DiagnosticKind::Semantic,
                path_pos,
                format!(
                    "'{}' has no unaliased monitors, so it has no outputs to use as a device",
                    path.display()
                ),
            );
            return None;
        }

        let kind = DeviceKind::Compound(Box::new(Subcircuit {
            path,
            network,
            inputs,
            outputs,
        }));
        self.add_device(s, name, kind)
    }

    /// `dev NAME { ... }` without a type: continue an existing device.
    pub fn reopen_device(&mut self, s: &mut Session, name: Name) -> Option<DeviceId> {
        if let Some(id) = self.network.find_device(name.symbol) {
            return Some(id);
        }
        let text = self.network.symbols.text(name.symbol);
        let message = format!(
            "unknown device '{}'{}; give a type to define it",
            text,
            did_you_mean(text, self.device_names())
        );
        s.error(DiagnosticKind::Semantic, name.pos, message);
        None
    }

    /// `KEY: NUMBER;`
    pub fn set_input_value(
        &mut self,
        s: &mut Session,
        device: DeviceId,
        key: Name,
        value: i32,
        value_pos: SourcePos,
    ) {
        let key_text = self.network.symbols.text(key.symbol).to_string();
        let name = self.network.device_name(device).to_string();
        let value_key = self
            .network
            .device(device)
            .kind
            .value_keys()
            .iter()
            .copied()
            .find(|k| k.eq_ignore_ascii_case(&key_text));

        let Some(value_key) = value_key else {
            match self.resolve_input_key(device, key.symbol) {
                Ok(_) => s.error(
                    DiagnosticKind::Semantic,
                    value_pos,
                    format!(
                        "input '{}' of '{}' must be connected to a signal, not the number {}",
                        key_text, name, value
                    ),
                ),
                Err(KeyError::OutOfRange { max }) => self.out_of_range(s, device, key, max),
                Err(KeyError::Unknown) => self.unknown_key(s, device, key),
            }
            return;
        };

        if let Some(previous) = self
            .values
            .iter()
            .find(|v| v.device == device && v.key == value_key)
        {
            let previous = previous.pos;
            s.error(
                DiagnosticKind::Semantic,
                key.pos,
                format!("{} of '{}' is already set", value_key, name),
            );
            s.note(previous, "previously set here");
            return;
        }

        let dev = self.network.device_mut(device);
        match &mut dev.kind {
            DeviceKind::Switch(sw) => {
                if value != 0 && value != 1 {
                    s.error(
                        DiagnosticKind::Semantic,
                        value_pos,
                        format!("{} of switch '{}' must be 0 or 1, found {}", value_key, name, value),
                    );
                    return;
                }
                sw.set(value == 1);
                // Start at the level itself so the first cycle shows no edge.
                dev.outputs[0].signal = sw.level;
            }
            DeviceKind::Clock(clock) => {
                if value < 1 {
                    s.error(
                        DiagnosticKind::Semantic,
                        value_pos,
                        format!("{} of clock '{}' must be at least 1, found {}", value_key, name, value),
                    );
                    return;
                }
                clock.set_period(value as u32);
            }
            other => {
                let message = format!("{} device '{}' has no numeric key '{}'", other.name(), name, value_key);
                s.internal(key.pos, message);
                return;
            }
        }
        self.values.push(AssignedValue {
            device,
            key: value_key,
            pos: key.pos,
        });
    }

    /// `KEY: DEV[.PIN];`
    pub fn set_input_signal(&mut self, s: &mut Session, device: DeviceId, key: Name, signal: SignalRef) {
        let input = match self.resolve_input_key(device, key.symbol) {
            Ok(InputKey::Pin(input)) => input,
            Ok(InputKey::Grow(n)) => {
                let existing = self.network.device(device).inputs.len();
                for i in existing + 1..=n {
                    let pin = self.network.symbols.intern(&format!("I{}", i));
                    self.network.add_input(device, pin, key.pos);
                }
                n - 1
            }
            Err(KeyError::OutOfRange { max }) => {
                self.out_of_range(s, device, key, max);
                return;
            }
            Err(KeyError::Unknown) => {
                let key_text = self.network.symbols.text(key.symbol);
                let is_value_key = self
                    .network
                    .device(device)
                    .kind
                    .value_keys()
                    .iter()
                    .any(|k| k.eq_ignore_ascii_case(key_text));
                if is_value_key {
                    let message = format!(
                        "{} of '{}' must be a number, not a signal",
                        key_text,
                        self.network.device_name(device)
                    );
                    s.error(DiagnosticKind::Semantic, signal.pos, message);
                } else {
                    self.unknown_key(s, device, key);
                }
                return;
            }
        };

        if let Some(previous) = self
            .connections
            .iter()
            .find(|c| c.device == device && c.input == input)
        {
            let previous = previous.key_pos;
            let device = self.network.device(device);
            let message = format!(
                "input '{}.{}' is already connected",
                self.network.symbols.text(device.id),
                self.network.symbols.text(device.inputs[input].id)
            );
            s.error(DiagnosticKind::Semantic, key.pos, message);
            s.note(previous, "previously connected here");
            return;
        }

        self.connections.push(PendingConnection {
            device,
            input,
            key_pos: key.pos,
            signal,
        });
    }

    /// `monitor SIGNAL [as ALIAS]`; checked in [`Builder::finish`].
    pub fn define_monitor(&mut self, signal: SignalRef, alias: Option<SignalRef>) {
        self.pending_monitors.push(PendingMonitor { signal, alias });
    }

    /// Resolve recorded connections and monitors, then check the network.
    pub fn finish(mut self, s: &mut Session) -> Circuit {
        for connection in std::mem::take(&mut self.connections) {
            if let Some(output) = self.resolve_signal(s, &connection.signal) {
                self.network.connect(connection.device, connection.input, output);
            }
        }
        for monitor in std::mem::take(&mut self.pending_monitors) {
            self.add_monitor(s, monitor);
        }

        check_network(&self.network, s);
        debug!(
            "built network with {} device(s) and {} monitor(s)",
            self.network.len(),
            self.monitors.len()
        );
        Circuit {
            network: self.network,
            monitors: self.monitors,
        }
    }

    fn add_device(&mut self, s: &mut Session, name: Name, kind: DeviceKind) -> Option<DeviceId> {
        if let Some(existing) = self.network.find_device(name.symbol) {
            let device = self.network.device(existing);
            let previous = device.defined_at;
            let message = format!(
                "device '{}' is already defined as {}",
                self.network.symbols.text(name.symbol),
                device.kind.name()
            );
            if device.kind.same_kind(&kind) {
                s.warning(name.pos, message);
                s.note(previous, "previously defined here");
                return Some(existing);
            }
            s.error(DiagnosticKind::Semantic, name.pos, message);
            s.note(previous, "previously defined here");
            return None;
        }

        debug!(
            "defining {} device '{}'",
            kind.name(),
            self.network.symbols.text(name.symbol)
        );
        Some(self.network.add_device(name.symbol, kind, name.pos))
    }

    fn resolve_input_key(&self, device: DeviceId, key: Symbol) -> Result<InputKey, KeyError> {
        let dev = self.network.device(device);
        let max = match dev.kind {
            DeviceKind::And | DeviceKind::Nand | DeviceKind::Or | DeviceKind::Nor => Some(MAX_GATE_INPUTS),
            DeviceKind::Xor => Some(XOR_INPUTS),
            _ => None,
        };

        match max {
            Some(max) => {
                let n = gate_pin_number(self.network.symbols.text(key)).ok_or(KeyError::Unknown)?;
                if n == 0 || n > max {
                    Err(KeyError::OutOfRange { max })
                } else if n <= dev.inputs.len() {
                    Ok(InputKey::Pin(n - 1))
                } else {
                    Ok(InputKey::Grow(n))
                }
            }
            None => dev.find_input(key).map(InputKey::Pin).ok_or(KeyError::Unknown),
        }
    }

    /// Every key `device` accepts, for suggestions.
    fn legal_keys(&self, device: DeviceId) -> Vec<String> {
        let dev = self.network.device(device);
        let mut keys: Vec<String> = dev.kind.value_keys().iter().map(|k| k.to_string()).collect();
        if dev.kind.gate_rule().is_some() {
            keys.extend((1..=MAX_GATE_INPUTS).map(|i| format!("I{}", i)));
        } else {
            keys.extend(
                dev.inputs
                    .iter()
                    .map(|p| self.network.symbols.text(p.id).to_string()),
            );
        }
        keys
    }

    fn unknown_key(&self, s: &mut Session, device: DeviceId, key: Name) {
        let key_text = self.network.symbols.text(key.symbol);
        let keys = self.legal_keys(device);
        let message = format!(
            "{} device '{}' has no input or property '{}'{}",
            self.network.device(device).kind.name(),
            self.network.device_name(device),
            key_text,
            did_you_mean(key_text, keys.iter().map(String::as_str))
        );
        s.error(DiagnosticKind::Semantic, key.pos, message);
    }

    fn out_of_range(&self, s: &mut Session, device: DeviceId, key: Name, max: usize) {
        let message = format!(
            "{} gates have at most {} inputs; '{}' is out of range",
            self.network.device(device).kind.name(),
            max,
            self.network.symbols.text(key.symbol)
        );
        s.error(DiagnosticKind::Semantic, key.pos, message);
    }

    fn device_names(&self) -> impl Iterator<Item = &str> {
        self.network
            .devices()
            .map(|(_, d)| self.network.symbols.text(d.id))
    }

    /// Find the output `signal` names, reporting why if there is none.
    fn resolve_signal(&self, s: &mut Session, signal: &SignalRef) -> Option<OutputId> {
        let symbols = &self.network.symbols;
        let device_text = symbols.text(signal.device);
        let Some(id) = self.network.find_device(signal.device) else {
            let message = format!(
                "unknown device '{}'{}",
                device_text,
                did_you_mean(device_text, self.device_names())
            );
            s.error(DiagnosticKind::Semantic, signal.pos, message);
            return None;
        };

        if let Some(output) = self.network.find_output(id, signal.pin) {
            return Some(output);
        }

        let device = self.network.device(id);
        let mut message = if signal.pin.is_blank() {
            format!("{} device '{}' has no unnamed output", device.kind.name(), device_text)
        } else {
            format!(
                "{} device '{}' has no output '{}'",
                device.kind.name(),
                device_text,
                symbols.text(signal.pin)
            )
        };
        match &device.kind {
            DeviceKind::DType(_) => message.push_str(" (use Q or QBAR)"),
            DeviceKind::Compound(sub) if !signal.pin.is_blank() => {
                message.push_str(&did_you_mean(symbols.text(signal.pin), sub.output_names()))
            }
            DeviceKind::Compound(sub) => {
                let names: Vec<&str> = sub.output_names().collect();
                message.push_str(&format!(" (outputs are {})", names.join(", ")));
            }
            _ => message.push_str(" (it has a single unnamed output)"),
        }
        s.error(DiagnosticKind::Semantic, signal.pin_pos.unwrap_or(signal.pos), message);
        None
    }

    fn add_monitor(&mut self, s: &mut Session, monitor: PendingMonitor) {
        let signal = monitor.signal;
        if self.resolve_signal(s, &signal).is_none() {
            return;
        }
        let name = signal_text(&self.network.symbols, signal.device, signal.pin);

        if self.monitors.is_full() {
            let message = format!(
                "cannot monitor '{}': at most {} signals can be monitored",
                name,
                self.monitors.max_monitors()
            );
            s.error(DiagnosticKind::Semantic, signal.pos, message);
            return;
        }
        if self.monitors.find(signal.device, signal.pin).is_some() {
            s.warning(signal.pos, format!("signal '{}' is already monitored", name));
            return;
        }

        let alias = monitor
            .alias
            .and_then(|alias| self.check_alias(s, &signal, &alias));
        if let Err(e) = self
            .monitors
            .add(&self.network, signal.device, signal.pin, alias)
        {
            s.internal(signal.pos, format!("monitor rejected after validation: {}", e));
        }
    }

    /// The alias to record, or `None` (with a warning) if it cannot be used.
    fn check_alias(&self, s: &mut Session, signal: &SignalRef, alias: &SignalRef) -> Option<(Symbol, Symbol)> {
        let alias_name = signal_text(&self.network.symbols, alias.device, alias.pin);
        if alias.same_signal(signal) {
            s.warning(alias.pos, format!("alias '{}' is the signal's own name; ignored", alias_name));
            return None;
        }
        let is_real = self
            .network
            .find_device(alias.device)
            .and_then(|d| self.network.find_output(d, alias.pin))
            .is_some();
        if is_real {
            s.warning(
                alias.pos,
                format!("alias '{}' is the name of an existing signal; ignored", alias_name),
            );
            return None;
        }
        if let Some(index) = self.monitors.find_alias(alias.device, alias.pin) {
            let other = self
                .monitors
                .get(index)
                .map(|p| signal_text(&self.network.symbols, p.device, p.pin))
                .unwrap_or_default();
            s.warning(
                alias.pos,
                format!("alias '{}' is already used for '{}'; ignored", alias_name, other),
            );
            return None;
        }
        Some((alias.device, alias.pin))
    }
}

/// `n` for a key of the form `In` with no leading zero. Numbers too large
/// to represent saturate.
fn gate_pin_number(key: &str) -> Option<usize> {
    let digits = key.strip_prefix(['I', 'i'])?;
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse().unwrap_or(usize::MAX))
}
