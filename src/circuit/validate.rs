//! Network validation.

use crate::components::DeviceKind;
use crate::dsl::{DiagnosticKind, Session};

use super::Network;

/// Check a fully built network for simulation.
///
/// Checks:
/// - Every input pin is connected to an existing output
/// - Every switch has an initial value
/// - Every clock has a period
/// - Every AND/NAND/OR/NOR gate has at least one input
pub fn check_network(network: &Network, s: &mut Session) {
    for (_, device) in network.devices() {
        let name = network.symbols.text(device.id);

        for pin in &device.inputs {
            let pin_name = network.symbols.text(pin.id);
            match pin.connection {
                None => s.error(
                    DiagnosticKind::Semantic,
                    pin.defined_at,
                    format!("input '{}.{}' is not connected", name, pin_name),
                ),
                Some(source) => {
                    let exists = network.contains(source.device)
                        && source.pin < network.device(source.device).outputs.len();
                    if !exists {
                        s.internal(
                            pin.defined_at,
                            format!(
                                "input '{}.{}' is connected to an output that does not exist",
                                name, pin_name
                            ),
                        );
                    }
                }
            }
        }

        match &device.kind {
            DeviceKind::Switch(sw) if !sw.is_set() => s.error(
                DiagnosticKind::Semantic,
                device.defined_at,
                format!("switch '{}' has no InitialValue", name),
            ),
            DeviceKind::Clock(clock) if clock.period == 0 => s.error(
                DiagnosticKind::Semantic,
                device.defined_at,
                format!("clock '{}' has no Period", name),
            ),
            kind if kind.gate_rule().is_some() && device.inputs.is_empty() => s.error(
                DiagnosticKind::Semantic,
                device.defined_at,
                format!("{} gate '{}' has no inputs", kind.name(), name),
            ),
            _ => {}
        }
    }
}
