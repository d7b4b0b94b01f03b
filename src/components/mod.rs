//! Device models for logic simulation.
//!
//! This module provides the transfer functions of every device kind:
//! - Sources: Switch, Clock
//! - Gates: AND, NAND, OR, NOR, XOR
//! - Sequential: D-type flip-flop
//! - Compound: a device backed by another circuit file
//!
//! [`DeviceKind`] is a closed sum type, so every dispatch below is an
//! exhaustive `match`.

mod compound;
mod dtype;
mod gates;
mod sources;

pub use compound::Subcircuit;
pub use dtype::{DType, DTYPE_INPUTS, DTYPE_OUTPUTS};
pub use gates::{xor_output, GateRule, MAX_GATE_INPUTS, XOR_INPUTS};
pub use sources::{Clock, Switch};

use std::fmt;

use crate::circuit::{Device, Signal};

/// Property key holding a switch's starting level.
pub const KEY_INITIAL_VALUE: &str = "InitialValue";
/// Property key holding a clock's half period.
pub const KEY_PERIOD: &str = "Period";

/// Device type names recognized by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Switch,
    Clock,
    And,
    Nand,
    Or,
    Nor,
    Xor,
    DType,
}

impl DeviceType {
    pub const ALL: [DeviceType; 8] = [
        DeviceType::Switch,
        DeviceType::Clock,
        DeviceType::And,
        DeviceType::Nand,
        DeviceType::Or,
        DeviceType::Nor,
        DeviceType::Xor,
        DeviceType::DType,
    ];

    /// Parse a type from its keyword, ignoring case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(keyword))
    }

    pub fn name(&self) -> &'static str {
        match self {
            DeviceType::Switch => "SWITCH",
            DeviceType::Clock => "CLOCK",
            DeviceType::And => "AND",
            DeviceType::Nand => "NAND",
            DeviceType::Or => "OR",
            DeviceType::Nor => "NOR",
            DeviceType::Xor => "XOR",
            DeviceType::DType => "DTYPE",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A device kind together with its kind-specific state.
#[derive(Debug, Clone)]
pub enum DeviceKind {
    Switch(Switch),
    Clock(Clock),
    And,
    Nand,
    Or,
    Nor,
    Xor,
    DType(DType),
    Compound(Box<Subcircuit>),
}

impl DeviceKind {
    /// Fresh state for a device of type `ty`.
    pub fn new(ty: DeviceType) -> Self {
        match ty {
            DeviceType::Switch => DeviceKind::Switch(Switch::new()),
            DeviceType::Clock => DeviceKind::Clock(Clock::new()),
            DeviceType::And => DeviceKind::And,
            DeviceType::Nand => DeviceKind::Nand,
            DeviceType::Or => DeviceKind::Or,
            DeviceType::Nor => DeviceKind::Nor,
            DeviceType::Xor => DeviceKind::Xor,
            DeviceType::DType => DeviceKind::DType(DType::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DeviceKind::Switch(_) => "SWITCH",
            DeviceKind::Clock(_) => "CLOCK",
            DeviceKind::And => "AND",
            DeviceKind::Nand => "NAND",
            DeviceKind::Or => "OR",
            DeviceKind::Nor => "NOR",
            DeviceKind::Xor => "XOR",
            DeviceKind::DType(_) => "DTYPE",
            DeviceKind::Compound(_) => "imported",
        }
    }

    /// True if both are the same kind, ignoring state.
    pub fn same_kind(&self, other: &DeviceKind) -> bool {
        match (self, other) {
            (DeviceKind::Compound(a), DeviceKind::Compound(b)) => a.path == b.path,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }

    /// The and-like rule, for AND/NAND/OR/NOR.
    pub fn gate_rule(&self) -> Option<GateRule> {
        match self {
            DeviceKind::And => Some(GateRule::AND),
            DeviceKind::Nand => Some(GateRule::NAND),
            DeviceKind::Or => Some(GateRule::OR),
            DeviceKind::Nor => Some(GateRule::NOR),
            _ => None,
        }
    }

    /// Keys that take a number rather than a signal.
    pub fn value_keys(&self) -> &'static [&'static str] {
        match self {
            DeviceKind::Switch(_) => &[KEY_INITIAL_VALUE],
            DeviceKind::Clock(_) => &[KEY_PERIOD],
            _ => &[],
        }
    }

    /// Input pins that exist from creation.
    pub fn fixed_inputs(&self) -> Vec<String> {
        match self {
            DeviceKind::Xor => (1..=XOR_INPUTS).map(|i| format!("I{}", i)).collect(),
            DeviceKind::DType(_) => DTYPE_INPUTS.iter().map(|s| s.to_string()).collect(),
            DeviceKind::Compound(sub) => sub.input_names().map(str::to_string).collect(),
            DeviceKind::Switch(_)
            | DeviceKind::Clock(_)
            | DeviceKind::And
            | DeviceKind::Nand
            | DeviceKind::Or
            | DeviceKind::Nor => Vec::new(),
        }
    }

    /// Output pin names; a blank name is the device's only output.
    pub fn fixed_outputs(&self) -> Vec<String> {
        match self {
            DeviceKind::DType(_) => DTYPE_OUTPUTS.iter().map(|s| s.to_string()).collect(),
            DeviceKind::Compound(sub) => sub.output_names().map(str::to_string).collect(),
            _ => vec![String::new()],
        }
    }

    /// Signal an output holds before the first cycle.
    pub fn initial_output(&self, pin: usize) -> Signal {
        match self {
            DeviceKind::Switch(_) => Signal::Floating,
            DeviceKind::DType(ff) if pin == 1 => ff.q_bar(),
            _ => Signal::Low,
        }
    }
}

impl Device {
    /// Evaluate once from the given input signals (in pin order).
    ///
    /// Returns true if any output changed.
    pub fn execute(&mut self, inputs: &[Signal]) -> bool {
        let outputs = &mut self.outputs;
        match &mut self.kind {
            DeviceKind::Switch(sw) => sw.execute(&mut outputs[0]),
            DeviceKind::Clock(clock) => clock.execute(&mut outputs[0]),
            DeviceKind::And => outputs[0].drive(GateRule::AND.output(inputs)),
            DeviceKind::Nand => outputs[0].drive(GateRule::NAND.output(inputs)),
            DeviceKind::Or => outputs[0].drive(GateRule::OR.output(inputs)),
            DeviceKind::Nor => outputs[0].drive(GateRule::NOR.output(inputs)),
            DeviceKind::Xor => outputs[0].drive(xor_output(inputs)),
            DeviceKind::DType(ff) => {
                ff.update(inputs);
                let q = outputs[0].drive(ff.q());
                let q_bar = outputs[1].drive(ff.q_bar());
                q || q_bar
            }
            DeviceKind::Compound(sub) => sub.execute(inputs, outputs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_type_keywords() {
        assert_eq!(DeviceType::from_keyword("nand"), Some(DeviceType::Nand));
        assert_eq!(DeviceType::from_keyword("DType"), Some(DeviceType::DType));
        assert_eq!(DeviceType::from_keyword("latch"), None);
    }

    #[test]
    fn test_fixed_pins() {
        let ff = DeviceKind::new(DeviceType::DType);
        assert_eq!(ff.fixed_inputs(), vec!["DATA", "CLK", "SET", "CLEAR"]);
        assert_eq!(ff.fixed_outputs(), vec!["Q", "QBAR"]);
        assert_eq!(ff.initial_output(1), Signal::High);

        let xor = DeviceKind::new(DeviceType::Xor);
        assert_eq!(xor.fixed_inputs(), vec!["I1", "I2"]);
        assert!(DeviceKind::new(DeviceType::And).fixed_inputs().is_empty());
    }

    #[test]
    fn test_same_kind() {
        let a = DeviceKind::new(DeviceType::Switch);
        let mut b = DeviceKind::new(DeviceType::Switch);
        if let DeviceKind::Switch(sw) = &mut b {
            sw.set(true);
        }
        assert!(a.same_kind(&b));
        assert!(!a.same_kind(&DeviceKind::new(DeviceType::Clock)));
    }
}
