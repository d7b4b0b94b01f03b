//! Combinational gates: AND, NAND, OR, NOR and XOR.

use crate::circuit::Signal;

/// Most inputs an AND/NAND/OR/NOR gate may have.
pub const MAX_GATE_INPUTS: usize = 16;

/// Inputs an XOR gate has.
pub const XOR_INPUTS: usize = 2;

/// The four "and-like" gates share one rule.
///
/// The output is `y` unless some input sits at the opposite of `x`, in which
/// case it is the opposite of `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateRule {
    pub x: bool,
    pub y: bool,
}

impl GateRule {
    pub const AND: GateRule = GateRule { x: true, y: true };
    pub const NAND: GateRule = GateRule { x: true, y: false };
    pub const OR: GateRule = GateRule { x: false, y: false };
    pub const NOR: GateRule = GateRule { x: false, y: true };

    pub fn output(&self, inputs: &[Signal]) -> Signal {
        let triggered = inputs.iter().any(|s| s.is_high() != self.x);
        Signal::from_level(self.y != triggered)
    }
}

/// High iff the inputs disagree.
pub fn xor_output(inputs: &[Signal]) -> Signal {
    let highs = inputs.iter().filter(|s| s.is_high()).count();
    Signal::from_level(highs % 2 == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Signal::*;

    #[test]
    fn test_and_nand() {
        assert_eq!(GateRule::AND.output(&[High, High]), High);
        assert_eq!(GateRule::AND.output(&[High, Low]), Low);
        assert_eq!(GateRule::NAND.output(&[High, High]), Low);
        assert_eq!(GateRule::NAND.output(&[Falling, High]), High);
    }

    #[test]
    fn test_or_nor() {
        assert_eq!(GateRule::OR.output(&[Low, Low, Low]), Low);
        assert_eq!(GateRule::OR.output(&[Low, Rising, Low]), High);
        assert_eq!(GateRule::NOR.output(&[Low, Low]), High);
        assert_eq!(GateRule::NOR.output(&[High]), Low);
    }

    #[test]
    fn test_xor() {
        assert_eq!(xor_output(&[High, Low]), High);
        assert_eq!(xor_output(&[Rising, High]), Low);
        assert_eq!(xor_output(&[Low, Low]), Low);
    }
}
