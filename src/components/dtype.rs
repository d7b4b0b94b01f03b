//! Edge-triggered D-type flip-flop with asynchronous set and clear.

use crate::circuit::Signal;

/// Input pin order of a D-type device.
pub const DTYPE_INPUTS: [&str; 4] = ["DATA", "CLK", "SET", "CLEAR"];
/// Output pin order of a D-type device.
pub const DTYPE_OUTPUTS: [&str; 2] = ["Q", "QBAR"];

pub const DATA: usize = 0;
pub const CLK: usize = 1;
pub const SET: usize = 2;
pub const CLEAR: usize = 3;

#[derive(Debug, Clone)]
pub struct DType {
    pub memory: Signal,
}

impl Default for DType {
    fn default() -> Self {
        Self::new()
    }
}

impl DType {
    pub fn new() -> Self {
        Self {
            memory: Signal::Low,
        }
    }

    /// Update memory from the current inputs, in [`DTYPE_INPUTS`] order.
    ///
    /// On a rising clock the data level from before this pass is captured.
    /// SET and CLEAR override the clock, CLEAR last.
    pub fn update(&mut self, inputs: &[Signal]) {
        let input = |i: usize| inputs.get(i).copied().unwrap_or(Signal::Low);

        if input(CLK) == Signal::Rising {
            self.memory = Signal::from_level(input(DATA).was_high());
        }
        if input(SET).is_high() {
            self.memory = Signal::High;
        }
        if input(CLEAR).is_high() {
            self.memory = Signal::Low;
        }
    }

    pub fn q(&self) -> Signal {
        self.memory
    }

    pub fn q_bar(&self) -> Signal {
        Signal::from_level(!self.memory.is_high())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Signal::*;

    #[test]
    fn test_captures_on_rising_edge() {
        let mut ff = DType::new();
        ff.update(&[High, Rising, Low, Low]);
        assert_eq!(ff.q(), High);
        assert_eq!(ff.q_bar(), Low);

        // no edge, data ignored
        ff.update(&[Low, High, Low, Low]);
        assert_eq!(ff.q(), High);
    }

    #[test]
    fn test_samples_data_before_edge() {
        let mut ff = DType::new();
        // data is only just rising in this pass: the old level was low
        ff.update(&[Rising, Rising, Low, Low]);
        assert_eq!(ff.q(), Low);

        ff.update(&[Falling, Rising, Low, Low]);
        assert_eq!(ff.q(), High);
    }

    #[test]
    fn test_clear_after_capture() {
        let mut ff = DType::new();
        ff.update(&[High, Rising, Low, Low]);
        assert_eq!(ff.q(), High);
        // no clock edge needed
        ff.update(&[High, High, Low, Rising]);
        assert_eq!(ff.q(), Low);
        assert_eq!(ff.q_bar(), High);
    }

    #[test]
    fn test_set_and_clear_override() {
        let mut ff = DType::new();
        ff.update(&[Low, Low, High, Low]);
        assert_eq!(ff.q(), High);
        ff.update(&[High, Rising, Low, High]);
        assert_eq!(ff.q(), Low);
        ff.update(&[Low, Low, High, High]);
        assert_eq!(ff.q(), Low);
    }
}
