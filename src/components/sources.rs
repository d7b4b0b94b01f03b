//! Signal sources: switches and clocks.

use crate::circuit::{OutputPin, Signal};

/// A user-controlled static level.
#[derive(Debug, Clone)]
pub struct Switch {
    /// `Floating` until an `InitialValue` is assigned
    pub level: Signal,
}

impl Default for Switch {
    fn default() -> Self {
        Self::new()
    }
}

impl Switch {
    pub fn new() -> Self {
        Self {
            level: Signal::Floating,
        }
    }

    pub fn set(&mut self, high: bool) {
        self.level = Signal::from_level(high);
    }

    pub fn is_set(&self) -> bool {
        self.level != Signal::Floating
    }

    /// Drive the output to the switch level.
    pub fn execute(&self, out: &mut OutputPin) -> bool {
        if self.is_set() {
            out.drive(self.level)
        } else {
            false
        }
    }
}

/// A free-running square wave.
///
/// The output flips every `period` ticks.
#[derive(Debug, Clone)]
pub struct Clock {
    /// Ticks per half cycle; 0 means "not yet assigned".
    pub period: u32,
    pub counter: u32,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            period: 0,
            counter: 0,
        }
    }

    pub fn set_period(&mut self, period: u32) {
        self.period = period;
        self.counter = 0;
    }

    /// Advance one simulated cycle, starting an edge when the period elapses.
    pub fn tick(&mut self, out: &mut OutputPin) {
        if self.period == 0 {
            return;
        }
        self.counter += 1;
        if self.counter >= self.period {
            self.counter = 0;
            out.signal = if out.signal.is_high() {
                Signal::Falling
            } else {
                Signal::Rising
            };
        }
    }

    /// Settle an edge started by [`Clock::tick`].
    pub fn execute(&self, out: &mut OutputPin) -> bool {
        match out.signal {
            Signal::Rising => out.drive(Signal::High),
            Signal::Falling => out.drive(Signal::Low),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{FileId, SourcePos, Symbol};

    fn pin(signal: Signal) -> OutputPin {
        OutputPin::new(Symbol::BLANK, signal, SourcePos::start_of(FileId(0)))
    }

    #[test]
    fn test_floating_switch_does_not_drive() {
        let sw = Switch::new();
        let mut out = pin(Signal::Floating);
        assert!(!sw.execute(&mut out));
        assert_eq!(out.signal, Signal::Floating);
    }

    #[test]
    fn test_switch_drives_level() {
        let mut sw = Switch::new();
        sw.set(true);
        let mut out = pin(Signal::Low);
        assert!(sw.execute(&mut out));
        assert_eq!(out.signal, Signal::Rising);
    }

    #[test]
    fn test_clock_flips_every_period() {
        let mut clock = Clock::new();
        clock.set_period(2);
        let mut out = pin(Signal::Low);

        clock.tick(&mut out);
        assert_eq!(out.signal, Signal::Low);
        clock.tick(&mut out);
        assert_eq!(out.signal, Signal::Rising);
        assert!(clock.execute(&mut out));
        assert_eq!(out.signal, Signal::High);
        assert!(!clock.execute(&mut out));

        clock.tick(&mut out);
        clock.tick(&mut out);
        assert_eq!(out.signal, Signal::Falling);
    }
}
