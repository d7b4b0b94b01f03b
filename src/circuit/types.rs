//! Core types for network representation.

use std::fmt;

use crate::components::DeviceKind;
use crate::dsl::{SourcePos, Symbol};

/// The value on a wire.
///
/// `Rising` and `Falling` mark an output that changed during the current
/// relaxation pass. The owning device settles them to `High`/`Low` the next
/// time it is evaluated, so other devices can see the edge for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Low,
    High,
    Rising,
    Falling,
    /// Not yet driven. Only legal before a switch is given a level.
    Floating,
}

impl Signal {
    /// `High` for true, `Low` for false.
    pub fn from_level(level: bool) -> Self {
        if level {
            Signal::High
        } else {
            Signal::Low
        }
    }

    /// Current logic level. A floating wire reads low.
    pub fn is_high(&self) -> bool {
        matches!(self, Signal::High | Signal::Rising)
    }

    /// Level before this pass's transition took effect.
    pub fn was_high(&self) -> bool {
        matches!(self, Signal::High | Signal::Falling)
    }

    /// The settled level, `High` or `Low`.
    pub fn level(&self) -> Signal {
        Signal::from_level(self.is_high())
    }

    /// Next state of a wire currently at `self` that is being driven to
    /// `target` (only the level of `target` matters).
    pub fn update(self, target: Signal) -> Signal {
        let high = target.is_high();
        match self {
            Signal::Low | Signal::Falling => {
                if high {
                    Signal::Rising
                } else {
                    Signal::Low
                }
            }
            Signal::High | Signal::Rising => {
                if high {
                    Signal::High
                } else {
                    Signal::Falling
                }
            }
            Signal::Floating => {
                if high {
                    Signal::Rising
                } else {
                    Signal::Falling
                }
            }
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Low => "low",
            Signal::High => "high",
            Signal::Rising => "rising",
            Signal::Falling => "falling",
            Signal::Floating => "floating",
        };
        f.write_str(s)
    }
}

/// Index of a device in the network arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub usize);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// A specific output pin: device plus index into its outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputId {
    pub device: DeviceId,
    pub pin: usize,
}

#[derive(Debug, Clone)]
pub struct OutputPin {
    pub id: Symbol,
    pub signal: Signal,
    pub defined_at: SourcePos,
}

impl OutputPin {
    pub fn new(id: Symbol, signal: Signal, defined_at: SourcePos) -> Self {
        Self {
            id,
            signal,
            defined_at,
        }
    }

    /// Drive toward `target`; returns true if the signal changed.
    pub fn drive(&mut self, target: Signal) -> bool {
        let next = self.signal.update(target);
        let changed = next != self.signal;
        self.signal = next;
        changed
    }
}

#[derive(Debug, Clone)]
pub struct InputPin {
    pub id: Symbol,
    pub connection: Option<OutputId>,
    pub defined_at: SourcePos,
}

impl InputPin {
    pub fn new(id: Symbol, defined_at: SourcePos) -> Self {
        Self {
            id,
            connection: None,
            defined_at,
        }
    }
}

/// One device in the network.
#[derive(Debug, Clone)]
pub struct Device {
    pub id: Symbol,
    pub kind: DeviceKind,
    pub inputs: Vec<InputPin>,
    pub outputs: Vec<OutputPin>,
    pub defined_at: SourcePos,
}

impl Device {
    pub fn find_input(&self, pin: Symbol) -> Option<usize> {
        self.inputs.iter().position(|p| p.id == pin)
    }

    pub fn find_output(&self, pin: Symbol) -> Option<usize> {
        self.outputs.iter().position(|p| p.id == pin)
    }

    pub fn is_clock(&self) -> bool {
        matches!(self.kind, DeviceKind::Clock(_))
    }
}
