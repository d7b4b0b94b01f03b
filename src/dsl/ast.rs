//! Syntax fragments handed from the parser to the network builder.

use super::reader::SourcePos;
use super::symbols::Symbol;

/// An identifier and where it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Name {
    pub symbol: Symbol,
    pub pos: SourcePos,
}

/// A reference to an output: `DEV` or `DEV.PIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalRef {
    pub device: Symbol,
    /// `Symbol::BLANK` when no pin was written
    pub pin: Symbol,
    pub pos: SourcePos,
    /// Position of the pin name, if any
    pub pin_pos: Option<SourcePos>,
}

impl SignalRef {
    pub fn same_signal(&self, other: &SignalRef) -> bool {
        self.device == other.device && self.pin == other.pin
    }
}
