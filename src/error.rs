//! Error types for the gatesim compiler and simulator.
//!
//! Two families live here. [`SimError`] covers failures of the runtime API
//! (loading files, poking switches, running cycles). [`LexError`] is raised by
//! the lexer and carries the offending [`SourcePos`]; the parser turns it into
//! a [`Diagnostic`](crate::dsl::Diagnostic) and resynchronizes.
//!
//! Problems found in circuit source text are not `SimError`s: they are
//! collected as diagnostics so that one mistake does not hide the next.

use thiserror::Error;

use crate::dsl::SourcePos;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Unified error type for runtime operations.
#[derive(Error, Debug)]
pub enum SimError {
    // ============ I/O Errors ============
    /// Error reading a circuit file
    #[error("Failed to read circuit file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The circuit failed to load
    #[error("Circuit '{path}' has {errors} error(s)")]
    LoadFailed { path: String, errors: usize },

    // ============ Lookup Errors ============
    /// No device with this name
    #[error("No device named '{name}'")]
    UnknownDevice { name: String },

    /// Device exists but has no such output
    #[error("Device '{device}' has no output '{pin}'")]
    UnknownOutput { device: String, pin: String },

    /// Device is not a switch
    #[error("Device '{name}' is not a switch")]
    NotASwitch { name: String },

    /// Device is not a clock
    #[error("Device '{name}' is not a clock")]
    NotAClock { name: String },

    /// Clock period must be positive
    #[error("Invalid clock period {period} for '{name}' (must be at least 1)")]
    InvalidPeriod { name: String, period: u32 },

    // ============ Monitor Errors ============
    /// Monitor capacity reached
    #[error("Cannot monitor more than {max} signals")]
    TooManyMonitors { max: usize },

    /// Signal is already monitored
    #[error("Signal '{signal}' is already monitored")]
    AlreadyMonitored { signal: String },

    /// Signal is not monitored
    #[error("Signal '{signal}' is not monitored")]
    NotMonitored { signal: String },

    // ============ Simulation Errors ============
    /// Relaxation did not settle within the pass budget
    #[error("Network oscillating at cycle {cycle}: no steady state after {passes} passes")]
    Oscillation { cycle: usize, passes: usize },
}

impl SimError {
    /// Create an unknown device error
    pub fn unknown_device(name: impl Into<String>) -> Self {
        Self::UnknownDevice { name: name.into() }
    }

    /// Create an unknown output error
    pub fn unknown_output(device: impl Into<String>, pin: impl Into<String>) -> Self {
        Self::UnknownOutput {
            device: device.into(),
            pin: pin.into(),
        }
    }

    /// Create an oscillation error
    pub fn oscillation(cycle: usize, passes: usize) -> Self {
        Self::Oscillation { cycle, passes }
    }
}

/// Lexical failure. The offending input has already been consumed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("illegal character '{ch}'")]
    IllegalCharacter { ch: char, pos: SourcePos },

    #[error("unterminated block comment")]
    UnterminatedComment { pos: SourcePos },

    #[error("unterminated string literal")]
    UnterminatedString { pos: SourcePos },

    #[error("number is too large (maximum is {})", i32::MAX)]
    IntegerOverflow { pos: SourcePos },
}

impl LexError {
    /// Where the error starts.
    pub fn pos(&self) -> SourcePos {
        match self {
            Self::IllegalCharacter { pos, .. }
            | Self::UnterminatedComment { pos }
            | Self::UnterminatedString { pos }
            | Self::IntegerOverflow { pos } => *pos,
        }
    }
}
