//! DSL (Domain Specific Language) front end for circuit descriptions.
//!
//! This module turns circuit definition files into a validated
//! [`Circuit`]. The language is statement oriented and free-form: line
//! breaks carry no meaning.
//!
//! # Grammar Overview
//!
//! ```text
//! file        = { statement }
//! statement   = device | monitor | import
//! device      = "dev" name [ "=" ( type | string ) ] ( ";" | "{" { option } "}" )
//! option      = key ":" ( number | signal ) ";"
//! monitor     = "monitor" watch { "," watch } ";"
//! watch       = signal [ "as" signal ]
//! import      = "import" string ";"
//!
//! signal      = name [ "." name ]
//! type        = "SWITCH" | "CLOCK" | "AND" | "NAND" | "OR" | "NOR" | "XOR" | "DTYPE"
//! name, key   = letter { letter | digit | "_" }
//! number      = digit { digit }
//! string      = '"' { any character except '"' and newline } '"'
//! ```
//!
//! Keywords, type names and identifiers are case-insensitive. Comments are
//! `// ...` to the end of the line or `/* ... */`.
//!
//! # Devices
//!
//! | Type | Inputs | Outputs | Properties |
//! |------|--------|---------|------------|
//! | SWITCH | - | (unnamed) | `InitialValue: 0 \| 1` |
//! | CLOCK | - | (unnamed) | `Period: n` (ticks per half cycle) |
//! | AND, NAND, OR, NOR | `I1` .. `I16` | (unnamed) | - |
//! | XOR | `I1`, `I2` | (unnamed) | - |
//! | DTYPE | `DATA`, `CLK`, `SET`, `CLEAR` | `Q`, `QBAR` | - |
//! | `"file"` | the file's switches | the file's unaliased monitors | - |
//!
//! `dev NAME { ... }` without a type adds options to a device defined
//! earlier. Signals may refer to devices defined later in the file.
//!
//! # Example
//!
//! ```text
//! // Divide-by-two counter
//! dev CLK = CLOCK { Period: 1; }
//! dev ZERO = SWITCH { InitialValue: 0; }
//! dev FF = DTYPE { DATA: FF.QBAR; CLK: CLK; SET: ZERO; CLEAR: ZERO; }
//! monitor CLK, FF.Q as COUNT;
//! ```

mod ast;
mod diagnostics;
mod lexer;
mod parser;
mod reader;
mod suggest;
mod symbols;

pub use ast::{Name, SignalRef};
pub use diagnostics::{wrap, Diagnostic, DiagnosticKind, Diagnostics, Severity, WRAP_WIDTH};
pub use lexer::{Keyword, Lexer, Token, TokenKind};
pub use parser::{Abort, Parser};
pub use reader::{FileId, Reader, SourceFile, SourceMap, SourcePos};
pub use suggest::{closest, did_you_mean, edit_distance, MAX_SUGGESTION_DISTANCE};
pub use symbols::{Symbol, SymbolTable};

use std::fs;
use std::path::Path;

use log::info;

use crate::circuit::Circuit;
use crate::error::SimError;

/// Everything one load shares across files: the sources and what was found
/// in them.
#[derive(Debug, Default)]
pub struct Session {
    pub sources: SourceMap,
    pub diagnostics: Diagnostics,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(
        &mut self,
        severity: Severity,
        kind: DiagnosticKind,
        pos: Option<SourcePos>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic::new(severity, kind, pos, message, &self.sources);
        self.diagnostics.push(diagnostic);
    }

    pub fn error(&mut self, kind: DiagnosticKind, pos: SourcePos, message: impl Into<String>) {
        self.report(Severity::Error, kind, Some(pos), message);
    }

    pub fn warning(&mut self, pos: SourcePos, message: impl Into<String>) {
        self.report(Severity::Warning, DiagnosticKind::Semantic, Some(pos), message);
    }

    /// Attach a note to the diagnostic just reported.
    pub fn note(&mut self, pos: SourcePos, message: impl Into<String>) {
        self.report(Severity::Note, DiagnosticKind::Semantic, Some(pos), message);
    }

    /// A broken invariant of the builder itself.
    pub fn internal(&mut self, pos: SourcePos, message: impl Into<String>) {
        self.report(Severity::Internal, DiagnosticKind::Internal, Some(pos), message);
    }
}

/// A circuit that loaded without errors, plus any warnings.
#[derive(Debug)]
pub struct LoadedCircuit {
    pub circuit: Circuit,
    pub diagnostics: Diagnostics,
}

/// Load and validate a circuit file.
///
/// On failure every diagnostic is returned, including warnings.
pub fn load_circuit(path: impl AsRef<Path>) -> Result<LoadedCircuit, Diagnostics> {
    let path = path.as_ref();
    let mut session = Session::new();

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(source) => {
            let e = SimError::FileReadError {
                path: path.display().to_string(),
                source,
            };
            session.report(Severity::Error, DiagnosticKind::Semantic, None, e.to_string());
            return Err(session.diagnostics);
        }
    };
    let canonical = fs::canonicalize(path).ok();
    let file = session.sources.add(path, canonical.clone(), text);
    compile(session, file, canonical)
}

/// Load and validate circuit text. `name` is used in messages and as the
/// base for relative imports.
pub fn load_str(name: &str, text: &str) -> Result<LoadedCircuit, Diagnostics> {
    let mut session = Session::new();
    let file = session.sources.add(name, None, text.to_string());
    compile(session, file, None)
}

fn compile(
    mut session: Session,
    file: FileId,
    canonical: Option<std::path::PathBuf>,
) -> Result<LoadedCircuit, Diagnostics> {
    let reader = Reader::new(file, &session.sources.file(file).text);
    let lexer = Lexer::new(reader, canonical);
    let circuit = Parser::new(&mut session, lexer, Vec::new()).parse();

    let path = session.sources.path(file).display().to_string();
    if session.diagnostics.has_errors() {
        info!(
            "failed to load {}: {} error(s)",
            path,
            session.diagnostics.error_count()
        );
        return Err(session.diagnostics);
    }
    info!(
        "loaded {}: {} device(s), {} monitor(s), {} warning(s)",
        path,
        circuit.network.len(),
        circuit.monitors.len(),
        session.diagnostics.warning_count()
    );
    Ok(LoadedCircuit {
        circuit,
        diagnostics: session.diagnostics,
    })
}
