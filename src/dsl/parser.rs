//! Recursive descent parser for the circuit definition language.
//!
//! The parser only checks syntax. Every statement is handed to the
//! [`Builder`], which decides whether it makes sense. On a syntax error the
//! parser reports it, unwinds the current statement with [`Abort`] and skips
//! ahead to a point where parsing can resume:
//!
//! - at top level, the next `dev` or `monitor` keyword (or end of file);
//! - inside `{ ... }`, past the next `;` or `}`.

use std::fs;
use std::path::{Path, PathBuf};

use log::trace;

use super::ast::{Name, SignalRef};
use super::lexer::{Keyword, Lexer, Token, TokenKind};
use super::reader::{Reader, SourcePos};
use super::symbols::Symbol;
use super::{DiagnosticKind, Session};
use crate::circuit::{Builder, Circuit, DeviceId};
use crate::error::LexError;

/// The current statement was abandoned; the error is already reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abort;

type PResult<T> = std::result::Result<T, Abort>;

/// Parser for one circuit. Sub-circuits get a parser of their own.
pub struct Parser<'s> {
    session: &'s mut Session,
    builder: Builder,
    root: Lexer,
    /// Files opened by `import`, innermost last
    imports: Vec<Lexer>,
    /// Files of the circuits this one is nested in
    ancestors: Vec<PathBuf>,
}

impl<'s> Parser<'s> {
    pub fn new(session: &'s mut Session, root: Lexer, ancestors: Vec<PathBuf>) -> Self {
        Self {
            session,
            builder: Builder::new(),
            root,
            imports: Vec::new(),
            ancestors,
        }
    }

    /// Parse the whole input and build the circuit.
    ///
    /// The circuit is returned even if errors were reported; callers check
    /// the session's diagnostics before using it.
    pub fn parse(mut self) -> Circuit {
        loop {
            let token = match self.peek() {
                Ok(token) => token,
                Err(Abort) => {
                    self.recover_statement();
                    continue;
                }
            };
            let result = match token.kind {
                TokenKind::Eof => break,
                TokenKind::Keyword(Keyword::Dev) => self.step().and_then(|_| self.device_statement()),
                TokenKind::Keyword(Keyword::Monitor) => self.step().and_then(|_| self.monitor_statement()),
                TokenKind::Keyword(Keyword::Import) => self.step().and_then(|_| self.import_statement()),
                _ => Err(self.syntax_error(&token, "'dev', 'monitor' or 'import'")),
            };
            if result.is_err() {
                self.recover_statement();
            }
        }
        self.builder.finish(self.session)
    }

    // ---------------------------------------------------------------
    // Token access
    // ---------------------------------------------------------------

    /// Next token of the innermost open file. Finished imports are closed.
    fn peek(&mut self) -> PResult<Token> {
        loop {
            let lexer = match self.imports.last_mut() {
                Some(lexer) => lexer,
                None => &mut self.root,
            };
            match lexer.peek(self.builder.symbols_mut()) {
                Ok(token) if token.kind == TokenKind::Eof && !self.imports.is_empty() => {
                    self.imports.pop();
                    trace!("import finished");
                }
                Ok(token) => return Ok(token),
                Err(e) => return Err(self.lex_error(e)),
            }
        }
    }

    fn step(&mut self) -> PResult<Token> {
        self.peek()?;
        let lexer = match self.imports.last_mut() {
            Some(lexer) => lexer,
            None => &mut self.root,
        };
        match lexer.step(self.builder.symbols_mut()) {
            Ok(token) => Ok(token),
            Err(e) => Err(self.lex_error(e)),
        }
    }

    /// Consume the next token if `accept` matches it.
    fn expect(&mut self, expected: &str, accept: impl Fn(&TokenKind) -> bool) -> PResult<Token> {
        let token = self.peek()?;
        if accept(&token.kind) {
            self.step()
        } else {
            Err(self.syntax_error(&token, expected))
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> PResult<Name> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::Identifier(symbol) => {
                self.step()?;
                Ok(Name {
                    symbol,
                    pos: token.pos,
                })
            }
            _ => Err(self.syntax_error(&token, expected)),
        }
    }

    fn peek_is(&mut self, kind: &TokenKind) -> PResult<bool> {
        Ok(&self.peek()?.kind == kind)
    }

    fn lex_error(&mut self, e: LexError) -> Abort {
        self.session
            .error(DiagnosticKind::Lexical, e.pos(), e.to_string());
        Abort
    }

    fn syntax_error(&mut self, found: &Token, expected: &str) -> Abort {
        let message = format!(
            "expected {}, found {}",
            expected,
            found.kind.describe(self.builder.symbols())
        );
        self.session
            .error(DiagnosticKind::Syntax, found.pos, message);
        Abort
    }

    // ---------------------------------------------------------------
    // Recovery
    // ---------------------------------------------------------------

    /// Skip to the next `dev`/`monitor` keyword or end of file.
    fn recover_statement(&mut self) {
        loop {
            match self.peek() {
                Err(Abort) => continue,
                Ok(token) => match token.kind {
                    TokenKind::Eof
                    | TokenKind::Keyword(Keyword::Dev)
                    | TokenKind::Keyword(Keyword::Monitor) => return,
                    _ => {
                        let _ = self.step();
                    }
                },
            }
        }
    }

    /// Skip past the next `;` or `}`. Returns true if the block was closed.
    fn recover_option(&mut self) -> bool {
        loop {
            match self.peek() {
                Err(Abort) => continue,
                Ok(token) => match token.kind {
                    TokenKind::Eof => return false,
                    TokenKind::Semicolon => {
                        let _ = self.step();
                        return false;
                    }
                    TokenKind::CloseBrace => {
                        let _ = self.step();
                        return true;
                    }
                    _ => {
                        let _ = self.step();
                    }
                },
            }
        }
    }

    // ---------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------

    /// `dev NAME [= TYPE | = "file"] (';' | '{' options '}')`
    fn device_statement(&mut self) -> PResult<()> {
        let name = self.expect_identifier("a device name")?;

        let device = if self.peek_is(&TokenKind::Equals)? {
            self.step()?;
            let token = self.peek()?;
            match &token.kind {
                TokenKind::DeviceType(ty) => {
                    self.step()?;
                    self.builder.define_device(self.session, name, *ty)
                }
                TokenKind::Str(path) => {
                    self.step()?;
                    self.compile_subcircuit(name, path, token.pos)
                }
                _ => return Err(self.syntax_error(&token, "a device type or a quoted file name")),
            }
        } else {
            self.builder.reopen_device(self.session, name)
        };

        let token = self.peek()?;
        match token.kind {
            TokenKind::Semicolon => {
                self.step()?;
                Ok(())
            }
            TokenKind::OpenBrace => {
                self.step()?;
                self.options(device)
            }
            _ => Err(self.syntax_error(&token, "';' or '{'")),
        }
    }

    /// Options up to and including the closing `}`.
    ///
    /// Options of a device that failed to define are still parsed, so their
    /// syntax is checked, but not applied.
    fn options(&mut self, device: Option<DeviceId>) -> PResult<()> {
        loop {
            let token = match self.peek() {
                Ok(token) => token,
                Err(Abort) => {
                    if self.recover_option() {
                        return Ok(());
                    }
                    continue;
                }
            };
            match token.kind {
                TokenKind::CloseBrace => {
                    self.step()?;
                    return Ok(());
                }
                TokenKind::Eof => return Err(self.syntax_error(&token, "'}'")),
                _ => {
                    if self.option(device).is_err() && self.recover_option() {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// `KEY ':' (NUMBER | SIGNAL) ';'`
    fn option(&mut self, device: Option<DeviceId>) -> PResult<()> {
        let key = self.expect_identifier("an input or property name")?;
        self.expect("':'", |k| *k == TokenKind::Colon)?;

        let token = self.peek()?;
        match token.kind {
            TokenKind::Number(value) => {
                self.step()?;
                self.expect("';'", |k| *k == TokenKind::Semicolon)?;
                if let Some(device) = device {
                    self.builder
                        .set_input_value(self.session, device, key, value, token.pos);
                }
            }
            TokenKind::Identifier(_) => {
                let signal = self.signal_name()?;
                self.expect("';'", |k| *k == TokenKind::Semicolon)?;
                if let Some(device) = device {
                    self.builder
                        .set_input_signal(self.session, device, key, signal);
                }
            }
            _ => return Err(self.syntax_error(&token, "a signal name or a number")),
        }
        Ok(())
    }

    /// `monitor SIGNAL [as SIGNAL] {',' SIGNAL [as SIGNAL]} ';'`
    fn monitor_statement(&mut self) -> PResult<()> {
        let mut items = Vec::new();
        loop {
            let signal = self.signal_name()?;
            let alias = if self.peek_is(&TokenKind::Keyword(Keyword::As))? {
                self.step()?;
                Some(self.signal_name()?)
            } else {
                None
            };
            items.push((signal, alias));

            if self.peek_is(&TokenKind::Comma)? {
                self.step()?;
            } else {
                self.expect("',' or ';'", |k| *k == TokenKind::Semicolon)?;
                break;
            }
        }
        for (signal, alias) in items {
            self.builder.define_monitor(signal, alias);
        }
        Ok(())
    }

    /// `import "file" ';'`
    fn import_statement(&mut self) -> PResult<()> {
        let token = self.expect("a quoted file name", |k| matches!(k, TokenKind::Str(_)))?;
        self.expect("';'", |k| *k == TokenKind::Semicolon)?;
        if let TokenKind::Str(path) = token.kind {
            if let Some(lexer) = self.open(&path, token.pos) {
                trace!("importing {}", path);
                self.imports.push(lexer);
            }
        }
        Ok(())
    }

    /// `DEV ['.' PIN]`
    fn signal_name(&mut self) -> PResult<SignalRef> {
        let device = self.expect_identifier("a device name")?;
        let (pin, pin_pos) = if self.peek_is(&TokenKind::Dot)? {
            self.step()?;
            let pin = self.expect_identifier("a pin name")?;
            (pin.symbol, Some(pin.pos))
        } else {
            (Symbol::BLANK, None)
        };
        Ok(SignalRef {
            device: device.symbol,
            pin,
            pos: device.pos,
            pin_pos,
        })
    }

    // ---------------------------------------------------------------
    // Files
    // ---------------------------------------------------------------

    /// Canonical paths of every file currently being read, here and in the
    /// circuits this one is nested in.
    fn open_files(&self) -> Vec<PathBuf> {
        let mut files = self.ancestors.clone();
        files.extend(
            std::iter::once(&self.root)
                .chain(self.imports.iter())
                .filter_map(|l| l.canonical().map(Path::to_path_buf)),
        );
        files
    }

    /// Open `path` (relative to the file that names it) as a new lexer.
    fn open(&mut self, path: &str, pos: SourcePos) -> Option<Lexer> {
        let resolved = match self.session.sources.path(pos.file).parent() {
            Some(dir) if Path::new(path).is_relative() => dir.join(path),
            _ => PathBuf::from(path),
        };

        let canonical = match fs::canonicalize(&resolved) {
            Ok(canonical) => canonical,
            Err(e) => {
                self.session.error(
                    DiagnosticKind::Semantic,
                    pos,
                    format!("cannot open '{}': {}", path, e),
                );
                return None;
            }
        };
        if self.open_files().contains(&canonical) {
            self.session.error(
                DiagnosticKind::Semantic,
                pos,
                format!("file '{}' is already included", path),
            );
            return None;
        }
        let text = match fs::read_to_string(&canonical) {
            Ok(text) => text,
            Err(e) => {
                self.session.error(
                    DiagnosticKind::Semantic,
                    pos,
                    format!("cannot read '{}': {}", path, e),
                );
                return None;
            }
        };

        let file = self.session.sources.add(resolved, Some(canonical.clone()), text);
        let reader = Reader::new(file, &self.session.sources.file(file).text);
        Some(Lexer::new(reader, Some(canonical)))
    }

    /// `dev NAME = "file"`: compile `file` as an independent circuit.
    fn compile_subcircuit(&mut self, name: Name, path: &str, pos: SourcePos) -> Option<DeviceId> {
        let lexer = self.open(path, pos)?;
        let resolved = self.session.sources.path(lexer.file()).to_path_buf();
        let ancestors = self.open_files();

        trace!("compiling sub-circuit {}", resolved.display());
        let errors_before = self.session.diagnostics.error_count();
        let sub = Parser::new(&mut *self.session, lexer, ancestors).parse();
        if self.session.diagnostics.error_count() > errors_before {
            self.session.error(
                DiagnosticKind::Semantic,
                pos,
                format!("'{}' has errors and cannot be used as a device", path),
            );
            return None;
        }

        self.builder
            .import_device(self.session, name, resolved, pos, sub)
    }
}
