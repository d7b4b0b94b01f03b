//! Diagnostics produced while loading a circuit.
//!
//! A [`Diagnostic`] is rendered once, when it is created, so it can be
//! printed later without access to the source files.

use std::fmt;
use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use super::reader::{SourceMap, SourcePos};

/// Width used when wrapping message text.
pub const WRAP_WIDTH: usize = 78;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Note,
    Warning,
    Error,
    /// An invariant of the tool itself was broken.
    Internal,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Internal => "internal error",
        }
    }

    fn color(&self) -> Color {
        match self {
            Severity::Info | Severity::Note => Color::Cyan,
            Severity::Warning => Color::Yellow,
            Severity::Error | Severity::Internal => Color::Red,
        }
    }
}

/// Which stage found the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    Semantic,
    Simulation,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub pos: Option<SourcePos>,
    /// The bare message, without location or excerpt
    pub message: String,
    location: Option<String>,
    excerpt: Option<(String, usize)>,
    rendered: String,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        kind: DiagnosticKind,
        pos: Option<SourcePos>,
        message: impl Into<String>,
        sources: &SourceMap,
    ) -> Self {
        let message = message.into();
        let location = pos.map(|p| sources.describe(p));
        let excerpt = pos.and_then(|p| {
            sources
                .line_text(p)
                .map(|line| (line.to_string(), p.column))
        });
        let rendered = render(severity, location.as_deref(), &message, excerpt.as_ref());
        Self {
            severity,
            kind,
            pos,
            message,
            location,
            excerpt,
            rendered,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error | Severity::Internal)
    }

    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// Print with colors to `stream`.
    pub fn print_to(&self, stream: &mut impl WriteColor) -> std::io::Result<()> {
        if let Some(location) = &self.location {
            stream.set_color(ColorSpec::new().set_bold(true))?;
            write!(stream, "{}: ", location)?;
        }
        stream.set_color(ColorSpec::new().set_fg(Some(self.severity.color())).set_bold(true))?;
        write!(stream, "{}: ", self.severity.label())?;
        stream.reset()?;

        let head = self.location.as_ref().map_or(0, |l| l.len() + 2) + self.severity.label().len() + 2;
        writeln!(stream, "{}", wrap(&self.message, head, 4))?;

        if let Some((line, column)) = &self.excerpt {
            writeln!(stream, "    {}", line)?;
            stream.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
            writeln!(stream, "    {}^", caret_padding(line, *column))?;
            stream.reset()?;
        }
        Ok(())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

fn render(
    severity: Severity,
    location: Option<&str>,
    message: &str,
    excerpt: Option<&(String, usize)>,
) -> String {
    let mut out = String::new();
    if let Some(location) = location {
        out.push_str(location);
        out.push_str(": ");
    }
    out.push_str(severity.label());
    out.push_str(": ");
    let head = out.chars().count();
    out.push_str(&wrap(message, head, 4));
    if let Some((line, column)) = excerpt {
        out.push_str("\n    ");
        out.push_str(line);
        out.push_str("\n    ");
        out.push_str(&caret_padding(line, *column));
        out.push('^');
    }
    out
}

// Tabs are kept so the caret lines up under the same terminal tab stops.
fn caret_padding(line: &str, column: usize) -> String {
    line.chars()
        .take(column.saturating_sub(1))
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect()
}

/// Greedy word wrap. `first` is the width already used on the first line;
/// continuation lines are indented by `indent` spaces.
pub fn wrap(text: &str, first: usize, indent: usize) -> String {
    let mut out = String::new();
    let mut used = first;
    for word in text.split_whitespace() {
        let len = word.chars().count();
        if used > indent && used + 1 + len > WRAP_WIDTH && !out.is_empty() {
            out.push('\n');
            out.extend(std::iter::repeat(' ').take(indent));
            used = indent;
        } else if !out.is_empty() {
            out.push(' ');
            used += 1;
        }
        out.push_str(word);
        used += len;
    }
    out
}

/// Collected diagnostics, in the order they were reported.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|d| d.severity == severity).count()
    }

    /// Errors, including internal errors.
    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Print everything to stderr, followed by a summary line.
    pub fn print(&self) -> std::io::Result<()> {
        let mut stream = StandardStream::stderr(ColorChoice::Auto);
        for diagnostic in &self.items {
            diagnostic.print_to(&mut stream)?;
        }
        if self.error_count() + self.warning_count() > 0 {
            writeln!(
                stream,
                "{} error(s), {} warning(s)",
                self.error_count(),
                self.warning_count()
            )?;
        }
        Ok(())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.items {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_excerpt() {
        let mut sources = SourceMap::new();
        let file = sources.add("a.circuit", None, "dev X = FOO;\n".to_string());
        let pos = SourcePos {
            file,
            line: 1,
            column: 9,
            offset: 8,
        };
        let d = Diagnostic::new(
            Severity::Error,
            DiagnosticKind::Syntax,
            Some(pos),
            "expected a device type",
            &sources,
        );
        assert_eq!(
            d.rendered(),
            "a.circuit:1:9: error: expected a device type\n    dev X = FOO;\n            ^"
        );
        assert!(d.is_error());
    }

    #[test]
    fn test_wrap_long_message() {
        let text = "word ".repeat(40);
        let wrapped = wrap(&text, 10, 4);
        assert!(wrapped.lines().count() > 1);
        assert!(wrapped.lines().all(|l| l.chars().count() <= WRAP_WIDTH));
        assert!(wrapped.lines().skip(1).all(|l| l.starts_with("    word")));
    }

    #[test]
    fn test_counts() {
        let sources = SourceMap::new();
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::new(Severity::Warning, DiagnosticKind::Semantic, None, "w", &sources));
        diags.push(Diagnostic::new(Severity::Internal, DiagnosticKind::Internal, None, "i", &sources));
        diags.push(Diagnostic::new(Severity::Note, DiagnosticKind::Semantic, None, "n", &sources));
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.count(Severity::Note), 1);
        assert!(diags.has_errors());
        assert_eq!(diags.iter().next().map(|d| d.rendered()), Some("warning: w"));
    }
}
