//! Source files and the position-tracking character reader.

use std::fmt;
use std::path::{Path, PathBuf};

/// Index of a file in a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub usize);

/// A position in a source file. Lines and columns are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePos {
    pub file: FileId,
    pub line: usize,
    pub column: usize,
    /// Character offset from the start of the file.
    pub offset: usize,
}

impl SourcePos {
    pub fn start_of(file: FileId) -> Self {
        Self {
            file,
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

/// A loaded source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path as written by the user (for messages)
    pub path: PathBuf,
    /// Canonical path, used for file identity. `None` for in-memory sources.
    pub canonical: Option<PathBuf>,
    /// Raw text
    pub text: String,
}

/// Every file opened while loading one circuit, including imports.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<PathBuf>, canonical: Option<PathBuf>, text: String) -> FileId {
        self.files.push(SourceFile {
            path: path.into(),
            canonical,
            text,
        });
        FileId(self.files.len() - 1)
    }

    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.0]
    }

    pub fn path(&self, id: FileId) -> &Path {
        &self.files[id.0].path
    }

    /// Text of the line containing `pos`, without its line terminator.
    pub fn line_text(&self, pos: SourcePos) -> Option<&str> {
        let text = &self.files.get(pos.file.0)?.text;
        let mut rest = text.as_str();
        // Same line counting as `Reader`: "\r\n", "\r" and "\n" each end a line.
        for _ in 1..pos.line {
            let end = rest.find(|c| c == '\n' || c == '\r')?;
            let skip = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
            rest = &rest[end + skip..];
        }
        let end = rest.find(|c| c == '\n' || c == '\r').unwrap_or(rest.len());
        Some(&rest[..end])
    }

    /// `path:line:column` for messages.
    pub fn describe(&self, pos: SourcePos) -> String {
        match self.files.get(pos.file.0) {
            Some(file) => format!("{}:{}:{}", file.path.display(), pos.line, pos.column),
            None => format!("<unknown>:{}:{}", pos.line, pos.column),
        }
    }
}

/// Character reader that tracks line, column and offset.
///
/// `\r\n` and a bare `\r` are both delivered as a single `\n`.
#[derive(Debug, Clone)]
pub struct Reader {
    chars: Vec<char>,
    index: usize,
    pos: SourcePos,
}

impl Reader {
    pub fn new(file: FileId, text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            index: 0,
            pos: SourcePos::start_of(file),
        }
    }

    /// Position of the next character.
    pub fn pos(&self) -> SourcePos {
        self.pos
    }

    pub fn file(&self) -> FileId {
        self.pos.file
    }

    pub fn at_eof(&self) -> bool {
        self.index >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        match self.chars.get(self.index).copied() {
            Some('\r') => Some('\n'),
            other => other,
        }
    }

    /// The character after the next one, without normalization.
    pub fn peek_second(&self) -> Option<char> {
        self.chars.get(self.index + 1).copied()
    }

    pub fn next(&mut self) -> Option<char> {
        let ch = *self.chars.get(self.index)?;
        self.index += 1;
        let ch = if ch == '\r' {
            if self.chars.get(self.index) == Some(&'\n') {
                self.index += 1;
            }
            '\n'
        } else {
            ch
        };
        self.pos.offset = self.index;
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(ch)
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_tracks_lines() {
        let mut reader = Reader::new(FileId(0), "ab\ncd");
        assert_eq!(reader.next(), Some('a'));
        assert_eq!(reader.next(), Some('b'));
        assert_eq!(reader.pos().column, 3);
        assert_eq!(reader.next(), Some('\n'));
        assert_eq!(reader.pos().line, 2);
        assert_eq!(reader.pos().column, 1);
        assert_eq!(reader.next(), Some('c'));
        assert_eq!(reader.next(), Some('d'));
        assert!(reader.at_eof());
        assert_eq!(reader.next(), None);
    }

    #[test]
    fn test_reader_normalizes_line_endings() {
        let mut reader = Reader::new(FileId(0), "a\r\nb\rc");
        let text: String = std::iter::from_fn(|| reader.next()).collect();
        assert_eq!(text, "a\nb\nc");
        assert_eq!(reader.pos().line, 3);
    }

    #[test]
    fn test_line_text() {
        let mut map = SourceMap::new();
        let id = map.add("mem", None, "first\nsecond\nthird".to_string());
        let pos = SourcePos {
            file: id,
            line: 2,
            column: 1,
            offset: 6,
        };
        assert_eq!(map.line_text(pos), Some("second"));
        assert_eq!(map.describe(pos), "mem:2:1");
    }
}
