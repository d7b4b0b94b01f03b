//! Lexer (tokenizer) for the circuit definition language.

use std::path::{Path, PathBuf};

use super::reader::{FileId, Reader, SourcePos};
use super::symbols::{Symbol, SymbolTable};
use crate::components::DeviceType;
use crate::error::LexError;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: SourcePos,
}

/// Token types in the language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    /// A device type name such as `NAND`
    DeviceType(DeviceType),
    Identifier(Symbol),
    Number(i32),
    /// A quoted file name
    Str(String),
    Equals,
    Colon,
    Semicolon,
    Comma,
    OpenBrace,
    CloseBrace,
    Dot,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Dev,
    Monitor,
    As,
    Import,
}

impl Keyword {
    pub fn from_ident(text: &str) -> Option<Self> {
        [Keyword::Dev, Keyword::Monitor, Keyword::As, Keyword::Import]
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(text))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Dev => "dev",
            Keyword::Monitor => "monitor",
            Keyword::As => "as",
            Keyword::Import => "import",
        }
    }
}

impl TokenKind {
    /// Human-readable description for "expected X, found Y" messages.
    pub fn describe(&self, symbols: &SymbolTable) -> String {
        match self {
            TokenKind::Keyword(k) => format!("keyword '{}'", k.as_str()),
            TokenKind::DeviceType(t) => format!("device type '{}'", t),
            TokenKind::Identifier(s) => format!("'{}'", symbols.text(*s)),
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::Str(s) => format!("string \"{}\"", s),
            TokenKind::Equals => "'='".to_string(),
            TokenKind::Colon => "':'".to_string(),
            TokenKind::Semicolon => "';'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::OpenBrace => "'{'".to_string(),
            TokenKind::CloseBrace => "'}'".to_string(),
            TokenKind::Dot => "'.'".to_string(),
            TokenKind::Eof => "end of file".to_string(),
        }
    }
}

/// Lexer over one source file, with one token of lookahead.
pub struct Lexer {
    reader: Reader,
    peeked: Option<Token>,
    /// Canonical path of the file, for import cycle detection
    canonical: Option<PathBuf>,
}

impl Lexer {
    pub fn new(reader: Reader, canonical: Option<PathBuf>) -> Self {
        Self {
            reader,
            peeked: None,
            canonical,
        }
    }

    pub fn file(&self) -> FileId {
        self.reader.file()
    }

    pub fn canonical(&self) -> Option<&Path> {
        self.canonical.as_deref()
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self, symbols: &mut SymbolTable) -> Result<Token, LexError> {
        if let Some(token) = &self.peeked {
            return Ok(token.clone());
        }
        let token = self.lex(symbols)?;
        self.peeked = Some(token.clone());
        Ok(token)
    }

    /// Consume the next token.
    pub fn step(&mut self, symbols: &mut SymbolTable) -> Result<Token, LexError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lex(symbols),
        }
    }

    fn lex(&mut self, symbols: &mut SymbolTable) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;

        let pos = self.reader.pos();
        let ch = match self.reader.peek() {
            Some(ch) => ch,
            None => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    pos,
                })
            }
        };

        let kind = match ch {
            '=' | ':' | ';' | ',' | '{' | '}' | '.' => {
                self.reader.next();
                match ch {
                    '=' => TokenKind::Equals,
                    ':' => TokenKind::Colon,
                    ';' => TokenKind::Semicolon,
                    ',' => TokenKind::Comma,
                    '{' => TokenKind::OpenBrace,
                    '}' => TokenKind::CloseBrace,
                    _ => TokenKind::Dot,
                }
            }
            '"' => TokenKind::Str(self.read_string(pos)?),
            '0'..='9' => TokenKind::Number(self.read_number(pos)?),
            _ if ch.is_ascii_alphabetic() => {
                let text = self.read_identifier();
                if let Some(keyword) = Keyword::from_ident(&text) {
                    TokenKind::Keyword(keyword)
                } else if let Some(ty) = DeviceType::from_keyword(&text) {
                    TokenKind::DeviceType(ty)
                } else {
                    TokenKind::Identifier(symbols.intern(&text))
                }
            }
            _ => {
                self.reader.next();
                return Err(LexError::IllegalCharacter { ch, pos });
            }
        };

        Ok(Token { kind, pos })
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        while let Some(ch) = self.reader.peek() {
            if ch.is_whitespace() {
                self.reader.next();
            } else if ch == '/' && self.reader.peek_second() == Some('/') {
                while let Some(c) = self.reader.next() {
                    if c == '\n' {
                        break;
                    }
                }
            } else if ch == '/' && self.reader.peek_second() == Some('*') {
                let start = self.reader.pos();
                self.reader.next();
                self.reader.next();
                let mut prev = None;
                loop {
                    match self.reader.next() {
                        None => return Err(LexError::UnterminatedComment { pos: start }),
                        Some('/') if prev == Some('*') => break,
                        c => prev = c,
                    }
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn read_identifier(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.reader.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                text.push(ch);
                self.reader.next();
            } else {
                break;
            }
        }
        text
    }

    fn read_number(&mut self, pos: SourcePos) -> Result<i32, LexError> {
        let mut value: i32 = 0;
        let mut overflow = false;
        while let Some(digit) = self.reader.peek().and_then(|c| c.to_digit(10)) {
            self.reader.next();
            if !overflow {
                match value.checked_mul(10).and_then(|v| v.checked_add(digit as i32)) {
                    Some(v) => value = v,
                    None => overflow = true,
                }
            }
        }
        if overflow {
            Err(LexError::IntegerOverflow { pos })
        } else {
            Ok(value)
        }
    }

    fn read_string(&mut self, pos: SourcePos) -> Result<String, LexError> {
        self.reader.next();
        let mut text = String::new();
        loop {
            match self.reader.peek() {
                None | Some('\n') => return Err(LexError::UnterminatedString { pos }),
                Some('"') => {
                    self.reader.next();
                    return Ok(text);
                }
                Some(c) => {
                    text.push(c);
                    self.reader.next();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(input: &str) -> (Vec<Result<TokenKind, LexError>>, SymbolTable) {
        let mut symbols = SymbolTable::new();
        let mut lexer = Lexer::new(Reader::new(FileId(0), input), None);
        let mut out = Vec::new();
        loop {
            match lexer.step(&mut symbols) {
                Ok(Token {
                    kind: TokenKind::Eof,
                    ..
                }) => break,
                Ok(tok) => out.push(Ok(tok.kind)),
                Err(e) => out.push(Err(e)),
            }
        }
        (out, symbols)
    }

    #[test]
    fn test_lexer_basic() {
        let (tokens, mut symbols) = lex_all("dev G1 = nand { I1: SW1.q; }");
        let g1 = symbols.intern("g1");
        let i1 = symbols.intern("I1");
        let sw1 = symbols.intern("SW1");
        let q = symbols.intern("Q");
        let expected = vec![
            TokenKind::Keyword(Keyword::Dev),
            TokenKind::Identifier(g1),
            TokenKind::Equals,
            TokenKind::DeviceType(DeviceType::Nand),
            TokenKind::OpenBrace,
            TokenKind::Identifier(i1),
            TokenKind::Colon,
            TokenKind::Identifier(sw1),
            TokenKind::Dot,
            TokenKind::Identifier(q),
            TokenKind::Semicolon,
            TokenKind::CloseBrace,
        ];
        let tokens: Vec<TokenKind> = tokens.into_iter().map(|t| t.unwrap()).collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_lexer_comments() {
        let (tokens, _) = lex_all("// line\n/* block\n * / */ monitor /**/ 12");
        let tokens: Vec<TokenKind> = tokens.into_iter().map(|t| t.unwrap()).collect();
        assert_eq!(
            tokens,
            vec![TokenKind::Keyword(Keyword::Monitor), TokenKind::Number(12)]
        );
    }

    #[test]
    fn test_unterminated_comment() {
        let (tokens, _) = lex_all("dev /* never closed");
        assert!(matches!(
            tokens.last(),
            Some(Err(LexError::UnterminatedComment { pos })) if pos.column == 5
        ));
    }

    #[test]
    fn test_number_overflow_consumes_digits() {
        let (tokens, _) = lex_all("99999999999999 ;");
        assert!(matches!(tokens[0], Err(LexError::IntegerOverflow { .. })));
        assert_eq!(tokens[1], Ok(TokenKind::Semicolon));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_illegal_character() {
        let (tokens, _) = lex_all("a $ b");
        assert!(matches!(tokens[1], Err(LexError::IllegalCharacter { ch: '$', .. })));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_strings() {
        let (tokens, _) = lex_all("import \"half_adder.circuit\";");
        assert_eq!(tokens[1], Ok(TokenKind::Str("half_adder.circuit".to_string())));
        let (tokens, _) = lex_all("import \"oops\n;");
        assert!(matches!(tokens[1], Err(LexError::UnterminatedString { .. })));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut symbols = SymbolTable::new();
        let mut lexer = Lexer::new(Reader::new(FileId(0), "monitor ;"), None);
        let first = lexer.peek(&mut symbols).unwrap();
        assert_eq!(lexer.peek(&mut symbols).unwrap(), first);
        assert_eq!(lexer.step(&mut symbols).unwrap(), first);
        assert_eq!(lexer.step(&mut symbols).unwrap().kind, TokenKind::Semicolon);
    }
}
