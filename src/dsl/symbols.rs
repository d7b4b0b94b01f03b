//! Case-insensitive identifier interning.

use std::collections::HashMap;
use std::fmt;

/// Handle to an interned identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    /// The empty name. Used for the single unnamed output of most devices.
    pub const BLANK: Symbol = Symbol(0);

    pub fn is_blank(&self) -> bool {
        *self == Self::BLANK
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-network symbol table.
///
/// Lookups fold ASCII case, but [`SymbolTable::text`] hands back the
/// spelling seen on first insertion.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    index: HashMap<String, Symbol>,
    texts: Vec<String>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            texts: vec![String::new()],
        }
    }

    /// Intern `text`, returning the existing symbol if one matches ignoring case.
    pub fn intern(&mut self, text: &str) -> Symbol {
        if text.is_empty() {
            return Symbol::BLANK;
        }
        let key = text.to_ascii_lowercase();
        if let Some(&symbol) = self.index.get(&key) {
            return symbol;
        }
        let symbol = Symbol(self.texts.len() as u32);
        self.texts.push(text.to_string());
        self.index.insert(key, symbol);
        symbol
    }

    /// Find `text` without interning it.
    pub fn lookup(&self, text: &str) -> Option<Symbol> {
        if text.is_empty() {
            return Some(Symbol::BLANK);
        }
        self.index.get(&text.to_ascii_lowercase()).copied()
    }

    pub fn text(&self, symbol: Symbol) -> &str {
        self.texts
            .get(symbol.0 as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len_of(&self, symbol: Symbol) -> usize {
        self.text(symbol).chars().count()
    }

    /// Number of interned names, not counting the blank symbol.
    pub fn len(&self) -> usize {
        self.texts.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
