//! Reserved words of the Sub-C language
//!
//! The spellings live on `Keyword`; `ReservedWords` is the lookup table the
//! scanner consults. It is built explicitly and never changes after
//! construction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Sub-C reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Int,
    Float,
    Char,
    Void,
    Const,

    If,
    Else,
    While,
    For,
    Do,
    Return,
    Break,
    Continue,

    Input,
    Print,
}

impl Keyword {
    /// Every keyword, in table declaration order
    pub const ALL: [Keyword; 15] = [
        Keyword::Int,
        Keyword::Float,
        Keyword::Char,
        Keyword::Void,
        Keyword::Const,
        Keyword::If,
        Keyword::Else,
        Keyword::While,
        Keyword::For,
        Keyword::Do,
        Keyword::Return,
        Keyword::Break,
        Keyword::Continue,
        Keyword::Input,
        Keyword::Print,
    ];

    /// Exact spelling as it appears in source
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Char => "char",
            Self::Void => "void",
            Self::Const => "const",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::For => "for",
            Self::Do => "do",
            Self::Return => "return",
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Input => "input",
            Self::Print => "print",
        }
    }

    /// Symbolic kind name used when rendering tokens
    pub const fn symbolic_name(self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Char => "CHAR",
            Self::Void => "VOID",
            Self::Const => "CONST",
            Self::If => "IF",
            Self::Else => "ELSE",
            Self::While => "WHILE",
            Self::For => "FOR",
            Self::Do => "DO",
            Self::Return => "RETURN",
            Self::Break => "BREAK",
            Self::Continue => "CONTINUE",
            Self::Input => "INPUT",
            Self::Print => "PRINT",
        }
    }

    pub const fn is_type_name(self) -> bool {
        matches!(
            self,
            Self::Int | Self::Float | Self::Char | Self::Void | Self::Const
        )
    }

    pub const fn is_control_flow(self) -> bool {
        matches!(
            self,
            Self::If
                | Self::Else
                | Self::While
                | Self::For
                | Self::Do
                | Self::Return
                | Self::Break
                | Self::Continue
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Exact, case-sensitive map from spelling to keyword
#[derive(Debug, Clone)]
pub struct ReservedWords {
    words: HashMap<&'static str, Keyword>,
}

impl ReservedWords {
    /// Build the table for the full Sub-C keyword set
    pub fn new() -> Self {
        Self::from_keywords(&Keyword::ALL)
    }

    /// Build a table restricted to the given keywords
    pub fn from_keywords(keywords: &[Keyword]) -> Self {
        let words = keywords.iter().map(|&kw| (kw.as_str(), kw)).collect();
        Self { words }
    }

    pub fn lookup(&self, lexeme: &str) -> Option<Keyword> {
        self.words.get(lexeme).copied()
    }

    pub fn is_reserved(&self, lexeme: &str) -> bool {
        self.words.contains_key(lexeme)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Reserved spellings, sorted
    pub fn spellings(&self) -> Vec<&'static str> {
        let mut spellings: Vec<_> = self.words.keys().copied().collect();
        spellings.sort_unstable();
        spellings
    }
}

impl Default for ReservedWords {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_exact() {
        let table = ReservedWords::new();
        assert_eq!(table.lookup("if"), Some(Keyword::If));
        assert_eq!(table.lookup("ifx"), None);
        assert_eq!(table.lookup("i"), None);
        assert_eq!(table.lookup("IF"), None);
        assert_eq!(table.lookup("While"), None);
    }

    #[test]
    fn test_every_keyword_is_registered() {
        let table = ReservedWords::new();
        assert_eq!(table.len(), Keyword::ALL.len());
        for keyword in Keyword::ALL {
            assert_eq!(table.lookup(keyword.as_str()), Some(keyword));
            assert_eq!(
                keyword.symbolic_name(),
                keyword.as_str().to_ascii_uppercase()
            );
        }
    }

    #[test]
    fn test_restricted_table() {
        let table = ReservedWords::from_keywords(&[Keyword::Int, Keyword::Return]);
        assert!(table.is_reserved("int"));
        assert!(!table.is_reserved("print"));
        assert_eq!(table.spellings(), vec!["int", "return"]);
    }

    #[test]
    fn test_keyword_groups() {
        assert!(Keyword::Float.is_type_name());
        assert!(Keyword::Continue.is_control_flow());
        assert!(!Keyword::Print.is_control_flow());
        assert!(!Keyword::Print.is_type_name());
    }
}
